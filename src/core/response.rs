//! Splitting replies to fit Discord message limits
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: `split_reply` keeps buttons on the final chunk
//! - 1.0.0: Line-aware, UTF-8 safe chunking

use super::reply::Reply;

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;

/// Chunk text into pieces of at most `max_size` bytes
///
/// Splits on line boundaries when possible and never inside a UTF-8 character.
pub fn chunk_text(text: &str, max_size: usize) -> Vec<String> {
    if text.len() <= max_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if !current.is_empty() && current.len() + line.len() + 1 > max_size {
            chunks.push(std::mem::take(&mut current));
        }

        if line.len() > max_size {
            chunks.extend(chunk_long_line(line, max_size));
            continue;
        }

        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn chunk_long_line(line: &str, max_size: usize) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();

    for ch in line.chars() {
        if current.len() + ch.len_utf8() > max_size && !current.is_empty() {
            result.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }

    if !current.is_empty() {
        result.push(current);
    }
    result
}

/// Split a reply into sendable messages; buttons go on the last one
pub fn split_reply(reply: Reply) -> Vec<Reply> {
    let mut parts: Vec<Reply> = chunk_text(&reply.text, MESSAGE_LIMIT)
        .into_iter()
        .map(Reply::text)
        .collect();

    if let Some(last) = parts.last_mut() {
        last.actions = reply.actions;
    }
    parts
}
