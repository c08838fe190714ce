// Output formatting for terminal display.

pub mod terminal;

/// Truncate to at most `max_chars` characters, appending "..." if anything was cut.
///
/// Cuts on a character boundary, so multi-byte names never panic.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
