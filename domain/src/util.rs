//! Text helpers for log output.

/// Single-line preview of message text for logs.
///
/// Line breaks become spaces and the result is cut to at most `max_bytes`
/// on a character boundary, with `…` appended when anything was dropped.
pub fn preview(text: &str, max_bytes: usize) -> String {
    let flat: String = text
        .trim()
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();

    if flat.len() <= max_bytes {
        return flat;
    }
    let mut end = max_bytes;
    while end > 0 && !flat.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &flat[..end])
}
