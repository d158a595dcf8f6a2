//! Log sanitization utilities
//!
//! Response bodies from archive servers (HTML error pages, whole snapshot files)
//! are cut down and flattened to one line before they reach debug/error logs.

/// Characters of a body kept in a log line.
const LOG_BODY_CHARS: usize = 256;

/// Shorten `body` to at most [`LOG_BODY_CHARS`] characters on a single line.
///
/// Line breaks and runs of whitespace collapse into one space. A shortened
/// body ends with a marker carrying its original byte length.
pub fn truncate_for_log(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(LOG_BODY_CHARS) {
        None => flat,
        Some((cut, _)) => format!("{}... ({} bytes)", &flat[..cut], body.len()),
    }
}
