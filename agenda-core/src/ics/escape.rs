//! TEXT value escaping (RFC 5545 §3.3.11).

/// Escape backslash, semicolon, comma and line breaks.
///
/// Backslashes are handled in the same pass as everything else, so an escape
/// sequence produced here is never escaped again. CRLF, LF and lone CR all
/// become the two characters `\n`.
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => result.push_str("\\\\"),
            ';' => result.push_str("\\;"),
            ',' => result.push_str("\\,"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                result.push_str("\\n");
            }
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }

    result
}
