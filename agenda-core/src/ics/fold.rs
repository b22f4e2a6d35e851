//! Content line folding (RFC 5545 §3.1).

/// Maximum line length in octets, not counting the CRLF.
const MAX_LINE_OCTETS: usize = 75;

/// Fold a content line at 75 octets with CRLF followed by a single space.
///
/// Splits only on UTF-8 character boundaries. The returned string has no
/// trailing line terminator.
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut result = String::with_capacity(line.len() + (line.len() / MAX_LINE_OCTETS) * 3);
    let mut rest = line;
    // Continuation lines lose one octet to the leading space
    let mut limit = MAX_LINE_OCTETS;

    while rest.len() > limit {
        let mut end = limit;
        while !rest.is_char_boundary(end) {
            end -= 1;
        }

        result.push_str(&rest[..end]);
        result.push_str("\r\n ");
        rest = &rest[end..];
        limit = MAX_LINE_OCTETS - 1;
    }
    result.push_str(rest);

    result
}
