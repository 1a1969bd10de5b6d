//! Input utilities for terminal applications

/// Sanitize text for the single-line input field
///
/// This function:
/// - Converts tabs, newlines and carriage returns to single spaces
/// - Collapses a CRLF pair into one space
/// - Filters out all other control characters
///
/// Chat messages are one line on the wire, so pasted text is flattened
/// rather than split into several messages.
pub fn sanitize_text_input(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                sanitized.push(' ');
            }
            '\t' | '\n' => sanitized.push(' '),
            _ if !c.is_control() => sanitized.push(c),
            _ => {}
        }
    }

    sanitized
}
