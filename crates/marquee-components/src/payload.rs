//! Copy payload encoding.
//!
//! Code snippets are embedded in the copy button's inline handler as a
//! single-quoted argument. Newlines become `\n`, quotes become `\'` and
//! backslashes become `\\`, so the encoding stays reversible for any input.

/// Encode text for embedding in `copyToClipboard('...')`.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode a payload produced by [`escape`].
///
/// Unknown escape sequences and a trailing lone backslash are kept verbatim.
pub fn unescape(payload: &str) -> String {
    let mut out = String::with_capacity(payload.len());
    let mut chars = payload.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
