//! RFC 5545 TEXT value escaping.

/// Reverse TEXT escaping: `\\`, `\,`, `\;` and `\n`/`\N`.
///
/// Unknown escapes and a trailing backslash are kept verbatim.
pub fn unescape_text(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }

    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => result.push('\\'),
            Some(',') => result.push(','),
            Some(';') => result.push(';'),
            Some('n') | Some('N') => result.push('\n'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}

/// Escape a value for a TEXT property. The result is always a single line.
pub fn escape_text(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace(',', r"\,")
        .replace(';', r"\;")
        .replace("\r\n", r"\n")
        .replace(['\r', '\n'], r"\n")
}
