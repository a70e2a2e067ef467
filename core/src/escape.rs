//! POSIX single-quote escaping.

/// Quote `s` so a POSIX shell reads it back as exactly one argument.
///
/// The whole string is wrapped in single quotes, inside which nothing but a
/// single quote is special. Each embedded `'` becomes `'\''`: close the
/// quoted run, emit an escaped quote, reopen. The empty string becomes `''`.
pub fn shell_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

/// Byte form of `shell_escape` for arguments that need not be UTF-8.
///
/// Only the ASCII `'` is rewritten, so every other byte is kept as is.
pub fn shell_escape_bytes(s: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() + 2);
    out.push(b'\'');
    for &b in s {
        if b == b'\'' {
            out.extend_from_slice(b"'\\''");
        } else {
            out.push(b);
        }
    }
    out.push(b'\'');
    out
}
