//! Strict hex helpers shared by the assembler, the CLIs and the run request.

use std::fmt::Write as _;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("odd-length hex string ({0} digits)")]
    OddLength(usize),
    #[error("invalid hex character {ch:?} at position {pos}")]
    InvalidChar { pos: usize, ch: char },
}

pub fn is_hex_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Parses an even-length string of hex digits; no prefix, no whitespace.
pub fn parse_hex(s: &str) -> Result<Vec<u8>, HexError> {
    if let Some((pos, ch)) = s.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(HexError::InvalidChar { pos, ch });
    }
    if s.len() % 2 != 0 {
        return Err(HexError::OddLength(s.len()));
    }
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() / 2);
    for pair in bytes.chunks_exact(2) {
        out.push((nibble(pair[0]) << 4) | nibble(pair[1]));
    }
    Ok(out)
}

fn nibble(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

/// Lowercase hex, no separators.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Strips whitespace and a leading `0x`, then lowercases.
pub fn clean_hex(s: &str) -> String {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let body = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    body.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_mixed_case() {
        assert_eq!(parse_hex("00aBFf").unwrap(), vec![0x00, 0xab, 0xff]);
        assert_eq!(parse_hex("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn parse_rejects_odd_and_garbage() {
        assert_eq!(parse_hex("abc"), Err(HexError::OddLength(3)));
        assert_eq!(parse_hex("0g"), Err(HexError::InvalidChar { pos: 1, ch: 'g' }));
        assert!(parse_hex("0x00").is_err());
    }

    #[test]
    fn clean_strips_prefix_and_space() {
        assert_eq!(clean_hex(" 0x76 A9\n14 "), "76a914");
        assert_eq!(to_hex(&[0x76, 0xa9]), "76a9");
    }
}
