//! ASM text -> bytecode.
//!
//! Tokens are separated by runs of whitespace. Each token is classified in a
//! fixed priority order (bracketed hex, `-1`, small decimal, `OP_*` mnemonic,
//! bare hex) and encoded independently, so the output is the plain
//! concatenation of per-token encodings.

use tracing::debug;

use crate::error::ScriptError;
use crate::hex::{is_hex_digits, parse_hex};
use crate::opcodes::{self, OP_0, OP_1, OP_1NEGATE, OP_PUSHDATA1, OP_PUSHDATA2, OP_PUSHDATA4};

/// One whitespace-delimited unit of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// 1-based source line.
    pub line: usize,
}

/// A classified token, ready to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Op(u8),
    Push(Vec<u8>),
}

impl Item {
    /// Encoded size in bytes.
    pub fn width(&self) -> usize {
        match self {
            Item::Op(_) => 1,
            Item::Push(data) => prefix_len(data.len()) + data.len(),
        }
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), ScriptError> {
        match self {
            Item::Op(b) => out.push(*b),
            Item::Push(data) => {
                write_push_prefix(out, data.len())?;
                out.extend_from_slice(data);
            }
        }
        Ok(())
    }
}

pub fn tokenize(src: &str) -> Vec<Token> {
    src.lines()
        .enumerate()
        .flat_map(|(i, line)| {
            line.split_whitespace().map(move |t| Token {
                text: t.to_string(),
                line: i + 1,
            })
        })
        .collect()
}

/// Token texts only; used to detect edits that change what gets assembled.
pub fn token_texts(src: &str) -> Vec<String> {
    src.split_whitespace().map(str::to_string).collect()
}

/// Length of the minimal push prefix for a payload of `len` bytes.
pub fn prefix_len(len: usize) -> usize {
    if len <= opcodes::MAX_INLINE_PUSH as usize {
        1
    } else if len <= 0xff {
        2
    } else if len <= 0xffff {
        3
    } else {
        5
    }
}

pub fn write_push_prefix(out: &mut Vec<u8>, len: usize) -> Result<(), ScriptError> {
    if len <= opcodes::MAX_INLINE_PUSH as usize {
        out.push(len as u8);
    } else if len <= 0xff {
        out.push(OP_PUSHDATA1);
        out.push(len as u8);
    } else if len <= 0xffff {
        out.push(OP_PUSHDATA2);
        out.extend_from_slice(&(len as u16).to_le_bytes());
    } else {
        let n = u32::try_from(len).map_err(|_| ScriptError::PushTooLarge { len })?;
        out.push(OP_PUSHDATA4);
        out.extend_from_slice(&n.to_le_bytes());
    }
    Ok(())
}

/// Minimal push encoding of `data`.
pub fn encode_push(data: &[u8]) -> Result<Vec<u8>, ScriptError> {
    let mut out = Vec::with_capacity(prefix_len(data.len()) + data.len());
    write_push_prefix(&mut out, data.len())?;
    out.extend_from_slice(data);
    Ok(out)
}

fn small_int(s: &str) -> Option<u8> {
    let n: u8 = s.parse().ok()?;
    (n <= 16 && n.to_string() == s).then_some(n)
}

fn is_mnemonic(s: &str) -> bool {
    s.strip_prefix("OP_").is_some_and(|rest| {
        !rest.is_empty()
            && rest
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
    })
}

pub fn parse_token(tok: &Token) -> Result<Item, ScriptError> {
    let s = tok.text.as_str();
    let line = tok.line;

    if let Some(inner) = s.strip_prefix('<').and_then(|r| r.strip_suffix('>')) {
        let data = parse_hex(inner).map_err(|_| ScriptError::InvalidHexFormat {
            line,
            token: s.to_string(),
        })?;
        return Ok(Item::Push(data));
    }
    if s == "-1" {
        return Ok(Item::Op(OP_1NEGATE));
    }
    if let Some(n) = small_int(s) {
        return Ok(Item::Op(if n == 0 { OP_0 } else { OP_1 + (n - 1) }));
    }
    if is_mnemonic(s) {
        return opcodes::name_to_byte(s)
            .map(Item::Op)
            .ok_or_else(|| ScriptError::UnknownOpcode {
                line,
                name: s.to_string(),
            });
    }
    if is_hex_digits(s) {
        if s.len() % 2 != 0 {
            return Err(ScriptError::OddLengthHex {
                line,
                token: s.to_string(),
            });
        }
        let data = parse_hex(s).map_err(|_| ScriptError::InvalidHexFormat {
            line,
            token: s.to_string(),
        })?;
        return Ok(Item::Push(data));
    }
    Err(ScriptError::UnrecognizedToken {
        line,
        token: s.to_string(),
    })
}

/// Bytes the assembler emits for `tok`.
pub fn encoded_len(tok: &Token) -> Result<usize, ScriptError> {
    Ok(parse_token(tok)?.width())
}

pub fn assemble(src: &str) -> Result<Vec<u8>, ScriptError> {
    let tokens = tokenize(src);
    let mut out = Vec::new();
    for tok in &tokens {
        parse_token(tok)?.encode_into(&mut out)?;
    }
    debug!(tokens = tokens.len(), bytes = out.len(), "assembled");
    Ok(out)
}
