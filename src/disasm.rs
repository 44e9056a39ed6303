use std::fmt::Write as _;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PushForm, ScriptError};
use crate::hex::to_hex;
use crate::opcodes::{
    self, MAX_INLINE_PUSH, OP_0, OP_1, OP_16, OP_1NEGATE, OP_PUSHDATA1, OP_PUSHDATA2,
    OP_PUSHDATA4,
};

/// One canonical ASM token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Chunk {
    Op(&'static str),
    SmallInt(i8),
    Data(Vec<u8>),
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Chunk::Op(name) => f.write_str(name),
            Chunk::SmallInt(n) => write!(f, "{n}"),
            Chunk::Data(data) => write!(f, "<{}>", to_hex(data)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub offset: usize,
    pub len: usize,
    pub chunk: Chunk,
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingOptions: u8 {
const OFFSETS = 1 << 0; // prefix each line with its byte offset
const BYTES = 1 << 1; // show the raw encoding
}
}

fn take(
    bytes: &[u8],
    start: usize,
    n: usize,
    form: PushForm,
    offset: usize,
) -> Result<&[u8], ScriptError> {
    let available = bytes.len().saturating_sub(start);
    if n > available {
        return Err(ScriptError::TruncatedPush {
            form,
            offset,
            declared: n,
            available,
        });
    }
    Ok(&bytes[start..start + n])
}

fn read_push(bytes: &[u8], offset: usize, op: u8) -> Result<(Vec<u8>, usize), ScriptError> {
    let (form, len_width) = match op {
        OP_PUSHDATA1 => (PushForm::PushData1, 1),
        OP_PUSHDATA2 => (PushForm::PushData2, 2),
        OP_PUSHDATA4 => (PushForm::PushData4, 4),
        _ => {
            let n = op as usize;
            let data = take(bytes, offset + 1, n, PushForm::Inline, offset)?;
            return Ok((data.to_vec(), 1 + n));
        }
    };
    let raw = take(bytes, offset + 1, len_width, form, offset)?;
    let mut le = [0u8; 4];
    le[..len_width].copy_from_slice(raw);
    let n = u32::from_le_bytes(le) as usize;
    let data = take(bytes, offset + 1 + len_width, n, form, offset)?;
    Ok((data.to_vec(), 1 + len_width + n))
}

/// Walks `bytes` one instruction at a time.
pub fn decode_instructions(bytes: &[u8]) -> Result<Vec<Instruction>, ScriptError> {
    let mut out = Vec::new();
    let mut pc = 0usize;
    while pc < bytes.len() {
        let op = bytes[pc];
        let (chunk, len) = match op {
            OP_0 => (Chunk::SmallInt(0), 1),
            1..=MAX_INLINE_PUSH | OP_PUSHDATA1 | OP_PUSHDATA2 | OP_PUSHDATA4 => {
                let (data, len) = read_push(bytes, pc, op)?;
                (Chunk::Data(data), len)
            }
            OP_1NEGATE => (Chunk::SmallInt(-1), 1),
            OP_1..=OP_16 => (Chunk::SmallInt((op - OP_1 + 1) as i8), 1),
            _ => {
                let name = opcodes::byte_to_name(op)
                    .ok_or(ScriptError::UnknownOpcodeByte { offset: pc, byte: op })?;
                (Chunk::Op(name), 1)
            }
        };
        out.push(Instruction { offset: pc, len, chunk });
        pc += len;
    }
    debug!(bytes = bytes.len(), tokens = out.len(), "disassembled");
    Ok(out)
}

/// Canonical ASM, one token per line.
pub fn disassemble(bytes: &[u8]) -> Result<String, ScriptError> {
    let instrs = decode_instructions(bytes)?;
    Ok(instrs
        .iter()
        .map(|i| i.chunk.to_string())
        .collect::<Vec<_>>()
        .join("\n"))
}

pub fn render_listing(instrs: &[Instruction], bytes: &[u8], opts: ListingOptions) -> String {
    let mut buf = String::new();
    for i in instrs {
        if opts.contains(ListingOptions::OFFSETS) {
            let _ = write!(buf, "{:#06x}: ", i.offset);
        }
        let raw = i
            .offset
            .checked_add(i.len)
            .and_then(|end| bytes.get(i.offset..end));
        // instructions not decoded from `bytes` get no bytes column
        if let Some(raw) = raw.filter(|_| opts.contains(ListingOptions::BYTES)) {
            // at most 8 bytes per line
            let shown = &raw[..raw.len().min(8)];
            for b in shown {
                let _ = write!(buf, "{b:02x} ");
            }
            if raw.len() > shown.len() {
                buf.push_str(".. ");
            }
            buf.push_str("  ");
        }
        let _ = writeln!(buf, "{}", i.chunk);
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushdata_length_field_truncated() {
        let err = decode_instructions(&[0x4d, 0x01]).unwrap_err();
        assert_eq!(
            err,
            ScriptError::TruncatedPush {
                form: PushForm::PushData2,
                offset: 0,
                declared: 2,
                available: 1
            }
        );
    }

    #[test]
    fn listing_with_offsets_and_bytes() {
        let bytes = [0x76, 0x02, 0xab, 0xcd, 0xac];
        let instrs = decode_instructions(&bytes).unwrap();
        let text = render_listing(&instrs, &bytes, ListingOptions::OFFSETS | ListingOptions::BYTES);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "0x0000: 76   OP_DUP");
        assert_eq!(lines[1], "0x0001: 02 ab cd   <abcd>");
        assert_eq!(lines[2], "0x0004: ac   OP_CHECKSIG");
    }

    #[test]
    fn listing_skips_bytes_outside_the_buffer() {
        let instrs = decode_instructions(&[0x76, 0xac]).unwrap();
        let text = render_listing(&instrs, &[0x76], ListingOptions::OFFSETS | ListingOptions::BYTES);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "0x0000: 76   OP_DUP");
        assert_eq!(lines[1], "0x0001: OP_CHECKSIG");
    }

    #[test]
    fn reserved_bytes_still_decode_by_name() {
        assert_eq!(disassemble(&[0x50, 0x89]).unwrap(), "OP_RESERVED\nOP_RESERVED1");
    }
}
