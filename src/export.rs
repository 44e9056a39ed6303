//! Read-only textual views of a compiled script.

use crate::disasm::{decode_instructions, Chunk, Instruction};
use crate::error::ScriptError;
use crate::hex::to_hex;

/// `[OP_DUP, 0x0011.., OP_CHECKSIG]`: data pushes become `0x` literals.
pub fn render_data_literal(instrs: &[Instruction]) -> String {
    let items: Vec<String> = instrs
        .iter()
        .map(|i| match &i.chunk {
            Chunk::Data(data) => format!("0x{}", to_hex(data)),
            other => other.to_string(),
        })
        .collect();
    format!("[{}]", items.join(", "))
}

/// `{0x76, 0xa9, ...}` over the raw bytes.
pub fn render_brace_initializer(bytes: &[u8]) -> String {
    let items: Vec<String> = bytes.iter().map(|b| format!("0x{b:02x}")).collect();
    format!("{{{}}}", items.join(", "))
}

/// Both views at once; fails only if `bytes` does not disassemble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exports {
    pub data_literal: String,
    pub brace_initializer: String,
}

impl Exports {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ScriptError> {
        let instrs = decode_instructions(bytes)?;
        Ok(Self {
            data_literal: render_data_literal(&instrs),
            brace_initializer: render_brace_initializer(bytes),
        })
    }
}
