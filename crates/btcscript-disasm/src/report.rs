use anyhow::Result;
use serde::Serialize;

use btcscript_rs::disasm::Instruction;
use btcscript_rs::hex::to_hex;
use btcscript_rs::OffsetMaps;

#[derive(Debug, Clone, Serialize)]
pub struct InstrOut {
    pub offset: usize,
    pub len: usize,
    pub asm: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisasmReport {
    pub hex: String,
    pub len: usize,
    pub instructions: Vec<InstrOut>,
}

impl DisasmReport {
    pub fn from_instructions(bytes: &[u8], instrs: &[Instruction]) -> Self {
        Self {
            hex: to_hex(bytes),
            len: bytes.len(),
            instructions: instrs
                .iter()
                .map(|i| InstrOut { offset: i.offset, len: i.len, asm: i.chunk.to_string() })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LineOut {
    pub line: usize,
    pub offset: usize,
    pub first_token: Option<usize>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PcOut {
    pub offset: usize,
    pub token: usize,
}

/// Line table and pc map of an ASM source, flattened for JSON.
#[derive(Debug, Clone, Serialize)]
pub struct OffsetReport {
    pub total_len: usize,
    pub token_count: usize,
    pub lines: Vec<LineOut>,
    pub pcs: Vec<PcOut>,
}

impl OffsetReport {
    pub fn compute(src: &str) -> Result<Self> {
        let maps = OffsetMaps::compute(src)?;
        Ok(Self::from_maps(&maps))
    }

    pub fn from_maps(maps: &OffsetMaps) -> Self {
        let lines = maps
            .line_offsets
            .iter()
            .enumerate()
            .map(|(i, &offset)| LineOut {
                line: i + 1,
                offset,
                first_token: maps.line_first_token.get(&(i + 1)).copied(),
            })
            .collect();
        let pcs = maps.pc_map.iter().map(|(&offset, &token)| PcOut { offset, token }).collect();
        Self { total_len: maps.total_len, token_count: maps.token_count, lines, pcs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn offset_report_flattens_maps() {
        let r = OffsetReport::compute("OP_DUP\n<abcd>").unwrap();
        assert_eq!(
            r.lines,
            vec![
                LineOut { line: 1, offset: 0, first_token: Some(0) },
                LineOut { line: 2, offset: 1, first_token: Some(1) },
            ]
        );
        assert_eq!(
            r.pcs,
            vec![PcOut { offset: 0, token: 0 }, PcOut { offset: 1, token: 1 }, PcOut { offset: 4, token: 1 }]
        );
    }
}
