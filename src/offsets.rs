//! Source line / byte offset / token index correspondence.
//!
//! Both tables are derived from the source text with the assembler's own
//! tokenizer and per-token widths, so an offset here is exactly the offset of
//! that token's encoding in `asm::assemble(src)`.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::asm::{encoded_len, tokenize};
use crate::error::ScriptError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OffsetMaps {
    /// `line_offsets[k - 1]` is the offset before line `k`'s first token.
    pub line_offsets: Vec<usize>,
    /// Token start offset -> token index, plus the end-of-program sentinel.
    pub pc_map: BTreeMap<usize, usize>,
    /// Index of the first token on each line that has one.
    pub line_first_token: BTreeMap<usize, usize>,
    /// Source line of each token, by token index.
    pub token_lines: Vec<usize>,
    pub total_len: usize,
    pub token_count: usize,
}

impl OffsetMaps {
    pub fn compute(src: &str) -> Result<Self, ScriptError> {
        let tokens = tokenize(src);
        let line_count = src.lines().count();

        let mut widths = Vec::with_capacity(tokens.len());
        for tok in &tokens {
            widths.push(encoded_len(tok)?);
        }

        let mut maps = OffsetMaps {
            line_offsets: Vec::with_capacity(line_count),
            token_count: tokens.len(),
            ..Default::default()
        };

        let mut offset = 0usize;
        let mut next = 0usize;
        for line in 1..=line_count {
            maps.line_offsets.push(offset);
            while next < tokens.len() && tokens[next].line == line {
                if !maps.line_first_token.contains_key(&line) {
                    maps.line_first_token.insert(line, next);
                }
                maps.pc_map.insert(offset, next);
                maps.token_lines.push(line);
                offset += widths[next];
                next += 1;
            }
        }
        maps.total_len = offset;
        if !tokens.is_empty() {
            maps.pc_map.insert(offset, tokens.len() - 1);
        }
        debug!(
            lines = line_count,
            tokens = maps.token_count,
            bytes = maps.total_len,
            "offset maps recomputed"
        );
        Ok(maps)
    }

    pub fn line_of_token(&self, index: usize) -> Option<usize> {
        self.token_lines.get(index).copied()
    }
}

/// Byte offsets for the given 1-based line numbers, ascending and deduplicated.
/// Lines outside the table are skipped.
pub fn translate_breakpoints(lines: &BTreeSet<usize>, line_offsets: &[usize]) -> Vec<usize> {
    let mut out: Vec<usize> = lines
        .iter()
        .filter_map(|&l| l.checked_sub(1).and_then(|i| line_offsets.get(i)).copied())
        .collect();
    out.dedup();
    out
}

/// Token whose encoding contains `pc`; `None` past the end-of-program sentinel.
pub fn translate_program_counter(pc: usize, pc_map: &BTreeMap<usize, usize>) -> Option<usize> {
    let (&end, _) = pc_map.last_key_value()?;
    if pc > end {
        return None;
    }
    pc_map.range(..=pc).next_back().map(|(_, &idx)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_repeat_the_running_offset() {
        let maps = OffsetMaps::compute("OP_DUP\n\n<0011>\nOP_EQUAL").unwrap();
        assert_eq!(maps.line_offsets, vec![0, 1, 1, 4]);
        assert_eq!(maps.total_len, 5);
    }

    #[test]
    fn sentinel_maps_to_last_token() {
        let maps = OffsetMaps::compute("OP_1 OP_2").unwrap();
        assert_eq!(maps.pc_map.get(&2), Some(&1));
        assert_eq!(translate_program_counter(2, &maps.pc_map), Some(1));
        assert_eq!(translate_program_counter(3, &maps.pc_map), None);
    }

    #[test]
    fn empty_source_has_no_map() {
        let maps = OffsetMaps::compute("").unwrap();
        assert!(maps.pc_map.is_empty());
        assert_eq!(translate_program_counter(0, &maps.pc_map), None);
    }
}
