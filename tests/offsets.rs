use std::collections::BTreeSet;

use btcscript_rs::asm::tokenize;
use btcscript_rs::disasm::decode_instructions;
use btcscript_rs::offsets::{translate_breakpoints, translate_program_counter};
use btcscript_rs::{assemble, OffsetMaps, ScriptError};
use pretty_assertions::assert_eq;

const SRC: &str = "OP_DUP OP_HASH160\n\n<00112233445566778899aabbccddeeff00112233>\nOP_EQUALVERIFY   OP_CHECKSIG\n";

#[test]
fn line_table_matches_encoding() {
    let maps = OffsetMaps::compute(SRC).unwrap();
    assert_eq!(maps.line_offsets, vec![0, 2, 2, 23]);
    assert_eq!(maps.total_len, assemble(SRC).unwrap().len());
    assert_eq!(maps.token_count, 5);
}

#[test]
fn pc_map_agrees_with_disassembler() {
    let maps = OffsetMaps::compute(SRC).unwrap();
    let instrs = decode_instructions(&assemble(SRC).unwrap()).unwrap();
    for (idx, i) in instrs.iter().enumerate() {
        assert_eq!(maps.pc_map.get(&i.offset), Some(&idx));
    }
    assert_eq!(maps.pc_map.get(&25), Some(&4));
    assert_eq!(maps.pc_map.len(), instrs.len() + 1);
}

#[test]
fn line_offset_is_smallest_offset_of_first_token() {
    let src = "OP_1\n<aabb> OP_ADD\n\n   \nOP_2 OP_EQUAL\nOP_VERIFY";
    let maps = OffsetMaps::compute(src).unwrap();
    for (&line, &tok) in &maps.line_first_token {
        let smallest = maps
            .pc_map
            .iter()
            .filter(|(_, &t)| t == tok)
            .map(|(&off, _)| off)
            .min()
            .unwrap();
        assert_eq!(maps.line_offsets[line - 1], smallest, "line {line}");
    }
    let lines: Vec<usize> = tokenize(src).iter().map(|t| t.line).collect();
    assert_eq!(maps.token_lines, lines);
}

#[test]
fn breakpoints_translate_in_order() {
    let maps = OffsetMaps::compute(SRC).unwrap();
    let lines: BTreeSet<usize> = [4, 1, 3, 2, 99, 0].into_iter().collect();
    // lines 2 and 3 share an offset (line 2 is blank)
    assert_eq!(translate_breakpoints(&lines, &maps.line_offsets), vec![0, 2, 23]);
}

#[test]
fn program_counter_resolves_inside_a_push() {
    let maps = OffsetMaps::compute(SRC).unwrap();
    assert_eq!(translate_program_counter(0, &maps.pc_map), Some(0));
    assert_eq!(translate_program_counter(2, &maps.pc_map), Some(2));
    assert_eq!(translate_program_counter(10, &maps.pc_map), Some(2));
    assert_eq!(translate_program_counter(24, &maps.pc_map), Some(4));
    assert_eq!(translate_program_counter(25, &maps.pc_map), Some(4));
    assert_eq!(translate_program_counter(26, &maps.pc_map), None);
}

#[test]
fn invalid_source_has_no_maps() {
    assert!(matches!(
        OffsetMaps::compute("OP_DUP\nzz"),
        Err(ScriptError::UnrecognizedToken { line: 2, .. })
    ));
}
