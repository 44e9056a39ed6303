use std::collections::HashMap;
use std::sync::OnceLock;

pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;

/// Largest payload encoded with a bare length byte (opcodes 0x01..=0x4b).
pub const MAX_INLINE_PUSH: u8 = 0x4b;

#[derive(Debug, Clone, Copy)]
pub struct OpcodeDesc {
    pub name: &'static str,
    pub byte: u8,
}

const fn op(name: &'static str, byte: u8) -> OpcodeDesc {
    OpcodeDesc { name, byte }
}

/// Declaration order matters: for aliased bytes the first name is canonical.
pub const TABLE: &[OpcodeDesc] = &[
    // constants
    op("OP_0", 0x00),
    op("OP_FALSE", 0x00),
    op("OP_PUSHDATA1", 0x4c),
    op("OP_PUSHDATA2", 0x4d),
    op("OP_PUSHDATA4", 0x4e),
    op("OP_1NEGATE", 0x4f),
    op("OP_RESERVED", 0x50),
    op("OP_1", 0x51),
    op("OP_TRUE", 0x51),
    op("OP_2", 0x52),
    op("OP_3", 0x53),
    op("OP_4", 0x54),
    op("OP_5", 0x55),
    op("OP_6", 0x56),
    op("OP_7", 0x57),
    op("OP_8", 0x58),
    op("OP_9", 0x59),
    op("OP_10", 0x5a),
    op("OP_11", 0x5b),
    op("OP_12", 0x5c),
    op("OP_13", 0x5d),
    op("OP_14", 0x5e),
    op("OP_15", 0x5f),
    op("OP_16", 0x60),
    // flow control
    op("OP_NOP", 0x61),
    op("OP_VER", 0x62),
    op("OP_IF", 0x63),
    op("OP_NOTIF", 0x64),
    op("OP_VERIF", 0x65),
    op("OP_VERNOTIF", 0x66),
    op("OP_ELSE", 0x67),
    op("OP_ENDIF", 0x68),
    op("OP_VERIFY", 0x69),
    op("OP_RETURN", 0x6a),
    // stack
    op("OP_TOALTSTACK", 0x6b),
    op("OP_FROMALTSTACK", 0x6c),
    op("OP_2DROP", 0x6d),
    op("OP_2DUP", 0x6e),
    op("OP_3DUP", 0x6f),
    op("OP_2OVER", 0x70),
    op("OP_2ROT", 0x71),
    op("OP_2SWAP", 0x72),
    op("OP_IFDUP", 0x73),
    op("OP_DEPTH", 0x74),
    op("OP_DROP", 0x75),
    op("OP_DUP", 0x76),
    op("OP_NIP", 0x77),
    op("OP_OVER", 0x78),
    op("OP_PICK", 0x79),
    op("OP_ROLL", 0x7a),
    op("OP_ROT", 0x7b),
    op("OP_SWAP", 0x7c),
    op("OP_TUCK", 0x7d),
    // splice
    op("OP_CAT", 0x7e),
    op("OP_SUBSTR", 0x7f),
    op("OP_LEFT", 0x80),
    op("OP_RIGHT", 0x81),
    op("OP_SIZE", 0x82),
    // bitwise logic
    op("OP_INVERT", 0x83),
    op("OP_AND", 0x84),
    op("OP_OR", 0x85),
    op("OP_XOR", 0x86),
    op("OP_EQUAL", 0x87),
    op("OP_EQUALVERIFY", 0x88),
    op("OP_RESERVED1", 0x89),
    op("OP_RESERVED2", 0x8a),
    // arithmetic
    op("OP_1ADD", 0x8b),
    op("OP_1SUB", 0x8c),
    op("OP_2MUL", 0x8d),
    op("OP_2DIV", 0x8e),
    op("OP_NEGATE", 0x8f),
    op("OP_ABS", 0x90),
    op("OP_NOT", 0x91),
    op("OP_0NOTEQUAL", 0x92),
    op("OP_ADD", 0x93),
    op("OP_SUB", 0x94),
    op("OP_MUL", 0x95),
    op("OP_DIV", 0x96),
    op("OP_MOD", 0x97),
    op("OP_LSHIFT", 0x98),
    op("OP_RSHIFT", 0x99),
    op("OP_BOOLAND", 0x9a),
    op("OP_BOOLOR", 0x9b),
    op("OP_NUMEQUAL", 0x9c),
    op("OP_NUMEQUALVERIFY", 0x9d),
    op("OP_NUMNOTEQUAL", 0x9e),
    op("OP_LESSTHAN", 0x9f),
    op("OP_GREATERTHAN", 0xa0),
    op("OP_LESSTHANOREQUAL", 0xa1),
    op("OP_GREATERTHANOREQUAL", 0xa2),
    op("OP_MIN", 0xa3),
    op("OP_MAX", 0xa4),
    op("OP_WITHIN", 0xa5),
    // crypto
    op("OP_RIPEMD160", 0xa6),
    op("OP_SHA1", 0xa7),
    op("OP_SHA256", 0xa8),
    op("OP_HASH160", 0xa9),
    op("OP_HASH256", 0xaa),
    op("OP_CODESEPARATOR", 0xab),
    op("OP_CHECKSIG", 0xac),
    op("OP_CHECKSIGVERIFY", 0xad),
    op("OP_CHECKMULTISIG", 0xae),
    op("OP_CHECKMULTISIGVERIFY", 0xaf),
    // expansion
    op("OP_NOP1", 0xb0),
    op("OP_NOP2", 0xb1),
    op("OP_CHECKLOCKTIMEVERIFY", 0xb1),
    op("OP_NOP3", 0xb2),
    op("OP_CHECKSEQUENCEVERIFY", 0xb2),
    op("OP_NOP4", 0xb3),
    op("OP_NOP5", 0xb4),
    op("OP_NOP6", 0xb5),
    op("OP_NOP7", 0xb6),
    op("OP_NOP8", 0xb7),
    op("OP_NOP9", 0xb8),
    op("OP_NOP10", 0xb9),
    op("OP_CHECKSIGADD", 0xba),
    // template matching pseudo-words
    op("OP_PUBKEYHASH", 0xfd),
    op("OP_PUBKEY", 0xfe),
    op("OP_INVALIDOPCODE", 0xff),
];

/// Bidirectional name/byte lookup built once from [`TABLE`].
pub struct OpcodeTable {
    by_byte: [Option<&'static str>; 256],
    by_name: HashMap<&'static str, u8>,
}

impl OpcodeTable {
    pub fn new() -> Self {
        let mut by_byte = [None; 256];
        let mut by_name = HashMap::with_capacity(TABLE.len());
        for desc in TABLE {
            let slot = &mut by_byte[desc.byte as usize];
            if slot.is_none() {
                *slot = Some(desc.name);
            }
            by_name.entry(desc.name).or_insert(desc.byte);
        }
        Self { by_byte, by_name }
    }

    /// Process-wide table.
    pub fn global() -> &'static OpcodeTable {
        static TABLE_CELL: OnceLock<OpcodeTable> = OnceLock::new();
        TABLE_CELL.get_or_init(OpcodeTable::new)
    }

    pub fn name_to_byte(&self, name: &str) -> Option<u8> {
        self.by_name.get(name).copied()
    }

    pub fn byte_to_name(&self, byte: u8) -> Option<&'static str> {
        self.by_byte[byte as usize]
    }
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::new()
    }
}

pub fn name_to_byte(name: &str) -> Option<u8> {
    OpcodeTable::global().name_to_byte(name)
}

pub fn byte_to_name(byte: u8) -> Option<&'static str> {
    OpcodeTable::global().byte_to_name(byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_declared_alias_is_canonical() {
        let t = OpcodeTable::new();
        assert_eq!(t.name_to_byte("OP_FALSE"), Some(0x00));
        assert_eq!(t.name_to_byte("OP_0"), Some(0x00));
        assert_eq!(t.byte_to_name(0x00), Some("OP_0"));
        assert_eq!(t.byte_to_name(0x51), Some("OP_1"));
        assert_eq!(t.byte_to_name(0xb1), Some("OP_NOP2"));
        assert_eq!(t.name_to_byte("OP_CHECKLOCKTIMEVERIFY"), Some(0xb1));
    }

    #[test]
    fn unassigned_bytes_have_no_name() {
        let t = OpcodeTable::new();
        assert_eq!(t.byte_to_name(0xbb), None);
        assert_eq!(t.byte_to_name(0xfc), None);
        assert_eq!(t.name_to_byte("OP_BOGUS"), None);
    }

    #[test]
    fn small_int_range_is_contiguous() {
        for n in 1..=16u8 {
            assert_eq!(name_to_byte(&format!("OP_{n}")), Some(OP_1 + n - 1));
        }
        assert_eq!(OP_1 + 15, OP_16);
    }
}
