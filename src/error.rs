use serde::{Deserialize, Serialize};

/// Which length-prefix form a data push was encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PushForm {
    Inline,
    PushData1,
    PushData2,
    PushData4,
}

impl std::fmt::Display for PushForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushForm::Inline => write!(f, "inline push"),
            PushForm::PushData1 => write!(f, "OP_PUSHDATA1"),
            PushForm::PushData2 => write!(f, "OP_PUSHDATA2"),
            PushForm::PushData4 => write!(f, "OP_PUSHDATA4"),
        }
    }
}

/// Codec failures. Every variant aborts the whole assemble/disassemble call.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: invalid hex data '{token}'")]
    InvalidHexFormat { line: usize, token: String },
    #[error("line {line}: odd-length hex '{token}'")]
    OddLengthHex { line: usize, token: String },
    #[error("line {line}: unknown opcode '{name}'")]
    UnknownOpcode { line: usize, name: String },
    #[error("unknown opcode byte {byte:#04x} at offset {offset}")]
    UnknownOpcodeByte { offset: usize, byte: u8 },
    #[error("line {line}: unrecognized token '{token}'")]
    UnrecognizedToken { line: usize, token: String },
    #[error("truncated {form} at offset {offset}: declared {declared} bytes, {available} available")]
    TruncatedPush {
        form: PushForm,
        offset: usize,
        declared: usize,
        available: usize,
    },
    #[error("push of {len} bytes exceeds the OP_PUSHDATA4 limit")]
    PushTooLarge { len: usize },
}

/// Failures reaching the external engine. Never a script error.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("engine not configured")]
    NotConfigured,
    #[error("failed to start engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("engine i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("engine exited with status {status}: {stderr}")]
    Exit { status: i32, stderr: String },
    #[error("malformed engine response: {0}")]
    Malformed(#[from] serde_json::Error),
}
