pub mod asm;
pub mod config;
pub mod debugger;
pub mod disasm;
pub mod engine;
pub mod error;
pub mod export;
pub mod hex;
pub mod offsets;
pub mod opcodes;
pub mod session;

pub use asm::assemble;
pub use config::DebuggerConfig;
pub use debugger::{Debugger, RunOutcome, RunTicket};
pub use disasm::disassemble;
pub use engine::{Engine, ProcessEngine, RunRequest, RunResponse, RunStatus, TraceStep};
pub use error::{PushForm, ScriptError, TransportError};
pub use offsets::OffsetMaps;
pub use session::{Navigation, Phase, Session, View};
