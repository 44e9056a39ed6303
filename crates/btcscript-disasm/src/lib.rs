pub mod model;
pub mod report;

// Re-export commonly used types/functions for the binaries
pub use model::{load_program, InputFormat, Program};
pub use report::{DisasmReport, OffsetReport};
