pub mod runtime_error;
pub mod tape;
pub mod vm;

pub use runtime_error::RuntimeError;
pub use tape::{CellWidth, TAPE_LEN, Tape, TapePolicy};
pub use vm::{EofPolicy, Vm, VmConfig, execute};
