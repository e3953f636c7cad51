pub mod compile;
pub mod compile_error;
pub mod disasm;
pub mod ir;
pub mod op;
pub mod verify;

pub use compile::{Compiler, Span, compile};
pub use compile_error::CompileError;
pub use ir::ProgramBc;
pub use op::Op;
