//! # tapevm
//!
//! A two-stage engine for the eight-command tape language:
//!
//! - [`bytecode`] turns source text into a [`ProgramBc`], folding runs of
//!   identical commands and resolving every bracket to its partner.
//! - [`runtime`] executes a [`ProgramBc`] on a fixed 30,000-cell tape with
//!   byte-at-a-time I/O.
//!
//! ## Commands
//!
//! - `+` / `-` add to / subtract from the current cell
//! - `>` / `<` move the data pointer right / left
//! - `.` writes the current cell's low byte, `,` reads one byte into it
//! - `[` skips past the matching `]` when the current cell is zero
//! - `]` returns to the matching `[` when the current cell is non-zero
//!
//! Every other character is a comment.

use std::io::{Read, Write};

use thiserror::Error;

pub mod bytecode;
pub mod runtime;

pub use bytecode::{CompileError, Op, ProgramBc, compile};
pub use runtime::{RuntimeError, Vm, VmConfig};

/// Either stage's failure, for callers that compile and run in one go.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Compile `source` and run it on a fresh machine.
pub fn run_source<R: Read, W: Write>(
    source: &str,
    config: VmConfig,
    mut input: R,
    mut output: W,
) -> Result<(), Error> {
    let prog = compile(source)?;
    Vm::with_config(config).run(&prog, &mut input, &mut output)?;
    Ok(())
}
