use std::io::{self, Read, Write};

use tracing::{debug, trace};

use crate::bytecode::{Op, ProgramBc};
use crate::runtime::runtime_error::RuntimeError;
use crate::runtime::tape::{CellWidth, Tape, TapePolicy};

/// What an input instruction does once the input stream is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum EofPolicy {
    /// Abort the run with [`RuntimeError::EndOfInput`].
    #[default]
    Fault,
    /// Store 0 in the current cell.
    Zero,
    /// Store -1 in the current cell (255 with 8-bit cells).
    MinusOne,
    /// Leave the current cell as it was.
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct VmConfig {
    pub tape_policy: TapePolicy,
    pub cell_width: CellWidth,
    pub eof_policy: EofPolicy,
    /// Abort after this many steps. Each dispatch is one step, except that
    /// folded I/O costs one step per byte transferred.
    pub max_steps: Option<u64>,
}

/// The tape machine.
///
/// State is rebuilt at the start of every [`Vm::run`] and left in place
/// afterwards (including after a fault) for inspection.
pub struct Vm {
    config: VmConfig,
    tape: Tape,
    ip: usize,
    steps: u64,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    pub fn with_config(config: VmConfig) -> Self {
        Self {
            tape: Tape::new(config.tape_policy, config.cell_width),
            config,
            ip: 0,
            steps: 0,
        }
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn data_pointer(&self) -> usize {
        self.tape.pointer()
    }

    pub fn instruction_pointer(&self) -> usize {
        self.ip
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn reset_execution_state(&mut self) {
        self.tape = Tape::new(self.config.tape_policy, self.config.cell_width);
        self.ip = 0;
        self.steps = 0;
    }

    /// Run a program to completion against the given streams.
    ///
    /// Returns once the instruction pointer walks off the end of the
    /// sequence. The output stream is flushed before every input
    /// instruction and before returning `Ok`.
    pub fn run<R: Read, W: Write>(
        &mut self,
        prog: &ProgramBc,
        input: &mut R,
        output: &mut W,
    ) -> Result<(), RuntimeError> {
        self.reset_execution_state();

        let ops = prog.ops();

        while self.ip < ops.len() {
            let op = ops[self.ip];
            self.check_limits(op)?;

            trace!(ip = self.ip, dp = self.tape.pointer(), %op, "dispatch");

            match op {
                Op::Inc(n) => self.tape.add(n),
                Op::Dec(n) => self.tape.sub(n),

                Op::Right(n) => self
                    .tape
                    .move_right(n)
                    .map_err(|e| RuntimeError::out_of_bounds(self.ip, e))?,
                Op::Left(n) => self
                    .tape
                    .move_left(n)
                    .map_err(|e| RuntimeError::out_of_bounds(self.ip, e))?,

                // Each repetition is its own transfer
                Op::Output(n) => {
                    for _ in 0..n {
                        self.put_byte(output)?;
                    }
                }
                Op::Input(n) => {
                    // Pending output has to be visible before a blocking read
                    output
                        .flush()
                        .map_err(|e| RuntimeError::stream_write(self.ip, e))?;
                    for _ in 0..n {
                        self.get_byte(input)?;
                    }
                }

                // Targets are absolute and land on the matching bracket,
                // which then runs its own test.
                Op::JumpIfZero(target) => {
                    if self.tape.get() == 0 {
                        self.ip = target;
                        continue;
                    }
                }
                Op::JumpIfNonZero(target) => {
                    if self.tape.get() != 0 {
                        self.ip = target;
                        continue;
                    }
                }
            }

            self.ip += 1;
        }

        output
            .flush()
            .map_err(|e| RuntimeError::stream_write(self.ip, e))?;

        debug!(steps = self.steps, "program finished");
        Ok(())
    }

    // Execution

    fn check_limits(&mut self, op: Op) -> Result<(), RuntimeError> {
        let cost = match op {
            Op::Output(n) | Op::Input(n) => u64::try_from(n).unwrap_or(u64::MAX),
            _ => 1,
        };
        self.steps = self.steps.saturating_add(cost);

        if let Some(limit) = self.config.max_steps {
            if self.steps > limit {
                return Err(RuntimeError::StepLimitExceeded { limit });
            }
        }

        Ok(())
    }

    fn put_byte<W: Write>(&mut self, output: &mut W) -> Result<(), RuntimeError> {
        let buf = [self.tape.byte()];
        output
            .write_all(&buf)
            .map_err(|e| RuntimeError::stream_write(self.ip, e))
    }

    fn get_byte<R: Read>(&mut self, input: &mut R) -> Result<(), RuntimeError> {
        let mut buf = [0u8; 1];

        match input.read_exact(&mut buf) {
            Ok(()) => {
                self.tape.set(i64::from(buf[0]));
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => self.end_of_input(),
            Err(e) => Err(RuntimeError::stream_read(self.ip, e)),
        }
    }

    fn end_of_input(&mut self) -> Result<(), RuntimeError> {
        match self.config.eof_policy {
            EofPolicy::Fault => return Err(RuntimeError::EndOfInput { ip: self.ip }),
            EofPolicy::Zero => self.tape.set(0),
            EofPolicy::MinusOne => self.tape.set(-1),
            EofPolicy::Unchanged => {}
        }
        debug!(ip = self.ip, policy = ?self.config.eof_policy, "end of input");
        Ok(())
    }
}

/// Run a compiled program on a fresh machine with the default configuration.
pub fn execute<R: Read, W: Write>(
    prog: &ProgramBc,
    mut input: R,
    mut output: W,
) -> Result<(), RuntimeError> {
    Vm::new().run(prog, &mut input, &mut output)
}
