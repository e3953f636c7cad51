use serde::{Deserialize, Serialize};

// =============================================================================
// OP - Tape machine instructions
// =============================================================================

/// A single compiled instruction.
///
/// The payload of the foldable kinds is the fold count: how many identical
/// source characters were collapsed into this one instruction. The payload
/// of the two jumps is the absolute index of the matching bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    // cell arithmetic
    /// `+` repeated n times: add n to the current cell.
    Inc(usize),
    /// `-` repeated n times: subtract n from the current cell.
    Dec(usize),

    // pointer movement
    /// `>` repeated n times.
    Right(usize),
    /// `<` repeated n times.
    Left(usize),

    // I/O (each repetition is a separate byte transfer)
    /// `.` repeated n times.
    Output(usize),
    /// `,` repeated n times.
    Input(usize),

    // ==========================================================================
    // Control flow - absolute jumps resolved at compile time
    // ==========================================================================
    /// `[`: if the current cell is zero, jump to the matching `]`.
    JumpIfZero(usize),

    /// `]`: if the current cell is non-zero, jump to the matching `[`.
    JumpIfNonZero(usize),
}

impl Op {
    pub fn operand(&self) -> usize {
        match *self {
            Op::Inc(n)
            | Op::Dec(n)
            | Op::Right(n)
            | Op::Left(n)
            | Op::Output(n)
            | Op::Input(n)
            | Op::JumpIfZero(n)
            | Op::JumpIfNonZero(n) => n,
        }
    }

    pub fn is_jump(&self) -> bool {
        matches!(self, Op::JumpIfZero(_) | Op::JumpIfNonZero(_))
    }

    /// The source character this instruction was compiled from.
    pub fn source_char(&self) -> char {
        match self {
            Op::Inc(_) => '+',
            Op::Dec(_) => '-',
            Op::Right(_) => '>',
            Op::Left(_) => '<',
            Op::Output(_) => '.',
            Op::Input(_) => ',',
            Op::JumpIfZero(_) => '[',
            Op::JumpIfNonZero(_) => ']',
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Op::Inc(_) => "INC",
            Op::Dec(_) => "DEC",
            Op::Right(_) => "RIGHT",
            Op::Left(_) => "LEFT",
            Op::Output(_) => "OUT",
            Op::Input(_) => "IN",
            Op::JumpIfZero(_) => "JZ",
            Op::JumpIfNonZero(_) => "JNZ",
        }
    }

    /// Build the foldable instruction for a source character, if it is one.
    pub fn foldable(ch: char, count: usize) -> Option<Op> {
        Some(match ch {
            '+' => Op::Inc(count),
            '-' => Op::Dec(count),
            '>' => Op::Right(count),
            '<' => Op::Left(count),
            '.' => Op::Output(count),
            ',' => Op::Input(count),
            _ => return None,
        })
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.mnemonic(), self.operand())
    }
}
