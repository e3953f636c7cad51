use tracing::debug;

use crate::bytecode::{Op, ProgramBc, compile_error::CompileError};

/// 1-based source position, tracked the same way for every character
/// whether or not it is a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Single-pass compiler from source text to a resolved instruction sequence.
///
/// Runs of identical foldable characters (`+ - < > . ,`) collapse into one
/// instruction carrying the run length. Brackets are matched with a stack of
/// pending `[` indices and patched in both directions when the `]` is seen.
/// Every other character is skipped.
pub struct Compiler {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,

    /// Output instruction sequence
    ops: Vec<Op>,

    /// Indices (into `ops`) of `[` instructions not yet closed, with the
    /// position of each in the source for error reporting.
    loop_stack: Vec<(usize, Span)>,
}

impl Compiler {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            ops: Vec::new(),
            loop_stack: Vec::new(),
        }
    }

    pub fn compile(mut self) -> Result<ProgramBc, CompileError> {
        while let Some(ch) = self.current() {
            match ch {
                '[' => {
                    let span = self.span();
                    let open = self.emit(Op::JumpIfZero(0));
                    self.loop_stack.push((open, span));
                    self.advance();
                }
                ']' => {
                    let (open, _) = self
                        .loop_stack
                        .pop()
                        .ok_or_else(|| CompileError::unmatched_close(self.line, self.col))?;

                    let close = self.emit(Op::JumpIfNonZero(open));

                    // Patch the placeholder now that the closer's index is known
                    self.ops[open] = Op::JumpIfZero(close);
                    self.advance();
                }
                other => self.compile_foldable(other),
            }
        }

        // The innermost unclosed bracket is the most useful one to report
        if let Some((_, span)) = self.loop_stack.pop() {
            return Err(CompileError::unclosed_open(span));
        }

        debug!(
            source_len = self.source.len(),
            instructions = self.ops.len(),
            "compiled program"
        );

        Ok(ProgramBc::from_compiled(self.ops))
    }

    /// Consume the maximal run of `ch` starting at the cursor and emit one
    /// instruction for it. Non-command characters are consumed and dropped.
    fn compile_foldable(&mut self, ch: char) {
        let mut count = 0;
        while self.current() == Some(ch) {
            count += 1;
            self.advance();
        }

        if let Some(op) = Op::foldable(ch, count) {
            self.emit(op);
        }
    }

    fn emit(&mut self, op: Op) -> usize {
        self.ops.push(op);
        self.ops.len() - 1
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) {
        if self.current() == Some('\n') {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.pos += 1;
    }

    fn span(&self) -> Span {
        Span {
            line: self.line,
            col: self.col,
        }
    }
}

/// Compile source text in one call.
pub fn compile(source: &str) -> Result<ProgramBc, CompileError> {
    Compiler::new(source).compile()
}
