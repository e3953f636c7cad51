use thiserror::Error;

use crate::bytecode::compile::Span;
use crate::bytecode::verify::VerifyError;

/// Errors raised before a program is allowed to run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A `]` appeared with no open `[` to close.
    #[error(
        "compile error: {span}: unmatched ']' with no open '['\n  hint: remove the ']' or add a '[' before it"
    )]
    UnmatchedClose { span: Span },

    /// The source ended while a `[` was still open. `span` points at the
    /// innermost unclosed bracket.
    #[error(
        "compile error: {span}: unclosed '[' at end of program\n  hint: every '[' needs a matching ']'"
    )]
    UnclosedOpen { span: Span },

    /// A binary program image could not be decoded.
    #[error("compile error: invalid program image: {0}")]
    Image(String),

    /// A decoded instruction sequence failed structural checks.
    #[error("compile error: {0}")]
    Verify(#[from] VerifyError),
}

impl CompileError {
    pub fn unmatched_close(line: usize, col: usize) -> Self {
        CompileError::UnmatchedClose {
            span: Span { line, col },
        }
    }

    pub fn unclosed_open(span: Span) -> Self {
        CompileError::UnclosedOpen { span }
    }

    pub fn image(msg: impl Into<String>) -> Self {
        CompileError::Image(msg.into())
    }

    /// True for the two bracket errors (the MalformedProgram class).
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            CompileError::UnmatchedClose { .. } | CompileError::UnclosedOpen { .. }
        )
    }
}
