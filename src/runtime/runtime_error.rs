use std::io;

use thiserror::Error;

use crate::runtime::tape::OutOfBounds;

/// Which direction a failed byte transfer was going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Read,
    Write,
}

impl std::fmt::Display for Transfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transfer::Read => write!(f, "read"),
            Transfer::Write => write!(f, "write"),
        }
    }
}

/// Fatal errors that abort a single execution.
///
/// None of these are retried; the machine state of the failed run is left as
/// it was at the moment of the fault so the caller can inspect it.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The input or output stream failed to move exactly one byte.
    #[error("runtime error: stream {transfer} failed at ip={ip}: {source}")]
    StreamFault {
        ip: usize,
        transfer: Transfer,
        #[source]
        source: io::Error,
    },

    /// A move took the data pointer off the tape under the fault policy.
    #[error("runtime error: out-of-bounds access at ip={ip}: {source}")]
    OutOfBoundsAccess {
        ip: usize,
        #[source]
        source: OutOfBounds,
    },

    /// Input was exhausted and the end-of-input policy is to abort.
    #[error("runtime error: end of input at ip={ip}")]
    EndOfInput { ip: usize },

    #[error("runtime error: execution step limit exceeded ({limit})")]
    StepLimitExceeded { limit: u64 },
}

impl RuntimeError {
    pub fn stream_read(ip: usize, source: io::Error) -> Self {
        RuntimeError::StreamFault {
            ip,
            transfer: Transfer::Read,
            source,
        }
    }

    pub fn stream_write(ip: usize, source: io::Error) -> Self {
        RuntimeError::StreamFault {
            ip,
            transfer: Transfer::Write,
            source,
        }
    }

    pub fn out_of_bounds(ip: usize, source: OutOfBounds) -> Self {
        RuntimeError::OutOfBoundsAccess { ip, source }
    }

    /// Instruction pointer at which the fault happened, if tied to one.
    pub fn ip(&self) -> Option<usize> {
        match self {
            RuntimeError::StreamFault { ip, .. }
            | RuntimeError::OutOfBoundsAccess { ip, .. }
            | RuntimeError::EndOfInput { ip } => Some(*ip),
            RuntimeError::StepLimitExceeded { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_stream_fault_display() {
        let err = RuntimeError::stream_write(
            3,
            io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"),
        );

        let msg = err.to_string();
        assert!(msg.contains("stream write failed"));
        assert!(msg.contains("ip=3"));
        assert!(msg.contains("pipe closed"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_out_of_bounds_display() {
        let err = RuntimeError::out_of_bounds(
            0,
            OutOfBounds {
                pointer: -1,
                capacity: 30_000,
            },
        );

        let msg = err.to_string();
        assert!(msg.contains("out-of-bounds"));
        assert_eq!(err.ip(), Some(0));
    }

    #[test]
    fn test_step_limit_has_no_ip() {
        let err = RuntimeError::StepLimitExceeded { limit: 10 };
        assert!(err.to_string().contains("(10)"));
        assert_eq!(err.ip(), None);
    }
}
