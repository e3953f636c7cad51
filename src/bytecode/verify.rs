use thiserror::Error;

use crate::bytecode::Op;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("verify error at ip={ip}: {message}")]
pub struct VerifyError {
    pub ip: usize,
    pub message: String,
}

impl VerifyError {
    pub fn new(ip: usize, message: impl Into<String>) -> Self {
        Self {
            ip,
            message: message.into(),
        }
    }
}

/// Check that an instruction sequence is safe to hand to the VM.
///
/// The compiler only ever produces sequences that pass; this exists for
/// sequences that arrive some other way (decoded images, hand-built tests).
///
/// Checks, in one linear scan with a bracket stack:
/// 1. foldable instructions have a non-zero count
/// 2. every jump target is inside the sequence
/// 3. each `[` and its `]` point at each other
/// 4. pairs nest properly (no `[ ( ] )` crossing)
pub fn check_ops(ops: &[Op]) -> Result<(), VerifyError> {
    let mut open: Vec<usize> = Vec::new();

    for (ip, op) in ops.iter().enumerate() {
        match *op {
            Op::JumpIfZero(target) => {
                match ops.get(target) {
                    Some(Op::JumpIfNonZero(back)) if *back == ip && target > ip => {}
                    Some(_) => {
                        return Err(VerifyError::new(
                            ip,
                            format!("'[' targets {} which is not its matching ']'", target),
                        ));
                    }
                    None => {
                        return Err(VerifyError::new(
                            ip,
                            format!("jump target {} out of range (len {})", target, ops.len()),
                        ));
                    }
                }
                open.push(ip);
            }
            Op::JumpIfNonZero(target) => {
                if target >= ops.len() {
                    return Err(VerifyError::new(
                        ip,
                        format!("jump target {} out of range (len {})", target, ops.len()),
                    ));
                }
                match open.pop() {
                    Some(opener) if opener == target => {}
                    Some(opener) => {
                        return Err(VerifyError::new(
                            ip,
                            format!(
                                "']' targets {} but the innermost open '[' is at {}",
                                target, opener
                            ),
                        ));
                    }
                    None => return Err(VerifyError::new(ip, "']' with no open '['")),
                }
            }
            other => {
                if other.operand() == 0 {
                    return Err(VerifyError::new(
                        ip,
                        format!("{} has a zero repeat count", other.mnemonic()),
                    ));
                }
            }
        }
    }

    match open.pop() {
        Some(ip) => Err(VerifyError::new(ip, "'[' is never closed")),
        None => Ok(()),
    }
}
