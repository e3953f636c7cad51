use std::fmt::Write;

use crate::bytecode::{Op, ProgramBc};

/// Print disassembly of a bytecode program
pub fn print_bc(bc: &ProgramBc) {
    println!("════════════════════════════════════════");
    println!(" main");
    println!(" {} instructions", bc.len());
    println!("════════════════════════════════════════");
    print!("{}", disassemble(bc));
}

/// Render one line per instruction.
///
/// Loop bodies are indented by nesting depth and every `[` is marked with
/// `►` since it is the landing slot for its `]`.
pub fn disassemble(bc: &ProgramBc) -> String {
    let mut out = String::new();
    let mut depth = 0usize;

    for (ip, op) in bc.ops().iter().enumerate() {
        if matches!(op, Op::JumpIfNonZero(_)) {
            depth = depth.saturating_sub(1);
        }

        let marker = if matches!(op, Op::JumpIfZero(_)) { "► " } else { "  " };
        let prefix = "  ".repeat(depth);

        // Writing into a String cannot fail
        let _ = writeln!(out, "{:04} {}{}{}", ip, marker, prefix, format_op(op));

        if matches!(op, Op::JumpIfZero(_)) {
            depth += 1;
        }
    }

    out
}

fn format_op(op: &Op) -> String {
    match op {
        Op::JumpIfZero(target) => {
            format!("{:<6} -> {:04}   ; exit loop if zero", op.mnemonic(), target)
        }
        Op::JumpIfNonZero(target) => {
            format!("{:<6} -> {:04}   ; repeat if non-zero", op.mnemonic(), target)
        }
        Op::Inc(n) | Op::Dec(n) => format!("{:<6} {}", op.mnemonic(), n),
        Op::Right(n) | Op::Left(n) => format!("{:<6} {}", op.mnemonic(), n),
        Op::Output(n) => format!("{:<6} {}        ; write {} byte(s)", op.mnemonic(), n, n),
        Op::Input(n) => format!("{:<6} {}        ; read {} byte(s)", op.mnemonic(), n, n),
    }
}
