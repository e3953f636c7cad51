//! The fixed-size memory tape.
//!
//! Capacity is always [`TAPE_LEN`] cells. What happens when the data pointer
//! is moved past either end is chosen by [`TapePolicy`]; how cell arithmetic
//! overflows is chosen by [`CellWidth`].

use thiserror::Error;
use tracing::debug;

/// Number of cells on the tape.
pub const TAPE_LEN: usize = 30_000;

/// What a move past either end of the tape does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TapePolicy {
    /// Abort the run with an out-of-bounds error.
    #[default]
    Fault,
    /// Reduce the pointer modulo the tape length.
    Wrap,
    /// Pin the pointer to the first or last cell.
    Clamp,
}

/// Overflow behavior of cell arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CellWidth {
    /// Cells hold 0..=255 and wrap modulo 256.
    #[default]
    U8,
    /// Cells are signed 64-bit and wrap at that width.
    I64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("data pointer {pointer} is outside the tape (0..{capacity})")]
pub struct OutOfBounds {
    pub pointer: i128,
    pub capacity: usize,
}

pub struct Tape {
    cells: Box<[i64]>,
    ptr: usize,
    policy: TapePolicy,
    width: CellWidth,
}

impl Tape {
    pub fn new(policy: TapePolicy, width: CellWidth) -> Self {
        Self {
            cells: vec![0; TAPE_LEN].into_boxed_slice(),
            ptr: 0,
            policy,
            width,
        }
    }

    pub fn pointer(&self) -> usize {
        self.ptr
    }

    pub fn cells(&self) -> &[i64] {
        &self.cells
    }

    pub fn get(&self) -> i64 {
        self.cells[self.ptr]
    }

    /// Store a value in the current cell, narrowed to the cell width.
    pub fn set(&mut self, value: i64) {
        self.cells[self.ptr] = match self.width {
            CellWidth::U8 => value.rem_euclid(256),
            CellWidth::I64 => value,
        };
    }

    /// The current cell's low 8 bits, as written by an output instruction.
    pub fn byte(&self) -> u8 {
        self.get() as u8
    }

    pub fn add(&mut self, n: usize) {
        let cell = self.get();
        self.cells[self.ptr] = match self.width {
            CellWidth::U8 => (cell + (n % 256) as i64) % 256,
            CellWidth::I64 => cell.wrapping_add(n as i64),
        };
    }

    pub fn sub(&mut self, n: usize) {
        let cell = self.get();
        self.cells[self.ptr] = match self.width {
            CellWidth::U8 => (cell - (n % 256) as i64).rem_euclid(256),
            CellWidth::I64 => cell.wrapping_sub(n as i64),
        };
    }

    pub fn move_right(&mut self, n: usize) -> Result<(), OutOfBounds> {
        self.shift(self.ptr as i128 + n as i128)
    }

    pub fn move_left(&mut self, n: usize) -> Result<(), OutOfBounds> {
        self.shift(self.ptr as i128 - n as i128)
    }

    fn shift(&mut self, target: i128) -> Result<(), OutOfBounds> {
        let len = TAPE_LEN as i128;
        if (0..len).contains(&target) {
            self.ptr = target as usize;
            return Ok(());
        }

        let landed = match self.policy {
            TapePolicy::Fault => {
                return Err(OutOfBounds {
                    pointer: target,
                    capacity: TAPE_LEN,
                });
            }
            TapePolicy::Wrap => target.rem_euclid(len),
            TapePolicy::Clamp => target.clamp(0, len - 1),
        };

        debug!(
            requested = target,
            landed,
            policy = ?self.policy,
            "data pointer left the tape"
        );
        self.ptr = landed as usize;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tape(policy: TapePolicy) -> Tape {
        Tape::new(policy, CellWidth::U8)
    }

    // =========================================================================
    // Cell arithmetic
    // =========================================================================

    #[test]
    fn test_starts_zeroed() {
        let t = tape(TapePolicy::Fault);
        assert_eq!(t.cells().len(), TAPE_LEN);
        assert!(t.cells().iter().all(|c| *c == 0));
        assert_eq!(t.pointer(), 0);
    }

    #[test]
    fn test_u8_wraps_up() {
        let mut t = tape(TapePolicy::Fault);
        t.add(255);
        assert_eq!(t.get(), 255);
        t.add(2);
        assert_eq!(t.get(), 1);
    }

    #[test]
    fn test_u8_wraps_down() {
        let mut t = tape(TapePolicy::Fault);
        t.sub(1);
        assert_eq!(t.get(), 255);
        assert_eq!(t.byte(), 255);
    }

    #[test]
    fn test_u8_large_fold_count() {
        let mut t = tape(TapePolicy::Fault);
        t.add(256 * 3 + 7);
        assert_eq!(t.get(), 7);
    }

    #[test]
    fn test_i64_goes_negative() {
        let mut t = Tape::new(TapePolicy::Fault, CellWidth::I64);
        t.sub(3);
        assert_eq!(t.get(), -3);
        // output narrows to the low 8 bits
        assert_eq!(t.byte(), 253);
        t.add(300);
        assert_eq!(t.get(), 297);
        assert_eq!(t.byte(), 41);
    }

    #[test]
    fn test_set_narrows() {
        let mut t = tape(TapePolicy::Fault);
        t.set(-1);
        assert_eq!(t.get(), 255);

        let mut wide = Tape::new(TapePolicy::Fault, CellWidth::I64);
        wide.set(-1);
        assert_eq!(wide.get(), -1);
    }

    // =========================================================================
    // Pointer policies
    // =========================================================================

    #[test]
    fn test_move_within_tape() {
        let mut t = tape(TapePolicy::Fault);
        t.move_right(10).unwrap();
        t.move_left(4).unwrap();
        assert_eq!(t.pointer(), 6);
    }

    #[test]
    fn test_fault_left_of_zero() {
        let mut t = tape(TapePolicy::Fault);
        let err = t.move_left(1).unwrap_err();
        assert_eq!(err.pointer, -1);
        assert_eq!(t.pointer(), 0);
    }

    #[test]
    fn test_fault_past_end() {
        let mut t = tape(TapePolicy::Fault);
        t.move_right(TAPE_LEN - 1).unwrap();
        let err = t.move_right(1).unwrap_err();
        assert_eq!(err.pointer, TAPE_LEN as i128);
    }

    #[test]
    fn test_wrap_both_ways() {
        let mut t = tape(TapePolicy::Wrap);
        t.move_left(1).unwrap();
        assert_eq!(t.pointer(), TAPE_LEN - 1);
        t.move_right(2).unwrap();
        assert_eq!(t.pointer(), 1);
    }

    #[test]
    fn test_clamp_both_ways() {
        let mut t = tape(TapePolicy::Clamp);
        t.move_left(5).unwrap();
        assert_eq!(t.pointer(), 0);
        t.move_right(usize::MAX).unwrap();
        assert_eq!(t.pointer(), TAPE_LEN - 1);
    }
}
