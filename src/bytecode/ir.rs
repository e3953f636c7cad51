use serde::{Deserialize, Serialize};

use crate::bytecode::{Op, compile_error::CompileError, verify::check_ops};

/// Leading bytes of a binary program image.
pub const IMAGE_MAGIC: &[u8; 4] = b"TVM\x01";

/// A compiled program: the instruction sequence, addressed by position.
///
/// Every value of this type satisfies the bracket-pairing invariant. The
/// compiler builds it directly; everything else goes through
/// [`ProgramBc::from_ops`], including serde deserialization, which is
/// routed through it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Op>", into = "Vec<Op>")]
pub struct ProgramBc {
    ops: Vec<Op>,
}

impl TryFrom<Vec<Op>> for ProgramBc {
    type Error = CompileError;

    fn try_from(ops: Vec<Op>) -> Result<Self, Self::Error> {
        Self::from_ops(ops)
    }
}

impl From<ProgramBc> for Vec<Op> {
    fn from(prog: ProgramBc) -> Self {
        prog.ops
    }
}

impl ProgramBc {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_compiled(ops: Vec<Op>) -> Self {
        Self { ops }
    }

    /// Wrap a hand-built sequence after checking its structure.
    pub fn from_ops(ops: Vec<Op>) -> Result<Self, CompileError> {
        check_ops(&ops)?;
        Ok(Self { ops })
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn get(&self, ip: usize) -> Option<&Op> {
        self.ops.get(ip)
    }

    /// Write the program back out as source text.
    ///
    /// Each foldable instruction becomes `count` copies of its character.
    /// Compiling the result gives back an equivalent program; two adjacent
    /// instructions of the same kind (split by a comment in the source)
    /// come back merged.
    pub fn to_source(&self) -> String {
        let mut out = String::with_capacity(self.ops.len());
        for op in &self.ops {
            let repeat = if op.is_jump() { 1 } else { op.operand() };
            out.extend(std::iter::repeat_n(op.source_char(), repeat));
        }
        out
    }

    /// Encode as a binary image: [`IMAGE_MAGIC`] followed by the postcard
    /// encoding of the program.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CompileError> {
        let body =
            postcard::to_allocvec(self).map_err(|e| CompileError::image(e.to_string()))?;

        let mut out = Vec::with_capacity(IMAGE_MAGIC.len() + body.len());
        out.extend_from_slice(IMAGE_MAGIC);
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Decode and verify a binary image produced by [`ProgramBc::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CompileError> {
        let body = bytes
            .strip_prefix(IMAGE_MAGIC.as_slice())
            .ok_or_else(|| CompileError::image("missing image header"))?;

        // Decode the raw sequence so a pairing failure keeps its verify error
        let ops: Vec<Op> =
            postcard::from_bytes(body).map_err(|e| CompileError::image(e.to_string()))?;

        Self::from_ops(ops)
    }

    pub fn is_image(bytes: &[u8]) -> bool {
        bytes.starts_with(IMAGE_MAGIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::compile::compile;

    #[test]
    fn test_to_source_expands_counts() {
        let bc = compile("+++[->>.<<]").unwrap();
        assert_eq!(bc.to_source(), "+++[->>.<<]");
    }

    #[test]
    fn test_to_source_drops_comments() {
        let bc = compile("add three: +++ then print .").unwrap();
        assert_eq!(bc.to_source(), "+++.");
    }

    #[test]
    fn test_recompile_is_identical_without_split_runs() {
        let bc = compile("++>[-<+>]<.").unwrap();
        let again = compile(&bc.to_source()).unwrap();
        assert_eq!(bc, again);
    }

    #[test]
    fn test_recompile_merges_split_runs() {
        let bc = compile("+ +").unwrap();
        assert_eq!(bc.ops(), &[Op::Inc(1), Op::Inc(1)]);

        let again = compile(&bc.to_source()).unwrap();
        assert_eq!(again.ops(), &[Op::Inc(2)]);
    }

    #[test]
    fn test_from_ops_verifies() {
        assert!(ProgramBc::from_ops(vec![Op::JumpIfZero(1), Op::JumpIfNonZero(0)]).is_ok());

        let err = ProgramBc::from_ops(vec![Op::JumpIfZero(0)]).unwrap_err();
        assert!(matches!(err, CompileError::Verify(_)));
    }

    #[test]
    fn test_image_roundtrip() {
        let bc = compile("++[>+<-]>.").unwrap();
        let bytes = bc.to_bytes().unwrap();

        assert!(ProgramBc::is_image(&bytes));
        assert_eq!(ProgramBc::from_bytes(&bytes).unwrap(), bc);
    }

    #[test]
    fn test_image_without_header_rejected() {
        let err = ProgramBc::from_bytes(b"+++").unwrap_err();
        assert!(err.to_string().contains("missing image header"));
    }

    #[test]
    fn test_truncated_image_rejected() {
        let bytes = compile("+[-]").unwrap().to_bytes().unwrap();
        let err = ProgramBc::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, CompileError::Image(_)));
    }

    #[test]
    fn test_image_with_broken_pairing_rejected() {
        let forged = ProgramBc::from_compiled(vec![Op::JumpIfZero(0), Op::JumpIfNonZero(0)]);
        let bytes = forged.to_bytes().unwrap();

        let err = ProgramBc::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, CompileError::Verify(_)));
    }

    #[test]
    fn test_deserialize_rejects_broken_pairing() {
        let body = postcard::to_allocvec(&vec![Op::JumpIfNonZero(0)]).unwrap();
        assert!(postcard::from_bytes::<ProgramBc>(&body).is_err());

        let body = postcard::to_allocvec(&vec![Op::JumpIfZero(1), Op::JumpIfNonZero(0)]).unwrap();
        let prog: ProgramBc = postcard::from_bytes(&body).unwrap();
        assert_eq!(prog.len(), 2);
    }
}
