//! The quadruple intermediate representation.
//!
//! A quadruple is `(op, left, right, result)` where each operand field is a
//! tagged variant: an address, a function name, a 1-based parameter position,
//! a quadruple index, or absent. The emitted program is append-only; the only
//! permitted mutation is backpatching the `result` of a previously emitted
//! `GOTO`, `GOTOF`, or `GOSUB`, exactly once.

mod generator;

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

pub use generator::QuadGenerator;

/// The closed opcode set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize, Deserialize)]
pub enum QuadOp {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    Ne,
    #[strum(serialize = "UMINUS")]
    UMinus,
    #[strum(serialize = "ASSIGN")]
    Assign,
    #[strum(serialize = "PRINT")]
    Print,
    #[strum(serialize = "GOTO")]
    Goto,
    #[strum(serialize = "GOTOF")]
    GotoF,
    #[strum(serialize = "ERA")]
    Era,
    #[strum(serialize = "PARAM")]
    Param,
    #[strum(serialize = "GOSUB")]
    Gosub,
    #[strum(serialize = "BEGINFUNC")]
    BeginFunc,
    #[strum(serialize = "ENDFUNC")]
    EndFunc,
}

impl QuadOp {
    /// Whether this opcode's `result` field is a quadruple index that may be
    /// backpatched.
    #[must_use]
    pub fn is_jump(self) -> bool {
        matches!(self, Self::Goto | Self::GotoF | Self::Gosub)
    }
}

/// One operand field of a quadruple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    /// Field unused by this opcode (printed as `-`).
    None,
    /// A virtual address.
    Addr(u32),
    /// A function name (`ERA`, `GOSUB`, `BEGINFUNC`, `ENDFUNC`).
    Name(String),
    /// A 1-based parameter position (`PARAM`).
    Pos(u32),
    /// A quadruple index (`GOTO`, `GOTOF`, `GOSUB`).
    Target(usize),
}

impl Operand {
    #[must_use]
    pub fn name(name: &str) -> Self {
        Self::Name(name.to_owned())
    }

    /// The jump target, if this operand is one.
    #[must_use]
    pub fn target(&self) -> Option<usize> {
        match self {
            Self::Target(index) => Some(*index),
            _ => None,
        }
    }

    /// The virtual address, if this operand is one.
    #[must_use]
    pub fn address(&self) -> Option<u32> {
        match self {
            Self::Addr(address) => Some(*address),
            _ => None,
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("-"),
            Self::Addr(address) => write!(f, "{address}"),
            Self::Name(name) => f.write_str(name),
            Self::Pos(position) => write!(f, "{position}"),
            Self::Target(index) => write!(f, "{index}"),
        }
    }
}

/// One four-address instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quadruple {
    pub op: QuadOp,
    pub left: Operand,
    pub right: Operand,
    pub result: Operand,
}

impl Quadruple {
    #[must_use]
    pub fn new(op: QuadOp, left: Operand, right: Operand, result: Operand) -> Self {
        Self { op, left, right, result }
    }
}

impl Display for Quadruple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.op, self.left, self.right, self.result)
    }
}

/// The emitted program: an ordered, zero-indexed quadruple sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuadProgram {
    quads: Vec<Quadruple>,
}

impl QuadProgram {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a quadruple and returns its index. Indices are stable once
    /// assigned.
    pub fn push(&mut self, quad: Quadruple) -> usize {
        self.quads.push(quad);
        self.quads.len() - 1
    }

    #[must_use]
    pub fn get(&self, index: usize) -> &Quadruple {
        &self.quads[index]
    }

    /// Fills in the jump target of a previously emitted `GOTO`, `GOTOF`, or
    /// `GOSUB`.
    ///
    /// # Panics
    ///
    /// Panics if the quadruple at `index` is not a jump or already carries a
    /// target; both indicate a code-generation bug, not a user error.
    pub fn patch(&mut self, index: usize, target: usize) {
        let quad = &mut self.quads[index];
        assert!(quad.op.is_jump(), "cannot patch non-jump {} at {index}", quad.op);
        assert!(
            quad.result == Operand::None,
            "jump at {index} was already patched to {}",
            quad.result
        );
        quad.result = Operand::Target(target);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Quadruple> {
        self.quads.iter()
    }
}

impl<'a> IntoIterator for &'a QuadProgram {
    type Item = &'a Quadruple;
    type IntoIter = std::slice::Iter<'a, Quadruple>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.iter()
    }
}

impl Display for QuadProgram {
    /// The numbered listing shown by the CLI's `--show-quads`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, quad) in self.quads.iter().enumerate() {
            writeln!(f, "{index:4}: {quad}")?;
        }
        Ok(())
    }
}
