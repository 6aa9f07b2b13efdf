//! Error taxonomy for compilation and execution.
//!
//! Compile-time errors abort the current phase immediately; no partial program
//! is ever returned. Run-time errors halt the virtual machine.

use std::fmt::{self, Display};

use strum::IntoStaticStr;

use crate::{quad::QuadOp, types::Type};

/// Result alias for operations that can fail during compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Result alias for operations that can fail during execution.
pub type RunResult<T> = Result<T, RunError>;

/// An error detected while building symbol tables or generating quadruples.
///
/// The `IntoStaticStr` derive gives each error its taxonomy name (e.g.
/// `DuplicateVariable`) via [`CompileError::kind`], which is what the driver
/// reports and what the test suite matches on.
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
pub enum CompileError {
    /// A function name was declared twice.
    DuplicateFunction { name: String },
    /// A variable name was declared twice in the same scope.
    DuplicateVariable { name: String },
    /// A parameter name was declared twice in the same function.
    DuplicateParameter { function: String, name: String },
    /// A call referenced a function that was never declared.
    UnknownFunction { name: String },
    /// An identifier resolved neither to a local nor to a global.
    UnknownVariable { name: String },
    /// A type appeared in a position its kind does not allow.
    InvalidType { context: String },
    /// The semantic cube has no row for this operator/operand combination.
    IncompatibleTypes { op: QuadOp, left: Type, right: Type },
    /// An assignment (or argument/return binding) would narrow or cross kinds.
    IncompatibleAssignment { context: String, target: Type, value: Type },
    /// A call supplied the wrong number of arguments.
    WrongArgumentCount {
        function: String,
        expected: usize,
        given: usize,
    },
    /// A VOID function was used where a value is required.
    VoidFunctionInExpression { name: String },
    /// A `return` statement appeared in the main body.
    ReturnOutsideFunction,
    /// A typed function returned without a value.
    MissingReturnValue { function: String },
}

impl CompileError {
    /// The taxonomy name of this error, e.g. `"DuplicateVariable"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateFunction { name } => {
                write!(f, "function '{name}' has already been declared")
            }
            Self::DuplicateVariable { name } => {
                write!(f, "variable '{name}' has already been declared in this scope")
            }
            Self::DuplicateParameter { function, name } => {
                write!(f, "parameter '{name}' has already been declared in function '{function}'")
            }
            Self::UnknownFunction { name } => write!(f, "function '{name}' has not been declared"),
            Self::UnknownVariable { name } => {
                write!(f, "variable '{name}' is not declared in the current scope")
            }
            Self::InvalidType { context } => write!(f, "invalid type: {context}"),
            Self::IncompatibleTypes { op, left, right } => {
                write!(f, "incompatible types: {left} {op} {right}")
            }
            Self::IncompatibleAssignment { context, target, value } => {
                write!(f, "incompatible types in {context}: {target} = {value}")
            }
            Self::WrongArgumentCount {
                function,
                expected,
                given,
            } => write!(
                f,
                "function '{function}' takes {expected} argument(s) but {given} were given"
            ),
            Self::VoidFunctionInExpression { name } => {
                write!(f, "VOID function '{name}' cannot be used in an expression")
            }
            Self::ReturnOutsideFunction => {
                write!(f, "'return' is only allowed inside a function body")
            }
            Self::MissingReturnValue { function } => {
                write!(f, "function '{function}' must return a value")
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// An error raised by the virtual machine. The VM halts on any of these.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
pub enum RunError {
    /// Division with a zero right operand, at the given quadruple index.
    DivisionByZero { at: usize },
    /// A read from an address whose typed array was never extended that far.
    UninitializedRead { address: u32 },
    /// An attempt to pop the main activation record.
    CallStackUnderflow,
    /// A GOSUB whose jump target was never backpatched.
    DanglingGosub { at: usize, function: String },
}

impl RunError {
    /// The taxonomy name of this error, e.g. `"DivisionByZero"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero { at } => write!(f, "division by zero at quadruple {at}"),
            Self::UninitializedRead { address } => {
                write!(f, "read from uninitialized address {address}")
            }
            Self::CallStackUnderflow => write!(f, "cannot pop the main activation record"),
            Self::DanglingGosub { at, function } => {
                write!(f, "GOSUB to '{function}' at quadruple {at} was never patched")
            }
        }
    }
}

impl std::error::Error for RunError {}
