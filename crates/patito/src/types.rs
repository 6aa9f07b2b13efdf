//! The Patito type system and semantic cube.
//!
//! The cube is the total relation `(operator, left, right) -> result` used to
//! type-check expressions. Everything here is pure data plus lookups; no state
//! is threaded through these functions.

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::{
    error::{CompileError, CompileResult},
    quad::QuadOp,
};

/// A Patito type.
///
/// `Bool` only exists as the compile-time result of a comparison; the source
/// language cannot declare boolean variables. `Void` only appears as a
/// function return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Int,
    Float,
    Bool,
    Void,
}

impl Type {
    /// Whether a variable of this type can be declared in source code.
    #[must_use]
    pub fn is_declarable(self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }

    /// Whether this type designates a numeric scalar.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

/// Looks up the result type of `left op right` in the semantic cube.
///
/// The cube covers exactly the INT/FLOAT pairs: `+ - *` produce INT only for
/// `(INT, INT)` and FLOAT whenever either side is FLOAT; `/` always produces
/// FLOAT; the relational operators always produce BOOL. Every other
/// combination, including any BOOL or VOID operand, is rejected.
pub fn result_type(op: QuadOp, left: Type, right: Type) -> CompileResult<Type> {
    if !left.is_numeric() || !right.is_numeric() {
        return Err(CompileError::IncompatibleTypes { op, left, right });
    }
    let result = match op {
        QuadOp::Add | QuadOp::Sub | QuadOp::Mul => {
            if left == Type::Float || right == Type::Float {
                Type::Float
            } else {
                Type::Int
            }
        }
        // Division is float-valued even over two INTs.
        QuadOp::Div => Type::Float,
        QuadOp::Gt | QuadOp::Lt | QuadOp::Eq | QuadOp::Ne => Type::Bool,
        _ => return Err(CompileError::IncompatibleTypes { op, left, right }),
    };
    Ok(result)
}

/// Checks that a value of type `value` may be stored into a slot of type
/// `target`.
///
/// Permitted: `INT <- INT`, `FLOAT <- INT`, `FLOAT <- FLOAT`. There is no
/// implicit narrowing, so `INT <- FLOAT` is rejected along with every
/// non-numeric target.
pub fn assert_assign(target: Type, value: Type, context: &str) -> CompileResult<()> {
    let ok = match target {
        Type::Int => value == Type::Int,
        Type::Float => value.is_numeric(),
        Type::Bool | Type::Void => false,
    };
    if ok {
        Ok(())
    } else {
        Err(CompileError::IncompatibleAssignment {
            context: context.to_owned(),
            target,
            value,
        })
    }
}

/// Checks that a condition expression is BOOL, i.e. came from a comparison.
pub fn ensure_bool(ty: Type, context: &str) -> CompileResult<()> {
    if ty == Type::Bool {
        Ok(())
    } else {
        Err(CompileError::InvalidType {
            context: format!("expected BOOL in {context}, got {ty}"),
        })
    }
}

/// Checks a `return` statement against the enclosing function's signature.
///
/// A VOID function must return without a value; a typed function must return
/// a value assignable to its return type.
pub fn assert_return(function: &str, return_type: Type, value: Option<Type>) -> CompileResult<()> {
    match (return_type, value) {
        (Type::Void, None) => Ok(()),
        (Type::Void, Some(ty)) => Err(CompileError::InvalidType {
            context: format!("function '{function}' is VOID but returns a {ty} value"),
        }),
        (_, None) => Err(CompileError::MissingReturnValue {
            function: function.to_owned(),
        }),
        (expected, Some(ty)) => assert_assign(expected, ty, &format!("return value of '{function}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUMERIC: [Type; 2] = [Type::Int, Type::Float];
    const ARITHMETIC: [QuadOp; 4] = [QuadOp::Add, QuadOp::Sub, QuadOp::Mul, QuadOp::Div];
    const RELATIONAL: [QuadOp; 4] = [QuadOp::Gt, QuadOp::Lt, QuadOp::Eq, QuadOp::Ne];

    #[test]
    fn cube_total_on_numeric_pairs() {
        for op in ARITHMETIC.into_iter().chain(RELATIONAL) {
            for left in NUMERIC {
                for right in NUMERIC {
                    assert!(result_type(op, left, right).is_ok(), "{op} {left} {right}");
                }
            }
        }
    }

    #[test]
    fn int_arithmetic_stays_int_except_division() {
        assert_eq!(result_type(QuadOp::Add, Type::Int, Type::Int).unwrap(), Type::Int);
        assert_eq!(result_type(QuadOp::Sub, Type::Int, Type::Int).unwrap(), Type::Int);
        assert_eq!(result_type(QuadOp::Mul, Type::Int, Type::Int).unwrap(), Type::Int);
        assert_eq!(result_type(QuadOp::Div, Type::Int, Type::Int).unwrap(), Type::Float);
    }

    #[test]
    fn float_operand_promotes() {
        assert_eq!(result_type(QuadOp::Add, Type::Int, Type::Float).unwrap(), Type::Float);
        assert_eq!(result_type(QuadOp::Mul, Type::Float, Type::Int).unwrap(), Type::Float);
    }

    #[test]
    fn comparisons_produce_bool() {
        for op in RELATIONAL {
            for left in NUMERIC {
                for right in NUMERIC {
                    assert_eq!(result_type(op, left, right).unwrap(), Type::Bool);
                }
            }
        }
    }

    #[test]
    fn bool_and_void_operands_rejected() {
        for op in ARITHMETIC.into_iter().chain(RELATIONAL) {
            assert!(result_type(op, Type::Bool, Type::Int).is_err());
            assert!(result_type(op, Type::Int, Type::Bool).is_err());
            assert!(result_type(op, Type::Void, Type::Int).is_err());
        }
    }

    #[test]
    fn non_expression_ops_rejected() {
        assert!(result_type(QuadOp::Assign, Type::Int, Type::Int).is_err());
        assert!(result_type(QuadOp::Goto, Type::Int, Type::Int).is_err());
    }

    #[test]
    fn assignment_compatibility() {
        assert!(assert_assign(Type::Int, Type::Int, "t").is_ok());
        assert!(assert_assign(Type::Float, Type::Int, "t").is_ok());
        assert!(assert_assign(Type::Float, Type::Float, "t").is_ok());
        assert!(assert_assign(Type::Int, Type::Float, "t").is_err());
        assert!(assert_assign(Type::Bool, Type::Bool, "t").is_err());
        assert!(assert_assign(Type::Void, Type::Int, "t").is_err());
    }

    #[test]
    fn conditions_must_be_bool() {
        assert!(ensure_bool(Type::Bool, "if condition").is_ok());
        assert!(ensure_bool(Type::Int, "if condition").is_err());
        assert!(ensure_bool(Type::Float, "while condition").is_err());
    }

    #[test]
    fn return_checking() {
        assert!(assert_return("f", Type::Void, None).is_ok());
        assert!(assert_return("f", Type::Void, Some(Type::Int)).is_err());
        assert!(assert_return("f", Type::Int, Some(Type::Int)).is_ok());
        assert!(assert_return("f", Type::Float, Some(Type::Int)).is_ok());
        assert!(assert_return("f", Type::Int, Some(Type::Float)).is_err());
        assert!(matches!(
            assert_return("f", Type::Int, None),
            Err(CompileError::MissingReturnValue { .. })
        ));
    }
}
