//! The parse-tree contract.
//!
//! The scanner and parser are external collaborators; this module defines the
//! tree shape they must produce. All nodes are plain serde-derived data, so a
//! parser in another process can hand us a tree as JSON (the CLI does exactly
//! that) and tests can build trees directly with the constructors below.

use serde::{Deserialize, Serialize};

use crate::types::Type;

/// A whole program: global declarations, functions, then the main body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Program name from the source header. Informational only.
    pub name: String,
    #[serde(default)]
    pub globals: Vec<VarDecl>,
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
    pub main_body: Block,
}

/// One declaration line: several names sharing a declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub names: Vec<String>,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl VarDecl {
    #[must_use]
    pub fn new(names: &[&str], ty: Type) -> Self {
        Self {
            names: names.iter().map(|n| (*n).to_owned()).collect(),
            ty,
        }
    }
}

/// A function declaration with typed parameters and optional return value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub return_type: Type,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub locals: Vec<VarDecl>,
    pub body: Block,
}

/// A single typed parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl Param {
    #[must_use]
    pub fn new(name: &str, ty: Type) -> Self {
        Self {
            name: name.to_owned(),
            ty,
        }
    }
}

/// An ordered statement list.
pub type Block = Vec<Stmt>;

/// A statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    Assign {
        target: String,
        value: Expr,
    },
    If {
        cond: Expr,
        then_body: Block,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        else_body: Option<Block>,
    },
    While {
        cond: Expr,
        body: Block,
    },
    /// A function call in statement position; any return value is discarded.
    Call {
        name: String,
        #[serde(default)]
        args: Vec<Expr>,
    },
    Print {
        args: Vec<PrintArg>,
    },
    Return {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Expr>,
    },
    /// A nested brace block; lowers its children in order.
    Block(Block),
}

impl Stmt {
    #[must_use]
    pub fn assign(target: &str, value: Expr) -> Self {
        Self::Assign {
            target: target.to_owned(),
            value,
        }
    }

    #[must_use]
    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Self::Call {
            name: name.to_owned(),
            args,
        }
    }

    /// A `print` with a single expression argument.
    #[must_use]
    pub fn print_expr(expr: Expr) -> Self {
        Self::Print {
            args: vec![PrintArg::Expr(expr)],
        }
    }

    /// A `print` with a single string-literal argument.
    #[must_use]
    pub fn print_str(text: &str) -> Self {
        Self::Print {
            args: vec![PrintArg::Str(text.to_owned())],
        }
    }
}

/// One argument to `print`: a string literal or an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintArg {
    Str(String),
    Expr(Expr),
}

/// A binary operator as it appears in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
}

/// An expression.
///
/// Unary `+` is a parser no-op and never reaches the tree; unary `-` arrives
/// as [`Expr::Neg`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Int(i64),
    Float(f64),
    Ident(String),
    Bin {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Neg(Box<Expr>),
    Call {
        name: String,
        #[serde(default)]
        args: Vec<Expr>,
    },
}

impl Expr {
    #[must_use]
    pub fn ident(name: &str) -> Self {
        Self::Ident(name.to_owned())
    }

    #[must_use]
    pub fn bin(op: BinOp, left: Expr, right: Expr) -> Self {
        Self::Bin {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn neg(operand: Expr) -> Self {
        Self::Neg(Box::new(operand))
    }

    #[must_use]
    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Self::Call {
            name: name.to_owned(),
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binop_serializes_as_symbol() {
        let json = serde_json::to_string(&BinOp::Ne).unwrap();
        assert_eq!(json, "\"!=\"");
        let back: BinOp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BinOp::Ne);
    }

    #[test]
    fn expr_round_trips_through_json() {
        let expr = Expr::bin(
            BinOp::Add,
            Expr::Int(1),
            Expr::bin(BinOp::Mul, Expr::Int(2), Expr::ident("x")),
        );
        let json = serde_json::to_string(&expr).unwrap();
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expr);
    }

    #[test]
    fn optional_sections_default_when_missing() {
        let json = r#"{
            "name": "demo",
            "main_body": [
                {"print": {"args": [{"str": "hello"}]}}
            ]
        }"#;
        let program: Program = serde_json::from_str(json).unwrap();
        assert!(program.globals.is_empty());
        assert!(program.functions.is_empty());
        assert_eq!(program.main_body.len(), 1);
    }
}
