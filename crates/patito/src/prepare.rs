//! The semantic builder: declarations to symbol tables.
//!
//! This pass consumes the parse tree bottom-up and populates the function
//! directory: globals first, then each function with its return type,
//! parameters in declared order, and local variables. It emits no code and
//! checks no expression types; both happen during quadruple generation.

use crate::{ast::Program, error::CompileResult, symbols::FunctionDirectory};

/// Builds the function directory for a program.
///
/// Fails on the first duplicate declaration (`DuplicateVariable`,
/// `DuplicateFunction`, `DuplicateParameter`) or non-declarable type.
pub fn build_directory(program: &Program) -> CompileResult<FunctionDirectory> {
    let mut directory = FunctionDirectory::new();

    for decl in &program.globals {
        for name in &decl.names {
            directory.add_global_variable(name, decl.ty)?;
        }
    }

    for function in &program.functions {
        directory.add_function(&function.name, function.return_type)?;
        for param in &function.params {
            directory.add_parameter_to(&function.name, &param.name, param.ty)?;
        }
        for decl in &function.locals {
            for name in &decl.names {
                directory.add_local_variable_to(&function.name, name, decl.ty)?;
            }
        }
    }

    Ok(directory)
}
