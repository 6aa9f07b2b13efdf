//! Symbol tables: per-scope variable tables and the function directory.
//!
//! Scoping is flat: one global table plus one local table per function. A
//! lookup searches the current function's locals first, then the globals;
//! there is no dynamic scoping and functions do not nest.
//!
//! Tables are `IndexMap`s so that iteration (and therefore address
//! assignment) follows declaration order deterministically.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::{CompileError, CompileResult},
    types::Type,
};

/// A declared variable or parameter.
///
/// `address` is filled exactly once by the address-assignment pass and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableEntry {
    pub name: String,
    pub ty: Type,
    pub is_parameter: bool,
    /// Zero-based position in the parameter list; `None` for plain locals.
    pub parameter_position: Option<u32>,
    pub address: Option<u32>,
}

/// Name-to-entry mapping for one scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableTable {
    entries: IndexMap<String, VariableEntry>,
}

impl VariableTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a variable in this scope.
    ///
    /// Only INT and FLOAT are declarable; a duplicate name in the same scope
    /// is rejected.
    pub fn add(
        &mut self,
        name: &str,
        ty: Type,
        is_parameter: bool,
        parameter_position: Option<u32>,
    ) -> CompileResult<()> {
        if self.entries.contains_key(name) {
            return Err(CompileError::DuplicateVariable { name: name.to_owned() });
        }
        if !ty.is_declarable() {
            return Err(CompileError::InvalidType {
                context: format!("variable '{name}' declared as {ty}"),
            });
        }
        self.entries.insert(
            name.to_owned(),
            VariableEntry {
                name: name.to_owned(),
                ty,
                is_parameter,
                parameter_position,
                address: None,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> CompileResult<&VariableEntry> {
        self.entries
            .get(name)
            .ok_or_else(|| CompileError::UnknownVariable { name: name.to_owned() })
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &VariableEntry> {
        self.entries.values()
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut VariableEntry> {
        self.entries.values_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A function's signature and local scope.
///
/// Parameters are stored once, in the locals table; `parameter_names` only
/// records their order. This keeps the "parameter list" and "local variable"
/// views of a parameter as one logical entry, so an address assigned through
/// either view is seen by both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionEntry {
    pub name: String,
    pub return_type: Type,
    parameter_names: Vec<String>,
    pub locals: VariableTable,
}

impl FunctionEntry {
    fn new(name: &str, return_type: Type) -> Self {
        Self {
            name: name.to_owned(),
            return_type,
            parameter_names: Vec::new(),
            locals: VariableTable::new(),
        }
    }

    /// Appends a parameter. Parameters must be declared before any plain
    /// local so they occupy the lowest local addresses.
    pub fn add_parameter(&mut self, name: &str, ty: Type) -> CompileResult<()> {
        if self.parameter_names.iter().any(|p| p == name) {
            return Err(CompileError::DuplicateParameter {
                function: self.name.clone(),
                name: name.to_owned(),
            });
        }
        let position = u32::try_from(self.parameter_names.len()).expect("parameter count exceeds u32");
        self.locals.add(name, ty, true, Some(position))?;
        self.parameter_names.push(name.to_owned());
        Ok(())
    }

    pub fn add_local_variable(&mut self, name: &str, ty: Type) -> CompileResult<()> {
        self.locals.add(name, ty, false, None)
    }

    /// The parameters in calling-convention order.
    pub fn parameters(&self) -> impl Iterator<Item = &VariableEntry> {
        self.parameter_names.iter().map(|name| {
            self.locals
                .get(name)
                .expect("parameter is always present in the locals table")
        })
    }

    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.parameter_names.len()
    }
}

/// The whole program's declarations: globals plus every function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDirectory {
    pub globals: VariableTable,
    functions: IndexMap<String, FunctionEntry>,
}

impl FunctionDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_function(&mut self, name: &str, return_type: Type) -> CompileResult<&mut FunctionEntry> {
        if self.functions.contains_key(name) {
            return Err(CompileError::DuplicateFunction { name: name.to_owned() });
        }
        if !matches!(return_type, Type::Int | Type::Float | Type::Void) {
            return Err(CompileError::InvalidType {
                context: format!("function '{name}' declared with return type {return_type}"),
            });
        }
        Ok(self
            .functions
            .entry(name.to_owned())
            .or_insert_with(|| FunctionEntry::new(name, return_type)))
    }

    pub fn function(&self, name: &str) -> CompileResult<&FunctionEntry> {
        self.functions
            .get(name)
            .ok_or_else(|| CompileError::UnknownFunction { name: name.to_owned() })
    }

    pub fn function_mut(&mut self, name: &str) -> CompileResult<&mut FunctionEntry> {
        self.functions
            .get_mut(name)
            .ok_or_else(|| CompileError::UnknownFunction { name: name.to_owned() })
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionEntry> {
        self.functions.values()
    }

    pub(crate) fn functions_mut(&mut self) -> impl Iterator<Item = &mut FunctionEntry> {
        self.functions.values_mut()
    }

    pub fn add_global_variable(&mut self, name: &str, ty: Type) -> CompileResult<()> {
        self.globals.add(name, ty, false, None)
    }

    pub fn add_parameter_to(&mut self, function: &str, name: &str, ty: Type) -> CompileResult<()> {
        self.function_mut(function)?.add_parameter(name, ty)
    }

    pub fn add_local_variable_to(&mut self, function: &str, name: &str, ty: Type) -> CompileResult<()> {
        self.function_mut(function)?.add_local_variable(name, ty)
    }

    /// Resolves an identifier: locals of `current_function` first (when
    /// given), then globals.
    pub fn lookup_variable(&self, name: &str, current_function: Option<&str>) -> CompileResult<&VariableEntry> {
        if let Some(function) = current_function {
            let entry = self.function(function)?;
            if entry.locals.contains(name) {
                return entry.locals.get(name);
            }
        }
        if self.globals.contains(name) {
            return self.globals.get(name);
        }
        Err(CompileError::UnknownVariable { name: name.to_owned() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_variable_in_scope_rejected() {
        let mut table = VariableTable::new();
        table.add("x", Type::Int, false, None).unwrap();
        let err = table.add("x", Type::Float, false, None).unwrap_err();
        assert_eq!(err.kind(), "DuplicateVariable");
    }

    #[test]
    fn only_int_and_float_declarable() {
        let mut table = VariableTable::new();
        assert!(table.add("a", Type::Int, false, None).is_ok());
        assert!(table.add("b", Type::Float, false, None).is_ok());
        assert_eq!(table.add("c", Type::Bool, false, None).unwrap_err().kind(), "InvalidType");
        assert_eq!(table.add("d", Type::Void, false, None).unwrap_err().kind(), "InvalidType");
    }

    #[test]
    fn duplicate_function_rejected() {
        let mut dir = FunctionDirectory::new();
        dir.add_function("f", Type::Void).unwrap();
        let err = dir.add_function("f", Type::Int).unwrap_err();
        assert_eq!(err.kind(), "DuplicateFunction");
    }

    #[test]
    fn duplicate_parameter_rejected() {
        let mut dir = FunctionDirectory::new();
        dir.add_function("f", Type::Void).unwrap();
        dir.add_parameter_to("f", "n", Type::Int).unwrap();
        let err = dir.add_parameter_to("f", "n", Type::Int).unwrap_err();
        assert_eq!(err.kind(), "DuplicateParameter");
    }

    #[test]
    fn parameter_also_visible_as_local() {
        let mut dir = FunctionDirectory::new();
        dir.add_function("f", Type::Int).unwrap();
        dir.add_parameter_to("f", "n", Type::Int).unwrap();
        let entry = dir.function("f").unwrap();
        assert!(entry.locals.contains("n"));
        let param = entry.parameters().next().unwrap();
        assert!(param.is_parameter);
        assert_eq!(param.parameter_position, Some(0));
    }

    #[test]
    fn local_shadowing_parameter_name_rejected() {
        let mut dir = FunctionDirectory::new();
        dir.add_function("f", Type::Void).unwrap();
        dir.add_parameter_to("f", "n", Type::Int).unwrap();
        let err = dir.add_local_variable_to("f", "n", Type::Float).unwrap_err();
        assert_eq!(err.kind(), "DuplicateVariable");
    }

    #[test]
    fn lookup_prefers_locals_over_globals() {
        let mut dir = FunctionDirectory::new();
        dir.add_global_variable("x", Type::Float).unwrap();
        dir.add_function("f", Type::Void).unwrap();
        dir.add_local_variable_to("f", "x", Type::Int).unwrap();

        let inside = dir.lookup_variable("x", Some("f")).unwrap();
        assert_eq!(inside.ty, Type::Int);
        let outside = dir.lookup_variable("x", None).unwrap();
        assert_eq!(outside.ty, Type::Float);
    }

    #[test]
    fn lookup_falls_back_to_globals() {
        let mut dir = FunctionDirectory::new();
        dir.add_global_variable("g", Type::Int).unwrap();
        dir.add_function("f", Type::Void).unwrap();
        assert_eq!(dir.lookup_variable("g", Some("f")).unwrap().ty, Type::Int);
        let err = dir.lookup_variable("missing", Some("f")).unwrap_err();
        assert_eq!(err.kind(), "UnknownVariable");
    }
}
