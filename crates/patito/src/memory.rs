//! Compile-time virtual memory: per-segment address counters, constant
//! interning, and function return slots.
//!
//! An address is a plain integer whose range alone determines its segment and
//! type. Each `(segment, type)` pair owns a 1000-wide range starting at a
//! fixed base. Allocation is monotonic; nothing is ever freed or compacted.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::{CompileError, CompileResult},
    symbols::FunctionDirectory,
    types::Type,
};

/// Number of addresses in each `(segment, type)` range.
pub const SEGMENT_WIDTH: u32 = 1000;

pub const GLOBAL_INT_BASE: u32 = 1000;
pub const GLOBAL_FLOAT_BASE: u32 = 2000;
pub const GLOBAL_BOOL_BASE: u32 = 3000;

pub const LOCAL_INT_BASE: u32 = 4000;
pub const LOCAL_FLOAT_BASE: u32 = 5000;
pub const LOCAL_BOOL_BASE: u32 = 6000;

pub const TEMP_INT_BASE: u32 = 7000;
pub const TEMP_FLOAT_BASE: u32 = 8000;
pub const TEMP_BOOL_BASE: u32 = 9000;

pub const CONST_INT_BASE: u32 = 10000;
pub const CONST_FLOAT_BASE: u32 = 11000;
pub const CONST_STRING_BASE: u32 = 12000;

/// First address past the last segment.
pub const ADDRESS_SPACE_END: u32 = CONST_STRING_BASE + SEGMENT_WIDTH;

/// The type tag a constant is interned under.
///
/// Strings never enter the expression type system; they exist only as PRINT
/// arguments and share a single CONSTANT range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstKind {
    Int,
    Float,
    Str,
}

/// Interning key: the source lexeme together with its constant kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstantKey {
    pub lexeme: String,
    pub kind: ConstKind,
}

/// `(lexeme, kind) -> address` interning table.
///
/// The same lexeme/kind pair always maps to the same address; entries keep
/// first-encounter order for deterministic loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstantTable {
    entries: IndexMap<ConstantKey, u32>,
}

impl ConstantTable {
    pub fn entries(&self) -> impl Iterator<Item = (&ConstantKey, u32)> {
        self.entries.iter().map(|(key, addr)| (key, *addr))
    }

    #[must_use]
    pub fn get(&self, lexeme: &str, kind: ConstKind) -> Option<u32> {
        self.entries
            .get(&ConstantKey {
                lexeme: lexeme.to_owned(),
                kind,
            })
            .copied()
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

/// Next free address per `(segment, type)` range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Counters {
    global_int: u32,
    global_float: u32,
    global_bool: u32,
    local_int: u32,
    local_float: u32,
    local_bool: u32,
    temp_int: u32,
    temp_float: u32,
    temp_bool: u32,
    const_int: u32,
    const_float: u32,
    const_string: u32,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            global_int: GLOBAL_INT_BASE,
            global_float: GLOBAL_FLOAT_BASE,
            global_bool: GLOBAL_BOOL_BASE,
            local_int: LOCAL_INT_BASE,
            local_float: LOCAL_FLOAT_BASE,
            local_bool: LOCAL_BOOL_BASE,
            temp_int: TEMP_INT_BASE,
            temp_float: TEMP_FLOAT_BASE,
            temp_bool: TEMP_BOOL_BASE,
            const_int: CONST_INT_BASE,
            const_float: CONST_FLOAT_BASE,
            const_string: CONST_STRING_BASE,
        }
    }
}

/// Hands out the current counter value and advances it.
///
/// # Panics
///
/// Panics when a range runs out of addresses. A fresh compilation must stay
/// under one thousand addresses per `(segment, type)` pair; exceeding it is a
/// program-size limit, not a recoverable condition.
fn bump(counter: &mut u32, base: u32, what: &str) -> u32 {
    let addr = *counter;
    assert!(
        addr < base + SEGMENT_WIDTH,
        "{what} segment exhausted ({SEGMENT_WIDTH} addresses)"
    );
    *counter += 1;
    addr
}

/// The virtual-address allocator used throughout compilation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualMemory {
    #[serde(default)]
    counters: Counters,
    constants: ConstantTable,
    /// One reserved GLOBAL-typed slot per typed function, where its return
    /// value travels back to the caller.
    return_slots: IndexMap<String, u32>,
}

impl VirtualMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_global(&mut self, ty: Type) -> u32 {
        match ty {
            Type::Int => bump(&mut self.counters.global_int, GLOBAL_INT_BASE, "GLOBAL/INT"),
            Type::Float => bump(&mut self.counters.global_float, GLOBAL_FLOAT_BASE, "GLOBAL/FLOAT"),
            Type::Bool => bump(&mut self.counters.global_bool, GLOBAL_BOOL_BASE, "GLOBAL/BOOL"),
            Type::Void => panic!("VOID has no storage segment"),
        }
    }

    pub fn allocate_local(&mut self, ty: Type) -> u32 {
        match ty {
            Type::Int => bump(&mut self.counters.local_int, LOCAL_INT_BASE, "LOCAL/INT"),
            Type::Float => bump(&mut self.counters.local_float, LOCAL_FLOAT_BASE, "LOCAL/FLOAT"),
            Type::Bool => bump(&mut self.counters.local_bool, LOCAL_BOOL_BASE, "LOCAL/BOOL"),
            Type::Void => panic!("VOID has no storage segment"),
        }
    }

    pub fn allocate_temporary(&mut self, ty: Type) -> u32 {
        match ty {
            Type::Int => bump(&mut self.counters.temp_int, TEMP_INT_BASE, "TEMP/INT"),
            Type::Float => bump(&mut self.counters.temp_float, TEMP_FLOAT_BASE, "TEMP/FLOAT"),
            Type::Bool => bump(&mut self.counters.temp_bool, TEMP_BOOL_BASE, "TEMP/BOOL"),
            Type::Void => panic!("VOID has no storage segment"),
        }
    }

    /// Interns a constant, returning its address. Interning the same
    /// `(lexeme, kind)` pair twice returns the first address and does not
    /// advance any counter.
    pub fn allocate_constant(&mut self, lexeme: &str, kind: ConstKind) -> u32 {
        let key = ConstantKey {
            lexeme: lexeme.to_owned(),
            kind,
        };
        if let Some(&addr) = self.constants.entries.get(&key) {
            return addr;
        }
        let addr = match kind {
            ConstKind::Int => bump(&mut self.counters.const_int, CONST_INT_BASE, "CONSTANT/INT"),
            ConstKind::Float => bump(&mut self.counters.const_float, CONST_FLOAT_BASE, "CONSTANT/FLOAT"),
            ConstKind::Str => bump(&mut self.counters.const_string, CONST_STRING_BASE, "CONSTANT/STRING"),
        };
        self.constants.entries.insert(key, addr);
        addr
    }

    /// Reserves (idempotently) the return slot of a typed function.
    ///
    /// The slot lives in the GLOBAL segment of the return type. A VOID
    /// function has no value to carry, so reserving a slot for one fails.
    pub fn allocate_function_return(&mut self, function: &str, return_type: Type) -> CompileResult<u32> {
        if let Some(&addr) = self.return_slots.get(function) {
            return Ok(addr);
        }
        let addr = match return_type {
            Type::Int | Type::Float => self.allocate_global(return_type),
            Type::Bool | Type::Void => {
                return Err(CompileError::InvalidType {
                    context: format!("function '{function}' with return type {return_type} has no return slot"),
                });
            }
        };
        self.return_slots.insert(function.to_owned(), addr);
        Ok(addr)
    }

    /// The already-reserved return slot of a typed function.
    pub fn function_return_address(&self, function: &str) -> CompileResult<u32> {
        self.return_slots
            .get(function)
            .copied()
            .ok_or_else(|| CompileError::UnknownFunction {
                name: function.to_owned(),
            })
    }

    #[must_use]
    pub fn constants(&self) -> &ConstantTable {
        &self.constants
    }
}

/// Assigns a virtual address to every declared global, every function local
/// (parameters included), and reserves each typed function's return slot.
///
/// Quadruple generation requires this pass to have run. The pass is
/// idempotent: entries that already hold an address are left untouched.
pub fn assign_variable_addresses(directory: &mut FunctionDirectory, memory: &mut VirtualMemory) -> CompileResult<()> {
    for entry in directory.globals.entries_mut() {
        if entry.address.is_none() {
            entry.address = Some(memory.allocate_global(entry.ty));
        }
    }
    for function in directory.functions_mut() {
        for entry in function.locals.entries_mut() {
            if entry.address.is_none() {
                entry.address = Some(memory.allocate_local(entry.ty));
            }
        }
    }
    for function in directory.functions() {
        if function.return_type != Type::Void {
            memory.allocate_function_return(&function.name, function.return_type)?;
        }
    }
    Ok(())
}

/// The segment a decoded address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Global,
    Local,
    Temp,
    Constant,
}

/// The typed lane within a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Int,
    Float,
    Bool,
    Str,
}

/// Decodes an address into `(segment, lane, offset-within-lane)` by range
/// comparison against the fixed bases. Returns `None` for addresses outside
/// every declared range.
#[must_use]
pub fn decode_address(address: u32) -> Option<(Segment, Lane, u32)> {
    let (segment, lane, base) = match address {
        GLOBAL_INT_BASE..GLOBAL_FLOAT_BASE => (Segment::Global, Lane::Int, GLOBAL_INT_BASE),
        GLOBAL_FLOAT_BASE..GLOBAL_BOOL_BASE => (Segment::Global, Lane::Float, GLOBAL_FLOAT_BASE),
        GLOBAL_BOOL_BASE..LOCAL_INT_BASE => (Segment::Global, Lane::Bool, GLOBAL_BOOL_BASE),
        LOCAL_INT_BASE..LOCAL_FLOAT_BASE => (Segment::Local, Lane::Int, LOCAL_INT_BASE),
        LOCAL_FLOAT_BASE..LOCAL_BOOL_BASE => (Segment::Local, Lane::Float, LOCAL_FLOAT_BASE),
        LOCAL_BOOL_BASE..TEMP_INT_BASE => (Segment::Local, Lane::Bool, LOCAL_BOOL_BASE),
        TEMP_INT_BASE..TEMP_FLOAT_BASE => (Segment::Temp, Lane::Int, TEMP_INT_BASE),
        TEMP_FLOAT_BASE..TEMP_BOOL_BASE => (Segment::Temp, Lane::Float, TEMP_FLOAT_BASE),
        TEMP_BOOL_BASE..CONST_INT_BASE => (Segment::Temp, Lane::Bool, TEMP_BOOL_BASE),
        CONST_INT_BASE..CONST_FLOAT_BASE => (Segment::Constant, Lane::Int, CONST_INT_BASE),
        CONST_FLOAT_BASE..CONST_STRING_BASE => (Segment::Constant, Lane::Float, CONST_FLOAT_BASE),
        CONST_STRING_BASE..ADDRESS_SPACE_END => (Segment::Constant, Lane::Str, CONST_STRING_BASE),
        _ => return None,
    };
    Some((segment, lane, address - base))
}
