#![doc = include_str!("../../../README.md")]
#![expect(clippy::float_cmp, reason = "runtime float comparisons are exact")]

mod ast;
mod error;
mod io;
pub mod memory;
mod prepare;
pub mod quad;
mod run;
mod symbols;
pub mod tracer;
mod types;
mod value;
mod vm;

pub use crate::{
    ast::{BinOp, Block, Expr, FunctionDecl, Param, PrintArg, Program, Stmt, VarDecl},
    error::{CompileError, CompileResult, RunError, RunResult},
    io::{CollectPrint, NoPrint, PrintWriter, StdPrint},
    memory::{ConstKind, ConstantTable, VirtualMemory, assign_variable_addresses},
    prepare::build_directory,
    quad::{Operand, QuadGenerator, QuadOp, QuadProgram, Quadruple},
    run::{Compilation, compile},
    symbols::{FunctionDirectory, FunctionEntry, VariableEntry, VariableTable},
    tracer::{NoopTracer, RecordingTracer, StderrTracer, TraceEvent, VmTracer},
    types::{Type, assert_assign, assert_return, ensure_bool, result_type},
    value::Value,
    vm::{
        VM,
        memory::{ActivationRecord, ExecutionMemory, FrameBases},
    },
};
