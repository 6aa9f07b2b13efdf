//! Public interface for compiling and running Patito programs.
//!
//! The pipeline is strictly sequential: semantic builder, address
//! assignment, quadruple generation, then execution. A [`Compilation`] holds
//! everything the VM needs and serializes as one unit, so a compiled program
//! can be cached and reloaded without recompiling.

use serde::{Deserialize, Serialize};

use crate::{
    ast::Program,
    error::{CompileResult, RunResult},
    io::PrintWriter,
    memory::{VirtualMemory, assign_variable_addresses},
    prepare::build_directory,
    quad::{QuadGenerator, QuadProgram},
    symbols::FunctionDirectory,
    tracer::{NoopTracer, VmTracer},
    vm::{VM, memory::ExecutionMemory},
};

/// Compiles a parse tree into an executable program.
///
/// Fails on the first semantic error; no partial program is returned.
pub fn compile(program: &Program) -> CompileResult<Compilation> {
    let mut directory = build_directory(program)?;
    let mut memory = VirtualMemory::new();
    assign_variable_addresses(&mut directory, &mut memory)?;
    let quads = QuadGenerator::new(&directory, &mut memory).generate(program)?;
    Ok(Compilation {
        directory,
        memory,
        quads,
    })
}

/// A compiled program: quadruples, the populated directory, and the
/// virtual-memory state (constant table and return slots).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compilation {
    pub directory: FunctionDirectory,
    pub memory: VirtualMemory,
    pub quads: QuadProgram,
}

impl Compilation {
    /// Executes the program, returning the printed lines in order.
    ///
    /// Each call executes against fresh execution memory, so running twice
    /// gives identical results.
    pub fn run(&self, print: &mut impl PrintWriter) -> RunResult<Vec<String>> {
        self.run_traced(print, NoopTracer).map(|(output, _)| output)
    }

    /// Executes the program with a tracer attached, returning the printed
    /// lines and the tracer.
    pub fn run_traced<T: VmTracer>(&self, print: &mut impl PrintWriter, tracer: T) -> RunResult<(Vec<String>, T)> {
        let mut exec = ExecutionMemory::new();
        exec.load_constants(self.memory.constants())?;
        let mut vm = VM::new(&self.quads, &self.directory, exec, print, tracer);
        vm.run()?;
        Ok(vm.into_output_and_tracer())
    }

    /// Serializes the compiled program to a compact binary format.
    pub fn dump(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    /// Restores a compiled program serialized with [`Compilation::dump`].
    pub fn load(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}
