//! The quadruple virtual machine.
//!
//! A fetch-decode-execute loop over the quadruple vector, driven by an
//! instruction pointer, a halt flag, and a return-address stack. Function
//! calls follow the ERA/PARAM/GOSUB handshake: `ERA` prepares a frame that
//! execution cannot see yet, `PARAM` writes arguments into it while the
//! caller's frame is still current, and `GOSUB` finally activates it. The
//! split keeps nested call sequences in argument position from colliding.

pub mod memory;

use ahash::AHashMap;

use crate::{
    error::{RunError, RunResult},
    io::PrintWriter,
    memory::{Lane, Segment, decode_address},
    quad::{Operand, QuadOp, QuadProgram, Quadruple},
    symbols::FunctionDirectory,
    tracer::VmTracer,
    value::Value,
    vm::memory::{ExecutionMemory, FrameBases},
};

/// Per-function LOCAL/TEMP rebasing offsets, fixed at VM construction.
#[derive(Debug, Clone, Copy, Default)]
struct FrameLayout {
    local: FrameBases,
    temp: FrameBases,
}

/// Executes a quadruple program against segmented execution memory.
///
/// Output is accumulated in an in-memory list and simultaneously emitted
/// through the [`PrintWriter`], so a harness can observe it without
/// capturing the output channel.
pub struct VM<'a, P: PrintWriter, T: VmTracer> {
    quads: &'a QuadProgram,
    memory: ExecutionMemory,
    /// LOCAL bases come from the directory; TEMP bases from a prescan of
    /// each function's emitted body.
    layouts: AHashMap<String, FrameLayout>,
    ip: usize,
    halted: bool,
    return_stack: Vec<usize>,
    /// Frame built by ERA, waiting for its GOSUB.
    pending_frame: Option<memory::ActivationRecord>,
    output: Vec<String>,
    print: &'a mut P,
    tracer: T,
}

impl<'a, P: PrintWriter, T: VmTracer> VM<'a, P, T> {
    pub fn new(
        quads: &'a QuadProgram,
        directory: &FunctionDirectory,
        exec_memory: ExecutionMemory,
        print: &'a mut P,
        tracer: T,
    ) -> Self {
        Self {
            quads,
            memory: exec_memory,
            layouts: compute_frame_layouts(quads, directory),
            ip: 0,
            halted: false,
            return_stack: Vec::new(),
            pending_frame: None,
            output: Vec::new(),
            print,
            tracer,
        }
    }

    /// Runs from quadruple zero until the program ends, a halt is reached,
    /// or a run-time error occurs. Resets ip, halt flag, and output first,
    /// so `run` can be called again.
    pub fn run(&mut self) -> RunResult<()> {
        self.ip = 0;
        self.halted = false;
        self.return_stack.clear();
        self.pending_frame = None;
        self.output.clear();

        let quads = self.quads;
        while self.ip < quads.len() && !self.halted {
            let quad = quads.get(self.ip);
            self.tracer.on_instruction(self.ip, quad.op, self.memory.depth());
            self.step(quad)?;
        }
        Ok(())
    }

    /// Lines printed so far, in execution order.
    #[must_use]
    pub fn output(&self) -> &[String] {
        &self.output
    }

    #[must_use]
    pub fn into_output(self) -> Vec<String> {
        self.output
    }

    #[must_use]
    pub fn into_output_and_tracer(self) -> (Vec<String>, T) {
        (self.output, self.tracer)
    }

    #[must_use]
    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    fn step(&mut self, quad: &Quadruple) -> RunResult<()> {
        match quad.op {
            QuadOp::Add | QuadOp::Sub | QuadOp::Mul | QuadOp::Div => self.exec_arithmetic(quad),
            QuadOp::Gt | QuadOp::Lt | QuadOp::Eq | QuadOp::Ne => self.exec_relational(quad),
            QuadOp::Assign => {
                let value = self.memory.read(operand_address(&quad.left))?;
                self.memory.write(operand_address(&quad.result), value)?;
                self.ip += 1;
                Ok(())
            }
            QuadOp::UMinus => {
                let value = match self.memory.read(operand_address(&quad.left))? {
                    Value::Int(v) => Value::Int(-v),
                    Value::Float(v) => Value::Float(-v),
                    other => unreachable!("UMINUS operand is numeric, got {other:?}"),
                };
                self.memory.write(operand_address(&quad.result), value)?;
                self.ip += 1;
                Ok(())
            }
            QuadOp::Print => {
                let value = self.memory.read(operand_address(&quad.left))?;
                let text = value.to_string();
                self.tracer.on_print(&text);
                self.print.write_line(&text);
                self.output.push(text);
                self.ip += 1;
                Ok(())
            }
            QuadOp::Goto => {
                self.ip = patched_target(quad);
                Ok(())
            }
            QuadOp::GotoF => {
                let condition = self.memory.read(operand_address(&quad.left))?;
                if condition.is_truthy() {
                    self.ip += 1;
                } else {
                    self.ip = patched_target(quad);
                }
                Ok(())
            }
            QuadOp::BeginFunc => self.exec_beginfunc(quad),
            QuadOp::EndFunc => self.exec_endfunc(),
            QuadOp::Era => self.exec_era(quad),
            QuadOp::Param => self.exec_param(quad),
            QuadOp::Gosub => self.exec_gosub(quad),
        }
    }

    fn exec_arithmetic(&mut self, quad: &Quadruple) -> RunResult<()> {
        let left = self.memory.read(operand_address(&quad.left))?;
        let right = self.memory.read(operand_address(&quad.right))?;

        let value = match quad.op {
            // Integer-over-integer division still produces a float.
            QuadOp::Div => {
                if right.is_zero() {
                    return Err(RunError::DivisionByZero { at: self.ip });
                }
                Value::Float(left.as_f64() / right.as_f64())
            }
            op => match (&left, &right) {
                (Value::Int(a), Value::Int(b)) => Value::Int(match op {
                    QuadOp::Add => a + b,
                    QuadOp::Sub => a - b,
                    QuadOp::Mul => a * b,
                    _ => unreachable!("arithmetic dispatch covers + - *"),
                }),
                _ => {
                    let (a, b) = (left.as_f64(), right.as_f64());
                    Value::Float(match op {
                        QuadOp::Add => a + b,
                        QuadOp::Sub => a - b,
                        QuadOp::Mul => a * b,
                        _ => unreachable!("arithmetic dispatch covers + - *"),
                    })
                }
            },
        };
        self.memory.write(operand_address(&quad.result), value)?;
        self.ip += 1;
        Ok(())
    }

    fn exec_relational(&mut self, quad: &Quadruple) -> RunResult<()> {
        let left = self.memory.read(operand_address(&quad.left))?;
        let right = self.memory.read(operand_address(&quad.right))?;

        let holds = match (&left, &right) {
            // Same-type INTs compare exactly; any FLOAT promotes both sides.
            (Value::Int(a), Value::Int(b)) => compare(quad.op, a, b),
            _ => compare(quad.op, &left.as_f64(), &right.as_f64()),
        };
        self.memory.write(operand_address(&quad.result), Value::Bool(holds))?;
        self.ip += 1;
        Ok(())
    }

    /// Entering a function marker without an active call means straight-line
    /// execution reached a function body laid out before the main entry:
    /// scan forward past the matching ENDFUNC instead of executing it.
    fn exec_beginfunc(&mut self, quad: &Quadruple) -> RunResult<()> {
        if self.memory.depth() > 1 {
            self.ip += 1;
            return Ok(());
        }
        let name = operand_name(&quad.left);
        let mut depth = 1usize;
        let mut next = self.ip + 1;
        while next < self.quads.len() {
            let candidate = self.quads.get(next);
            match candidate.op {
                QuadOp::BeginFunc => depth += 1,
                QuadOp::EndFunc if operand_name(&candidate.left) == name => {
                    depth -= 1;
                    if depth == 0 {
                        self.ip = next + 1;
                        return Ok(());
                    }
                }
                _ => {}
            }
            next += 1;
        }
        unreachable!("every BEGINFUNC has a matching ENDFUNC")
    }

    fn exec_endfunc(&mut self) -> RunResult<()> {
        self.memory.pop_frame()?;
        self.tracer.on_return(self.memory.depth());
        if let Some(return_address) = self.return_stack.pop() {
            self.ip = return_address;
        } else {
            self.halted = true;
        }
        Ok(())
    }

    fn exec_era(&mut self, quad: &Quadruple) -> RunResult<()> {
        let name = operand_name(&quad.left);
        let layout = self
            .layouts
            .get(name)
            .copied()
            .expect("ERA names a function present in the directory");
        self.pending_frame = Some(self.memory.prepare_frame(name, layout.local, layout.temp));
        self.ip += 1;
        Ok(())
    }

    fn exec_param(&mut self, quad: &Quadruple) -> RunResult<()> {
        let arg_address = operand_address(&quad.left);
        // Read in the caller's context before touching the pending frame.
        let value = self.memory.read(arg_address)?;
        let (_, lane, _) = decode_address(arg_address).expect("PARAM argument address is in range");
        let position = match quad.result {
            Operand::Pos(p) => p,
            _ => unreachable!("PARAM result is a parameter position"),
        };
        let frame = self
            .pending_frame
            .as_mut()
            .expect("PARAM follows an ERA in emitted code");
        frame.store_param(lane, (position - 1) as usize, value);
        self.ip += 1;
        Ok(())
    }

    fn exec_gosub(&mut self, quad: &Quadruple) -> RunResult<()> {
        let name = operand_name(&quad.left);
        let Some(target) = quad.result.target() else {
            return Err(RunError::DanglingGosub {
                at: self.ip,
                function: name.to_owned(),
            });
        };
        let frame = self
            .pending_frame
            .take()
            .expect("GOSUB follows an ERA in emitted code");
        self.return_stack.push(self.ip + 1);
        self.memory.push_frame(frame);
        self.tracer.on_call(name, self.memory.depth());
        self.ip = target;
        Ok(())
    }
}

fn operand_address(operand: &Operand) -> u32 {
    operand.address().expect("operand carries a virtual address")
}

fn operand_name(operand: &Operand) -> &str {
    match operand {
        Operand::Name(name) => name,
        other => unreachable!("operand carries a function name, got {other:?}"),
    }
}

/// GOTO and GOTOF targets are always patched by the generator before the
/// program reaches the VM.
fn patched_target(quad: &Quadruple) -> usize {
    quad.result.target().expect("jump target was backpatched")
}

fn compare<V: PartialOrd>(op: QuadOp, left: &V, right: &V) -> bool {
    match op {
        QuadOp::Gt => left > right,
        QuadOp::Lt => left < right,
        QuadOp::Eq => left == right,
        QuadOp::Ne => left != right,
        _ => unreachable!("relational dispatch covers > < == !="),
    }
}

/// Computes every function's LOCAL and TEMP rebasing offsets.
///
/// LOCAL bases are the lowest per-lane offsets among the function's declared
/// locals. TEMP bases come from scanning the function's emitted quadruples
/// for TEMP-segment addresses, since temporaries are not in the directory.
fn compute_frame_layouts(quads: &QuadProgram, directory: &FunctionDirectory) -> AHashMap<String, FrameLayout> {
    let mut layouts: AHashMap<String, FrameLayout> = AHashMap::new();

    for function in directory.functions() {
        let mut layout = FrameLayout::default();
        let mut mins = LaneMins::default();
        for entry in function.locals.entries() {
            let address = entry.address.expect("addresses are assigned before execution");
            if let Some((Segment::Local, lane, offset)) = decode_address(address) {
                mins.update(lane, offset);
            }
        }
        layout.local = mins.into_bases();
        layouts.insert(function.name.clone(), layout);
    }

    let mut current: Option<&str> = None;
    let mut mins = LaneMins::default();
    for quad in quads {
        match quad.op {
            QuadOp::BeginFunc => {
                current = Some(operand_name(&quad.left));
                mins = LaneMins::default();
            }
            QuadOp::EndFunc => {
                if let Some(name) = current.take() {
                    if let Some(layout) = layouts.get_mut(name) {
                        layout.temp = mins.into_bases();
                    }
                }
            }
            _ => {
                if current.is_some() {
                    for operand in [&quad.left, &quad.right, &quad.result] {
                        if let Some(address) = operand.address() {
                            if let Some((Segment::Temp, lane, offset)) = decode_address(address) {
                                mins.update(lane, offset);
                            }
                        }
                    }
                }
            }
        }
    }

    layouts
}

/// Running per-lane minimum offsets.
#[derive(Debug, Clone, Copy, Default)]
struct LaneMins {
    ints: Option<u32>,
    floats: Option<u32>,
    bools: Option<u32>,
}

impl LaneMins {
    fn update(&mut self, lane: Lane, offset: u32) {
        let slot = match lane {
            Lane::Int => &mut self.ints,
            Lane::Float => &mut self.floats,
            Lane::Bool => &mut self.bools,
            Lane::Str => return,
        };
        *slot = Some(slot.map_or(offset, |current| current.min(offset)));
    }

    fn into_bases(self) -> FrameBases {
        FrameBases {
            ints: self.ints.unwrap_or(0),
            floats: self.floats.unwrap_or(0),
            bools: self.bools.unwrap_or(0),
        }
    }
}
