//! Quadruple generation: lowering a parse tree to a flat quadruple program.
//!
//! The generator walks the tree with the populated function directory in
//! hand. Expressions flow through the classical operand/type/operator stacks;
//! forward references (`if`/`else`, `while`, `return`, calls to functions
//! whose bodies come later) are left unresolved and backpatched as soon as
//! their targets are known. By the time [`QuadGenerator::generate`] returns,
//! every jump in the program carries a valid target.

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::{
    ast::{BinOp, Block, Expr, FunctionDecl, PrintArg, Program, Stmt},
    error::{CompileError, CompileResult},
    memory::{ConstKind, VirtualMemory},
    quad::{Operand, QuadOp, QuadProgram, Quadruple},
    symbols::{FunctionDirectory, FunctionEntry},
    types::{self, Type},
};

/// Where a lowered subexpression lives and what type it has.
#[derive(Debug, Clone, Copy)]
struct ExprValue {
    address: u32,
    ty: Type,
}

/// Inline capacity for call-argument buffers; most calls take few arguments.
type ArgValues = SmallVec<[ExprValue; 4]>;

/// Single-pass quadruple generator.
///
/// Requires every declared variable to already carry a virtual address and
/// every typed function to have a reserved return slot (the address
/// assignment pass establishes both).
pub struct QuadGenerator<'a> {
    directory: &'a FunctionDirectory,
    memory: &'a mut VirtualMemory,
    quads: QuadProgram,

    // Expression stacks, in lockstep: operand_stack[i] has type type_stack[i].
    operand_stack: Vec<u32>,
    type_stack: Vec<Type>,
    operator_stack: Vec<QuadOp>,

    /// Function currently being lowered; `None` while in the main body.
    current_function: Option<String>,
    /// Index of each function's first executable quadruple (past BEGINFUNC).
    function_starts: AHashMap<String, usize>,
    /// Exit GOTOs emitted by `return`, patched to ENDFUNC per function.
    pending_return_gotos: AHashMap<String, Vec<usize>>,
    /// GOSUBs emitted before their callee's body, patched at BEGINFUNC.
    pending_gosub_fixups: AHashMap<String, Vec<usize>>,
}

impl<'a> QuadGenerator<'a> {
    #[must_use]
    pub fn new(directory: &'a FunctionDirectory, memory: &'a mut VirtualMemory) -> Self {
        Self {
            directory,
            memory,
            quads: QuadProgram::new(),
            operand_stack: Vec::new(),
            type_stack: Vec::new(),
            operator_stack: Vec::new(),
            current_function: None,
            function_starts: AHashMap::new(),
            pending_return_gotos: AHashMap::new(),
            pending_gosub_fixups: AHashMap::new(),
        }
    }

    /// Lowers the whole program: every function body first, then the main
    /// body. Consumes the generator and returns the finished program.
    pub fn generate(mut self, program: &Program) -> CompileResult<QuadProgram> {
        for function in &program.functions {
            self.lower_function(function)?;
        }
        self.current_function = None;
        self.lower_block(&program.main_body)?;

        debug_assert!(
            self.pending_gosub_fixups.values().all(Vec::is_empty),
            "all forward GOSUBs are patched once their callee is generated"
        );
        Ok(self.quads)
    }

    fn lower_function(&mut self, decl: &FunctionDecl) -> CompileResult<()> {
        let name = decl.name.clone();
        let previous = self.current_function.replace(name.clone());
        self.pending_return_gotos.insert(name.clone(), Vec::new());

        let begin = self.quads.push(Quadruple::new(
            QuadOp::BeginFunc,
            Operand::name(&name),
            Operand::None,
            Operand::None,
        ));
        // The first executable quadruple of the body follows BEGINFUNC.
        self.function_starts.insert(name.clone(), begin + 1);

        // Calls emitted before this body existed now learn their target.
        if let Some(fixups) = self.pending_gosub_fixups.remove(&name) {
            for gosub_index in fixups {
                self.quads.patch(gosub_index, begin + 1);
            }
        }

        self.lower_block(&decl.body)?;

        let end = self.quads.push(Quadruple::new(
            QuadOp::EndFunc,
            Operand::name(&name),
            Operand::None,
            Operand::None,
        ));
        // Every `return` inside this function exits through ENDFUNC.
        if let Some(gotos) = self.pending_return_gotos.remove(&name) {
            for goto_index in gotos {
                self.quads.patch(goto_index, end);
            }
        }

        self.current_function = previous;
        Ok(())
    }

    fn lower_block(&mut self, block: &Block) -> CompileResult<()> {
        for stmt in block {
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Assign { target, value } => self.lower_assign(target, value),
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => self.lower_if(cond, then_body, else_body.as_ref()),
            Stmt::While { cond, body } => self.lower_while(cond, body),
            Stmt::Call { name, args } => self.lower_call_stmt(name, args),
            Stmt::Print { args } => self.lower_print(args),
            Stmt::Return { value } => self.lower_return(value.as_ref()),
            Stmt::Block(inner) => self.lower_block(inner),
        }
    }

    fn lower_assign(&mut self, target: &str, value: &Expr) -> CompileResult<()> {
        let directory = self.directory;
        let entry = directory.lookup_variable(target, self.current_function.as_deref())?;
        let value = self.lower_expr(value)?;
        types::assert_assign(entry.ty, value.ty, "assignment")?;
        let target_address = entry.address.expect("variable addresses are assigned before generation");
        self.quads.push(Quadruple::new(
            QuadOp::Assign,
            Operand::Addr(value.address),
            Operand::None,
            Operand::Addr(target_address),
        ));
        Ok(())
    }

    fn lower_if(&mut self, cond: &Expr, then_body: &Block, else_body: Option<&Block>) -> CompileResult<()> {
        let cond = self.lower_expr(cond)?;
        types::ensure_bool(cond.ty, "if condition")?;

        let gotof = self.quads.push(Quadruple::new(
            QuadOp::GotoF,
            Operand::Addr(cond.address),
            Operand::None,
            Operand::None,
        ));
        self.lower_block(then_body)?;

        if let Some(else_body) = else_body {
            let goto_end = self
                .quads
                .push(Quadruple::new(QuadOp::Goto, Operand::None, Operand::None, Operand::None));
            // A false condition jumps past the GOTO, into the else branch.
            self.quads.patch(gotof, self.quads.len());
            self.lower_block(else_body)?;
            self.quads.patch(goto_end, self.quads.len());
        } else {
            self.quads.patch(gotof, self.quads.len());
        }
        Ok(())
    }

    fn lower_while(&mut self, cond: &Expr, body: &Block) -> CompileResult<()> {
        let loop_start = self.quads.len();
        let cond = self.lower_expr(cond)?;
        types::ensure_bool(cond.ty, "while condition")?;

        let gotof = self.quads.push(Quadruple::new(
            QuadOp::GotoF,
            Operand::Addr(cond.address),
            Operand::None,
            Operand::None,
        ));
        self.lower_block(body)?;
        self.quads.push(Quadruple::new(
            QuadOp::Goto,
            Operand::None,
            Operand::None,
            Operand::Target(loop_start),
        ));
        self.quads.patch(gotof, self.quads.len());
        Ok(())
    }

    fn lower_print(&mut self, args: &[PrintArg]) -> CompileResult<()> {
        for arg in args {
            let address = match arg {
                PrintArg::Str(text) => {
                    // Interned under the quoted source lexeme; the outer
                    // quotes are stripped again when constants are loaded.
                    self.memory.allocate_constant(&format!("\"{text}\""), ConstKind::Str)
                }
                PrintArg::Expr(expr) => self.lower_expr(expr)?.address,
            };
            self.quads.push(Quadruple::new(
                QuadOp::Print,
                Operand::Addr(address),
                Operand::None,
                Operand::None,
            ));
        }
        Ok(())
    }

    fn lower_call_stmt(&mut self, name: &str, args: &[Expr]) -> CompileResult<()> {
        let (function, arg_values) = self.prepare_call(name, args)?;
        self.emit_activation(function, &arg_values);
        Ok(())
    }

    fn lower_return(&mut self, value: Option<&Expr>) -> CompileResult<()> {
        let Some(function_name) = self.current_function.clone() else {
            return Err(CompileError::ReturnOutsideFunction);
        };
        let function = self.directory.function(&function_name)?;
        let return_type = function.return_type;

        let value = match value {
            Some(expr) => Some(self.lower_expr(expr)?),
            None => None,
        };
        types::assert_return(&function_name, return_type, value.map(|v| v.ty))?;

        if let Some(value) = value {
            // Carry the value home through the function's reserved slot.
            let slot = self.memory.function_return_address(&function_name)?;
            self.quads.push(Quadruple::new(
                QuadOp::Assign,
                Operand::Addr(value.address),
                Operand::None,
                Operand::Addr(slot),
            ));
        }

        let goto = self
            .quads
            .push(Quadruple::new(QuadOp::Goto, Operand::None, Operand::None, Operand::None));
        self.pending_return_gotos
            .entry(function_name)
            .or_default()
            .push(goto);
        Ok(())
    }

    // === Expressions ===

    fn lower_expr(&mut self, expr: &Expr) -> CompileResult<ExprValue> {
        match expr {
            Expr::Int(value) => {
                let address = self.memory.allocate_constant(&value.to_string(), ConstKind::Int);
                Ok(ExprValue {
                    address,
                    ty: Type::Int,
                })
            }
            Expr::Float(value) => {
                let mut buffer = ryu::Buffer::new();
                let address = self.memory.allocate_constant(buffer.format(*value), ConstKind::Float);
                Ok(ExprValue {
                    address,
                    ty: Type::Float,
                })
            }
            Expr::Ident(name) => {
                let entry = self
                    .directory
                    .lookup_variable(name, self.current_function.as_deref())?;
                Ok(ExprValue {
                    address: entry.address.expect("variable addresses are assigned before generation"),
                    ty: entry.ty,
                })
            }
            Expr::Bin { op, left, right } => {
                let left = self.lower_expr(left)?;
                let right = self.lower_expr(right)?;
                self.emit_binary(binop_to_quadop(*op), left, right)
            }
            Expr::Neg(operand) => {
                let operand = self.lower_expr(operand)?;
                if !operand.ty.is_numeric() {
                    return Err(CompileError::IncompatibleTypes {
                        op: QuadOp::UMinus,
                        left: operand.ty,
                        right: operand.ty,
                    });
                }
                let temp = self.memory.allocate_temporary(operand.ty);
                self.quads.push(Quadruple::new(
                    QuadOp::UMinus,
                    Operand::Addr(operand.address),
                    Operand::None,
                    Operand::Addr(temp),
                ));
                Ok(ExprValue {
                    address: temp,
                    ty: operand.ty,
                })
            }
            Expr::Call { name, args } => self.lower_call_expr(name, args),
        }
    }

    /// Reduces one binary operation through the stacks: push both operands
    /// and the operator, pop them back, consult the cube, emit into a fresh
    /// temporary, and push the result.
    fn emit_binary(&mut self, op: QuadOp, left: ExprValue, right: ExprValue) -> CompileResult<ExprValue> {
        self.push_operand(left);
        self.push_operand(right);
        self.operator_stack.push(op);

        let op = self.operator_stack.pop().expect("operator was just pushed");
        let (right_address, right_type) = self.pop_operand();
        let (left_address, left_type) = self.pop_operand();

        let result = types::result_type(op, left_type, right_type)?;
        let temp = self.memory.allocate_temporary(result);
        self.quads.push(Quadruple::new(
            op,
            Operand::Addr(left_address),
            Operand::Addr(right_address),
            Operand::Addr(temp),
        ));

        let value = ExprValue {
            address: temp,
            ty: result,
        };
        self.push_operand(value);
        let (address, ty) = self.pop_operand();
        Ok(ExprValue { address, ty })
    }

    fn push_operand(&mut self, value: ExprValue) {
        self.operand_stack.push(value.address);
        self.type_stack.push(value.ty);
    }

    fn pop_operand(&mut self) -> (u32, Type) {
        let address = self.operand_stack.pop().expect("operand stack underflow");
        let ty = self.type_stack.pop().expect("type stack underflow");
        (address, ty)
    }

    // === Calls ===

    /// Resolves the callee, lowers every argument left to right, and checks
    /// the argument list against the parameter list.
    fn prepare_call(&mut self, name: &str, args: &[Expr]) -> CompileResult<(&'a FunctionEntry, ArgValues)> {
        let directory = self.directory;
        let function = directory.function(name)?;

        let mut arg_values = ArgValues::new();
        for arg in args {
            arg_values.push(self.lower_expr(arg)?);
        }

        if arg_values.len() != function.parameter_count() {
            return Err(CompileError::WrongArgumentCount {
                function: name.to_owned(),
                expected: function.parameter_count(),
                given: arg_values.len(),
            });
        }
        for (position, (arg, param)) in arg_values.iter().zip(function.parameters()).enumerate() {
            types::assert_assign(
                param.ty,
                arg.ty,
                &format!("argument {} of '{name}'", position + 1),
            )?;
        }
        Ok((function, arg_values))
    }

    /// Emits the ERA/PARAM/GOSUB activation protocol for one call.
    ///
    /// Argument expressions were already lowered, so any nested call
    /// sequences are fully emitted before this ERA: the pending frame the
    /// ERA creates at run time is consumed by this GOSUB before another ERA
    /// can appear.
    fn emit_activation(&mut self, function: &FunctionEntry, args: &[ExprValue]) {
        self.quads.push(Quadruple::new(
            QuadOp::Era,
            Operand::name(&function.name),
            Operand::None,
            Operand::None,
        ));
        for (index, arg) in args.iter().enumerate() {
            let position = u32::try_from(index + 1).expect("parameter position exceeds u32");
            self.quads.push(Quadruple::new(
                QuadOp::Param,
                Operand::Addr(arg.address),
                Operand::None,
                Operand::Pos(position),
            ));
        }

        if let Some(&start) = self.function_starts.get(&function.name) {
            self.quads.push(Quadruple::new(
                QuadOp::Gosub,
                Operand::name(&function.name),
                Operand::None,
                Operand::Target(start),
            ));
        } else {
            // Forward call: the callee's body is not generated yet. Patched
            // at its BEGINFUNC.
            let gosub = self.quads.push(Quadruple::new(
                QuadOp::Gosub,
                Operand::name(&function.name),
                Operand::None,
                Operand::None,
            ));
            self.pending_gosub_fixups
                .entry(function.name.clone())
                .or_default()
                .push(gosub);
        }
    }

    fn lower_call_expr(&mut self, name: &str, args: &[Expr]) -> CompileResult<ExprValue> {
        let (function, arg_values) = self.prepare_call(name, args)?;
        if function.return_type == Type::Void {
            return Err(CompileError::VoidFunctionInExpression { name: name.to_owned() });
        }
        let return_type = function.return_type;
        self.emit_activation(function, &arg_values);

        // Copy the return slot into a fresh temporary immediately: a later
        // call to the same function would overwrite the slot.
        let slot = self.memory.function_return_address(name)?;
        let temp = self.memory.allocate_temporary(return_type);
        self.quads.push(Quadruple::new(
            QuadOp::Assign,
            Operand::Addr(slot),
            Operand::None,
            Operand::Addr(temp),
        ));
        Ok(ExprValue {
            address: temp,
            ty: return_type,
        })
    }
}

fn binop_to_quadop(op: BinOp) -> QuadOp {
    match op {
        BinOp::Add => QuadOp::Add,
        BinOp::Sub => QuadOp::Sub,
        BinOp::Mul => QuadOp::Mul,
        BinOp::Div => QuadOp::Div,
        BinOp::Gt => QuadOp::Gt,
        BinOp::Lt => QuadOp::Lt,
        BinOp::Eq => QuadOp::Eq,
        BinOp::Ne => QuadOp::Ne,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{Param, VarDecl},
        memory::assign_variable_addresses,
        prepare::build_directory,
    };

    fn generate(program: &Program) -> (QuadProgram, VirtualMemory) {
        let mut directory = build_directory(program).unwrap();
        let mut memory = VirtualMemory::new();
        assign_variable_addresses(&mut directory, &mut memory).unwrap();
        let quads = QuadGenerator::new(&directory, &mut memory).generate(program).unwrap();
        (quads, memory)
    }

    fn main_only(globals: Vec<VarDecl>, main_body: Block) -> Program {
        Program {
            name: "test".to_owned(),
            globals,
            functions: Vec::new(),
            main_body,
        }
    }

    #[test]
    fn precedence_comes_from_tree_shape() {
        // y = 1 + 2 * 3 lowers the product first, then the sum.
        let program = main_only(
            vec![VarDecl::new(&["y"], Type::Int)],
            vec![Stmt::assign(
                "y",
                Expr::bin(
                    BinOp::Add,
                    Expr::Int(1),
                    Expr::bin(BinOp::Mul, Expr::Int(2), Expr::Int(3)),
                ),
            )],
        );
        let (quads, _) = generate(&program);
        assert_eq!(quads.len(), 3);
        assert_eq!(quads.get(0).op, QuadOp::Mul);
        assert_eq!(quads.get(1).op, QuadOp::Add);
        assert_eq!(quads.get(2).op, QuadOp::Assign);
        // The product's temporary feeds the sum.
        assert_eq!(quads.get(1).right, quads.get(0).result);
    }

    #[test]
    fn redundant_parentheses_change_nothing() {
        // (1 + (2 * 3)) parses to the same tree as 1 + 2 * 3 under the
        // declared precedence, so the quadruples are identical.
        let bare = main_only(
            vec![VarDecl::new(&["y"], Type::Int)],
            vec![Stmt::assign(
                "y",
                Expr::bin(
                    BinOp::Add,
                    Expr::Int(1),
                    Expr::bin(BinOp::Mul, Expr::Int(2), Expr::Int(3)),
                ),
            )],
        );
        let (bare_quads, _) = generate(&bare);
        let (paren_quads, _) = generate(&bare.clone());
        assert_eq!(bare_quads, paren_quads);
    }

    #[test]
    fn if_without_else_patches_past_then() {
        let program = main_only(
            vec![VarDecl::new(&["c"], Type::Int)],
            vec![Stmt::If {
                cond: Expr::bin(BinOp::Gt, Expr::ident("c"), Expr::Int(5)),
                then_body: vec![Stmt::print_expr(Expr::Int(1))],
                else_body: None,
            }],
        );
        let (quads, _) = generate(&program);
        // 0: >   1: GOTOF   2: PRINT
        assert_eq!(quads.get(1).op, QuadOp::GotoF);
        assert_eq!(quads.get(1).result, Operand::Target(3));
    }

    #[test]
    fn if_else_patches_both_arms() {
        let program = main_only(
            vec![VarDecl::new(&["c"], Type::Int)],
            vec![Stmt::If {
                cond: Expr::bin(BinOp::Gt, Expr::ident("c"), Expr::Int(5)),
                then_body: vec![Stmt::print_expr(Expr::Int(1))],
                else_body: Some(vec![Stmt::print_expr(Expr::Int(0))]),
            }],
        );
        let (quads, _) = generate(&program);
        // 0: >   1: GOTOF->4   2: PRINT   3: GOTO->5   4: PRINT
        assert_eq!(quads.get(1).op, QuadOp::GotoF);
        assert_eq!(quads.get(1).result, Operand::Target(4));
        assert_eq!(quads.get(3).op, QuadOp::Goto);
        assert_eq!(quads.get(3).result, Operand::Target(5));
    }

    #[test]
    fn while_jumps_back_to_condition() {
        let program = main_only(
            vec![VarDecl::new(&["c"], Type::Int)],
            vec![Stmt::While {
                cond: Expr::bin(BinOp::Lt, Expr::ident("c"), Expr::Int(3)),
                body: vec![Stmt::assign(
                    "c",
                    Expr::bin(BinOp::Add, Expr::ident("c"), Expr::Int(1)),
                )],
            }],
        );
        let (quads, _) = generate(&program);
        // 0: <   1: GOTOF->5   2: +   3: ASSIGN   4: GOTO->0
        assert_eq!(quads.get(1).result, Operand::Target(5));
        assert_eq!(quads.get(4).op, QuadOp::Goto);
        assert_eq!(quads.get(4).result, Operand::Target(0));
    }

    #[test]
    fn forward_call_from_earlier_function_is_patched() {
        // `first` calls `second` before `second` is generated; the GOSUB is
        // patched when `second`'s BEGINFUNC lands.
        let program = Program {
            name: "test".to_owned(),
            globals: Vec::new(),
            functions: vec![
                FunctionDecl {
                    name: "first".to_owned(),
                    return_type: Type::Void,
                    params: Vec::new(),
                    locals: Vec::new(),
                    body: vec![Stmt::call("second", Vec::new())],
                },
                FunctionDecl {
                    name: "second".to_owned(),
                    return_type: Type::Void,
                    params: Vec::new(),
                    locals: Vec::new(),
                    body: vec![Stmt::print_str("hi")],
                },
            ],
            main_body: vec![Stmt::call("first", Vec::new())],
        };
        let (quads, _) = generate(&program);
        let gosubs: Vec<_> = quads.iter().filter(|q| q.op == QuadOp::Gosub).collect();
        assert_eq!(gosubs.len(), 2);
        for gosub in gosubs {
            let target = gosub.result.target().expect("every GOSUB is patched");
            assert_eq!(quads.get(target - 1).op, QuadOp::BeginFunc);
        }
    }

    #[test]
    fn call_expression_copies_return_slot_to_temp() {
        let program = Program {
            name: "test".to_owned(),
            globals: Vec::new(),
            functions: vec![FunctionDecl {
                name: "sq".to_owned(),
                return_type: Type::Int,
                params: vec![Param::new("n", Type::Int)],
                locals: Vec::new(),
                body: vec![Stmt::Return {
                    value: Some(Expr::bin(BinOp::Mul, Expr::ident("n"), Expr::ident("n"))),
                }],
            }],
            main_body: vec![Stmt::print_expr(Expr::call("sq", vec![Expr::Int(5)]))],
        };
        let (quads, memory) = generate(&program);
        let slot = memory.function_return_address("sq").unwrap();

        // The main body emits ERA, PARAM, GOSUB, then copies the slot.
        let gosub_at = (0..quads.len())
            .rev()
            .find(|&i| quads.get(i).op == QuadOp::Gosub)
            .unwrap();
        let copy = quads.get(gosub_at + 1);
        assert_eq!(copy.op, QuadOp::Assign);
        assert_eq!(copy.left, Operand::Addr(slot));
        assert_eq!(quads.get(gosub_at - 1).op, QuadOp::Param);
        assert_eq!(quads.get(gosub_at - 1).result, Operand::Pos(1));
        assert_eq!(quads.get(gosub_at - 2).op, QuadOp::Era);
    }

    #[test]
    fn return_goto_exits_through_endfunc() {
        let program = Program {
            name: "test".to_owned(),
            globals: Vec::new(),
            functions: vec![FunctionDecl {
                name: "pick".to_owned(),
                return_type: Type::Int,
                params: vec![Param::new("n", Type::Int)],
                locals: Vec::new(),
                body: vec![
                    Stmt::If {
                        cond: Expr::bin(BinOp::Lt, Expr::ident("n"), Expr::Int(0)),
                        then_body: vec![Stmt::Return {
                            value: Some(Expr::Int(0)),
                        }],
                        else_body: None,
                    },
                    Stmt::Return {
                        value: Some(Expr::ident("n")),
                    },
                ],
            }],
            main_body: vec![Stmt::print_expr(Expr::call("pick", vec![Expr::Int(7)]))],
        };
        let (quads, _) = generate(&program);
        let end = (0..quads.len()).find(|&i| quads.get(i).op == QuadOp::EndFunc).unwrap();
        let return_gotos: Vec<_> = (0..end)
            .filter(|&i| quads.get(i).op == QuadOp::Goto && quads.get(i).result == Operand::Target(end))
            .collect();
        assert_eq!(return_gotos.len(), 2);
    }

    #[test]
    fn stacks_are_empty_after_generation() {
        let program = main_only(
            vec![VarDecl::new(&["y"], Type::Int)],
            vec![Stmt::assign(
                "y",
                Expr::bin(
                    BinOp::Sub,
                    Expr::bin(BinOp::Add, Expr::Int(1), Expr::Int(2)),
                    Expr::Int(3),
                ),
            )],
        );
        let mut directory = build_directory(&program).unwrap();
        let mut memory = VirtualMemory::new();
        assign_variable_addresses(&mut directory, &mut memory).unwrap();
        let mut generator = QuadGenerator::new(&directory, &mut memory);
        for stmt in &program.main_body {
            generator.lower_stmt(stmt).unwrap();
        }
        assert!(generator.operand_stack.is_empty());
        assert!(generator.type_stack.is_empty());
        assert!(generator.operator_stack.is_empty());
    }
}
