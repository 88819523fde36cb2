//! Bytecode generation.
//!
//! Each function compiles to a flat instruction list. Variables live in
//! numbered frame slots handed out by a scope stack, so slots are
//! reused once a block ends. Forward jumps are emitted with a
//! placeholder target and patched to a NOP landing pad once the target
//! address is known.
//!
//! Assignment compiles the l-value path as if reading it, then drops
//! the final read instruction: what remains on the stack is exactly the
//! container (and index) the matching SETF/SETI/STORE needs.

use crate::error::CompileError;
use opal_common::{FunctionInfo, Instruction, Opcode, Program, Value};
use opal_frontend::ast::{
    AssignStmt, BasicIf, CallExpr, DeleteTarget, Expr, FunDef, RValue, Stmt, Term, VarRef,
};
use opal_frontend::token::TokenKind;
use opal_frontend::{ast, Token};
use std::collections::HashMap;

/// Compile a checked program into bytecode.
pub fn compile(program: &ast::Program) -> Result<Program, CompileError> {
    let mut struct_fields = HashMap::new();
    for struct_def in &program.structs {
        let fields: Vec<String> = struct_def
            .fields
            .iter()
            .map(|f| f.name.lexeme.clone())
            .collect();
        struct_fields.insert(struct_def.name.lexeme.clone(), fields);
    }
    let compiler = Compiler { struct_fields };
    let mut out = Program::new();
    for fun_def in &program.functions {
        out.add(compiler.compile_fun(fun_def)?);
    }
    Ok(out)
}

struct Compiler {
    /// Field names per struct, in declaration order.
    struct_fields: HashMap<String, Vec<String>>,
}

/// Instruction list and slot allocation for one function.
struct FrameContext {
    instructions: Vec<Instruction>,
    scopes: Vec<HashMap<String, usize>>,
    next_slot: usize,
}

impl FrameContext {
    fn new() -> Self {
        Self {
            instructions: Vec::new(),
            scopes: Vec::new(),
            next_slot: 0,
        }
    }

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Address of the next instruction to be emitted.
    fn here(&self) -> usize {
        self.instructions.len()
    }

    fn patch(&mut self, at: usize, target: usize) {
        if let Some(instruction) = self.instructions.get_mut(at) {
            instruction.set_target(target);
        }
    }

    fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Leaving a scope frees its slots for reuse.
    fn exit_scope(&mut self) {
        if let Some(scope) = self.scopes.pop() {
            self.next_slot -= scope.len();
        }
    }

    fn declare(&mut self, name: &str) -> usize {
        let slot = self.next_slot;
        self.next_slot += 1;
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), slot);
        }
        slot
    }

    fn resolve(&self, name: &str) -> Result<usize, CompileError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .copied()
            .ok_or_else(|| CompileError::UnresolvedVariable {
                name: name.to_string(),
            })
    }
}

/// Placeholder target for jumps patched later.
const UNPATCHED: usize = usize::MAX;

fn unescape(lexeme: &str) -> String {
    lexeme.replace("\\n", "\n").replace("\\t", "\t")
}

impl Compiler {
    fn compile_fun(&self, fun_def: &FunDef) -> Result<FunctionInfo, CompileError> {
        let mut ctx = FrameContext::new();
        ctx.enter_scope();
        // The caller leaves arguments on the stack in reverse order.
        for (i, param) in fun_def.params.iter().enumerate() {
            ctx.emit(Instruction::store(i));
            ctx.declare(&param.name.lexeme);
        }
        for stmt in &fun_def.stmts {
            self.stmt(&mut ctx, stmt)?;
        }
        let falls_off_end = ctx
            .instructions
            .last()
            .map_or(true, |last| last.opcode != Opcode::Ret);
        if falls_off_end {
            ctx.emit(Instruction::push(Value::Null));
            ctx.emit(Instruction::ret());
        }
        ctx.exit_scope();
        Ok(FunctionInfo {
            name: fun_def.name.lexeme.clone(),
            param_count: fun_def.params.len(),
            instructions: ctx.instructions,
        })
    }

    fn stmt(&self, ctx: &mut FrameContext, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::VarDecl(decl) => {
                self.expr(ctx, &decl.expr)?;
                let slot = ctx.declare(&decl.var_def.name.lexeme);
                ctx.emit(Instruction::store(slot));
                Ok(())
            }
            Stmt::Assign(assign) => self.assign(ctx, assign),
            Stmt::Call(call) => self.call(ctx, call),
            Stmt::If(if_stmt) => {
                let mut exit_jmps = Vec::new();
                self.if_arm(ctx, &if_stmt.if_part, &mut exit_jmps)?;
                for arm in &if_stmt.else_ifs {
                    self.if_arm(ctx, arm, &mut exit_jmps)?;
                }
                ctx.enter_scope();
                for stmt in &if_stmt.else_stmts {
                    self.stmt(ctx, stmt)?;
                }
                ctx.exit_scope();
                let end = ctx.here();
                ctx.emit(Instruction::nop());
                for jmp in exit_jmps {
                    ctx.patch(jmp, end);
                }
                Ok(())
            }
            Stmt::While(while_stmt) => {
                let start = ctx.here();
                self.expr(ctx, &while_stmt.condition)?;
                let jmpf = ctx.here();
                ctx.emit(Instruction::jmpf(UNPATCHED));
                ctx.enter_scope();
                for stmt in &while_stmt.stmts {
                    self.stmt(ctx, stmt)?;
                }
                ctx.exit_scope();
                ctx.emit(Instruction::jmp(start));
                let exit = ctx.here();
                ctx.emit(Instruction::nop());
                ctx.patch(jmpf, exit);
                Ok(())
            }
            Stmt::For(for_stmt) => {
                ctx.enter_scope();
                self.expr(ctx, &for_stmt.var_decl.expr)?;
                let slot = ctx.declare(&for_stmt.var_decl.var_def.name.lexeme);
                ctx.emit(Instruction::store(slot));
                let start = ctx.here();
                self.expr(ctx, &for_stmt.condition)?;
                let jmpf = ctx.here();
                ctx.emit(Instruction::jmpf(UNPATCHED));
                ctx.enter_scope();
                for stmt in &for_stmt.stmts {
                    self.stmt(ctx, stmt)?;
                }
                ctx.exit_scope();
                self.assign(ctx, &for_stmt.assign)?;
                ctx.exit_scope();
                ctx.emit(Instruction::jmp(start));
                let exit = ctx.here();
                ctx.emit(Instruction::nop());
                ctx.patch(jmpf, exit);
                Ok(())
            }
            Stmt::Return(ret) => {
                self.expr(ctx, &ret.expr)?;
                ctx.emit(Instruction::ret());
                Ok(())
            }
            Stmt::Delete(delete) => {
                self.expr(ctx, &delete.expr)?;
                match delete.target {
                    Some(DeleteTarget::Struct) => ctx.emit(Instruction::dels()),
                    Some(DeleteTarget::Array) => ctx.emit(Instruction::delar()),
                    None => return Err(CompileError::UncheckedDelete),
                }
                Ok(())
            }
        }
    }

    /// One `if`/`elseif` arm: condition, body, jump to the chain exit,
    /// and a landing pad for the false case.
    fn if_arm(
        &self,
        ctx: &mut FrameContext,
        arm: &BasicIf,
        exit_jmps: &mut Vec<usize>,
    ) -> Result<(), CompileError> {
        self.expr(ctx, &arm.condition)?;
        let jmpf = ctx.here();
        ctx.emit(Instruction::jmpf(UNPATCHED));
        ctx.enter_scope();
        for stmt in &arm.stmts {
            self.stmt(ctx, stmt)?;
        }
        ctx.exit_scope();
        exit_jmps.push(ctx.here());
        ctx.emit(Instruction::jmp(UNPATCHED));
        let next = ctx.here();
        ctx.emit(Instruction::nop());
        ctx.patch(jmpf, next);
        Ok(())
    }

    fn assign(&self, ctx: &mut FrameContext, assign: &AssignStmt) -> Result<(), CompileError> {
        self.path(ctx, &assign.lvalue)?;
        // Drop the final read; its operands stay for the write below.
        ctx.instructions.pop();
        self.expr(ctx, &assign.expr)?;
        let last = &assign.lvalue[assign.lvalue.len() - 1];
        if last.index.is_some() {
            ctx.emit(Instruction::seti());
        } else if assign.lvalue.len() > 1 {
            ctx.emit(Instruction::setf(last.name.lexeme.clone()));
        } else {
            let slot = ctx.resolve(&last.name.lexeme)?;
            ctx.emit(Instruction::store(slot));
        }
        Ok(())
    }

    /// Read a dotted/indexed path, leaving its value on the stack.
    fn path(&self, ctx: &mut FrameContext, path: &[VarRef]) -> Result<(), CompileError> {
        let slot = ctx.resolve(&path[0].name.lexeme)?;
        ctx.emit(Instruction::load(slot));
        for (i, step) in path.iter().enumerate() {
            if i != 0 {
                ctx.emit(Instruction::getf(step.name.lexeme.clone()));
            }
            if let Some(index) = &step.index {
                self.expr(ctx, index)?;
                ctx.emit(Instruction::geti());
            }
        }
        Ok(())
    }

    fn call(&self, ctx: &mut FrameContext, call: &CallExpr) -> Result<(), CompileError> {
        for arg in &call.args {
            self.expr(ctx, arg)?;
        }
        let instruction = match call.name.lexeme.as_str() {
            "print" => Instruction::write(),
            "input" => Instruction::read(),
            "to_string" => Instruction::to_str(),
            "to_int" => Instruction::to_int(),
            "to_double" => Instruction::to_dbl(),
            "concat" => Instruction::concat(),
            "length" => Instruction::slen(),
            "array_length" => Instruction::alen(),
            "get" => Instruction::getc(),
            name => Instruction::call(name),
        };
        ctx.emit(instruction);
        Ok(())
    }

    fn expr(&self, ctx: &mut FrameContext, expr: &Expr) -> Result<(), CompileError> {
        self.term(ctx, &expr.first)?;
        if let (Some(op), Some(rest)) = (&expr.op, &expr.rest) {
            self.expr(ctx, rest)?;
            ctx.emit(op_instruction(op));
        }
        if expr.negated {
            ctx.emit(Instruction::not());
        }
        Ok(())
    }

    fn term(&self, ctx: &mut FrameContext, term: &Term) -> Result<(), CompileError> {
        match term {
            Term::Paren(inner) => self.expr(ctx, inner),
            Term::Simple(rvalue) => self.rvalue(ctx, rvalue),
        }
    }

    fn rvalue(&self, ctx: &mut FrameContext, rvalue: &RValue) -> Result<(), CompileError> {
        match rvalue {
            RValue::Literal(token) => {
                ctx.emit(Instruction::push(literal_value(token)?));
                Ok(())
            }
            RValue::New(new_rvalue) => {
                let type_name = &new_rvalue.type_token.lexeme;
                match &new_rvalue.array_size {
                    Some(size) => {
                        self.expr(ctx, size)?;
                        ctx.emit(Instruction::push(Value::Null));
                        ctx.emit(Instruction::alloca());
                    }
                    None => {
                        let fields = self.struct_fields.get(type_name).ok_or_else(|| {
                            CompileError::UnknownStruct {
                                name: type_name.clone(),
                            }
                        })?;
                        ctx.emit(Instruction::allocs());
                        for field in fields {
                            ctx.emit(Instruction::dup());
                            ctx.emit(Instruction::addf(field.clone()));
                            ctx.emit(Instruction::dup());
                            ctx.emit(Instruction::push(Value::Null));
                            ctx.emit(Instruction::setf(field.clone()));
                        }
                    }
                }
                Ok(())
            }
            RValue::Call(call) => self.call(ctx, call),
            RValue::Path(path) => self.path(ctx, path),
        }
    }
}

fn op_instruction(op: &Token) -> Instruction {
    match op.kind {
        TokenKind::Plus => Instruction::add(),
        TokenKind::Minus => Instruction::sub(),
        TokenKind::Times => Instruction::mul(),
        TokenKind::Divide => Instruction::div(),
        TokenKind::And => Instruction::and(),
        TokenKind::Or => Instruction::or(),
        TokenKind::Less => Instruction::cmplt(),
        TokenKind::LessEq => Instruction::cmple(),
        TokenKind::Greater => Instruction::cmpgt(),
        TokenKind::GreaterEq => Instruction::cmpge(),
        TokenKind::Equal => Instruction::cmpeq(),
        _ => Instruction::cmpne(),
    }
}

fn literal_value(token: &Token) -> Result<Value, CompileError> {
    let malformed = || CompileError::MalformedLiteral {
        lexeme: token.lexeme.clone(),
    };
    match token.kind {
        TokenKind::IntVal => {
            let value = token.lexeme.parse::<i64>().map_err(|_| malformed())?;
            Ok(Value::Int(value))
        }
        TokenKind::DoubleVal => {
            let value = token.lexeme.parse::<f64>().map_err(|_| malformed())?;
            Ok(Value::Double(value))
        }
        TokenKind::StringVal | TokenKind::CharVal => Ok(Value::Text(unescape(&token.lexeme))),
        TokenKind::BoolVal => Ok(Value::Bool(token.lexeme == "true")),
        _ => Ok(Value::Null),
    }
}
