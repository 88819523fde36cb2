//! Pretty-printer for Opal programs.
//!
//! Output is itself valid Opal and printing is a fixpoint: parsing the
//! printed form and printing again yields the same text. Negated
//! expressions always print with parentheses (`not (x)`), and an already
//! parenthesized operand is not wrapped a second time.

use crate::ast::{
    AssignStmt, BasicIf, CallExpr, Expr, ForStmt, FunDef, IfStmt, NewRValue, Program, RValue,
    Stmt, StructDef, Term, VarDeclStmt, VarDef, VarRef, WhileStmt,
};
use crate::token::TokenKind;
use std::fmt::Write;

const INDENT: usize = 2;

/// Render a parsed program as formatted source text.
pub fn print_program(program: &Program) -> String {
    let mut printer = Printer::default();
    for struct_def in &program.structs {
        printer.struct_def(struct_def);
    }
    for fun_def in &program.functions {
        printer.fun_def(fun_def);
    }
    printer.out
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn pad(&mut self) {
        for _ in 0..self.indent {
            self.out.push(' ');
        }
    }

    fn var_def(&mut self, var_def: &VarDef) {
        if var_def.data_type.is_array {
            self.out.push_str("array ");
        }
        let _ = write!(
            self.out,
            "{} {}",
            var_def.data_type.type_name, var_def.name.lexeme
        );
    }

    fn struct_def(&mut self, struct_def: &StructDef) {
        let _ = write!(self.out, "\nstruct {} {{\n", struct_def.name.lexeme);
        self.indent += INDENT;
        for (i, field) in struct_def.fields.iter().enumerate() {
            self.pad();
            self.var_def(field);
            if i + 1 < struct_def.fields.len() {
                self.out.push_str(",\n");
            }
        }
        self.indent -= INDENT;
        self.out.push_str("\n}\n");
    }

    fn fun_def(&mut self, fun_def: &FunDef) {
        self.out.push('\n');
        if fun_def.return_type.is_array {
            self.out.push_str("array ");
        }
        let _ = write!(
            self.out,
            "{} {}(",
            fun_def.return_type.type_name, fun_def.name.lexeme
        );
        for (i, param) in fun_def.params.iter().enumerate() {
            self.var_def(param);
            if i + 1 < fun_def.params.len() {
                self.out.push_str(", ");
            }
        }
        self.out.push_str(") {\n");
        self.indent += INDENT;
        for stmt in &fun_def.stmts {
            self.pad();
            self.stmt(stmt);
            self.out.push('\n');
        }
        self.indent -= INDENT;
        self.out.push_str("}\n");
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl(v) => self.var_decl(v),
            Stmt::Assign(a) => self.assign(a),
            Stmt::Call(c) => self.call(c),
            Stmt::If(i) => self.if_stmt(i),
            Stmt::While(w) => self.while_stmt(w),
            Stmt::For(f) => self.for_stmt(f),
            Stmt::Return(r) => {
                self.out.push_str("return ");
                self.expr(&r.expr);
            }
            Stmt::Delete(d) => {
                self.out.push_str("delete ");
                self.expr(&d.expr);
            }
        }
    }

    fn var_decl(&mut self, stmt: &VarDeclStmt) {
        self.var_def(&stmt.var_def);
        self.out.push_str(" = ");
        self.expr(&stmt.expr);
    }

    fn assign(&mut self, stmt: &AssignStmt) {
        self.path(&stmt.lvalue);
        self.out.push_str(" = ");
        self.expr(&stmt.expr);
    }

    fn path(&mut self, path: &[VarRef]) {
        for (i, var_ref) in path.iter().enumerate() {
            self.out.push_str(&var_ref.name.lexeme);
            if let Some(index) = &var_ref.index {
                self.out.push('[');
                self.expr(index);
                self.out.push(']');
            }
            if i + 1 < path.len() {
                self.out.push('.');
            }
        }
    }

    fn block(&mut self, stmts: &[Stmt]) {
        self.indent += INDENT;
        for stmt in stmts {
            self.pad();
            self.stmt(stmt);
            self.out.push('\n');
        }
        self.indent -= INDENT;
        self.pad();
        self.out.push('}');
    }

    fn if_stmt(&mut self, stmt: &IfStmt) {
        self.out.push_str("if (");
        self.expr(&stmt.if_part.condition);
        self.out.push_str(") {\n");
        self.block(&stmt.if_part.stmts);
        if !stmt.else_ifs.is_empty() {
            self.out.push('\n');
            for BasicIf { condition, stmts } in &stmt.else_ifs {
                self.pad();
                self.out.push_str("elseif (");
                self.expr(condition);
                self.out.push_str(") {\n");
                self.block(stmts);
                self.out.push('\n');
            }
        }
        if !stmt.else_stmts.is_empty() {
            if stmt.else_ifs.is_empty() {
                self.out.push('\n');
            }
            self.pad();
            self.out.push_str("else {\n");
            self.block(&stmt.else_stmts);
        }
    }

    fn while_stmt(&mut self, stmt: &WhileStmt) {
        self.out.push_str("while (");
        self.expr(&stmt.condition);
        self.out.push_str(") {\n");
        self.block(&stmt.stmts);
    }

    fn for_stmt(&mut self, stmt: &ForStmt) {
        self.out.push_str("for (");
        self.var_decl(&stmt.var_decl);
        self.out.push_str("; ");
        self.expr(&stmt.condition);
        self.out.push_str("; ");
        self.assign(&stmt.assign);
        self.out.push_str(") {\n");
        self.block(&stmt.stmts);
    }

    fn call(&mut self, call: &CallExpr) {
        let _ = write!(self.out, "{}(", call.name.lexeme);
        for (i, arg) in call.args.iter().enumerate() {
            self.expr(arg);
            if i + 1 < call.args.len() {
                self.out.push_str(", ");
            }
        }
        self.out.push(')');
    }

    fn expr(&mut self, expr: &Expr) {
        if expr.negated {
            self.out.push_str("not ");
            // A lone parenthesized term supplies its own parentheses.
            if expr.op.is_none() {
                if let Term::Paren(inner) = &expr.first {
                    self.out.push('(');
                    self.expr(inner);
                    self.out.push(')');
                    return;
                }
            }
            self.out.push('(');
            self.expr_body(expr);
            self.out.push(')');
        } else {
            self.expr_body(expr);
        }
    }

    fn expr_body(&mut self, expr: &Expr) {
        self.term(&expr.first);
        if let (Some(op), Some(rest)) = (&expr.op, &expr.rest) {
            let _ = write!(self.out, " {} ", op.lexeme);
            self.expr(rest);
        }
    }

    fn term(&mut self, term: &Term) {
        match term {
            Term::Simple(rvalue) => self.rvalue(rvalue),
            Term::Paren(inner) => {
                self.out.push('(');
                self.expr(inner);
                self.out.push(')');
            }
        }
    }

    fn rvalue(&mut self, rvalue: &RValue) {
        match rvalue {
            RValue::Literal(token) => match token.kind {
                TokenKind::StringVal => {
                    let _ = write!(self.out, "\"{}\"", token.lexeme);
                }
                TokenKind::CharVal => {
                    let _ = write!(self.out, "'{}'", token.lexeme);
                }
                _ => self.out.push_str(&token.lexeme),
            },
            RValue::New(new_rvalue) => self.new_rvalue(new_rvalue),
            RValue::Call(call) => self.call(call),
            RValue::Path(path) => self.path(path),
        }
    }

    fn new_rvalue(&mut self, new_rvalue: &NewRValue) {
        let _ = write!(self.out, "new {}", new_rvalue.type_token.lexeme);
        if let Some(size) = &new_rvalue.array_size {
            self.out.push_str(" [");
            self.expr(size);
            self.out.push(']');
        }
    }
}
