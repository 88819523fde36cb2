//! Semantic checker for Opal.
//!
//! Walks the AST with a scope stack of declared variable types, checks
//! every expression and statement, and annotates each `delete` with
//! whether it frees a struct or an array so code generation never has
//! to re-derive types. `void` doubles as the type of `null` and acts as
//! a wildcard where a null is acceptable.

use crate::ast::{
    AssignStmt, BasicIf, CallExpr, DataType, DeleteTarget, Expr, FunDef, Program, RValue, Stmt,
    StructDef, Term, Token, VarDef, VarRef,
};
use crate::error::StaticError;
use crate::token::TokenKind;
use std::collections::HashMap;

const BASE_TYPES: [&str; 5] = ["int", "double", "char", "string", "bool"];

const BUILT_INS: [&str; 9] = [
    "print",
    "input",
    "to_string",
    "to_int",
    "to_double",
    "length",
    "array_length",
    "get",
    "concat",
];

/// Check a parsed program, annotating delete statements in place.
pub fn check(program: &mut Program) -> Result<(), StaticError> {
    Checker::new(program)?.check_program(program)
}

struct FunSig {
    params: Vec<DataType>,
    return_type: DataType,
}

struct Checker {
    struct_defs: HashMap<String, StructDef>,
    fun_sigs: HashMap<String, FunSig>,
    scopes: Vec<HashMap<String, DataType>>,
    current_return: DataType,
}

fn is_base_type(name: &str) -> bool {
    BASE_TYPES.contains(&name)
}

fn type_str(data_type: &DataType) -> String {
    if data_type.is_array {
        format!("array {}", data_type.type_name)
    } else {
        data_type.type_name.clone()
    }
}

impl Checker {
    /// Record every struct and function definition up front so bodies
    /// can refer to definitions that come later in the file.
    fn new(program: &Program) -> Result<Self, StaticError> {
        let mut struct_defs = HashMap::new();
        for struct_def in &program.structs {
            let name = struct_def.name.lexeme.clone();
            if struct_defs.contains_key(&name) {
                return Err(StaticError::near(
                    format!("multiple definitions of '{name}'"),
                    &struct_def.name,
                ));
            }
            struct_defs.insert(name, struct_def.clone());
        }
        let mut fun_sigs = HashMap::new();
        let mut found_main = false;
        for fun_def in &program.functions {
            let name = fun_def.name.lexeme.clone();
            if BUILT_INS.contains(&name.as_str()) {
                return Err(StaticError::near(
                    format!("redefining built-in function '{name}'"),
                    &fun_def.name,
                ));
            }
            if fun_sigs.contains_key(&name) {
                return Err(StaticError::near(
                    format!("multiple definitions of '{name}'"),
                    &fun_def.name,
                ));
            }
            if name == "main" {
                if fun_def.return_type.type_name != "void" || fun_def.return_type.is_array {
                    return Err(StaticError::near(
                        "main function must have void type",
                        &fun_def.name,
                    ));
                }
                if !fun_def.params.is_empty() {
                    return Err(StaticError::near(
                        "main function cannot have parameters",
                        &fun_def.params[0].name,
                    ));
                }
                found_main = true;
            }
            fun_sigs.insert(
                name,
                FunSig {
                    params: fun_def
                        .params
                        .iter()
                        .map(|p| p.data_type.clone())
                        .collect(),
                    return_type: fun_def.return_type.clone(),
                },
            );
        }
        if !found_main {
            return Err(StaticError::global("program missing main function"));
        }
        Ok(Self {
            struct_defs,
            fun_sigs,
            scopes: Vec::new(),
            current_return: DataType::new(false, "void"),
        })
    }

    fn check_program(&mut self, program: &mut Program) -> Result<(), StaticError> {
        for struct_def in &program.structs {
            self.check_struct(struct_def)?;
        }
        for fun_def in &mut program.functions {
            self.check_fun(fun_def)?;
        }
        Ok(())
    }

    fn valid_type(&self, data_type: &DataType) -> bool {
        is_base_type(&data_type.type_name) || self.struct_defs.contains_key(&data_type.type_name)
    }

    fn check_struct(&self, struct_def: &StructDef) -> Result<(), StaticError> {
        for (i, field) in struct_def.fields.iter().enumerate() {
            if !self.valid_type(&field.data_type) {
                return Err(StaticError::near(
                    format!("invalid field type '{}'", field.data_type.type_name),
                    &field.name,
                ));
            }
            for later in &struct_def.fields[i + 1..] {
                if later.name.lexeme == field.name.lexeme {
                    return Err(StaticError::near(
                        format!("multiple fields of name '{}'", field.name.lexeme),
                        &later.name,
                    ));
                }
            }
        }
        Ok(())
    }

    fn check_params(&self, params: &[VarDef]) -> Result<(), StaticError> {
        for (i, param) in params.iter().enumerate() {
            if !self.valid_type(&param.data_type) {
                return Err(StaticError::near(
                    format!("invalid parameter type '{}'", param.data_type.type_name),
                    &param.name,
                ));
            }
            for later in &params[i + 1..] {
                if later.name.lexeme == param.name.lexeme {
                    return Err(StaticError::near(
                        format!("multiple parameters of name '{}'", param.name.lexeme),
                        &later.name,
                    ));
                }
            }
        }
        Ok(())
    }

    fn check_fun(&mut self, fun_def: &mut FunDef) -> Result<(), StaticError> {
        let return_type = &fun_def.return_type;
        if return_type.type_name != "void" && !self.valid_type(return_type) {
            return Err(StaticError::near(
                format!("invalid return type '{}'", return_type.type_name),
                &fun_def.name,
            ));
        }
        self.check_params(&fun_def.params)?;
        self.current_return = fun_def.return_type.clone();
        self.push_scope();
        for param in &fun_def.params {
            self.declare(&param.name.lexeme, param.data_type.clone());
        }
        self.check_stmts(&mut fun_def.stmts)?;
        self.pop_scope();
        Ok(())
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &str, data_type: DataType) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), data_type);
        }
    }

    fn lookup(&self, name: &str) -> Option<&DataType> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn in_current_scope(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.contains_key(name))
    }

    fn check_stmts(&mut self, stmts: &mut [Stmt]) -> Result<(), StaticError> {
        for stmt in stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_condition(&self, condition: &Expr) -> Result<(), StaticError> {
        let cond_type = self.expr_type(condition)?;
        if cond_type.type_name != "bool" || cond_type.is_array {
            return Err(StaticError::near(
                "condition is not a bool",
                condition.first_token(),
            ));
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &mut Stmt) -> Result<(), StaticError> {
        match stmt {
            Stmt::VarDecl(decl) => {
                let var_def = &decl.var_def;
                if !self.valid_type(&var_def.data_type) {
                    return Err(StaticError::near(
                        format!(
                            "invalid variable declaration type '{}'",
                            var_def.data_type.type_name
                        ),
                        &var_def.name,
                    ));
                }
                if self.in_current_scope(&var_def.name.lexeme) {
                    return Err(StaticError::near(
                        format!("multiple variables of name '{}'", var_def.name.lexeme),
                        &var_def.name,
                    ));
                }
                let rhs = self.expr_type(&decl.expr)?;
                if rhs.type_name != "void"
                    && (rhs.type_name != var_def.data_type.type_name
                        || rhs.is_array != var_def.data_type.is_array)
                {
                    return Err(StaticError::near(
                        format!(
                            "type mismatch initializing {} with {}",
                            type_str(&var_def.data_type),
                            type_str(&rhs)
                        ),
                        &var_def.name,
                    ));
                }
                self.declare(&var_def.name.lexeme, var_def.data_type.clone());
                Ok(())
            }
            Stmt::Assign(assign) => self.check_assign(assign),
            Stmt::Call(call) => {
                self.call_type(call)?;
                Ok(())
            }
            Stmt::If(if_stmt) => {
                self.check_condition(&if_stmt.if_part.condition)?;
                self.push_scope();
                self.check_stmts(&mut if_stmt.if_part.stmts)?;
                self.pop_scope();
                for BasicIf { condition, stmts } in &mut if_stmt.else_ifs {
                    self.check_condition(condition)?;
                    self.push_scope();
                    self.check_stmts(stmts)?;
                    self.pop_scope();
                }
                self.push_scope();
                self.check_stmts(&mut if_stmt.else_stmts)?;
                self.pop_scope();
                Ok(())
            }
            Stmt::While(while_stmt) => {
                self.check_condition(&while_stmt.condition)?;
                self.push_scope();
                self.check_stmts(&mut while_stmt.stmts)?;
                self.pop_scope();
                Ok(())
            }
            Stmt::For(for_stmt) => {
                // The loop variable lives in its own scope around the body.
                self.push_scope();
                let mut decl = Stmt::VarDecl(for_stmt.var_decl.clone());
                self.check_stmt(&mut decl)?;
                self.check_condition(&for_stmt.condition)?;
                self.check_assign(&for_stmt.assign)?;
                self.check_stmts(&mut for_stmt.stmts)?;
                self.pop_scope();
                Ok(())
            }
            Stmt::Return(ret) => {
                let ret_type = self.expr_type(&ret.expr)?;
                if ret_type.type_name != "void"
                    && (ret_type.type_name != self.current_return.type_name
                        || ret_type.is_array != self.current_return.is_array)
                {
                    return Err(StaticError::near(
                        format!(
                            "type mismatch returning {} when expected {}",
                            type_str(&ret_type),
                            type_str(&self.current_return)
                        ),
                        ret.expr.first_token(),
                    ));
                }
                Ok(())
            }
            Stmt::Delete(delete) => {
                let target_type = self.expr_type(&delete.expr)?;
                delete.target = if target_type.is_array {
                    Some(DeleteTarget::Array)
                } else if self.struct_defs.contains_key(&target_type.type_name) {
                    Some(DeleteTarget::Struct)
                } else {
                    return Err(StaticError::near(
                        format!("cannot delete type {}", type_str(&target_type)),
                        delete.expr.first_token(),
                    ));
                };
                Ok(())
            }
        }
    }

    fn check_assign(&self, assign: &AssignStmt) -> Result<(), StaticError> {
        let lhs = self.path_type(&assign.lvalue)?;
        let rhs = self.expr_type(&assign.expr)?;
        if rhs.type_name != "void"
            && (rhs.type_name != lhs.type_name || rhs.is_array != lhs.is_array)
        {
            return Err(StaticError::near(
                format!(
                    "type mismatch assigning {} to {}",
                    type_str(&rhs),
                    type_str(&lhs)
                ),
                &assign.lvalue[0].name,
            ));
        }
        Ok(())
    }

    /// Resolve a dotted/indexed path to the type it denotes.
    fn path_type(&self, path: &[VarRef]) -> Result<DataType, StaticError> {
        let first = &path[0];
        let mut current = self
            .lookup(&first.name.lexeme)
            .cloned()
            .ok_or_else(|| {
                StaticError::near(
                    format!("use before definition of '{}'", first.name.lexeme),
                    &first.name,
                )
            })?;
        current = self.index_into(current, first)?;
        for step in &path[1..] {
            if current.is_array {
                return Err(StaticError::near(
                    "field access on an array",
                    &step.name,
                ));
            }
            let struct_def = self.struct_defs.get(&current.type_name).ok_or_else(|| {
                StaticError::near(
                    format!("field access on non-struct type '{}'", current.type_name),
                    &step.name,
                )
            })?;
            let field = struct_def
                .fields
                .iter()
                .find(|f| f.name.lexeme == step.name.lexeme)
                .ok_or_else(|| {
                    StaticError::near(
                        format!("undefined field '{}'", step.name.lexeme),
                        &step.name,
                    )
                })?;
            current = self.index_into(field.data_type.clone(), step)?;
        }
        Ok(current)
    }

    /// Apply an optional `[index]` step, yielding the element type.
    fn index_into(&self, current: DataType, step: &VarRef) -> Result<DataType, StaticError> {
        let Some(index) = &step.index else {
            return Ok(current);
        };
        if !current.is_array {
            return Err(StaticError::near(
                format!("indexing non-array '{}'", step.name.lexeme),
                &step.name,
            ));
        }
        let index_type = self.expr_type(index)?;
        if index_type.type_name != "int" || index_type.is_array {
            return Err(StaticError::near(
                "array index is not an int",
                index.first_token(),
            ));
        }
        Ok(DataType::new(false, current.type_name))
    }

    fn expr_type(&self, expr: &Expr) -> Result<DataType, StaticError> {
        let lhs = self.term_type(&expr.first)?;
        let result = match (&expr.op, &expr.rest) {
            (Some(op), Some(rest)) => {
                let rhs = self.expr_type(rest)?;
                self.op_type(&lhs, op, &rhs, expr.first_token())?
            }
            _ => lhs,
        };
        if expr.negated && (result.type_name != "bool" || result.is_array) {
            return Err(StaticError::near(
                format!("cannot apply 'not' to {}", type_str(&result)),
                expr.first_token(),
            ));
        }
        Ok(result)
    }

    fn op_type(
        &self,
        lhs: &DataType,
        op: &Token,
        rhs: &DataType,
        at: &Token,
    ) -> Result<DataType, StaticError> {
        let mismatch = || {
            StaticError::near(
                format!(
                    "cannot use '{}' with {} and {}",
                    op.lexeme,
                    type_str(lhs),
                    type_str(rhs)
                ),
                at,
            )
        };
        match op.kind {
            TokenKind::Plus | TokenKind::Minus | TokenKind::Times | TokenKind::Divide => {
                let same = lhs.type_name == rhs.type_name && !lhs.is_array && !rhs.is_array;
                if !same || !matches!(lhs.type_name.as_str(), "int" | "double") {
                    return Err(mismatch());
                }
                Ok(lhs.clone())
            }
            TokenKind::Equal | TokenKind::NotEqual => {
                // Anything compares against null.
                if lhs.type_name != rhs.type_name
                    && lhs.type_name != "void"
                    && rhs.type_name != "void"
                {
                    return Err(mismatch());
                }
                Ok(DataType::new(false, "bool"))
            }
            TokenKind::Less | TokenKind::LessEq | TokenKind::Greater | TokenKind::GreaterEq => {
                let same = lhs.type_name == rhs.type_name && !lhs.is_array && !rhs.is_array;
                let ordered =
                    matches!(lhs.type_name.as_str(), "int" | "double" | "char" | "string");
                if !same || !ordered {
                    return Err(mismatch());
                }
                Ok(DataType::new(false, "bool"))
            }
            TokenKind::And | TokenKind::Or => {
                let bools = lhs.type_name == "bool"
                    && rhs.type_name == "bool"
                    && !lhs.is_array
                    && !rhs.is_array;
                if !bools {
                    return Err(mismatch());
                }
                Ok(DataType::new(false, "bool"))
            }
            _ => Err(mismatch()),
        }
    }

    fn term_type(&self, term: &Term) -> Result<DataType, StaticError> {
        match term {
            Term::Paren(inner) => self.expr_type(inner),
            Term::Simple(rvalue) => self.rvalue_type(rvalue),
        }
    }

    fn rvalue_type(&self, rvalue: &RValue) -> Result<DataType, StaticError> {
        match rvalue {
            RValue::Literal(token) => {
                let name = match token.kind {
                    TokenKind::IntVal => "int",
                    TokenKind::DoubleVal => "double",
                    TokenKind::CharVal => "char",
                    TokenKind::StringVal => "string",
                    TokenKind::BoolVal => "bool",
                    _ => "void",
                };
                Ok(DataType::new(false, name))
            }
            RValue::New(new_rvalue) => {
                let name = new_rvalue.type_token.lexeme.clone();
                if !is_base_type(&name) && !self.struct_defs.contains_key(&name) {
                    return Err(StaticError::near(
                        format!("invalid new type '{name}'"),
                        &new_rvalue.type_token,
                    ));
                }
                match &new_rvalue.array_size {
                    Some(size) => {
                        let size_type = self.expr_type(size)?;
                        if size_type.type_name != "int" || size_type.is_array {
                            return Err(StaticError::near(
                                "array size is not an int",
                                size.first_token(),
                            ));
                        }
                        Ok(DataType::new(true, name))
                    }
                    None => Ok(DataType::new(false, name)),
                }
            }
            RValue::Call(call) => self.call_type(call),
            RValue::Path(path) => self.path_type(path),
        }
    }

    fn arg_count(&self, call: &CallExpr, expected: usize) -> Result<(), StaticError> {
        if call.args.len() != expected {
            return Err(StaticError::near(
                format!("invalid number of arguments to '{}'", call.name.lexeme),
                &call.name,
            ));
        }
        Ok(())
    }

    fn bad_arg(&self, call: &CallExpr, got: &DataType) -> StaticError {
        StaticError::near(
            format!(
                "invalid argument type {} to '{}'",
                type_str(got),
                call.name.lexeme
            ),
            &call.name,
        )
    }

    fn call_type(&self, call: &CallExpr) -> Result<DataType, StaticError> {
        let name = call.name.lexeme.as_str();
        match name {
            "print" => {
                self.arg_count(call, 1)?;
                let arg = self.expr_type(&call.args[0])?;
                if arg.is_array || self.struct_defs.contains_key(&arg.type_name) {
                    return Err(self.bad_arg(call, &arg));
                }
                Ok(DataType::new(false, "void"))
            }
            "input" => {
                self.arg_count(call, 0)?;
                Ok(DataType::new(false, "string"))
            }
            "get" => {
                self.arg_count(call, 2)?;
                let index = self.expr_type(&call.args[0])?;
                if index.type_name != "int" || index.is_array {
                    return Err(self.bad_arg(call, &index));
                }
                let text = self.expr_type(&call.args[1])?;
                if text.type_name != "string" || text.is_array {
                    return Err(self.bad_arg(call, &text));
                }
                Ok(DataType::new(false, "char"))
            }
            "to_string" => {
                self.arg_count(call, 1)?;
                let arg = self.expr_type(&call.args[0])?;
                if arg.is_array || matches!(arg.type_name.as_str(), "void" | "bool") {
                    return Err(self.bad_arg(call, &arg));
                }
                Ok(DataType::new(false, "string"))
            }
            "to_int" => {
                self.arg_count(call, 1)?;
                let arg = self.expr_type(&call.args[0])?;
                if arg.is_array || !matches!(arg.type_name.as_str(), "double" | "string") {
                    return Err(self.bad_arg(call, &arg));
                }
                Ok(DataType::new(false, "int"))
            }
            "to_double" => {
                self.arg_count(call, 1)?;
                let arg = self.expr_type(&call.args[0])?;
                if arg.is_array || !matches!(arg.type_name.as_str(), "int" | "string") {
                    return Err(self.bad_arg(call, &arg));
                }
                Ok(DataType::new(false, "double"))
            }
            "length" => {
                self.arg_count(call, 1)?;
                let arg = self.expr_type(&call.args[0])?;
                if arg.type_name != "string" || arg.is_array {
                    return Err(self.bad_arg(call, &arg));
                }
                Ok(DataType::new(false, "int"))
            }
            "array_length" => {
                self.arg_count(call, 1)?;
                let arg = self.expr_type(&call.args[0])?;
                if !arg.is_array {
                    return Err(self.bad_arg(call, &arg));
                }
                Ok(DataType::new(false, "int"))
            }
            "concat" => {
                self.arg_count(call, 2)?;
                for arg_expr in &call.args {
                    let arg = self.expr_type(arg_expr)?;
                    if arg.type_name != "string" || arg.is_array {
                        return Err(self.bad_arg(call, &arg));
                    }
                }
                Ok(DataType::new(false, "string"))
            }
            _ => {
                let sig = self.fun_sigs.get(name).ok_or_else(|| {
                    StaticError::near(
                        format!("undefined function '{name}'"),
                        &call.name,
                    )
                })?;
                self.arg_count(call, sig.params.len())?;
                for (arg_expr, param) in call.args.iter().zip(&sig.params) {
                    let arg = self.expr_type(arg_expr)?;
                    if arg.type_name != "void"
                        && (arg.type_name != param.type_name || arg.is_array != param.is_array)
                    {
                        return Err(self.bad_arg(call, &arg));
                    }
                }
                Ok(sig.return_type.clone())
            }
        }
    }
}
