//! Abstract syntax tree for Opal programs.
//!
//! Nodes keep the tokens they were parsed from so later phases can point
//! diagnostics at source positions. Statements and r-values are closed
//! enums matched directly by the checker, printer, and compiler.

pub use crate::token::Token;

/// A parsed source file: struct definitions and function definitions in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub structs: Vec<StructDef>,
    pub functions: Vec<FunDef>,
}

/// `struct Name { fields }`
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: Token,
    pub fields: Vec<VarDef>,
}

/// A typed name: a struct field or a function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub data_type: DataType,
    pub name: Token,
}

/// A declared type. `type_name` is a base type name (`int`, `double`,
/// `char`, `string`, `bool`, `void`) or a struct name.
#[derive(Debug, Clone, PartialEq)]
pub struct DataType {
    pub is_array: bool,
    pub type_name: String,
}

impl DataType {
    pub fn new(is_array: bool, type_name: impl Into<String>) -> Self {
        Self {
            is_array,
            type_name: type_name.into(),
        }
    }
}

/// A function definition with its body.
#[derive(Debug, Clone, PartialEq)]
pub struct FunDef {
    pub return_type: DataType,
    pub name: Token,
    pub params: Vec<VarDef>,
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl(VarDeclStmt),
    Assign(AssignStmt),
    Call(CallExpr),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Return(ReturnStmt),
    Delete(DeleteStmt),
}

/// `type name = expr`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclStmt {
    pub var_def: VarDef,
    pub expr: Expr,
}

/// `path = expr` where path is one or more dotted/indexed references.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub lvalue: Vec<VarRef>,
    pub expr: Expr,
}

/// `if` with any number of `elseif` arms and an optional `else` block.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub if_part: BasicIf,
    pub else_ifs: Vec<BasicIf>,
    pub else_stmts: Vec<Stmt>,
}

/// A condition and its block, shared by `if` and `elseif`.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicIf {
    pub condition: Expr,
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub stmts: Vec<Stmt>,
}

/// `for (decl; condition; assign) { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub var_decl: VarDeclStmt,
    pub condition: Expr,
    pub assign: AssignStmt,
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub expr: Expr,
}

/// `delete expr`. The checker fills in `target` once it knows whether
/// the operand is a struct or an array.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStmt {
    pub expr: Expr,
    pub target: Option<DeleteTarget>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    Struct,
    Array,
}

/// An expression: an optional `not`, a first term, and an optional
/// binary operator chaining to the rest (right-leaning).
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub negated: bool,
    pub first: Term,
    pub op: Option<Token>,
    pub rest: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Simple(RValue),
    Paren(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RValue {
    /// An int, double, string, char, bool, or null literal token.
    Literal(Token),
    New(NewRValue),
    Call(CallExpr),
    /// A dotted/indexed variable path.
    Path(Vec<VarRef>),
}

/// `new Type` or `new Type [size]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRValue {
    pub type_token: Token,
    pub array_size: Option<Box<Expr>>,
}

/// `name(args)` as a statement or an r-value.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub name: Token,
    pub args: Vec<Expr>,
}

/// One step of a variable path, with an optional `[index]`.
#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    pub name: Token,
    pub index: Option<Box<Expr>>,
}

impl Expr {
    /// The leftmost token of the expression, for diagnostics.
    pub fn first_token(&self) -> &Token {
        match &self.first {
            Term::Simple(rvalue) => rvalue.first_token(),
            Term::Paren(inner) => inner.first_token(),
        }
    }
}

impl RValue {
    pub fn first_token(&self) -> &Token {
        match self {
            RValue::Literal(token) => token,
            RValue::New(new_rvalue) => &new_rvalue.type_token,
            RValue::Call(call) => &call.name,
            RValue::Path(path) => &path[0].name,
        }
    }
}
