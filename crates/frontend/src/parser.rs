//! Recursive-descent parser for Opal.
//!
//! One token of lookahead, no precedence climbing: binary expressions
//! chain right-leaning through `Expr::rest`, and `not` applies to the
//! whole expression that follows it. Statements that start with an
//! identifier (call, declaration with a struct type, assignment) are
//! told apart by peeking at the token after the identifier.

use crate::ast::{
    AssignStmt, BasicIf, CallExpr, DataType, DeleteStmt, Expr, ForStmt, FunDef, IfStmt, NewRValue,
    Program, RValue, ReturnStmt, Stmt, StructDef, Term, Token, VarDeclStmt, VarDef, VarRef,
    WhileStmt,
};
use crate::error::ParseError;
use crate::token::TokenKind;

/// Parse a full token stream (ending in EOS) into a program.
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParseError> {
    Parser::new(tokens).program()
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

const BASE_TYPES: [TokenKind; 5] = [
    TokenKind::IntType,
    TokenKind::DoubleType,
    TokenKind::StringType,
    TokenKind::CharType,
    TokenKind::BoolType,
];

const BIN_OPS: [TokenKind; 12] = [
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Times,
    TokenKind::Divide,
    TokenKind::And,
    TokenKind::Or,
    TokenKind::Equal,
    TokenKind::NotEqual,
    TokenKind::Less,
    TokenKind::LessEq,
    TokenKind::Greater,
    TokenKind::GreaterEq,
];

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::Eos, "end-of-stream", 1, 0));
        }
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn check_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current().kind)
    }

    /// Consume a token of the given kind or fail with `message`.
    fn eat(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if !self.check(kind) {
            return Err(ParseError::new(message, self.current()));
        }
        let token = self.current().clone();
        self.advance();
        Ok(token)
    }

    pub fn program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::default();
        while !self.check(TokenKind::Eos) {
            if self.check(TokenKind::Struct) {
                program.structs.push(self.struct_def()?);
            } else {
                program.functions.push(self.fun_def()?);
            }
        }
        self.eat(TokenKind::Eos, "expecting end-of-file")?;
        Ok(program)
    }

    fn struct_def(&mut self) -> Result<StructDef, ParseError> {
        self.eat(TokenKind::Struct, "expecting 'struct'")?;
        let name = self.eat(TokenKind::Id, "expecting identifier")?;
        self.eat(TokenKind::LBrace, "expecting '{'")?;
        let fields = self.fields()?;
        self.eat(TokenKind::RBrace, "expecting '}'")?;
        Ok(StructDef { name, fields })
    }

    fn fields(&mut self) -> Result<Vec<VarDef>, ParseError> {
        let mut fields = Vec::new();
        if !self.check(TokenKind::RBrace) {
            fields.push(self.var_def()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                fields.push(self.var_def()?);
            }
        }
        Ok(fields)
    }

    fn var_def(&mut self) -> Result<VarDef, ParseError> {
        let data_type = self.data_type()?;
        let name = self.eat(TokenKind::Id, "expecting identifier")?;
        Ok(VarDef { data_type, name })
    }

    fn fun_def(&mut self) -> Result<FunDef, ParseError> {
        let return_type = if self.check(TokenKind::VoidType) {
            self.advance();
            DataType::new(false, "void")
        } else {
            self.data_type()?
        };
        let name = self.eat(TokenKind::Id, "expecting identifier")?;
        self.eat(TokenKind::LParen, "expecting '('")?;
        let params = self.params()?;
        self.eat(TokenKind::RParen, "expecting ')'")?;
        self.eat(TokenKind::LBrace, "expecting '{'")?;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) {
            stmts.push(self.stmt()?);
        }
        self.eat(TokenKind::RBrace, "expecting '}'")?;
        Ok(FunDef {
            return_type,
            name,
            params,
            stmts,
        })
    }

    fn params(&mut self) -> Result<Vec<VarDef>, ParseError> {
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            params.push(self.var_def()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                params.push(self.var_def()?);
            }
        }
        Ok(params)
    }

    fn data_type(&mut self) -> Result<DataType, ParseError> {
        if self.check(TokenKind::Id) {
            let name = self.current().lexeme.clone();
            self.advance();
            Ok(DataType::new(false, name))
        } else if self.check(TokenKind::Array) {
            self.advance();
            let name = if self.check(TokenKind::Id) {
                let name = self.current().lexeme.clone();
                self.advance();
                name
            } else {
                self.base_type()?.lexeme
            };
            Ok(DataType::new(true, name))
        } else {
            let name = self.base_type()?.lexeme;
            Ok(DataType::new(false, name))
        }
    }

    fn base_type(&mut self) -> Result<Token, ParseError> {
        if self.check_any(&BASE_TYPES) {
            let token = self.current().clone();
            self.advance();
            Ok(token)
        } else {
            Err(ParseError::new("expecting base type", self.current()))
        }
    }

    fn stmt(&mut self) -> Result<Stmt, ParseError> {
        if self.check_any(&BASE_TYPES) || self.check(TokenKind::Array) {
            let data_type = self.data_type()?;
            Ok(Stmt::VarDecl(self.vdecl_tail(data_type)?))
        } else if self.check(TokenKind::Id) {
            // Call, declaration with a struct type, or assignment.
            let first = self.current().clone();
            self.advance();
            if self.check(TokenKind::LParen) {
                Ok(Stmt::Call(self.call_expr(first)?))
            } else if self.check(TokenKind::Id) {
                let data_type = DataType::new(false, first.lexeme);
                Ok(Stmt::VarDecl(self.vdecl_tail(data_type)?))
            } else {
                let mut lvalue = vec![VarRef {
                    name: first,
                    index: None,
                }];
                self.path_tail(&mut lvalue)?;
                self.eat(TokenKind::Assign, "expecting '='")?;
                let expr = self.expr()?;
                Ok(Stmt::Assign(AssignStmt { lvalue, expr }))
            }
        } else if self.check(TokenKind::If) {
            Ok(Stmt::If(self.if_stmt()?))
        } else if self.check(TokenKind::While) {
            Ok(Stmt::While(self.while_stmt()?))
        } else if self.check(TokenKind::For) {
            Ok(Stmt::For(self.for_stmt()?))
        } else if self.check(TokenKind::Return) {
            self.advance();
            let expr = self.expr()?;
            Ok(Stmt::Return(ReturnStmt { expr }))
        } else if self.check(TokenKind::Delete) {
            self.advance();
            let expr = self.expr()?;
            Ok(Stmt::Delete(DeleteStmt { expr, target: None }))
        } else {
            Err(ParseError::new("expecting statement", self.current()))
        }
    }

    /// Declaration with the type already parsed: `name = expr`.
    fn vdecl_tail(&mut self, data_type: DataType) -> Result<VarDeclStmt, ParseError> {
        let name = self.eat(TokenKind::Id, "expecting identifier")?;
        self.eat(TokenKind::Assign, "expecting '='")?;
        let expr = self.expr()?;
        Ok(VarDeclStmt {
            var_def: VarDef { data_type, name },
            expr,
        })
    }

    fn vdecl_stmt(&mut self) -> Result<VarDeclStmt, ParseError> {
        let data_type = if self.check(TokenKind::Id) {
            DataType::new(false, "")
        } else {
            self.data_type()?
        };
        self.vdecl_tail(data_type)
    }

    /// Extend a seeded path with `.field` and `[index]` steps. An index
    /// attaches to the step most recently pushed.
    fn path_tail(&mut self, path: &mut Vec<VarRef>) -> Result<(), ParseError> {
        while self.check(TokenKind::Dot) || self.check(TokenKind::LBracket) {
            if self.check(TokenKind::Dot) {
                self.advance();
                let name = self.eat(TokenKind::Id, "expecting identifier")?;
                path.push(VarRef { name, index: None });
            } else {
                self.advance();
                let index = self.expr()?;
                self.eat(TokenKind::RBracket, "expecting ']'")?;
                if let Some(last) = path.last_mut() {
                    last.index = Some(Box::new(index));
                }
            }
        }
        Ok(())
    }

    fn if_stmt(&mut self) -> Result<IfStmt, ParseError> {
        self.eat(TokenKind::If, "expecting 'if'")?;
        let if_part = self.basic_if()?;
        let mut else_ifs = Vec::new();
        while self.check(TokenKind::ElseIf) {
            self.advance();
            else_ifs.push(self.basic_if()?);
        }
        let mut else_stmts = Vec::new();
        if self.check(TokenKind::Else) {
            self.advance();
            self.eat(TokenKind::LBrace, "expecting '{'")?;
            while !self.check(TokenKind::RBrace) {
                else_stmts.push(self.stmt()?);
            }
            self.eat(TokenKind::RBrace, "expecting '}'")?;
        }
        Ok(IfStmt {
            if_part,
            else_ifs,
            else_stmts,
        })
    }

    /// `( condition ) { stmts }` after `if` or `elseif`.
    fn basic_if(&mut self) -> Result<BasicIf, ParseError> {
        self.eat(TokenKind::LParen, "expecting '('")?;
        let condition = self.expr()?;
        self.eat(TokenKind::RParen, "expecting ')'")?;
        self.eat(TokenKind::LBrace, "expecting '{'")?;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) {
            stmts.push(self.stmt()?);
        }
        self.eat(TokenKind::RBrace, "expecting '}'")?;
        Ok(BasicIf { condition, stmts })
    }

    fn while_stmt(&mut self) -> Result<WhileStmt, ParseError> {
        self.eat(TokenKind::While, "expecting 'while'")?;
        self.eat(TokenKind::LParen, "expecting '('")?;
        let condition = self.expr()?;
        self.eat(TokenKind::RParen, "expecting ')'")?;
        self.eat(TokenKind::LBrace, "expecting '{'")?;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) {
            stmts.push(self.stmt()?);
        }
        self.eat(TokenKind::RBrace, "expecting '}'")?;
        Ok(WhileStmt { condition, stmts })
    }

    fn for_stmt(&mut self) -> Result<ForStmt, ParseError> {
        self.eat(TokenKind::For, "expecting 'for'")?;
        self.eat(TokenKind::LParen, "expecting '('")?;
        let var_decl = self.vdecl_stmt()?;
        self.eat(TokenKind::Semicolon, "expecting ';'")?;
        let condition = self.expr()?;
        self.eat(TokenKind::Semicolon, "expecting ';'")?;
        let name = self.eat(TokenKind::Id, "expecting identifier")?;
        let mut lvalue = vec![VarRef { name, index: None }];
        self.path_tail(&mut lvalue)?;
        self.eat(TokenKind::Assign, "expecting '='")?;
        let expr = self.expr()?;
        let assign = AssignStmt { lvalue, expr };
        self.eat(TokenKind::RParen, "expecting ')'")?;
        self.eat(TokenKind::LBrace, "expecting '{'")?;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) {
            stmts.push(self.stmt()?);
        }
        self.eat(TokenKind::RBrace, "expecting '}'")?;
        Ok(ForStmt {
            var_decl,
            condition,
            assign,
            stmts,
        })
    }

    /// Arguments after `name`, with the opening paren still current.
    fn call_expr(&mut self, name: Token) -> Result<CallExpr, ParseError> {
        self.eat(TokenKind::LParen, "expecting '('")?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            args.push(self.expr()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                args.push(self.expr()?);
            }
        }
        self.eat(TokenKind::RParen, "expecting ')'")?;
        Ok(CallExpr { name, args })
    }

    pub fn expr(&mut self) -> Result<Expr, ParseError> {
        if self.check(TokenKind::Not) {
            self.advance();
            let mut expr = self.expr()?;
            expr.negated = true;
            return Ok(expr);
        }
        let first = if self.check(TokenKind::LParen) {
            self.advance();
            let inner = self.expr()?;
            self.eat(TokenKind::RParen, "expecting ')'")?;
            Term::Paren(Box::new(inner))
        } else {
            Term::Simple(self.rvalue()?)
        };
        if self.check_any(&BIN_OPS) {
            let op = self.current().clone();
            self.advance();
            let rest = self.expr()?;
            Ok(Expr {
                negated: false,
                first,
                op: Some(op),
                rest: Some(Box::new(rest)),
            })
        } else {
            Ok(Expr {
                negated: false,
                first,
                op: None,
                rest: None,
            })
        }
    }

    fn rvalue(&mut self) -> Result<RValue, ParseError> {
        if self.check(TokenKind::New) {
            return Ok(RValue::New(self.new_rvalue()?));
        }
        if self.check(TokenKind::Id) {
            let first = self.current().clone();
            self.advance();
            if self.check(TokenKind::LParen) {
                return Ok(RValue::Call(self.call_expr(first)?));
            }
            let mut path = vec![VarRef {
                name: first,
                index: None,
            }];
            self.path_tail(&mut path)?;
            return Ok(RValue::Path(path));
        }
        if self.check_any(&[
            TokenKind::IntVal,
            TokenKind::DoubleVal,
            TokenKind::StringVal,
            TokenKind::CharVal,
            TokenKind::BoolVal,
            TokenKind::NullVal,
        ]) {
            let token = self.current().clone();
            self.advance();
            return Ok(RValue::Literal(token));
        }
        Err(ParseError::new("expecting value", self.current()))
    }

    fn new_rvalue(&mut self) -> Result<NewRValue, ParseError> {
        self.eat(TokenKind::New, "expecting 'new'")?;
        if self.check(TokenKind::Id) {
            let type_token = self.current().clone();
            self.advance();
            let array_size = if self.check(TokenKind::LBracket) {
                self.advance();
                let size = self.expr()?;
                self.eat(TokenKind::RBracket, "expecting ']'")?;
                Some(Box::new(size))
            } else {
                None
            };
            Ok(NewRValue {
                type_token,
                array_size,
            })
        } else {
            // A base type always allocates an array.
            let type_token = self.base_type()?;
            self.eat(TokenKind::LBracket, "expecting '['")?;
            let size = self.expr()?;
            self.eat(TokenKind::RBracket, "expecting ']'")?;
            Ok(NewRValue {
                type_token,
                array_size: Some(Box::new(size)),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_source(source: &str) -> Result<Program, ParseError> {
        parse(tokenize(source).unwrap())
    }

    fn main_stmts(source: &str) -> Vec<Stmt> {
        let body = format!("void main() {{ {} }}", source);
        parse_source(&body).unwrap().functions.remove(0).stmts
    }

    #[test]
    fn empty_program() {
        let program = parse_source("").unwrap();
        assert!(program.structs.is_empty());
        assert!(program.functions.is_empty());
    }

    #[test]
    fn struct_with_fields() {
        let program = parse_source("struct Node { int value, Node next, array int scores }")
            .unwrap();
        let s = &program.structs[0];
        assert_eq!(s.name.lexeme, "Node");
        assert_eq!(s.fields.len(), 3);
        assert_eq!(s.fields[0].data_type, DataType::new(false, "int"));
        assert_eq!(s.fields[1].data_type, DataType::new(false, "Node"));
        assert_eq!(s.fields[2].data_type, DataType::new(true, "int"));
    }

    #[test]
    fn function_signature() {
        let program =
            parse_source("array int firsts(array int xs, int n) { return xs }").unwrap();
        let f = &program.functions[0];
        assert_eq!(f.return_type, DataType::new(true, "int"));
        assert_eq!(f.name.lexeme, "firsts");
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.params[0].data_type, DataType::new(true, "int"));
    }

    #[test]
    fn id_statement_dispatch() {
        let stmts = main_stmts("f() Node n = null x = 1");
        assert!(matches!(stmts[0], Stmt::Call(_)));
        match &stmts[1] {
            Stmt::VarDecl(v) => {
                assert_eq!(v.var_def.data_type, DataType::new(false, "Node"));
                assert_eq!(v.var_def.name.lexeme, "n");
            }
            other => panic!("expected declaration, got {other:?}"),
        }
        assert!(matches!(stmts[2], Stmt::Assign(_)));
    }

    #[test]
    fn assignment_path() {
        let stmts = main_stmts("a.b[i].c = 0");
        match &stmts[0] {
            Stmt::Assign(a) => {
                assert_eq!(a.lvalue.len(), 3);
                assert_eq!(a.lvalue[0].name.lexeme, "a");
                assert!(a.lvalue[0].index.is_none());
                assert_eq!(a.lvalue[1].name.lexeme, "b");
                assert!(a.lvalue[1].index.is_some());
                assert_eq!(a.lvalue[2].name.lexeme, "c");
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn binary_exprs_lean_right() {
        let stmts = main_stmts("int x = 1 + 2 * 3");
        match &stmts[0] {
            Stmt::VarDecl(v) => {
                let e = &v.expr;
                assert_eq!(e.op.as_ref().map(|t| t.lexeme.as_str()), Some("+"));
                let rest = e.rest.as_ref().unwrap();
                assert_eq!(rest.op.as_ref().map(|t| t.lexeme.as_str()), Some("*"));
                assert!(rest.rest.as_ref().unwrap().op.is_none());
            }
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn not_negates_whole_expression() {
        let stmts = main_stmts("bool b = not x > 5");
        match &stmts[0] {
            Stmt::VarDecl(v) => {
                assert!(v.expr.negated);
                assert_eq!(v.expr.op.as_ref().map(|t| t.lexeme.as_str()), Some(">"));
            }
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn if_elseif_else_shape() {
        let stmts = main_stmts("if (a) { x = 1 } elseif (b) { x = 2 } else { x = 3 }");
        match &stmts[0] {
            Stmt::If(i) => {
                assert_eq!(i.if_part.stmts.len(), 1);
                assert_eq!(i.else_ifs.len(), 1);
                assert_eq!(i.else_stmts.len(), 1);
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn for_loop_shape() {
        let stmts = main_stmts("for (int i = 0; i < 10; i = i + 1) { print(i) }");
        match &stmts[0] {
            Stmt::For(f) => {
                assert_eq!(f.var_decl.var_def.name.lexeme, "i");
                assert_eq!(f.assign.lvalue[0].name.lexeme, "i");
                assert_eq!(f.stmts.len(), 1);
            }
            other => panic!("expected for, got {other:?}"),
        }
    }

    #[test]
    fn new_rvalues() {
        let stmts = main_stmts("Node n = new Node array int xs = new int [10]");
        match &stmts[0] {
            Stmt::VarDecl(v) => match &v.expr.first {
                Term::Simple(RValue::New(n)) => {
                    assert_eq!(n.type_token.lexeme, "Node");
                    assert!(n.array_size.is_none());
                }
                other => panic!("expected new, got {other:?}"),
            },
            other => panic!("expected declaration, got {other:?}"),
        }
        match &stmts[1] {
            Stmt::VarDecl(v) => match &v.expr.first {
                Term::Simple(RValue::New(n)) => {
                    assert_eq!(n.type_token.lexeme, "int");
                    assert!(n.array_size.is_some());
                }
                other => panic!("expected new, got {other:?}"),
            },
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn delete_parses_without_target() {
        let stmts = main_stmts("delete n");
        match &stmts[0] {
            Stmt::Delete(d) => assert!(d.target.is_none()),
            other => panic!("expected delete, got {other:?}"),
        }
    }

    #[test]
    fn trailing_tokens_rejected() {
        // A stray token after the last definition is read as the start of
        // another function, so the diagnostic comes from its return type.
        let err = parse_source("void main() { } }").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expecting base type found '}' at line 1, column 17"
        );
    }

    #[test]
    fn missing_brace_rejected() {
        let err = parse_source("void main() { int x = 1 ").unwrap_err();
        assert_eq!(err.message, "expecting statement");
        assert_eq!(err.found, "end-of-stream");
    }

    #[test]
    fn base_type_new_requires_size() {
        let err = parse_source("void main() { array int xs = new int }").unwrap_err();
        assert_eq!(err.message, "expecting '['");
    }
}
