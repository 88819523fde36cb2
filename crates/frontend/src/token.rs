//! Tokens produced by the Opal lexer.

/// The kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Stream control
    Eos,

    // Identifiers and literals
    Id,
    IntVal,
    DoubleVal,
    StringVal,
    CharVal,
    BoolVal,
    NullVal,

    // Type names
    IntType,
    DoubleType,
    CharType,
    StringType,
    BoolType,
    VoidType,

    // Reserved words
    Struct,
    Array,
    Delete,
    For,
    While,
    If,
    ElseIf,
    Else,
    And,
    Or,
    Not,
    New,
    Return,

    // Operators
    Assign,
    Equal,
    NotEqual,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Plus,
    Minus,
    Times,
    Divide,

    // Punctuation
    Dot,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Semicolon,
    LBracket,
    RBracket,
}

impl TokenKind {
    /// Uppercase name used in token listings.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Eos => "EOS",
            TokenKind::Id => "ID",
            TokenKind::IntVal => "INT_VAL",
            TokenKind::DoubleVal => "DOUBLE_VAL",
            TokenKind::StringVal => "STRING_VAL",
            TokenKind::CharVal => "CHAR_VAL",
            TokenKind::BoolVal => "BOOL_VAL",
            TokenKind::NullVal => "NULL_VAL",
            TokenKind::IntType => "INT_TYPE",
            TokenKind::DoubleType => "DOUBLE_TYPE",
            TokenKind::CharType => "CHAR_TYPE",
            TokenKind::StringType => "STRING_TYPE",
            TokenKind::BoolType => "BOOL_TYPE",
            TokenKind::VoidType => "VOID_TYPE",
            TokenKind::Struct => "STRUCT",
            TokenKind::Array => "ARRAY",
            TokenKind::Delete => "DELETE",
            TokenKind::For => "FOR",
            TokenKind::While => "WHILE",
            TokenKind::If => "IF",
            TokenKind::ElseIf => "ELSEIF",
            TokenKind::Else => "ELSE",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::New => "NEW",
            TokenKind::Return => "RETURN",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Equal => "EQUAL",
            TokenKind::NotEqual => "NOT_EQUAL",
            TokenKind::Less => "LESS",
            TokenKind::LessEq => "LESS_EQ",
            TokenKind::Greater => "GREATER",
            TokenKind::GreaterEq => "GREATER_EQ",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Times => "TIMES",
            TokenKind::Divide => "DIVIDE",
            TokenKind::Dot => "DOT",
            TokenKind::Comma => "COMMA",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
        }
    }
}

/// A lexed token with its source position (1-based line, 1-based column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }
}

impl std::fmt::Display for Token {
    /// Listing form: `4, 2: DELETE 'delete'`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}: {} '{}'",
            self.line,
            self.column,
            self.kind.name(),
            self.lexeme
        )
    }
}
