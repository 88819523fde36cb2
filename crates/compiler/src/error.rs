use thiserror::Error;

/// Errors produced during bytecode generation.
///
/// A checked AST never triggers these; they guard against compiling an
/// AST that skipped the checker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("unresolved variable '{name}'")]
    UnresolvedVariable { name: String },

    #[error("unknown struct type '{name}'")]
    UnknownStruct { name: String },

    /// A delete statement the checker never annotated.
    #[error("delete statement missing its target annotation")]
    UncheckedDelete,

    #[error("malformed literal '{lexeme}'")]
    MalformedLiteral { lexeme: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        assert_eq!(
            CompileError::UnresolvedVariable {
                name: "x".to_string()
            }
            .to_string(),
            "unresolved variable 'x'"
        );
        assert_eq!(
            CompileError::MalformedLiteral {
                lexeme: "99999999999999999999".to_string()
            }
            .to_string(),
            "malformed literal '99999999999999999999'"
        );
    }
}
