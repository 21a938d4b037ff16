//! Error type for expression evaluation.

/// Result type for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;

/// Reasons an expression could not be evaluated.
///
/// The `Display` text is returned verbatim to HTTP clients in the `error`
/// field of a calculation response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("empty expression")]
    Empty,

    #[error("expression is longer than {max} characters")]
    TooLong { max: usize },

    #[error("expression nesting exceeds {max} levels")]
    TooDeep { max: usize },

    #[error("syntax error at position {position}")]
    Syntax { position: usize },

    #[error("unexpected '{found}' at position {position}")]
    UnexpectedInput { found: char, position: usize },

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("function '{name}' expects {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    /// Failure reported by an externally supplied evaluator.
    #[error("{0}")]
    Custom(String),
}
