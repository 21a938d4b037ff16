//! Arithmetic expression evaluation.
//!
//! The request handler only depends on the [`Evaluator`] trait, so any
//! evaluator can be injected into the HTTP state. [`ArithmeticEvaluator`] is
//! the default: a nom-based recursive descent parser over `f64`.
//!
//! # Supported syntax
//!
//! - Numbers: `42`, `1.5`, `.5`, `1e3`, `2.5E-2`
//! - Operators: `+ - * / %`, `^` (right associative), unary `+`/`-`, parentheses
//! - Constants: `pi`, `e`
//! - Functions: `sqrt abs sin cos tan asin acos atan sinh cosh tanh exp ln
//!   log log2 log10 floor ceil round`, and `pow atan2 min max hypot`
//!
//! Results follow IEEE-754: `1/0` evaluates to `+inf` and `0/0` to NaN. Deciding
//! what to do with those values is the caller's job.

mod error;
mod functions;
mod parser;

pub use error::{EvalError, EvalResult};

use crate::config::EvaluatorSettings;

/// Evaluates an expression string to a number.
///
/// Implementations must be side-effect free and fast enough to run inline on
/// the request task.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, expression: &str) -> EvalResult<f64>;
}

impl<F> Evaluator for F
where
    F: Fn(&str) -> EvalResult<f64> + Send + Sync,
{
    fn evaluate(&self, expression: &str) -> EvalResult<f64> {
        self(expression)
    }
}

/// Default evaluator for arithmetic expressions.
#[derive(Debug, Clone)]
pub struct ArithmeticEvaluator {
    max_expression_len: usize,
    max_nesting: usize,
}

impl ArithmeticEvaluator {
    pub const DEFAULT_MAX_EXPRESSION_LEN: usize = 4096;
    pub const DEFAULT_MAX_NESTING: usize = 64;

    pub fn new() -> Self {
        Self::with_limits(Self::DEFAULT_MAX_EXPRESSION_LEN, Self::DEFAULT_MAX_NESTING)
    }

    /// Create an evaluator with explicit input limits.
    ///
    /// # Arguments
    /// * `max_expression_len` - Longest accepted expression, in characters
    /// * `max_nesting` - Deepest accepted parenthesis nesting
    pub fn with_limits(max_expression_len: usize, max_nesting: usize) -> Self {
        Self {
            max_expression_len,
            max_nesting,
        }
    }

    pub fn from_settings(settings: &EvaluatorSettings) -> Self {
        Self::with_limits(settings.max_expression_len, settings.max_nesting)
    }
}

impl Default for ArithmeticEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for ArithmeticEvaluator {
    fn evaluate(&self, expression: &str) -> EvalResult<f64> {
        parser::check_limits(expression, self.max_expression_len, self.max_nesting)?;
        parser::parse(expression)?.eval()
    }
}
