//! Named constants and functions available to expressions.

use std::f64::consts;

use super::error::{EvalError, EvalResult};

type Unary = fn(f64) -> f64;
type Binary = fn(f64, f64) -> f64;

pub(crate) fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(consts::PI),
        "e" => Some(consts::E),
        _ => None,
    }
}

fn unary(name: &str) -> Option<Unary> {
    let f: Unary = match name {
        "sqrt" => f64::sqrt,
        "abs" => f64::abs,
        "sin" => f64::sin,
        "cos" => f64::cos,
        "tan" => f64::tan,
        "asin" => f64::asin,
        "acos" => f64::acos,
        "atan" => f64::atan,
        "sinh" => f64::sinh,
        "cosh" => f64::cosh,
        "tanh" => f64::tanh,
        "exp" => f64::exp,
        "ln" => f64::ln,
        // `log` is the common (base 10) logarithm; `ln` is the natural one
        "log" | "log10" => f64::log10,
        "log2" => f64::log2,
        "floor" => f64::floor,
        "ceil" => f64::ceil,
        "round" => f64::round,
        _ => return None,
    };
    Some(f)
}

fn binary(name: &str) -> Option<Binary> {
    let f: Binary = match name {
        "pow" => f64::powf,
        "atan2" => f64::atan2,
        "min" => f64::min,
        "max" => f64::max,
        "hypot" => f64::hypot,
        _ => return None,
    };
    Some(f)
}

fn arity_error(name: &str, expected: usize, found: usize) -> EvalError {
    EvalError::Arity {
        name: name.to_string(),
        expected,
        found,
    }
}

pub(crate) fn call(name: &str, args: &[f64]) -> EvalResult<f64> {
    if let Some(f) = unary(name) {
        return match args {
            [x] => Ok(f(*x)),
            _ => Err(arity_error(name, 1, args.len())),
        };
    }

    if let Some(f) = binary(name) {
        return match args {
            [x, y] => Ok(f(*x, *y)),
            _ => Err(arity_error(name, 2, args.len())),
        };
    }

    Err(EvalError::UnknownFunction(name.to_string()))
}
