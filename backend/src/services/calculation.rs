//! Evaluation of calculation requests and numeric result classification.

use crate::evaluator::Evaluator;
use crate::models::{CalculationRequest, CalculationResponse};

/// Evaluator results that must never be reported as a successful answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NumericFault {
    #[error("+infinity")]
    PositiveInfinity,
    #[error("-infinity")]
    NegativeInfinity,
    #[error("NaN")]
    NotANumber,
}

/// Accept a finite value, or name the fault for an infinite or NaN one.
pub fn classify_answer(value: f64) -> Result<f64, NumericFault> {
    if value.is_nan() {
        Err(NumericFault::NotANumber)
    } else if value == f64::INFINITY {
        Err(NumericFault::PositiveInfinity)
    } else if value == f64::NEG_INFINITY {
        Err(NumericFault::NegativeInfinity)
    } else {
        Ok(value)
    }
}

/// Evaluate a request's problem and shape the client response.
///
/// Evaluator errors and numeric faults both produce `success: false` with
/// `answer: 0`; the `error` text is the evaluator message or the fault name.
pub fn evaluate_request(
    evaluator: &dyn Evaluator,
    request: &CalculationRequest,
) -> CalculationResponse {
    match evaluator.evaluate(&request.problem) {
        Ok(value) => match classify_answer(value) {
            Ok(answer) => CalculationResponse::success(&request.id, answer),
            Err(fault) => CalculationResponse::failure(&request.id, fault.to_string()),
        },
        Err(err) => CalculationResponse::failure(&request.id, err.to_string()),
    }
}
