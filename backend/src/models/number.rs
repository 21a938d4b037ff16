//! JSON encoding of numeric answers.

use serde::Serializer;

/// Largest magnitude below which every integer is exactly representable.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Write integral answers without a fractional part (`3`, not `3.0`).
///
/// Finite integral values below 2^53 in magnitude go out as JSON integers;
/// everything else is written as a float.
pub fn serialize_answer<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let value = *value;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        serializer.serialize_i64(value as i64)
    } else {
        serializer.serialize_f64(value)
    }
}
