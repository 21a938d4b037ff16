//! Calculation request and response bodies.

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use super::number::serialize_answer;

/// Body of `POST /calculate`.
///
/// Decoding is lenient the way clients of the service expect:
/// - field names match regardless of case (`Problem`, `ID`)
/// - absent fields, `null` fields and a `null` body decode as empty strings
/// - unknown fields are ignored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CalculationRequest {
    /// Client identity label
    pub username: String,
    /// Expression to evaluate
    pub problem: String,
    /// Client correlation id, echoed back in the response
    pub id: String,
}

impl CalculationRequest {
    /// Decode the first JSON value of `bytes`; anything after it is ignored.
    pub fn decode_first(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::Deserializer::from_slice(bytes)
            .into_iter::<Self>()
            .next()
            .unwrap_or_else(|| Err(de::Error::custom("empty request body")))
    }
}

enum RequestField {
    Username,
    Problem,
    Id,
}

impl RequestField {
    fn matching(key: &str) -> Option<Self> {
        if key.eq_ignore_ascii_case("username") {
            Some(Self::Username)
        } else if key.eq_ignore_ascii_case("problem") {
            Some(Self::Problem)
        } else if key.eq_ignore_ascii_case("id") {
            Some(Self::Id)
        } else {
            None
        }
    }
}

struct RequestVisitor;

impl<'de> Visitor<'de> for RequestVisitor {
    type Value = CalculationRequest;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a calculation request object")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(CalculationRequest::default())
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut request = CalculationRequest::default();
        while let Some(key) = map.next_key::<String>()? {
            let slot = match RequestField::matching(&key) {
                Some(RequestField::Username) => &mut request.username,
                Some(RequestField::Problem) => &mut request.problem,
                Some(RequestField::Id) => &mut request.id,
                None => {
                    map.next_value::<IgnoredAny>()?;
                    continue;
                }
            };
            if let Some(value) = map.next_value::<Option<String>>()? {
                *slot = value;
            }
        }
        Ok(request)
    }
}

impl<'de> Deserialize<'de> for CalculationRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RequestVisitor)
    }
}

/// Result of one calculation.
///
/// `answer` is meaningful only when `success` is true and is `0` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResponse {
    pub success: bool,
    pub error: String,
    #[serde(serialize_with = "serialize_answer")]
    pub answer: f64,
    pub id: String,
}

impl CalculationResponse {
    pub fn success(id: impl Into<String>, answer: f64) -> Self {
        Self {
            success: true,
            error: String::new(),
            answer,
            id: id.into(),
        }
    }

    pub fn failure(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            answer: 0.0,
            id: id.into(),
        }
    }
}
