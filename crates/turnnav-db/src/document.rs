//! Storage-form document values.
//!
//! Plan details are open-ended JSON, but the store must never hold binary
//! floats: every fractional numeric leaf is carried as an arbitrary-precision
//! decimal from the moment it enters the persistence layer. `DocValue` is that
//! storage form. Conversions:
//!
//! - [`DocValue::from_json`] -- wire JSON (or a stored jsonb image) into
//!   storage form; float leaves become [`Decimal`]s.
//! - [`DocValue::to_wire`] -- storage form back into plain JSON with f64
//!   leaves, for HTTP responses.
//! - [`DocValue::to_stored`] -- storage form into the jsonb image written to
//!   the database, with full decimal digits as the number tokens.
//!
//! `to_wire(from_json(x)) == x` holds for any JSON value whose numeric leaves
//! are finite and canonically formed.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to bring a JSON value into storage form.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// A numeric leaf cannot be represented as a 96-bit decimal.
    #[error("numeric value {token:?} is outside the storable decimal range")]
    NumberOutOfRange { token: String },
}

// ---------------------------------------------------------------------------
// DocValue
// ---------------------------------------------------------------------------

/// A JSON-shaped value tree whose fractional numbers are exact decimals.
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    Null,
    Bool(bool),
    /// Integer leaf, passed through unchanged.
    Int(i64),
    /// Fractional leaf (or an integer too large for `i64`).
    Number(Decimal),
    String(String),
    Array(Vec<DocValue>),
    Object(BTreeMap<String, DocValue>),
}

impl DocValue {
    /// Convert a JSON value into storage form.
    ///
    /// Integer leaves stay integers; every other numeric leaf is parsed into
    /// a [`Decimal`] from its literal token, so both wire input (shortest f64
    /// rendering) and stored jsonb (full digit strings) convert losslessly.
    pub fn from_json(value: &Value) -> Result<Self, DocumentError> {
        let converted = match value {
            Value::Null => DocValue::Null,
            Value::Bool(b) => DocValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DocValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    DocValue::Number(Decimal::from(u))
                } else if n.as_f64().is_some() {
                    DocValue::Number(parse_decimal(&n.to_string())?)
                } else {
                    return Err(DocumentError::NumberOutOfRange {
                        token: n.to_string(),
                    });
                }
            }
            Value::String(s) => DocValue::String(s.clone()),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(Self::from_json(item)?);
                }
                DocValue::Array(out)
            }
            Value::Object(map) => {
                let mut out = BTreeMap::new();
                for (key, item) in map {
                    out.insert(key.clone(), Self::from_json(item)?);
                }
                DocValue::Object(out)
            }
        };
        Ok(converted)
    }

    /// Convert storage form back into wire JSON.
    ///
    /// Decimal leaves become f64 numbers (integer-valued decimals that arose
    /// from oversized integers come back as integers). Infallible: every
    /// decimal sits inside f64's range.
    pub fn to_wire(&self) -> Value {
        match self {
            DocValue::Null => Value::Null,
            DocValue::Bool(b) => Value::Bool(*b),
            DocValue::Int(i) => Value::Number((*i).into()),
            DocValue::Number(d) => {
                if d.scale() == 0 {
                    if let Some(i) = d.to_i64() {
                        return Value::Number(i.into());
                    }
                    if let Some(u) = d.to_u64() {
                        return Value::Number(u.into());
                    }
                }
                match d.to_f64().and_then(serde_json::Number::from_f64) {
                    Some(n) => Value::Number(n),
                    // Unreachable: Decimal's range fits in finite f64.
                    None => Value::Number(0.into()),
                }
            }
            DocValue::String(s) => Value::String(s.clone()),
            DocValue::Array(items) => Value::Array(items.iter().map(Self::to_wire).collect()),
            DocValue::Object(map) => {
                let mut out = serde_json::Map::new();
                for (key, item) in map {
                    out.insert(key.clone(), item.to_wire());
                }
                Value::Object(out)
            }
        }
    }

    /// Convert storage form into the jsonb image written to the database.
    ///
    /// Decimal leaves are emitted with their full digit strings as the number
    /// tokens (`serde_json` runs with `arbitrary_precision`), so the database
    /// round trip preserves every digit.
    pub fn to_stored(&self) -> Value {
        match self {
            DocValue::Null => Value::Null,
            DocValue::Bool(b) => Value::Bool(*b),
            DocValue::Int(i) => Value::Number((*i).into()),
            DocValue::Number(d) => {
                Value::Number(serde_json::Number::from_string_unchecked(d.to_string()))
            }
            DocValue::String(s) => Value::String(s.clone()),
            DocValue::Array(items) => Value::Array(items.iter().map(Self::to_stored).collect()),
            DocValue::Object(map) => {
                let mut out = serde_json::Map::new();
                for (key, item) in map {
                    out.insert(key.clone(), item.to_stored());
                }
                Value::Object(out)
            }
        }
    }

    /// Object field lookup; `None` for non-objects and missing keys.
    pub fn get(&self, key: &str) -> Option<&DocValue> {
        match self {
            DocValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// String leaf accessor.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Decimal leaf accessor.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            DocValue::Number(d) => Some(*d),
            _ => None,
        }
    }
}

/// Parse a JSON number token into a decimal.
///
/// Tries plain decimal notation first, then scientific notation, and finally
/// errors when the value cannot fit a 96-bit decimal.
fn parse_decimal(token: &str) -> Result<Decimal, DocumentError> {
    use std::str::FromStr;

    Decimal::from_str(token)
        .or_else(|_| Decimal::from_scientific(token))
        .map_err(|_| DocumentError::NumberOutOfRange {
            token: token.to_owned(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
