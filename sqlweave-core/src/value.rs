//! Value types for SQL bind parameters

use serde::{Deserialize, Serialize};

/// A SQL value that can be bound to a named parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 32-bit integer
    I32(i32),
    /// 64-bit integer
    I64(i64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// String value
    String(String),
    /// Bytes value
    Bytes(Vec<u8>),
    /// JSON value
    Json(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// Implement From for common types
impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Bool(val)
    }
}

impl From<i8> for Value {
    fn from(val: i8) -> Self {
        Value::I32(val as i32)
    }
}

impl From<i16> for Value {
    fn from(val: i16) -> Self {
        Value::I32(val as i32)
    }
}

impl From<i32> for Value {
    fn from(val: i32) -> Self {
        Value::I32(val)
    }
}

impl From<u8> for Value {
    fn from(val: u8) -> Self {
        Value::I32(val as i32)
    }
}

impl From<u16> for Value {
    fn from(val: u16) -> Self {
        Value::I32(val as i32)
    }
}

impl From<u32> for Value {
    fn from(val: u32) -> Self {
        Value::I64(val as i64)
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::I64(val)
    }
}

impl From<f32> for Value {
    fn from(val: f32) -> Self {
        Value::F32(val)
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::F64(val)
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::String(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::String(val.to_string())
    }
}

impl From<&String> for Value {
    fn from(val: &String) -> Self {
        Value::String(val.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(val: Vec<u8>) -> Self {
        Value::Bytes(val)
    }
}

impl From<serde_json::Value> for Value {
    fn from(val: serde_json::Value) -> Self {
        Value::Json(val)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

// The `any` driver has no native binding for these, so they travel as text
#[cfg(feature = "uuid-support")]
impl From<uuid::Uuid> for Value {
    fn from(val: uuid::Uuid) -> Self {
        Value::String(val.hyphenated().to_string())
    }
}

#[cfg(feature = "datetime-support")]
impl From<chrono::NaiveDate> for Value {
    fn from(val: chrono::NaiveDate) -> Self {
        Value::String(val.format("%Y-%m-%d").to_string())
    }
}

#[cfg(feature = "datetime-support")]
impl From<chrono::NaiveDateTime> for Value {
    fn from(val: chrono::NaiveDateTime) -> Self {
        Value::String(val.format("%Y-%m-%d %H:%M:%S%.f").to_string())
    }
}

#[cfg(feature = "datetime-support")]
impl<Tz: chrono::TimeZone> From<chrono::DateTime<Tz>> for Value
where
    Tz::Offset: std::fmt::Display,
{
    fn from(val: chrono::DateTime<Tz>) -> Self {
        Value::String(val.to_rfc3339())
    }
}

#[cfg(feature = "decimal-support")]
impl From<rust_decimal::Decimal> for Value {
    fn from(val: rust_decimal::Decimal) -> Self {
        Value::String(val.to_string())
    }
}
