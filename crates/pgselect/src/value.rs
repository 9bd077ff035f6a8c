//! Scalar values used for bound parameters and decoded result fields.

use bytes::BytesMut;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type, WrongType};

/// A scalar value that can be bound to a placeholder or read back from a row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL `NULL`
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Check if this value is `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text form of the value, `None` for `NULL`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Borrow the inner string of a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Read the value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Scalar JSON maps onto the matching variant; arrays and objects are kept as JSON text.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Text(n.to_string())),
            },
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Text(other.to_string()),
        }
    }
}

type BoxError = Box<dyn Error + Sync + Send>;

pub(crate) fn is_text_type(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN
    )
}

fn mismatch(value: &Value, ty: &Type) -> BoxError {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Int(_) => "integer",
        Value::Float(_) => "float",
        Value::Text(_) => "text",
    };
    format!("cannot bind a {kind} value to a parameter of type {}", ty.name()).into()
}

fn parse_as<T>(s: &str, ty: &Type) -> Result<T, BoxError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    s.trim().parse::<T>().map_err(|e| {
        format!("cannot bind '{s}' to a parameter of type {}: {e}", ty.name()).into()
    })
}

/// Accepts the spellings Postgres itself takes for boolean input.
fn parse_bool(s: &str, ty: &Type) -> Result<bool, BoxError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Ok(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Ok(false),
        _ => Err(format!("cannot bind '{s}' to a parameter of type {}", ty.name()).into()),
    }
}

/// `2024-01-02 03:04:05` and `2024-01-02T03:04:05` are both accepted.
fn iso_timestamp(s: &str) -> String {
    s.trim().replacen(' ', "T", 1)
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => match *ty {
                Type::BOOL => v.to_sql(ty, out),
                _ if is_text_type(ty) => v.to_string().to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
                Type::INT8 => v.to_sql(ty, out),
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => (*v as f64).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*v).to_sql(ty, out),
                _ if is_text_type(ty) => v.to_string().to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => v.to_sql(ty, out),
                // shortest round-trip text, so 0.1 binds as 0.1 and not its binary expansion
                Type::NUMERIC => parse_as::<Decimal>(&v.to_string(), ty)?.to_sql(ty, out),
                _ if is_text_type(ty) => v.to_string().to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Value::Text(s) => match *ty {
                Type::BOOL => parse_bool(s, ty)?.to_sql(ty, out),
                Type::INT2 => parse_as::<i16>(s, ty)?.to_sql(ty, out),
                Type::INT4 => parse_as::<i32>(s, ty)?.to_sql(ty, out),
                Type::INT8 => parse_as::<i64>(s, ty)?.to_sql(ty, out),
                Type::FLOAT4 => parse_as::<f32>(s, ty)?.to_sql(ty, out),
                Type::FLOAT8 => parse_as::<f64>(s, ty)?.to_sql(ty, out),
                Type::NUMERIC => parse_as::<Decimal>(s, ty)?.to_sql(ty, out),
                Type::UUID => parse_as::<uuid::Uuid>(s, ty)?.to_sql(ty, out),
                Type::JSON | Type::JSONB => parse_as::<serde_json::Value>(s, ty)?.to_sql(ty, out),
                Type::DATE => parse_as::<NaiveDate>(s, ty)?.to_sql(ty, out),
                Type::TIMESTAMP => {
                    parse_as::<NaiveDateTime>(&iso_timestamp(s), ty)?.to_sql(ty, out)
                }
                Type::TIMESTAMPTZ => {
                    parse_as::<DateTime<FixedOffset>>(&iso_timestamp(s), ty)?.to_sql(ty, out)
                }
                _ if is_text_type(ty) => s.to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
        }
    }

    fn accepts(ty: &Type) -> bool {
        is_text_type(ty)
            || matches!(
                *ty,
                Type::BOOL
                    | Type::INT2
                    | Type::INT4
                    | Type::INT8
                    | Type::FLOAT4
                    | Type::FLOAT8
                    | Type::NUMERIC
                    | Type::UUID
                    | Type::JSON
                    | Type::JSONB
                    | Type::DATE
                    | Type::TIMESTAMP
                    | Type::TIMESTAMPTZ
            )
    }

    // NULL binds to any slot, including types `accepts` rejects.
    fn to_sql_checked(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        if self.is_null() {
            return Ok(IsNull::Yes);
        }
        if !Self::accepts(ty) {
            return Err(Box::new(WrongType::new::<Self>(ty.clone())));
        }
        self.to_sql(ty, out)
    }
}
