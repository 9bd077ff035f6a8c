//! Field-name keyed result rows.

use crate::error::{SelectError, SelectResult};
use crate::value::{Value, is_text_type};
use std::error::Error;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, Kind, Type};

type BoxError = Box<dyn Error + Sync + Send>;

/// A single result row as an ordered `column -> value` mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Duplicate column names are kept; `get` sees the last one.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.fields.push((column.into(), value.into()));
    }

    /// Get the value of a column by name.
    ///
    /// When several columns share a name (`SELECT a.name, b.name`), the
    /// rightmost one wins, as with an associative fetch.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .rev()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(column, value)` pairs in result order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Decode a `tokio_postgres::Row` column by column.
    ///
    /// Every column type decodes. Types without a dedicated rendering come
    /// back as `\x`-prefixed hex of their binary wire value.
    pub fn from_row(row: &Row) -> SelectResult<Self> {
        let mut record = Record::new();
        for (idx, column) in row.columns().iter().enumerate() {
            let Cell(value) = row
                .try_get::<_, Cell>(idx)
                .map_err(|e| SelectError::decode(column.name(), e.to_string()))?;
            record.push(column.name(), value);
        }
        Ok(record)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.push(k, v);
        }
        record
    }
}

/// A column value of any Postgres type.
struct Cell(Value);

impl<'a> FromSql<'a> for Cell {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        decode(ty, raw).map(Cell)
    }

    fn from_sql_null(_: &Type) -> Result<Self, BoxError> {
        Ok(Cell(Value::Null))
    }

    fn accepts(_: &Type) -> bool {
        true
    }
}

fn decode(ty: &Type, raw: &[u8]) -> Result<Value, BoxError> {
    let value: Value = match *ty {
        Type::BOOL => bool::from_sql(ty, raw)?.into(),
        Type::INT2 => i16::from_sql(ty, raw)?.into(),
        Type::INT4 => i32::from_sql(ty, raw)?.into(),
        Type::INT8 => i64::from_sql(ty, raw)?.into(),
        Type::OID => u32::from_sql(ty, raw)?.into(),
        Type::FLOAT4 => f32::from_sql(ty, raw)?.into(),
        Type::FLOAT8 => f64::from_sql(ty, raw)?.into(),
        Type::JSON | Type::JSONB => serde_json::Value::from_sql(ty, raw)?.to_string().into(),
        Type::UUID => uuid::Uuid::from_sql(ty, raw)?.to_string().into(),
        Type::DATE => chrono::NaiveDate::from_sql(ty, raw)?.to_string().into(),
        Type::TIME => chrono::NaiveTime::from_sql(ty, raw)?.to_string().into(),
        Type::TIMESTAMP => chrono::NaiveDateTime::from_sql(ty, raw)?.to_string().into(),
        Type::TIMESTAMPTZ => chrono::DateTime::<chrono::Utc>::from_sql(ty, raw)?
            .to_rfc3339()
            .into(),
        // rendered from the wire digits so NaN and values wider than Decimal survive
        Type::NUMERIC => numeric_text(raw)?.into(),
        Type::INTERVAL => interval_text(raw)?.into(),
        Type::BYTEA => hex(raw).into(),
        _ if is_text_type(ty) => <&str>::from_sql(ty, raw)?.into(),
        _ => match ty.kind() {
            Kind::Enum(_) => <&str>::from_sql(ty, raw)?.into(),
            Kind::Domain(base) => decode(base, raw)?,
            Kind::Array(_) => match Vec::<Cell>::from_sql(ty, raw) {
                Ok(items) => array_text(&items).into(),
                // multi-dimensional
                Err(_) => hex(raw).into(),
            },
            _ if ty.name() == "citext" => <&str>::from_sql(ty, raw)?.into(),
            _ => hex(raw).into(),
        },
    };
    Ok(value)
}

fn hex(raw: &[u8]) -> String {
    let mut out = String::with_capacity(2 + raw.len() * 2);
    out.push_str("\\x");
    for b in raw {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Render a one-dimensional array the way Postgres prints it: `{1,NULL,"a b"}`.
fn array_text(items: &[Cell]) -> String {
    let parts: Vec<String> = items
        .iter()
        .map(|Cell(v)| match v {
            Value::Null => "NULL".to_string(),
            Value::Text(s) if needs_quotes(s) => {
                format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
            }
            other => other.to_string(),
        })
        .collect();
    format!("{{{}}}", parts.join(","))
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.eq_ignore_ascii_case("null")
        || s
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | ',' | '"' | '\\'))
}

/// Text form of a binary `numeric`: header of four u16 words, then base-10000 digits.
fn numeric_text(raw: &[u8]) -> Result<String, BoxError> {
    let word = |i: usize| -> Result<u16, BoxError> {
        raw.get(2 * i..2 * i + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .ok_or_else(|| "truncated numeric value".into())
    };
    let ndigits = usize::from(word(0)?);
    let weight = i32::from(word(1)? as i16);
    let sign = word(2)?;
    let dscale = usize::from(word(3)?);

    match sign {
        0xC000 => return Ok("NaN".to_string()),
        0xD000 => return Ok("Infinity".to_string()),
        0xF000 => return Ok("-Infinity".to_string()),
        _ => {}
    }

    let digits = (0..ndigits)
        .map(|i| word(4 + i))
        .collect::<Result<Vec<_>, _>>()?;
    let group = |pos: i32| -> u16 {
        usize::try_from(pos)
            .ok()
            .and_then(|p| digits.get(p).copied())
            .unwrap_or(0)
    };

    let mut text = String::new();
    if sign == 0x4000 {
        text.push('-');
    }
    if weight < 0 {
        text.push('0');
    } else {
        text.push_str(&group(0).to_string());
        for pos in 1..=weight {
            text.push_str(&format!("{:04}", group(pos)));
        }
    }
    if dscale > 0 {
        let mut frac = String::new();
        let mut pos = weight + 1;
        while frac.len() < dscale {
            frac.push_str(&format!("{:04}", group(pos)));
            pos += 1;
        }
        frac.truncate(dscale);
        text.push('.');
        text.push_str(&frac);
    }
    Ok(text)
}

/// Text form of a binary `interval` (microseconds, days, months), e.g. `1 year 2 mons 3 days 04:05:06`.
fn interval_text(raw: &[u8]) -> Result<String, BoxError> {
    if raw.len() != 16 {
        return Err("invalid interval length".into());
    }
    let micros = i64::from_be_bytes(raw[0..8].try_into()?);
    let days = i32::from_be_bytes(raw[8..12].try_into()?);
    let months = i32::from_be_bytes(raw[12..16].try_into()?);

    let unit = |n: i32, one: &str, many: &str| {
        format!("{n} {}", if n == 1 { one } else { many })
    };

    let mut parts = Vec::new();
    let (years, months) = (months / 12, months % 12);
    if years != 0 {
        parts.push(unit(years, "year", "years"));
    }
    if months != 0 {
        parts.push(unit(months, "mon", "mons"));
    }
    if days != 0 {
        parts.push(unit(days, "day", "days"));
    }
    if micros != 0 || parts.is_empty() {
        let sign = if micros < 0 { "-" } else { "" };
        let total = micros.unsigned_abs();
        let secs = total / 1_000_000;
        let mut clock = format!(
            "{sign}{:02}:{:02}:{:02}",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60
        );
        let frac = total % 1_000_000;
        if frac != 0 {
            let digits = format!("{frac:06}");
            clock.push('.');
            clock.push_str(digits.trim_end_matches('0'));
        }
        parts.push(clock);
    }
    Ok(parts.join(" "))
}
