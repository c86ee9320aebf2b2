use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::{analyzer::AnalyzerError, metadata::FieldType};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn invalid(value: &Value, target: &str) -> AnalyzerError {
    AnalyzerError::InvalidValue { value: value.to_string(), target: target.to_string() }
}

pub fn parse_date(value: &Value) -> Result<NaiveDate, AnalyzerError> {
    value.as_str()
        .and_then(|text| NaiveDate::parse_from_str(text, DATE_FORMAT).ok())
        .ok_or_else(|| invalid(value, "date"))
}

pub fn parse_time(value: &Value) -> Result<NaiveTime, AnalyzerError> {
    let text = value.as_str().ok_or_else(|| invalid(value, "time"))?;
    NaiveTime::parse_from_str(text, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S%.f"))
        .map_err(|_| invalid(value, "time"))
}

/// RFC 3339 (offset normalized away) or `YYYY-MM-DD HH:MM:SS[.f]`.
pub fn parse_datetime(value: &Value) -> Result<NaiveDateTime, AnalyzerError> {
    let text = value.as_str().ok_or_else(|| invalid(value, "datetime"))?;

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed.naive_utc());
    }
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|_| invalid(value, "datetime"))
}

/// Booleans as the database may hand them back: native, 0/1, or text.
pub fn parse_bool(value: &Value) -> Result<bool, AnalyzerError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(invalid(value, "bool")),
        },
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => Ok(true),
            "false" | "f" | "0" => Ok(false),
            _ => Err(invalid(value, "bool")),
        },
        _ => Err(invalid(value, "bool")),
    }
}

/// Normalize a bound value for a slot of type `ty`; untyped and
/// non-temporal values pass through.
pub fn bound_value(value: &Value, ty: Option<FieldType>, datetime_format: &str) -> Result<Value, AnalyzerError> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    match ty {
        Some(FieldType::Bool) => Ok(Value::Bool(parse_bool(value)?)),
        Some(FieldType::Date) => Ok(Value::String(parse_date(value)?.format(DATE_FORMAT).to_string())),
        Some(FieldType::Time) => Ok(Value::String(parse_time(value)?.format(TIME_FORMAT).to_string())),
        Some(FieldType::DateTime) => Ok(Value::String(parse_datetime(value)?.format(datetime_format).to_string())),
        _ => Ok(value.clone()),
    }
}
