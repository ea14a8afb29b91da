// File: src/db/value.rs
// Purpose: Bound scalar values, type signatures, and result-row decoding

use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row as SqlxRow, TypeInfo, ValueRef};

use super::error::QueryError;

/// One scalar bound into, or read out of, a statement.
///
/// `Null` only ever appears in result rows; bind sequences must carry explicit
/// scalars (the signature codes have no null code).
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
    Null,
}

impl SqlValue {
    /// Human-readable kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            SqlValue::Int(_) => "integer",
            SqlValue::Float(_) => "float",
            SqlValue::Text(_) => "string",
            SqlValue::Blob(_) => "blob",
            SqlValue::Null => "null",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            SqlValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            SqlValue::Blob(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Blob(v)
    }
}

/// One result row: column name -> scalar, `Null` for SQL NULL.
pub type Row = HashMap<String, SqlValue>;

/// Check that a type signature describes a value sequence.
///
/// One code per value: `i` integer, `d` float, `s` string, `b` blob. Length
/// or per-position kind disagreement is a caller bug and is rejected here,
/// before any connection is involved.
pub(crate) fn check_signature(values: &[SqlValue], types: &str) -> Result<(), QueryError> {
    let codes: Vec<char> = types.chars().collect();
    if codes.len() != values.len() {
        return Err(QueryError::Signature(format!(
            "{} type codes for {} values",
            codes.len(),
            values.len()
        )));
    }
    for (position, (code, value)) in codes.iter().copied().zip(values).enumerate() {
        let matches = matches!(
            (code, value),
            ('i', SqlValue::Int(_))
                | ('d', SqlValue::Float(_))
                | ('s', SqlValue::Text(_))
                | ('b', SqlValue::Blob(_))
        );
        if !matches {
            return Err(QueryError::Signature(format!(
                "code '{}' at position {} does not describe a {} value",
                code,
                position,
                value.kind()
            )));
        }
    }
    Ok(())
}

/// Decode a driver row into a column-name map, picking the variant from the
/// column's SQLite type.
pub(crate) fn decode_row(row: &SqliteRow) -> Result<Row, sqlx::Error> {
    let mut out = Row::with_capacity(row.len());
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            SqlValue::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => SqlValue::Int(row.try_get::<i64, _>(index)?),
                "REAL" => SqlValue::Float(row.try_get::<f64, _>(index)?),
                "BLOB" => SqlValue::Blob(row.try_get::<Vec<u8>, _>(index)?),
                _ => SqlValue::Text(row.try_get::<String, _>(index)?),
            }
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}
