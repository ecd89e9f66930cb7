//! Canonical field values shared by store reads and snapshot cells.
//!
//! # Responsibility
//! - Hold one column value after coercion to its column kind.
//! - Provide the single equality rule used by the field diff.
//!
//! # Invariants
//! - Empty text is always represented as `FieldValue::Null`.
//! - A `FieldRow` always holds one value per contract column.

use crate::schema::{Column, ColumnKind};
use rusqlite::types::{ToSql, ToSqlOutput, Value};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Canonical column value.
///
/// Equality is exact on the canonical form: reals compare with `==`, text
/// compares byte-wise, and `Null` only equals `Null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Bool(bool),
}

impl FieldValue {
    /// Builds a text value, folding empty strings into `Null`.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Null
        } else {
            Self::Text(value)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(value) => Some(*value),
            Self::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => f.write_str(&format_real(*value)),
            Self::Text(value) => f.write_str(value),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self {
            Self::Null => Value::Null,
            Self::Integer(value) => Value::Integer(*value),
            Self::Real(value) => Value::Real(*value),
            Self::Text(value) => Value::Text(value.clone()),
            Self::Bool(value) => Value::Integer(i64::from(*value)),
        };
        Ok(ToSqlOutput::Owned(value))
    }
}

/// One value per contract column, indexed by `Column::position`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRow {
    values: Vec<FieldValue>,
}

impl FieldRow {
    /// Creates a row with every column `Null`.
    pub fn empty() -> Self {
        Self {
            values: vec![FieldValue::Null; Column::ALL.len()],
        }
    }

    pub fn get(&self, column: Column) -> &FieldValue {
        &self.values[column.position()]
    }

    pub fn set(&mut self, column: Column, value: FieldValue) {
        self.values[column.position()] = value;
    }

    /// Builder-style setter used by fixtures and tests.
    pub fn with(mut self, column: Column, value: FieldValue) -> Self {
        self.set(column, value);
        self
    }

    /// Iterates `(column, value)` pairs in contract order.
    pub fn iter(&self) -> impl Iterator<Item = (Column, &FieldValue)> {
        Column::ALL.into_iter().zip(self.values.iter())
    }
}

impl Default for FieldRow {
    fn default() -> Self {
        Self::empty()
    }
}

/// Error raised when a raw value cannot be coerced to its column kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionError {
    pub column: Column,
    pub value: String,
}

impl Display for CoercionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let expected = match self.column.kind() {
            ColumnKind::Integer => "an integer",
            ColumnKind::Text => "text",
            ColumnKind::Real => "a number",
            ColumnKind::Flag => "a boolean",
        };
        write!(
            f,
            "column {} expects {expected}, got `{}`",
            self.column, self.value
        )
    }
}

impl std::error::Error for CoercionError {}

/// Coerces a numeric input to the column kind.
pub fn coerce_number(column: Column, value: f64) -> Result<FieldValue, CoercionError> {
    match column.kind() {
        ColumnKind::Integer => integral(value)
            .map(FieldValue::Integer)
            .ok_or_else(|| CoercionError {
                column,
                value: format_real(value),
            }),
        ColumnKind::Real => Ok(FieldValue::Real(value)),
        ColumnKind::Text => Ok(FieldValue::Text(format_real(value))),
        ColumnKind::Flag => Ok(FieldValue::Bool(value != 0.0)),
    }
}

/// Coerces an integer input to the column kind.
pub fn coerce_integer(column: Column, value: i64) -> FieldValue {
    match column.kind() {
        ColumnKind::Integer => FieldValue::Integer(value),
        ColumnKind::Real => FieldValue::Real(value as f64),
        ColumnKind::Text => FieldValue::Text(value.to_string()),
        ColumnKind::Flag => FieldValue::Bool(value != 0),
    }
}

/// Coerces a boolean input to the column kind.
pub fn coerce_bool(column: Column, value: bool) -> Result<FieldValue, CoercionError> {
    match column.kind() {
        ColumnKind::Flag => Ok(FieldValue::Bool(value)),
        ColumnKind::Text => Ok(FieldValue::Text(value.to_string())),
        ColumnKind::Integer | ColumnKind::Real => Err(CoercionError {
            column,
            value: value.to_string(),
        }),
    }
}

/// Coerces textual input to the column kind.
///
/// Text columns keep the value verbatim; other kinds parse the trimmed value
/// and treat whitespace-only input as `Null`.
pub fn coerce_text(column: Column, value: &str) -> Result<FieldValue, CoercionError> {
    let trimmed = value.trim();
    let invalid = || CoercionError {
        column,
        value: value.to_string(),
    };

    match column.kind() {
        ColumnKind::Text => Ok(FieldValue::text(value)),
        _ if trimmed.is_empty() => Ok(FieldValue::Null),
        ColumnKind::Integer => match trimmed.parse::<i64>() {
            Ok(parsed) => Ok(FieldValue::Integer(parsed)),
            Err(_) => trimmed
                .parse::<f64>()
                .ok()
                .and_then(integral)
                .map(FieldValue::Integer)
                .ok_or_else(invalid),
        },
        ColumnKind::Real => trimmed
            .parse::<f64>()
            .ok()
            .filter(|parsed| parsed.is_finite())
            .map(FieldValue::Real)
            .ok_or_else(invalid),
        ColumnKind::Flag => parse_flag(trimmed).map(FieldValue::Bool).ok_or_else(invalid),
    }
}

/// Parses a flag word or number; `None` when unrecognized.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        other => other.parse::<f64>().ok().map(|number| number != 0.0),
    }
}

fn integral(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.007_199_254_740_992e15 {
        Some(value as i64)
    } else {
        None
    }
}

fn format_real(value: f64) -> String {
    match integral(value) {
        Some(whole) => whole.to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{coerce_integer, coerce_number, coerce_text, parse_flag, FieldRow, FieldValue};
    use crate::schema::{AlarmField, AlarmKind, Column};

    const HALM_EN: Column = Column::Alarm(AlarmKind::HighAlarm, AlarmField::Enabled);

    #[test]
    fn empty_text_folds_to_null() {
        assert_eq!(FieldValue::text(""), FieldValue::Null);
        assert_eq!(
            coerce_text(Column::FullDescription, "").unwrap(),
            FieldValue::Null
        );
        assert_eq!(coerce_text(Column::EguLow, "   ").unwrap(), FieldValue::Null);
    }

    #[test]
    fn integral_numbers_become_ids_and_plain_tags() {
        assert_eq!(coerce_number(Column::Id, 7.0).unwrap(), FieldValue::Integer(7));
        assert!(coerce_number(Column::Id, 7.5).is_err());
        assert_eq!(
            coerce_number(Column::Tag, 101.0).unwrap(),
            FieldValue::Text("101".to_string())
        );
        assert_eq!(
            coerce_number(Column::Tag, 1.5).unwrap(),
            FieldValue::Text("1.5".to_string())
        );
    }

    #[test]
    fn integers_in_real_columns_compare_equal_to_reals() {
        assert_eq!(coerce_integer(Column::EguHigh, 100), FieldValue::Real(100.0));
        assert_eq!(
            coerce_text(Column::EguHigh, " 100 ").unwrap(),
            FieldValue::Real(100.0)
        );
    }

    #[test]
    fn flags_accept_words_and_numbers() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("no"), Some(false));
        assert_eq!(parse_flag("-1"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
        assert!(coerce_text(HALM_EN, "maybe").is_err());
        assert_eq!(coerce_integer(HALM_EN, -1), FieldValue::Bool(true));
    }

    #[test]
    fn invalid_numbers_are_rejected_with_column_name() {
        let err = coerce_text(Column::RawLow, "low").unwrap_err();
        assert_eq!(err.column, Column::RawLow);
        assert!(err.to_string().contains("RawLow"));
    }

    #[test]
    fn field_row_addresses_columns_by_position() {
        let row = FieldRow::empty()
            .with(Column::Id, FieldValue::Integer(3))
            .with(HALM_EN, FieldValue::Bool(true));
        assert_eq!(row.get(Column::Id), &FieldValue::Integer(3));
        assert_eq!(row.get(HALM_EN), &FieldValue::Bool(true));
        assert_eq!(row.iter().count(), 23);
        assert!(row.get(Column::Tag).is_null());
    }
}
