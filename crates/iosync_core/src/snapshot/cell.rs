//! Worksheet cell conversion.
//!
//! # Invariants
//! - String cells are unescaped from OOXML `_xHHHH_` form before use, so text
//!   written by the exporter reads back unchanged.

use crate::model::value::{
    coerce_bool, coerce_integer, coerce_number, coerce_text, CoercionError, FieldValue,
};
use crate::schema::Column;
use calamine::Data;
use std::borrow::Cow;

/// Coerces one worksheet cell to the canonical value for `column`.
pub(crate) fn cell_value(column: Column, cell: &Data) -> Result<FieldValue, CoercionError> {
    match cell {
        Data::Empty => Ok(FieldValue::Null),
        Data::String(text) => coerce_text(column, &unescape_ooxml(text)),
        Data::Float(value) => coerce_number(column, *value),
        Data::Int(value) => Ok(coerce_integer(column, *value)),
        Data::Bool(value) => coerce_bool(column, *value),
        other => Err(CoercionError {
            column,
            value: other.to_string(),
        }),
    }
}

/// Renders a header cell as text; empty cells become `""`.
pub(crate) fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => unescape_ooxml(text).into_owned(),
        other => other.to_string(),
    }
}

/// Decodes `_xHHHH_` escapes; `_x005F_` stands for a literal underscore.
///
/// Malformed sequences are kept verbatim.
pub(crate) fn unescape_ooxml(text: &str) -> Cow<'_, str> {
    if !text.contains("_x") {
        return Cow::Borrowed(text);
    }

    let mut decoded = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("_x") {
        decoded.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match escaped_char(candidate) {
            Some(ch) => {
                decoded.push(ch);
                rest = &candidate[7..];
            }
            None => {
                decoded.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }
    decoded.push_str(rest);
    Cow::Owned(decoded)
}

fn escaped_char(candidate: &str) -> Option<char> {
    let hex = candidate.get(2..6)?;
    let closed = candidate.as_bytes().get(6) == Some(&b'_');
    if !closed || !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

pub(crate) fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{cell_value, header_text, is_blank, unescape_ooxml};
    use crate::model::value::FieldValue;
    use crate::schema::{AlarmField, AlarmKind, Column};
    use calamine::Data;

    #[test]
    fn numeric_cells_follow_column_kind() {
        assert_eq!(
            cell_value(Column::Id, &Data::Float(7.0)).unwrap(),
            FieldValue::Integer(7)
        );
        assert_eq!(
            cell_value(Column::EguHigh, &Data::Int(150)).unwrap(),
            FieldValue::Real(150.0)
        );
        assert_eq!(
            cell_value(Column::Tag, &Data::Float(42.0)).unwrap(),
            FieldValue::Text("42".to_string())
        );
    }

    #[test]
    fn boolean_cells_only_fit_flag_and_text_columns() {
        let enabled = Column::Alarm(AlarmKind::HighWarning, AlarmField::Enabled);
        assert_eq!(
            cell_value(enabled, &Data::Bool(true)).unwrap(),
            FieldValue::Bool(true)
        );
        assert!(cell_value(Column::RawHigh, &Data::Bool(true)).is_err());
    }

    #[test]
    fn blank_detection_ignores_whitespace_strings() {
        assert!(is_blank(&Data::Empty));
        assert!(is_blank(&Data::String("  ".to_string())));
        assert!(!is_blank(&Data::Float(0.0)));
        assert_eq!(header_text(&Data::Empty), "");
    }

    #[test]
    fn escaped_control_characters_are_decoded() {
        assert_eq!(unescape_ooxml("a_x000D_\nb"), "a\r\nb");
        assert_eq!(unescape_ooxml("ctl_x0001_x"), "ctl\u{1}x");
        assert_eq!(unescape_ooxml("lit _x005F_x0041_ esc"), "lit _x0041_ esc");
        assert_eq!(
            cell_value(Column::Tag, &Data::String("AI_x000D_1".to_string())).unwrap(),
            FieldValue::Text("AI\r1".to_string())
        );
    }

    #[test]
    fn malformed_escapes_are_kept_verbatim() {
        assert_eq!(unescape_ooxml("FT_x12_"), "FT_x12_");
        assert_eq!(unescape_ooxml("_xZZZZ_ and _x"), "_xZZZZ_ and _x");
        assert_eq!(unescape_ooxml("plain"), "plain");
        let header = Data::String("EGU_x005F_Low".to_string());
        assert_eq!(header_text(&header), "EGU_Low");
    }
}
