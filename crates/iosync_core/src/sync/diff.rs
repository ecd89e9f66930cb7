//! Field-level diff between a snapshot row and a live record.

use crate::model::value::{FieldRow, FieldValue};
use crate::schema::Column;
use serde::Serialize;

/// One column whose snapshot value differs from the live value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub column: Column,
    pub before: FieldValue,
    pub after: FieldValue,
}

/// Returns changed non-key columns in contract order.
///
/// Both rows must already be canonical; comparison is exact equality.
pub fn diff_fields(snapshot: &FieldRow, live: &FieldRow) -> Vec<FieldChange> {
    Column::ALL
        .into_iter()
        .filter(|column| !column.is_key())
        .filter_map(|column| {
            let after = snapshot.get(column);
            let before = live.get(column);
            (after != before).then(|| FieldChange {
                column,
                before: before.clone(),
                after: after.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::diff_fields;
    use crate::model::value::{FieldRow, FieldValue};
    use crate::schema::{AlarmField, AlarmKind, Column};

    fn base() -> FieldRow {
        FieldRow::empty()
            .with(Column::Id, FieldValue::Integer(7))
            .with(Column::Tag, FieldValue::text("FT-101"))
            .with(Column::EguLow, FieldValue::Real(0.0))
            .with(Column::EguHigh, FieldValue::Real(100.0))
    }

    #[test]
    fn identical_rows_have_no_diff() {
        assert!(diff_fields(&base(), &base()).is_empty());
    }

    #[test]
    fn reports_only_changed_columns_with_before_and_after() {
        let edited = base()
            .with(Column::EguHigh, FieldValue::Real(150.0))
            .with(
                Column::Alarm(AlarmKind::HighAlarm, AlarmField::Enabled),
                FieldValue::Bool(true),
            );
        let changes = diff_fields(&edited, &base());

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].column, Column::EguHigh);
        assert_eq!(changes[0].before, FieldValue::Real(100.0));
        assert_eq!(changes[0].after, FieldValue::Real(150.0));
        assert_eq!(
            changes[1].column,
            Column::Alarm(AlarmKind::HighAlarm, AlarmField::Enabled)
        );
        assert_eq!(changes[1].before, FieldValue::Null);
    }

    #[test]
    fn key_columns_are_never_diffed() {
        let edited = base().with(Column::Tag, FieldValue::text("FT-102"));
        assert!(diff_fields(&edited, &base()).is_empty());
    }

    #[test]
    fn clearing_a_value_is_a_change_to_null() {
        let edited = base().with(Column::EguLow, FieldValue::Null);
        let changes = diff_fields(&edited, &base());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].after, FieldValue::Null);
    }
}
