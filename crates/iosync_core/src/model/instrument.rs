//! Instrument record domain model.
//!
//! # Responsibility
//! - Represent one live store row as snapshot fields plus category flags.
//! - Classify a record into exactly one category (or none).
//!
//! # Invariants
//! - `ID` and `Tag` inside `fields` are always set for loaded records.
//! - Classification follows `Category::ALL` priority; first `Some(true)` wins.
//! - An absent flag (`None`) is never conflated with an explicit `false`.

use crate::model::value::{FieldRow, FieldValue};
use crate::schema::{Category, Column};
use serde::Serialize;

/// Composite `(ID, Tag)` key matching snapshot rows to live records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InstrumentKey {
    pub id: i64,
    pub tag: String,
}

impl InstrumentKey {
    pub fn new(id: i64, tag: impl Into<String>) -> Self {
        Self {
            id,
            tag: tag.into(),
        }
    }

    /// Extracts the key from a row; `None` when either half is missing.
    pub fn from_row(row: &FieldRow) -> Option<Self> {
        let id = row.get(Column::Id).as_integer()?;
        let tag = row.get(Column::Tag).as_text()?;
        Some(Self::new(id, tag))
    }
}

impl std::fmt::Display for InstrumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(ID={}, Tag={})", self.id, self.tag)
    }
}

/// Tri-state I/O class flags as stored on the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryFlags {
    pub digital_input: Option<bool>,
    pub digital_output: Option<bool>,
    pub analog_input: Option<bool>,
    pub analog_output: Option<bool>,
}

impl CategoryFlags {
    /// Flags with only `category` explicitly set to `true`; others `false`.
    pub fn only(category: Category) -> Self {
        let mut flags = Self {
            digital_input: Some(false),
            digital_output: Some(false),
            analog_input: Some(false),
            analog_output: Some(false),
        };
        flags.set(category, Some(true));
        flags
    }

    pub fn get(&self, category: Category) -> Option<bool> {
        match category {
            Category::DigitalInput => self.digital_input,
            Category::DigitalOutput => self.digital_output,
            Category::AnalogInput => self.analog_input,
            Category::AnalogOutput => self.analog_output,
        }
    }

    pub fn set(&mut self, category: Category, value: Option<bool>) {
        let slot = match category {
            Category::DigitalInput => &mut self.digital_input,
            Category::DigitalOutput => &mut self.digital_output,
            Category::AnalogInput => &mut self.analog_input,
            Category::AnalogOutput => &mut self.analog_output,
        };
        *slot = value;
    }

    /// Returns the first category whose flag is explicitly `true`.
    pub fn classify(&self) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|category| self.get(*category) == Some(true))
    }
}

/// One eligible-or-not row of the `Instruments` table.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentRecord {
    pub fields: FieldRow,
    pub flags: CategoryFlags,
}

impl InstrumentRecord {
    pub fn new(key: &InstrumentKey, flags: CategoryFlags) -> Self {
        let fields = FieldRow::empty()
            .with(Column::Id, FieldValue::Integer(key.id))
            .with(Column::Tag, FieldValue::text(key.tag.as_str()));
        Self { fields, flags }
    }

    pub fn key(&self) -> Option<InstrumentKey> {
        InstrumentKey::from_row(&self.fields)
    }

    pub fn category(&self) -> Option<Category> {
        self.flags.classify()
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryFlags, InstrumentKey, InstrumentRecord};
    use crate::schema::Category;

    #[test]
    fn first_true_flag_wins_in_priority_order() {
        let flags = CategoryFlags {
            digital_input: None,
            digital_output: Some(true),
            analog_input: Some(true),
            analog_output: Some(true),
        };
        assert_eq!(flags.classify(), Some(Category::DigitalOutput));
    }

    #[test]
    fn absent_and_false_flags_are_both_skipped() {
        let flags = CategoryFlags {
            digital_input: Some(false),
            digital_output: None,
            analog_input: None,
            analog_output: Some(true),
        };
        assert_eq!(flags.classify(), Some(Category::AnalogOutput));
        assert_eq!(CategoryFlags::default().classify(), None);
    }

    #[test]
    fn only_sets_exactly_one_flag() {
        for category in Category::ALL {
            let flags = CategoryFlags::only(category);
            assert_eq!(flags.classify(), Some(category));
            for other in Category::ALL.into_iter().filter(|other| *other != category) {
                assert_eq!(flags.get(other), Some(false));
            }
        }
    }

    #[test]
    fn record_exposes_composite_key() {
        let key = InstrumentKey::new(7, "FT-101");
        let record = InstrumentRecord::new(&key, CategoryFlags::only(Category::AnalogInput));
        assert_eq!(record.key(), Some(key));
        assert_eq!(record.category(), Some(Category::AnalogInput));
    }
}
