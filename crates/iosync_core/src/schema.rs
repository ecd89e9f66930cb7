//! Fixed column and category contract shared by export, validation and sync.
//!
//! # Responsibility
//! - Define the ordered snapshot column list and the four category sections.
//! - Map every column to the value kind used for canonical comparison.
//!
//! # Invariants
//! - `Column::ALL` has exactly 23 entries in snapshot header order.
//! - `Category::ALL` is the fixed section order for export and update passes.
//! - Column and section names are literal store/snapshot identifiers.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Name of the live store table holding instrument records.
pub const INSTRUMENTS_TABLE: &str = "Instruments";

/// Store column restricting records to I/O points.
pub const TYPE_COLUMN: &str = "Type";

/// `Type` value of records in scope for export and sync.
pub const IO_TYPE: &str = "IO";

/// Alarm/warning variant of an alarm column block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlarmKind {
    HighAlarm,
    HighWarning,
    LowAlarm,
    LowWarning,
}

impl AlarmKind {
    pub const ALL: [AlarmKind; 4] = [
        AlarmKind::HighAlarm,
        AlarmKind::HighWarning,
        AlarmKind::LowAlarm,
        AlarmKind::LowWarning,
    ];

    fn index(self) -> usize {
        match self {
            Self::HighAlarm => 0,
            Self::HighWarning => 1,
            Self::LowAlarm => 2,
            Self::LowWarning => 3,
        }
    }
}

/// Sub-attribute of one alarm/warning variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlarmField {
    Enabled,
    Setpoint,
    Deadband,
    Delay,
}

impl AlarmField {
    pub const ALL: [AlarmField; 4] = [
        AlarmField::Enabled,
        AlarmField::Setpoint,
        AlarmField::Deadband,
        AlarmField::Delay,
    ];

    fn index(self) -> usize {
        match self {
            Self::Enabled => 0,
            Self::Setpoint => 1,
            Self::Deadband => 2,
            Self::Delay => 3,
        }
    }
}

const ALARM_COLUMN_NAMES: [[&str; 4]; 4] = [
    ["HALM_EN", "HALM_SP", "HALM_DB", "HALM_DLY"],
    ["HWARN_EN", "HWARN_SP", "HWARN_DB", "HWARN_DLY"],
    ["LALM_EN", "LALM_SP", "LALM_DB", "LALM_DLY"],
    ["LWARN_EN", "LWARN_SP", "LWARN_DB", "LWARN_DLY"],
];

/// Value kind a column is coerced to before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
    Real,
    Flag,
}

/// One snapshot column of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    Id,
    Tag,
    FullDescription,
    EguLow,
    EguHigh,
    RawLow,
    RawHigh,
    Alarm(AlarmKind, AlarmField),
}

impl Column {
    /// All contract columns in snapshot header order.
    pub const ALL: [Column; 23] = [
        Column::Id,
        Column::Tag,
        Column::FullDescription,
        Column::EguLow,
        Column::EguHigh,
        Column::RawLow,
        Column::RawHigh,
        Column::Alarm(AlarmKind::HighAlarm, AlarmField::Enabled),
        Column::Alarm(AlarmKind::HighAlarm, AlarmField::Setpoint),
        Column::Alarm(AlarmKind::HighAlarm, AlarmField::Deadband),
        Column::Alarm(AlarmKind::HighAlarm, AlarmField::Delay),
        Column::Alarm(AlarmKind::HighWarning, AlarmField::Enabled),
        Column::Alarm(AlarmKind::HighWarning, AlarmField::Setpoint),
        Column::Alarm(AlarmKind::HighWarning, AlarmField::Deadband),
        Column::Alarm(AlarmKind::HighWarning, AlarmField::Delay),
        Column::Alarm(AlarmKind::LowAlarm, AlarmField::Enabled),
        Column::Alarm(AlarmKind::LowAlarm, AlarmField::Setpoint),
        Column::Alarm(AlarmKind::LowAlarm, AlarmField::Deadband),
        Column::Alarm(AlarmKind::LowAlarm, AlarmField::Delay),
        Column::Alarm(AlarmKind::LowWarning, AlarmField::Enabled),
        Column::Alarm(AlarmKind::LowWarning, AlarmField::Setpoint),
        Column::Alarm(AlarmKind::LowWarning, AlarmField::Deadband),
        Column::Alarm(AlarmKind::LowWarning, AlarmField::Delay),
    ];

    /// Literal header / store column name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Tag => "Tag",
            Self::FullDescription => "FullDescription",
            Self::EguLow => "EGULow",
            Self::EguHigh => "EGUHigh",
            Self::RawLow => "RawLow",
            Self::RawHigh => "RawHigh",
            Self::Alarm(kind, field) => ALARM_COLUMN_NAMES[kind.index()][field.index()],
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Self::Id => ColumnKind::Integer,
            Self::Tag | Self::FullDescription => ColumnKind::Text,
            Self::Alarm(_, AlarmField::Enabled) => ColumnKind::Flag,
            _ => ColumnKind::Real,
        }
    }

    /// Position of this column in `Column::ALL`.
    pub fn position(self) -> usize {
        match self {
            Self::Id => 0,
            Self::Tag => 1,
            Self::FullDescription => 2,
            Self::EguLow => 3,
            Self::EguHigh => 4,
            Self::RawLow => 5,
            Self::RawHigh => 6,
            Self::Alarm(kind, field) => 7 + kind.index() * 4 + field.index(),
        }
    }

    /// Whether the column is part of the composite `(ID, Tag)` key.
    pub fn is_key(self) -> bool {
        matches!(self, Self::Id | Self::Tag)
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|column| column.name() == name)
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// I/O class of an instrument; one snapshot section per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    DigitalInput,
    DigitalOutput,
    AnalogInput,
    AnalogOutput,
}

impl Category {
    /// Fixed section order; also the classification priority order.
    pub const ALL: [Category; 4] = [
        Category::DigitalInput,
        Category::DigitalOutput,
        Category::AnalogInput,
        Category::AnalogOutput,
    ];

    /// Section name, identical to the store flag column name.
    pub fn name(self) -> &'static str {
        match self {
            Self::DigitalInput => "DigitalInput",
            Self::DigitalOutput => "DigitalOutput",
            Self::AnalogInput => "AnalogInput",
            Self::AnalogOutput => "AnalogOutput",
        }
    }

    pub fn from_name(name: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|category| category.name() == name)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the contract header names in order.
pub fn header_names() -> impl Iterator<Item = &'static str> {
    Column::ALL.into_iter().map(Column::name)
}

/// Compares a header row against the contract.
///
/// Trailing empty cells are ignored since spreadsheet ranges may be wider
/// than the header. Any other difference (added, removed, reordered or
/// renamed column) is a mismatch.
pub fn header_matches<S: AsRef<str>>(cells: &[S]) -> bool {
    let used = cells
        .iter()
        .rposition(|cell| !cell.as_ref().is_empty())
        .map_or(0, |last| last + 1);
    used == Column::ALL.len()
        && cells[..used]
            .iter()
            .zip(header_names())
            .all(|(cell, expected)| cell.as_ref() == expected)
}
