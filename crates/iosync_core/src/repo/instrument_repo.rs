//! Instrument repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Read eligible records and single records by composite key.
//! - Issue targeted column updates keyed by `(ID, Tag)`.
//!
//! # Invariants
//! - Eligibility is `Type = 'IO'` with a non-empty `Tag`.
//! - Updates only ever touch the columns passed in; keys are never rewritten.
//! - Read paths reject values that cannot be coerced instead of masking them.

use crate::db::{ensure_instruments_ready, quote_identifier, DbError, DbResult};
use crate::model::instrument::{CategoryFlags, InstrumentKey, InstrumentRecord};
use crate::model::value::{
    coerce_integer, coerce_number, coerce_text, parse_flag, FieldRow, FieldValue,
};
use crate::schema::{Category, Column, INSTRUMENTS_TABLE, IO_TYPE, TYPE_COLUMN};
use once_cell::sync::Lazy;
use rusqlite::types::ValueRef;
use rusqlite::{params, params_from_iter, Connection, Row};

static INSTRUMENT_SELECT_SQL: Lazy<String> = Lazy::new(|| {
    let columns: Vec<String> = Column::ALL
        .into_iter()
        .map(Column::name)
        .chain(Category::ALL.into_iter().map(Category::name))
        .map(quote_identifier)
        .collect();
    format!(
        "SELECT {} FROM {}",
        columns.join(", "),
        quote_identifier(INSTRUMENTS_TABLE)
    )
});

/// Repository interface over the `Instruments` table.
pub trait InstrumentRepository {
    /// Lists eligible records ordered by `ID`.
    fn list_eligible(&self) -> DbResult<Vec<InstrumentRecord>>;
    /// Finds one record by exact composite key, regardless of eligibility.
    fn find_by_key(&self, key: &InstrumentKey) -> DbResult<Option<InstrumentRecord>>;
    /// Sets exactly `changes` on the keyed record; returns affected rows.
    fn update_fields(
        &self,
        key: &InstrumentKey,
        changes: &[(Column, FieldValue)],
    ) -> DbResult<usize>;
}

/// SQLite-backed instrument repository.
///
/// Borrows a plain connection or an open transaction (which derefs to one).
pub struct SqliteInstrumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteInstrumentRepository<'conn> {
    /// Constructs a repository after verifying the table shape.
    pub fn try_new(conn: &'conn Connection) -> DbResult<Self> {
        ensure_instruments_ready(conn)?;
        Ok(Self { conn })
    }
}

impl InstrumentRepository for SqliteInstrumentRepository<'_> {
    fn list_eligible(&self) -> DbResult<Vec<InstrumentRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE {} = ?1 AND {tag} IS NOT NULL AND {tag} <> '' ORDER BY {} ASC;",
            INSTRUMENT_SELECT_SQL.as_str(),
            quote_identifier(TYPE_COLUMN),
            quote_identifier(Column::Id.name()),
            tag = quote_identifier(Column::Tag.name()),
        ))?;

        let mut rows = stmt.query([IO_TYPE])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_instrument_row(row)?);
        }
        Ok(records)
    }

    fn find_by_key(&self, key: &InstrumentKey) -> DbResult<Option<InstrumentRecord>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "{} WHERE {} = ?1 AND {} = ?2;",
            INSTRUMENT_SELECT_SQL.as_str(),
            quote_identifier(Column::Id.name()),
            quote_identifier(Column::Tag.name()),
        ))?;

        let mut rows = stmt.query(params![key.id, key.tag.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_instrument_row(row)?));
        }
        Ok(None)
    }

    fn update_fields(
        &self,
        key: &InstrumentKey,
        changes: &[(Column, FieldValue)],
    ) -> DbResult<usize> {
        if changes.is_empty() {
            return Ok(0);
        }
        if let Some((column, _)) = changes.iter().find(|(column, _)| column.is_key()) {
            return Err(DbError::InvalidData(format!(
                "refusing to update key column {column} of {key}"
            )));
        }

        let assignments: Vec<String> = changes
            .iter()
            .enumerate()
            .map(|(index, (column, _))| {
                format!("{} = ?{}", quote_identifier(column.name()), index + 1)
            })
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{} AND {} = ?{};",
            quote_identifier(INSTRUMENTS_TABLE),
            assignments.join(", "),
            quote_identifier(Column::Id.name()),
            changes.len() + 1,
            quote_identifier(Column::Tag.name()),
            changes.len() + 2,
        );

        let bind_values = changes
            .iter()
            .map(|(_, value)| value.clone())
            .chain([
                FieldValue::Integer(key.id),
                FieldValue::Text(key.tag.clone()),
            ]);
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed)
    }
}

fn parse_instrument_row(row: &Row<'_>) -> DbResult<InstrumentRecord> {
    let mut fields = FieldRow::empty();
    for column in Column::ALL {
        let value = store_value(column, row.get_ref(column.name())?)?;
        fields.set(column, value);
    }

    if fields.get(Column::Id).is_null() {
        return Err(DbError::InvalidData(format!(
            "record with Tag `{}` has no ID",
            fields.get(Column::Tag)
        )));
    }

    let mut flags = CategoryFlags::default();
    for category in Category::ALL {
        flags.set(category, store_flag(category, row.get_ref(category.name())?)?);
    }

    Ok(InstrumentRecord { fields, flags })
}

fn store_value(column: Column, value: ValueRef<'_>) -> DbResult<FieldValue> {
    let coerced = match value {
        ValueRef::Null => Ok(FieldValue::Null),
        ValueRef::Integer(value) => Ok(coerce_integer(column, value)),
        ValueRef::Real(value) => coerce_number(column, value),
        ValueRef::Text(bytes) => coerce_text(column, &String::from_utf8_lossy(bytes)),
        ValueRef::Blob(_) => {
            return Err(DbError::InvalidData(format!(
                "blob value in {INSTRUMENTS_TABLE}.{column}"
            )))
        }
    };
    coerced.map_err(|err| DbError::InvalidData(format!("{INSTRUMENTS_TABLE}: {err}")))
}

fn store_flag(category: Category, value: ValueRef<'_>) -> DbResult<Option<bool>> {
    let invalid = |shown: String| {
        DbError::InvalidData(format!(
            "invalid flag value `{shown}` in {INSTRUMENTS_TABLE}.{category}"
        ))
    };
    match value {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(value) => Ok(Some(value != 0)),
        ValueRef::Real(value) => Ok(Some(value != 0.0)),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            if text.trim().is_empty() {
                return Ok(None);
            }
            parse_flag(&text).map(Some).ok_or_else(|| invalid(text.into_owned()))
        }
        ValueRef::Blob(bytes) => Err(invalid(format!("<{} bytes>", bytes.len()))),
    }
}
