// models/src/rows.rs

//! Row codec for the record store. Every record is persisted as one row of
//! string cells in a table whose first row holds the column headers, the same
//! layout a spreadsheet would hold.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::errors::{ValidationError, ValidationResult};
use crate::identifiers::{RecordId, RecordKind};

/// One stored row. Cell order follows the owning table's headers.
pub type Row = Vec<String>;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A record that maps onto one row of a named table.
pub trait TableRecord: Sized {
    /// Table (sheet) name.
    const TABLE: &'static str;
    /// Header row, in cell order.
    const HEADERS: &'static [&'static str];
    /// Collection the record's identity belongs to.
    const KIND: RecordKind;

    fn id(&self) -> RecordId;
    fn to_row(&self) -> Row;
    fn from_row(row: &[String]) -> ValidationResult<Self>;
}

/// Returns the cell at `index`, or an empty string when the row is short.
/// Trailing empty cells are commonly dropped by row stores.
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

pub(crate) fn required<'a>(
    row: &'a [String],
    index: usize,
    table: &'static str,
    headers: &'static [&'static str],
) -> ValidationResult<&'a str> {
    let value = cell(row, index);
    if value.trim().is_empty() {
        return Err(ValidationError::MissingCell { table, column: headers[index] });
    }
    Ok(value)
}

pub(crate) fn id_cell(row: &[String], index: usize, kind: RecordKind) -> ValidationResult<RecordId> {
    RecordId::parse_as(cell(row, index), kind)
}

pub fn parse_date(value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDateFormat(value.to_string()))
}

pub fn parse_time(value: &str) -> ValidationResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| ValidationError::InvalidTimeFormat(value.to_string()))
}

pub fn parse_timestamp(value: &str) -> ValidationResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT)
        .map_err(|_| ValidationError::InvalidTimestampFormat(value.to_string()))
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: &NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}
