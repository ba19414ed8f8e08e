use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use crate::errors::CoreError;
use crate::models::transaction::{
    Column, DroppedRow, InvalidCell, Ledger, Schema, Transaction,
};
use crate::models::window::midnight;
use crate::storage::source::{RawTable, TabularSource};

/// Timestamp layouts seen in ledger exports, tried in order.
const ROW_DATETIME_FORMATS: &[&str] = &[
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts; these yield midnight.
const ROW_DATE_FORMATS: &[&str] = &["%d.%m.%Y", "%Y-%m-%d"];

/// Turns raw tabular sources into typed ledgers.
///
/// Pure transformation apart from `load`, which reads the source first.
/// Rows whose operation date cannot be parsed are dropped and remembered in
/// `Ledger::dropped`; a bad payment date or amount only blanks that field
/// and is remembered in `Ledger::invalid_cells`.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Read `path` through `source` and normalize the result.
    pub fn load(&self, source: &dyn TabularSource, path: &str) -> Result<Ledger, CoreError> {
        let table = source.load(path)?;
        Ok(self.normalize(&table))
    }

    /// Map a raw table onto `Transaction`s using the detected header schema.
    pub fn normalize(&self, table: &RawTable) -> Ledger {
        let schema = Schema::detect(&table.headers);

        let positions: HashMap<Column, usize> = Column::ALL
            .iter()
            .filter_map(|&column| {
                schema
                    .header_candidates(column)
                    .iter()
                    .find_map(|name| table.column_index(name))
                    .map(|idx| (column, idx))
            })
            .collect();
        let columns: BTreeSet<Column> = positions.keys().copied().collect();

        let mut transactions = Vec::with_capacity(table.len());
        let mut dropped = Vec::new();
        let mut invalid_cells = Vec::new();

        if let Some(&date_idx) = positions.get(&Column::OperationDate) {
            let cell = |row: &[String], column: Column| -> Option<String> {
                let idx = *positions.get(&column)?;
                row.get(idx)
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            };

            for (i, row) in table.rows.iter().enumerate() {
                let raw_date = row.get(date_idx).map(|v| v.trim()).unwrap_or_default();
                let operation_date = match parse_timestamp(raw_date) {
                    Ok(ts) => ts,
                    Err(reason) => {
                        log::debug!("Dropping row {}: {reason}", i + 1);
                        dropped.push(DroppedRow { row: i + 1, reason });
                        continue;
                    }
                };

                let field = |column: Column| cell(row, column).map(|v| (i + 1, column, v));
                let payment_date = parse_field(
                    field(Column::PaymentDate),
                    |v| parse_timestamp(v).ok(),
                    &mut invalid_cells,
                );
                let amount = parse_field(field(Column::Amount), parse_amount, &mut invalid_cells);
                let cashback =
                    parse_field(field(Column::Cashback), parse_amount, &mut invalid_cells);

                transactions.push(Transaction {
                    operation_date,
                    payment_date,
                    amount,
                    category: cell(row, Column::Category),
                    card_id: cell(row, Column::Card),
                    description: cell(row, Column::Description),
                    cashback,
                });
            }
        }

        if !dropped.is_empty() {
            log::warn!(
                "Dropped {} of {} rows with unparsable operation dates",
                dropped.len(),
                table.len()
            );
        }
        log::info!(
            "Normalized {} transactions ({schema:?} schema, {} columns)",
            transactions.len(),
            columns.len()
        );

        Ledger {
            transactions,
            schema,
            columns,
            source_rows: table.len(),
            dropped,
            invalid_cells,
        }
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one optional cell, recording it when present but unparsable.
fn parse_field<T>(
    cell: Option<(usize, Column, String)>,
    parse: impl Fn(&str) -> Option<T>,
    invalid: &mut Vec<InvalidCell>,
) -> Option<T> {
    let (row, column, value) = cell?;
    let parsed = parse(&value);
    if parsed.is_none() {
        log::warn!("Row {row}: ignoring unparsable {column:?} value '{value}'");
        invalid.push(InvalidCell { row, column, value });
    }
    parsed
}

/// Parse a ledger timestamp in any of the supported layouts.
/// The error string names the offending value.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty date".to_string());
    }
    if let Some(ts) = ROW_DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
    {
        return Ok(ts);
    }
    ROW_DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        .map(midnight)
        .ok_or_else(|| format!("unrecognized date '{raw}'"))
}

/// Parse a money cell.
///
/// Spaces (including non-breaking ones) are thousands separators. When both
/// `,` and `.` appear, the one that comes last is the decimal separator and
/// the other groups thousands (`1,234.56`, `1.234,56`); a lone `,` is decimal.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    if compact.is_empty() {
        return None;
    }
    let normalized = match (compact.rfind(','), compact.rfind('.')) {
        (Some(comma), Some(dot)) if comma < dot => compact.replace(',', ""),
        (Some(_), Some(_)) => compact.replace('.', "").replace(',', "."),
        (Some(_), None) => compact.replace(',', "."),
        _ => compact,
    };
    Decimal::from_str(&normalized).ok()
}
