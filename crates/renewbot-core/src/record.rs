// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed view of one spreadsheet row.
//!
//! Rows arrive from the record store as positional string cells. Parsing
//! happens once, here, so that the alert engine only ever sees rows with a
//! key, an integer countdown, and an expiry clock. Anything else is skipped,
//! never reported as an error.

/// Column A: account key.
pub const KEY_COLUMN: usize = 0;
/// Column B: credential surfaced in the alert.
pub const SECRET_COLUMN: usize = 1;
/// Column C: free-text category, drives template selection.
pub const CATEGORY_COLUMN: usize = 2;
/// Column H: remaining-days countdown.
pub const REMAINING_COLUMN: usize = 7;
/// Column I: `HH:MM:SS` expiry time-of-day.
pub const EXPIRY_COLUMN: usize = 8;

/// Rows with fewer cells than this are ignored.
pub const MIN_COLUMNS: usize = 9;

/// Range covering every column the engine reads.
pub const DATA_RANGE: &str = "A:I";

/// One account row, 1-based `row_index` as in the source sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub row_index: usize,
    pub key: String,
    pub secret: String,
    pub category: String,
    pub remaining: i64,
    pub expiry_clock: String,
}

impl Record {
    /// Parses a single row.
    ///
    /// Returns `None` when the row is too short, when the key, countdown, or
    /// expiry cell is empty, or when the countdown is not an integer.
    pub fn from_cells(row_index: usize, cells: &[String]) -> Option<Self> {
        if cells.len() < MIN_COLUMNS {
            return None;
        }

        let key = &cells[KEY_COLUMN];
        let remaining_raw = &cells[REMAINING_COLUMN];
        let expiry_clock = &cells[EXPIRY_COLUMN];

        if key.is_empty() || remaining_raw.is_empty() || expiry_clock.is_empty() {
            return None;
        }

        let remaining = remaining_raw.trim().parse::<i64>().ok()?;

        Some(Self {
            row_index,
            key: key.clone(),
            secret: cells[SECRET_COLUMN].clone(),
            category: cells[CATEGORY_COLUMN].clone(),
            remaining,
            expiry_clock: expiry_clock.clone(),
        })
    }
}

/// Parses a full fetch result, skipping the header row and every row that
/// does not parse. Output is in ascending row order.
pub fn parse_rows(rows: &[Vec<String>]) -> Vec<Record> {
    rows.iter()
        .enumerate()
        .map(|(i, cells)| (i + 1, cells))
        .filter(|(row_index, _)| *row_index > 1)
        .filter_map(|(row_index, cells)| Record::from_cells(row_index, cells))
        .collect()
}

/// Finds the 1-based index of the first row whose column A matches `key`,
/// ignoring case and surrounding whitespace.
pub fn locate_key(rows: &[Vec<String>], key: &str) -> Option<usize> {
    let wanted = key.trim().to_lowercase();
    rows.iter()
        .position(|cells| {
            cells
                .first()
                .is_some_and(|cell| cell.trim().to_lowercase() == wanted)
        })
        .map(|i| i + 1)
}
