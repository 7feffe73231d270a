// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store trait for the tabular source of account rows.

use async_trait::async_trait;

use crate::error::RenewError;
use crate::traits::adapter::PluginAdapter;
use crate::types::RenewalStamp;

/// Adapter for the spreadsheet holding account rows.
///
/// Rows are 1-based and row 1 is the header. Cells are returned as strings,
/// trailing empty cells may be omitted by the backend.
#[async_trait]
pub trait RecordStore: PluginAdapter {
    /// Fetches all rows of a column range such as `A:I`.
    async fn fetch_range(&self, range: &str) -> Result<Vec<Vec<String>>, RenewError>;

    /// Fetches the `A:I` cells of one row, `None` if the row is empty.
    async fn fetch_row(&self, row_index: usize) -> Result<Option<Vec<String>>, RenewError>;

    /// Writes the renewal date into column G and time into column I of a row.
    async fn write_renewal(&self, row_index: usize, stamp: &RenewalStamp)
    -> Result<(), RenewError>;

    /// Locates a row by its column A value, ignoring case and surrounding whitespace.
    ///
    /// Lookup failures are logged and reported as `None`.
    async fn find_row_by_key(&self, key: &str) -> Option<usize> {
        match self.fetch_range("A:A").await {
            Ok(rows) => crate::record::locate_key(&rows, key),
            Err(e) => {
                tracing::error!(error = %e, key, "failed to look up row by key");
                None
            }
        }
    }
}
