// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock record store for deterministic testing.
//!
//! `MockStore` keeps a sheet in memory (row 1 at index 0), records every
//! renewal write, and can be switched into failing reads or writes.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use renewbot_core::record::{EXPIRY_COLUMN, MIN_COLUMNS};
use renewbot_core::traits::{PluginAdapter, RecordStore};
use renewbot_core::types::{AdapterType, HealthStatus, RenewalStamp};
use renewbot_core::RenewError;

/// Column G, where the renewal date lands.
const RENEWAL_DATE_COLUMN: usize = 6;

/// Builds a full `A:I` row with the given key, secret, category,
/// remaining-days, and expiry cells. Unused columns are empty.
pub fn sheet_row(
    key: &str,
    secret: &str,
    category: &str,
    remaining: &str,
    expiry: &str,
) -> Vec<String> {
    let mut row = vec![String::new(); MIN_COLUMNS];
    row[0] = key.to_string();
    row[1] = secret.to_string();
    row[2] = category.to_string();
    row[7] = remaining.to_string();
    row[8] = expiry.to_string();
    row
}

pub struct MockStore {
    rows: Mutex<Vec<Vec<String>>>,
    writes: Mutex<Vec<(usize, RenewalStamp)>>,
    fail_fetches: AtomicBool,
    fail_writes: AtomicBool,
}

impl MockStore {
    /// Creates a store whose first element is sheet row 1 (the header).
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: Mutex::new(rows),
            writes: Mutex::new(Vec::new()),
            fail_fetches: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Replaces the sheet contents.
    pub fn set_rows(&self, rows: Vec<Vec<String>>) {
        *self.rows.lock().expect("rows lock poisoned") = rows;
    }

    /// Snapshot of the current sheet contents.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().expect("rows lock poisoned").clone()
    }

    /// Every successful `write_renewal` call, in order.
    pub fn writes(&self) -> Vec<(usize, RenewalStamp)> {
        self.writes.lock().expect("writes lock poisoned").clone()
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_fetch(&self) -> Result<(), RenewError> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(RenewError::store("mock fetch failure"));
        }
        Ok(())
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl PluginAdapter for MockStore {
    fn name(&self) -> &str {
        "mock-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::RecordStore
    }

    async fn health_check(&self) -> Result<HealthStatus, RenewError> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Unhealthy("fetches failing".into()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RenewError> {
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MockStore {
    /// `A:A` yields only the key column; any other range yields whole rows.
    async fn fetch_range(&self, range: &str) -> Result<Vec<Vec<String>>, RenewError> {
        self.check_fetch()?;
        let rows = self.rows();
        if range == "A:A" {
            return Ok(rows
                .into_iter()
                .map(|row| row.into_iter().take(1).collect())
                .collect());
        }
        Ok(rows)
    }

    async fn fetch_row(&self, row_index: usize) -> Result<Option<Vec<String>>, RenewError> {
        self.check_fetch()?;
        let rows = self.rows.lock().expect("rows lock poisoned");
        Ok(row_index
            .checked_sub(1)
            .and_then(|i| rows.get(i))
            .filter(|row| !row.is_empty())
            .cloned())
    }

    async fn write_renewal(&self, row_index: usize, stamp: &RenewalStamp) -> Result<(), RenewError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RenewError::store("mock write failure"));
        }

        {
            let mut rows = self.rows.lock().expect("rows lock poisoned");
            if let Some(row) = row_index.checked_sub(1).and_then(|i| rows.get_mut(i)) {
                if row.len() < MIN_COLUMNS {
                    row.resize(MIN_COLUMNS, String::new());
                }
                row[RENEWAL_DATE_COLUMN] = stamp.date.clone();
                row[EXPIRY_COLUMN] = stamp.time.clone();
            }
        }

        self.writes
            .lock()
            .expect("writes lock poisoned")
            .push((row_index, stamp.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MockStore {
        MockStore::new(vec![
            sheet_row("Email", "Password", "Type", "Days", "Expiry"),
            sheet_row("a@x.com", "p1", "Office 365", "0", "21:00:00"),
        ])
    }

    #[tokio::test]
    async fn key_column_range_is_narrowed() {
        let keys = store().fetch_range("A:A").await.unwrap();
        assert_eq!(keys, vec![vec!["Email".to_string()], vec!["a@x.com".to_string()]]);
    }

    #[tokio::test]
    async fn fetch_row_is_one_based() {
        let store = store();
        assert_eq!(store.fetch_row(2).await.unwrap().unwrap()[0], "a@x.com");
        assert!(store.fetch_row(0).await.unwrap().is_none());
        assert!(store.fetch_row(9).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_updates_row_and_is_recorded() {
        let store = store();
        let stamp = RenewalStamp {
            date: "2026-10-19".into(),
            time: "09:00:00".into(),
        };
        store.write_renewal(2, &stamp).await.unwrap();

        let row = &store.rows()[1];
        assert_eq!(row[RENEWAL_DATE_COLUMN], "2026-10-19");
        assert_eq!(row[EXPIRY_COLUMN], "09:00:00");
        assert_eq!(store.writes(), vec![(2, stamp)]);
    }

    #[tokio::test]
    async fn failure_switches() {
        let store = store();
        store.fail_fetches(true);
        assert!(store.fetch_range("A:I").await.is_err());
        assert_eq!(store.find_row_by_key("a@x.com").await, None);

        store.fail_fetches(false);
        assert_eq!(store.find_row_by_key("  A@X.COM ").await, Some(2));

        store.fail_writes(true);
        let stamp = RenewalStamp {
            date: "2026-10-19".into(),
            time: "09:00:00".into(),
        };
        assert!(store.write_renewal(2, &stamp).await.is_err());
        assert!(store.writes().is_empty());
    }
}
