// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The set of groups that receive alerts, persisted as `{"group_ids": [...]}`.
//!
//! One instance is shared between the command handlers (which add groups) and
//! the scheduler (which only reads), so a group enabled at runtime receives the
//! next periodic alert without a restart.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use renewbot_core::{DestinationId, RenewError};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
struct WhitelistFile {
    #[serde(default)]
    group_ids: Vec<DestinationId>,
}

#[derive(Debug)]
pub struct Whitelist {
    path: PathBuf,
    groups: RwLock<BTreeSet<DestinationId>>,
}

impl Whitelist {
    /// Loads the whitelist from `path`.
    ///
    /// A missing file yields an empty set. An unreadable or malformed file is
    /// logged and also yields an empty set; it is overwritten on the next save.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let groups = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => match serde_json::from_str::<WhitelistFile>(&contents) {
                Ok(file) => file.group_ids.into_iter().collect(),
                Err(e) => {
                    error!(path = %path.display(), error = %e, "invalid whitelist file, starting empty");
                    BTreeSet::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no whitelist file, starting empty");
                BTreeSet::new()
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to read whitelist, starting empty");
                BTreeSet::new()
            }
        };

        info!(groups = groups.len(), "whitelist loaded");
        Self::with_groups(path, groups)
    }

    /// Builds a whitelist without touching the filesystem.
    pub fn with_groups(path: impl Into<PathBuf>, groups: impl IntoIterator<Item = DestinationId>) -> Self {
        Self {
            path: path.into(),
            groups: RwLock::new(groups.into_iter().collect()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn contains(&self, group: DestinationId) -> bool {
        self.groups.read().await.contains(&group)
    }

    /// Snapshot of the enabled groups, in ascending id order.
    pub async fn destinations(&self) -> Vec<DestinationId> {
        self.groups.read().await.iter().copied().collect()
    }

    pub async fn len(&self) -> usize {
        self.groups.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.groups.read().await.is_empty()
    }

    /// Adds a group and persists the set.
    ///
    /// Returns `Ok(false)` if the group was already enabled. If saving fails
    /// the group is removed again so memory and disk stay in step.
    pub async fn enable(&self, group: DestinationId) -> Result<bool, RenewError> {
        let mut groups = self.groups.write().await;
        if !groups.insert(group) {
            return Ok(false);
        }

        if let Err(e) = save(&self.path, &groups).await {
            groups.remove(&group);
            return Err(e);
        }

        info!(%group, "group added to whitelist");
        Ok(true)
    }
}

async fn save(path: &Path, groups: &BTreeSet<DestinationId>) -> Result<(), RenewError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RenewError::Whitelist {
                message: format!("failed to create {}", parent.display()),
                source: Some(Box::new(e)),
            })?;
    }

    let file = WhitelistFile {
        group_ids: groups.iter().copied().collect(),
    };
    let json = serde_json::to_string_pretty(&file).map_err(|e| RenewError::Whitelist {
        message: "failed to serialize whitelist".into(),
        source: Some(Box::new(e)),
    })?;

    tokio::fs::write(path, json).await.map_err(|e| {
        warn!(path = %path.display(), error = %e, "failed to write whitelist");
        RenewError::Whitelist {
            message: format!("failed to write {}", path.display()),
            source: Some(Box::new(e)),
        }
    })?;

    info!(path = %path.display(), "whitelist saved");
    Ok(())
}
