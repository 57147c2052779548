//! Durable persistence of the known-vehicle set.
//!
//! `load` never fails: a missing or unreadable file degrades to an empty
//! state. `save` writes to a temporary file and renames it into place so a
//! crash mid-write never leaves a torn file behind.

use crate::model::{InventoryState, StateFile};
use chrono::Utc;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

pub const STATE_FILE_NAME: &str = "last_inventory.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct InventoryStore {
    path: PathBuf,
}

impl InventoryStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(STATE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last persisted state. Corruption is logged and treated as
    /// "no prior state".
    pub async fn load(&self) -> InventoryState {
        match self.try_load().await {
            Ok(Some(state)) => {
                info!(known = state.known.len(), "loaded inventory state");
                state
            }
            Ok(None) => InventoryState::default(),
            Err(err) => {
                warn!(?err, path = %self.path.display(), "unreadable state file; starting empty");
                InventoryState::default()
            }
        }
    }

    async fn try_load(&self) -> Result<Option<InventoryState>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let file: StateFile = serde_json::from_slice(&bytes)?;
        Ok(Some(file.into()))
    }

    /// Persist the full state, replacing whatever was there before.
    pub async fn save(&self, state: &InventoryState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut vehicles: Vec<String> = state.known.iter().cloned().collect();
        vehicles.sort();
        let file = StateFile {
            vehicles,
            last_update: state
                .last_update
                .unwrap_or_else(|| Utc::now().naive_utc()),
        };
        let bytes = serde_json::to_vec_pretty(&file)?;

        let tmp = self.path.with_extension("json.tmp");
        let mut out = tokio::fs::File::create(&tmp).await?;
        out.write_all(&bytes).await?;
        out.flush().await?;
        drop(out);
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
