use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One candidate listing extracted from the inventory page during a single
/// poll. Immutable once constructed; ids are compared, records discarded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VehicleRecord {
    pub id: String,
    pub model: String,
    pub details: String,
    pub url: String,
}

/// The durable record of vehicle ids already notified about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryState {
    pub known: HashSet<String>,
    pub last_update: Option<NaiveDateTime>,
}

impl InventoryState {
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

/// On-disk layout of `last_inventory.json`. Kept byte-compatible with the
/// first bot version's file so existing deployments carry their state over.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateFile {
    pub vehicles: Vec<String>,
    pub last_update: NaiveDateTime,
}

impl From<StateFile> for InventoryState {
    fn from(file: StateFile) -> Self {
        Self {
            known: file.vehicles.into_iter().collect(),
            last_update: Some(file.last_update),
        }
    }
}
