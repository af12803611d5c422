//! Per-conversation car context
//!
//! A session caches a snapshot of the car resolved in the current
//! conversation. It is never persisted and never shared between
//! conversations.

use serde::{Deserialize, Serialize};

use crate::registry::CarRecord;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    current: Option<CarRecord>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the resolved car with a new snapshot
    pub fn set_current(&mut self, record: CarRecord) {
        self.current = Some(record);
    }

    /// Forget the resolved car, e.g. when a conversation restarts
    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&CarRecord> {
        self.current.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.current
            .as_ref()
            .map_or(false, |record| !record.vin.is_empty())
    }

    /// Render the current car as `label: value` lines in VIN, make, model,
    /// year order. An unresolved session renders the labels with no values.
    pub fn describe(&self) -> String {
        match &self.current {
            Some(record) => format!(
                "vin: {}\nmake: {}\nmodel: {}\nyear: {}",
                record.vin, record.make, record.model, record.year
            ),
            None => "vin: \nmake: \nmodel: \nyear: ".to_string(),
        }
    }
}
