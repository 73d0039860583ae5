//! End-of-batch report.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::state::EntityState;

/// Terminal state of one entity in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityOutcome {
    pub entity_id: String,
    #[serde(flatten)]
    pub state: EntityState,
}

/// Result of a complete single or batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Outcomes in processing order.
    pub outcomes: Vec<EntityOutcome>,
}

impl BatchReport {
    /// Entities that went through both stages.
    pub fn succeeded(&self) -> Vec<&str> {
        self.with_state(|s| matches!(s, EntityState::Succeeded))
    }

    /// Entities whose processing or summarization stage failed.
    pub fn failed(&self) -> Vec<&str> {
        self.with_state(|s| matches!(s, EntityState::Failed { .. }))
    }

    /// Entities whose processing stage extracted nothing.
    pub fn empty(&self) -> Vec<&str> {
        self.with_state(|s| matches!(s, EntityState::EmptyResult))
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o.state, EntityState::Succeeded))
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    fn with_state(&self, pred: impl Fn(&EntityState) -> bool) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| pred(&o.state))
            .map(|o| o.entity_id.as_str())
            .collect()
    }

    /// Human-readable summary listing failed and empty entities.
    pub fn render_summary(&self) -> String {
        let mut out = String::from("=== Summary Report ===\n");

        let failed = self.failed();
        if failed.is_empty() {
            out.push_str("No APK failed to process.\n");
        } else {
            out.push_str(&format!("APKs that failed to process ({}):\n", failed.len()));
            for apk in failed {
                out.push_str(&format!("   - {apk}\n"));
            }
        }

        let empty = self.empty();
        if empty.is_empty() {
            out.push_str("All APKs had extracted bytecode.\n");
        } else {
            out.push_str(&format!("APKs with no bytecode extracted ({}):\n", empty.len()));
            for apk in empty {
                out.push_str(&format!("   - {apk}\n"));
            }
        }
        out
    }

    /// Write the report as JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        leakjudge_core::write_json_atomic(path, self)?;
        Ok(())
    }
}
