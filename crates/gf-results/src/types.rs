//! Run record types.

use chrono::{DateTime, Utc};
use gf_sim::Snapshot;
use serde::{Deserialize, Serialize};

/// Metadata of one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunMeta {
    /// Content-hashed run ID (model + engine version).
    pub run_id: String,
    /// Model name the run was produced from.
    pub model_name: String,
    /// Engine version string baked into the hash.
    pub engine_version: String,
    /// UTC creation time.
    pub created_at: DateTime<Utc>,
    /// Engine tick, s.
    pub dt_s: f64,
    /// Snapshot decimation: every N-th tick is recorded.
    pub record_every: usize,
    /// Total ticks simulated.
    pub ticks: usize,
}

/// A recorded simulation run: metadata plus the snapshot series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunRecord {
    pub meta: RunMeta,
    pub series: Vec<Snapshot>,
}

impl RunRecord {
    /// Final snapshot of the run, if any ticks were recorded.
    pub fn last(&self) -> Option<&Snapshot> {
        self.series.last()
    }
}
