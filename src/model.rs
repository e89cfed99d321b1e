use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    Bubble,
    Linear,
    JobSequencing,
    Knapsack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(with = "humantime_serde")]
    pub pace: Duration,
    /// Search target; `None` when the caller's text was not a number.
    #[serde(default)]
    pub target: Option<f64>,
    pub capacity: f64,
}

/// Already-parsed input handed to a runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlgorithmInput {
    Array(Vec<i64>),
    Jobs(Vec<Job>),
    Items(Vec<KnapsackItem>),
}

impl AlgorithmInput {
    pub fn len(&self) -> usize {
        match self {
            AlgorithmInput::Array(v) => v.len(),
            AlgorithmInput::Jobs(v) => v.len(),
            AlgorithmInput::Items(v) => v.len(),
        }
    }
}

/// Everything the controller needs to launch one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub algorithm: Algorithm,
    pub input: AlgorithmInput,
    pub config: RunConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarState {
    #[default]
    Default,
    Comparing,
    Swapping,
    Sorted,
    Found,
    Searching,
    Pivot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub value: i64,
    pub state: BarState,
}

impl Bar {
    pub fn new(value: i64) -> Self {
        Self {
            value,
            state: BarState::Default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Default,
    Processing,
    Accepted,
    Rejected,
}

/// Largest deadline a job may carry; the slot array is allocated up to this length.
pub const MAX_DEADLINE: u32 = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub profit: f64,
    /// In `1..=MAX_DEADLINE`; the input layer drops rows outside it.
    pub deadline: u32,
    pub status: JobStatus,
}

impl Job {
    pub fn new(id: impl Into<String>, profit: f64, deadline: u32) -> Self {
        Self {
            id: id.into(),
            profit,
            deadline,
            status: JobStatus::Default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Default,
    Considering,
    Taken,
    FractionTaken,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnapsackItem {
    pub id: String,
    pub value: f64,
    pub weight: f64,
    /// Fixed at construction, never recomputed.
    pub ratio: f64,
    pub status: ItemStatus,
    /// In (0, 1] once the item is taken; `None` otherwise.
    #[serde(default)]
    pub fraction: Option<f64>,
}

impl KnapsackItem {
    pub fn new(id: impl Into<String>, value: f64, weight: f64) -> Self {
        let ratio = if weight > 0.0 { value / weight } else { 0.0 };
        Self {
            id: id.into(),
            value,
            weight,
            ratio,
            status: ItemStatus::Default,
            fraction: None,
        }
    }
}

/// One entry of the knapsack: which item went in and how much of its weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnapsackEntry {
    pub item_id: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub comparisons: u64,
    pub swaps: u64,
    #[serde(default)]
    pub profit: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
}

/// The entity collection(s) captured by one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SnapshotView {
    Array(Vec<Bar>),
    Jobs {
        jobs: Vec<Job>,
        /// Index `i` holds the job scheduled at time `i + 1`.
        slots: Vec<Option<Job>>,
    },
    Knapsack {
        items: Vec<KnapsackItem>,
        content: Vec<KnapsackEntry>,
        capacity: f64,
        current_weight: f64,
        total_value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub run_id: u64,
    pub seq: u64,
    pub view: SnapshotView,
    pub stats: Stats,
    pub narration: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Completed,
    /// Rejected input; the run stopped before touching any entity.
    Aborted(String),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: u64,
    pub algorithm: Algorithm,
    pub outcome: RunOutcome,
    pub narration: String,
    pub stats: Stats,
    #[serde(default)]
    pub timestamp_utc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TraceEvent {
    RunStarted {
        run_id: u64,
        algorithm: Algorithm,
    },
    // Boxed to keep TraceEvent small; snapshots carry whole entity collections.
    Step(Box<Snapshot>),
    RunFinished {
        report: Box<RunReport>,
    },
    Idle {
        narration: String,
    },
}

/// Final, serializable record of a run for `--json` and `--export-json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub config: RunConfig,
    pub report: RunReport,
    pub steps: u64,
    pub final_snapshot: Option<Snapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_zero_for_weightless_items() {
        let item = KnapsackItem::new("I1", 10.0, 0.0);
        assert_eq!(item.ratio, 0.0);
        let item = KnapsackItem::new("I2", 60.0, 10.0);
        assert_eq!(item.ratio, 6.0);
        assert_eq!(item.status, ItemStatus::Default);
        assert!(item.fraction.is_none());
    }

    #[test]
    fn states_serialize_as_snake_case() {
        let s = serde_json::to_string(&ItemStatus::FractionTaken).unwrap();
        assert_eq!(s, "\"fraction_taken\"");
        let a = serde_json::to_string(&Algorithm::JobSequencing).unwrap();
        assert_eq!(a, "\"job-sequencing\"");
    }

    #[test]
    fn run_config_pace_roundtrips_as_humantime() {
        let cfg = RunConfig {
            pace: Duration::from_millis(500),
            target: Some(25.0),
            capacity: 50.0,
        };
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["pace"], "500ms");
    }
}
