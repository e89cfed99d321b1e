mod bubble_sort;
mod job_sequencing;
mod knapsack;
mod linear_search;

use crate::model::{
    Algorithm, AlgorithmInput, RunConfig, RunOutcome, RunReport, RunRequest, Snapshot,
    SnapshotView, Stats, TraceEvent,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Longest stretch a pacing delay sleeps before re-checking the cancel flag.
const CANCEL_POLL: Duration = Duration::from_millis(25);

/// Pace multiplier for major transitions (sort marks, slot assignments, item resolution).
pub(crate) const MAJOR: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RunError {
    #[error("Invalid search value.")]
    InvalidSearchTarget,
    #[error("Invalid knapsack capacity: {0}.")]
    InvalidCapacity(f64),
    #[error("{algorithm:?} cannot run over {input} input.")]
    InputMismatch {
        algorithm: Algorithm,
        input: &'static str,
    },
    #[error("Deadline {0} exceeds the limit of {max}.", max = crate::model::MAX_DEADLINE)]
    DeadlineTooLarge(u32),
    #[error("Run cancelled.")]
    Cancelled,
}

/// Run-scoped state owned by exactly one runner: step counter, statistics,
/// pacing and the publishing side of the event channel.
pub(crate) struct RunContext {
    run_id: u64,
    seq: u64,
    pace: Duration,
    pub stats: Stats,
    event_tx: mpsc::UnboundedSender<TraceEvent>,
    cancel: Arc<AtomicBool>,
}

impl RunContext {
    pub(crate) fn new(
        run_id: u64,
        pace: Duration,
        event_tx: mpsc::UnboundedSender<TraceEvent>,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self {
            run_id,
            seq: 0,
            pace,
            stats: Stats::default(),
            event_tx,
            cancel,
        }
    }

    pub(crate) fn steps(&self) -> u64 {
        self.seq
    }

    fn check_cancelled(&self) -> Result<(), RunError> {
        if self.cancel.load(Ordering::Relaxed) {
            Err(RunError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Publish one step. `view` must already be a copy of the working state.
    pub(crate) fn publish(
        &mut self,
        view: SnapshotView,
        narration: impl Into<String>,
    ) -> Result<(), RunError> {
        self.check_cancelled()?;
        let snapshot = Snapshot {
            run_id: self.run_id,
            seq: self.seq,
            view,
            stats: self.stats,
            narration: narration.into(),
        };
        self.seq += 1;
        // A dropped observer does not stop the run.
        let _ = self.event_tx.send(TraceEvent::Step(Box::new(snapshot)));
        Ok(())
    }

    /// Wait `factor` pace units, returning early with `Cancelled` if the run is aborted.
    pub(crate) async fn pace(&self, factor: f64) -> Result<(), RunError> {
        self.check_cancelled()?;
        let total = self.pace.mul_f64(factor);
        if total.is_zero() {
            tokio::task::yield_now().await;
            return self.check_cancelled();
        }
        let deadline = Instant::now() + total;
        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            tokio::time::sleep((deadline - now).min(CANCEL_POLL)).await;
            self.check_cancelled()?;
        }
        Ok(())
    }
}

/// Format a number without a trailing `.0` for whole values.
pub(crate) fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v:.2}")
    }
}

pub struct TraceEngine {
    run_id: u64,
    request: RunRequest,
}

impl TraceEngine {
    pub fn new(run_id: u64, request: RunRequest) -> Self {
        Self { run_id, request }
    }

    /// Drive the selected runner to completion, cancellation or rejection.
    /// Never fails: every termination is folded into the returned report.
    pub async fn run(
        self,
        event_tx: mpsc::UnboundedSender<TraceEvent>,
        cancel: Arc<AtomicBool>,
    ) -> RunReport {
        let RunRequest {
            algorithm,
            input,
            config,
        } = self.request;
        let RunConfig {
            pace,
            target,
            capacity,
        } = config;

        if !cancel.load(Ordering::Relaxed) {
            let _ = event_tx.send(TraceEvent::RunStarted {
                run_id: self.run_id,
                algorithm,
            });
        }

        let mut ctx = RunContext::new(self.run_id, pace, event_tx, cancel);
        let result = match (algorithm, input) {
            (Algorithm::Bubble, AlgorithmInput::Array(values)) => {
                bubble_sort::run(&mut ctx, &values).await
            }
            (Algorithm::Linear, AlgorithmInput::Array(values)) => {
                linear_search::run(&mut ctx, &values, target).await
            }
            (Algorithm::JobSequencing, AlgorithmInput::Jobs(jobs)) => {
                job_sequencing::run(&mut ctx, jobs).await
            }
            (Algorithm::Knapsack, AlgorithmInput::Items(items)) => {
                knapsack::run(&mut ctx, items, capacity).await
            }
            (algorithm, input) => Err(RunError::InputMismatch {
                algorithm,
                input: match input {
                    AlgorithmInput::Array(_) => "array",
                    AlgorithmInput::Jobs(_) => "job",
                    AlgorithmInput::Items(_) => "item",
                },
            }),
        };

        let (outcome, narration) = match result {
            Ok(narration) => (RunOutcome::Completed, narration),
            Err(RunError::Cancelled) => {
                tracing::debug!(run_id = self.run_id, steps = ctx.steps(), "run cancelled");
                (RunOutcome::Cancelled, RunError::Cancelled.to_string())
            }
            Err(e) => {
                tracing::warn!(run_id = self.run_id, "run aborted: {e}");
                (RunOutcome::Aborted(e.to_string()), e.to_string())
            }
        };
        tracing::debug!(run_id = self.run_id, ?outcome, steps = ctx.steps(), "run finished");

        RunReport {
            run_id: self.run_id,
            algorithm,
            outcome,
            narration,
            stats: ctx.stats,
            timestamp_utc: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "now".into()),
        }
    }
}
