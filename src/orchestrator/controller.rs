//! Run lifecycle controller.
//!
//! Owns start/reset/restart orchestration and emits events for presentation layers.

use crate::catalog::IDLE_NARRATION;
use crate::engine::TraceEngine;
use crate::model::{Algorithm, RunOutcome, RunReport, RunRequest, Stats, TraceEvent};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::{JoinError, JoinHandle};

/// `Completed` and `Cancelled` hold until the next `start` or `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// Internal handle for a running trace task.
struct RunCtx {
    run_id: u64,
    algorithm: Algorithm,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<RunReport>,
}

pub(crate) struct RunController {
    event_tx: UnboundedSender<TraceEvent>,
    state: RunState,
    active: Option<RunCtx>,
    next_run_id: u64,
}

impl RunController {
    pub(crate) fn new(event_tx: UnboundedSender<TraceEvent>) -> Self {
        Self {
            event_tx,
            state: RunState::Idle,
            active: None,
            next_run_id: 1,
        }
    }

    pub(crate) fn state(&self) -> RunState {
        self.state
    }

    /// Launch a run. Returns `false` without side effects if one is already active.
    pub(crate) fn start(&mut self, request: RunRequest) -> bool {
        if let Some(ctx) = &self.active {
            tracing::info!(run_id = ctx.run_id, "run already active; ignoring start");
            return false;
        }

        let run_id = self.next_run_id;
        self.next_run_id += 1;
        let algorithm = request.algorithm;
        tracing::info!(
            run_id,
            ?algorithm,
            input_len = request.input.len(),
            pace = ?request.config.pace,
            "starting run"
        );

        let cancel = Arc::new(AtomicBool::new(false));
        let engine = TraceEngine::new(run_id, request);
        let event_tx = self.event_tx.clone();
        let cancel2 = cancel.clone();
        let handle = tokio::spawn(async move { engine.run(event_tx, cancel2).await });

        self.active = Some(RunCtx {
            run_id,
            algorithm,
            cancel,
            handle,
        });
        self.state = RunState::Running;
        true
    }

    /// Await the active run and publish its report. Returns `None` when idle.
    ///
    /// Safe to use inside `select!`: the handle is only released once the run
    /// has actually finished.
    pub(crate) async fn wait(&mut self) -> Option<RunReport> {
        let joined = match self.active.as_mut() {
            Some(ctx) => (&mut ctx.handle).await,
            None => return None,
        };
        let ctx = self.active.take()?;
        Some(self.finish(ctx, joined))
    }

    fn finish(&mut self, ctx: RunCtx, joined: Result<RunReport, JoinError>) -> RunReport {
        let report = joined.unwrap_or_else(|e| {
            tracing::warn!(run_id = ctx.run_id, "run task failed: {e}");
            RunReport {
                run_id: ctx.run_id,
                algorithm: ctx.algorithm,
                outcome: RunOutcome::Aborted(format!("Run failed: {e}")),
                narration: format!("Run failed: {e}"),
                stats: Stats::default(),
                timestamp_utc: String::new(),
            }
        });

        self.state = match report.outcome {
            RunOutcome::Cancelled => RunState::Cancelled,
            _ => RunState::Completed,
        };
        tracing::info!(run_id = ctx.run_id, state = ?self.state, "run finished");
        let _ = self.event_tx.send(TraceEvent::RunFinished {
            report: Box::new(report.clone()),
        });
        report
    }

    /// Ask the active run to stop at its next step or pacing slice. Does not join;
    /// `wait` then reports it as cancelled.
    pub(crate) fn cancel(&self) {
        if let Some(ctx) = &self.active {
            tracing::info!(run_id = ctx.run_id, "cancelling run");
            ctx.cancel.store(true, Ordering::Relaxed);
        }
    }

    /// Cancel the active run, if any, wait for it to stop, then publish the idle narration.
    /// Returns the report of the run that was interrupted.
    pub(crate) async fn reset(&mut self) -> Option<RunReport> {
        self.cancel();
        // Joining before publishing Idle keeps the old run's steps strictly ahead of it.
        let interrupted = self.wait().await;
        self.state = RunState::Idle;
        let _ = self.event_tx.send(TraceEvent::Idle {
            narration: IDLE_NARRATION.to_string(),
        });
        interrupted
    }

    /// Cancel whatever is running and start `request` in its place.
    pub(crate) async fn restart(&mut self, request: RunRequest) -> bool {
        self.reset().await;
        self.start(request)
    }
}
