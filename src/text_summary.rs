//! Text summary builder for CLI output.
//!
//! Formats a finished run and its final snapshot as human-readable lines.

use crate::catalog;
use crate::model::{ItemStatus, JobStatus, RunOutcome, RunSummary, SnapshotView};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into())
}

/// Build a text summary from a finished run.
pub(crate) fn build_text_summary(summary: &RunSummary) -> TextSummary {
    let report = &summary.report;
    let info = catalog::info(report.algorithm);
    let mut lines = vec![
        format!("{}: {}", info.name, info.description),
        format!("Pace: {}", humantime::format_duration(summary.config.pace)),
    ];

    let outcome = match &report.outcome {
        RunOutcome::Completed => "completed".to_string(),
        RunOutcome::Aborted(reason) => format!("aborted ({reason})"),
        RunOutcome::Cancelled => "cancelled".to_string(),
    };
    lines.push(format!("Outcome: {outcome} after {} steps", summary.steps));
    lines.push(report.narration.clone());
    lines.push(format!(
        "Comparisons: {}  Swaps: {}  Profit/Value: {}  Weight: {}",
        report.stats.comparisons,
        report.stats.swaps,
        fmt_opt(report.stats.profit),
        fmt_opt(report.stats.weight)
    ));

    match summary.final_snapshot.as_ref().map(|s| &s.view) {
        Some(SnapshotView::Array(bars)) => {
            let values: Vec<String> = bars.iter().map(|b| b.value.to_string()).collect();
            lines.push(format!("Array: [{}]", values.join(", ")));
        }
        Some(SnapshotView::Jobs { jobs, slots }) => {
            let slots: Vec<String> = slots
                .iter()
                .enumerate()
                .map(|(i, s)| match s {
                    Some(job) => format!("t{}={}", i + 1, job.id),
                    None => format!("t{}=-", i + 1),
                })
                .collect();
            lines.push(format!("Slots: {}", slots.join(" ")));
            let rejected: Vec<&str> = jobs
                .iter()
                .filter(|j| j.status == JobStatus::Rejected)
                .map(|j| j.id.as_str())
                .collect();
            if !rejected.is_empty() {
                lines.push(format!("Rejected: {}", rejected.join(", ")));
            }
        }
        Some(SnapshotView::Knapsack {
            items,
            capacity,
            current_weight,
            total_value,
            ..
        }) => {
            lines.push(format!(
                "Knapsack: weight {current_weight:.2}/{capacity:.2}, value {total_value:.2}"
            ));
            for item in items {
                match (item.status, item.fraction) {
                    (ItemStatus::Taken, _) => lines.push(format!("  {} taken", item.id)),
                    (ItemStatus::FractionTaken, Some(f)) => {
                        lines.push(format!("  {} taken at fraction {f:.3}", item.id))
                    }
                    _ => {}
                }
            }
        }
        None => {}
    }

    TextSummary { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Algorithm, Job, RunConfig, RunReport, Snapshot, Stats};
    use std::time::Duration;

    #[test]
    fn job_summary_lists_slots_and_rejections() {
        let mut j1 = Job::new("J1", 100.0, 1);
        j1.status = JobStatus::Accepted;
        let mut j2 = Job::new("J2", 10.0, 1);
        j2.status = JobStatus::Rejected;
        let summary = RunSummary {
            config: RunConfig {
                pace: Duration::from_millis(500),
                target: None,
                capacity: 50.0,
            },
            report: RunReport {
                run_id: 1,
                algorithm: Algorithm::JobSequencing,
                outcome: RunOutcome::Completed,
                narration: "Scheduling complete! Final profit: 100".into(),
                stats: Stats {
                    comparisons: 2,
                    profit: Some(100.0),
                    ..Default::default()
                },
                timestamp_utc: String::new(),
            },
            steps: 6,
            final_snapshot: Some(Snapshot {
                run_id: 1,
                seq: 5,
                view: SnapshotView::Jobs {
                    jobs: vec![j1.clone(), j2],
                    slots: vec![Some(j1), None],
                },
                stats: Stats::default(),
                narration: String::new(),
            }),
        };

        let lines = build_text_summary(&summary).lines;
        assert!(lines[0].starts_with("Job Sequencing Problem"));
        assert!(lines.contains(&"Pace: 500ms".to_string()));
        assert!(lines.contains(&"Outcome: completed after 6 steps".to_string()));
        assert!(lines.contains(&"Slots: t1=J1 t2=-".to_string()));
        assert!(lines.contains(&"Rejected: J2".to_string()));
    }
}
