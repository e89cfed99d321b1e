use crate::catalog;
use crate::input;
use crate::model::{Algorithm, RunConfig, RunRequest, RunSummary, Snapshot, TraceEvent};
use crate::orchestrator::RunController;
use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;

const MIN_PACE: Duration = Duration::from_millis(50);
const MAX_PACE: Duration = Duration::from_millis(2000);

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "algo-trace",
    version,
    about = "Step-by-step traces of sorting, searching and greedy algorithms"
)]
pub struct Cli {
    /// Algorithm to trace
    #[arg(long, value_enum, default_value_t = Algorithm::Bubble)]
    pub algorithm: Algorithm,

    /// Input data: `64, 34, 25` for arrays, `profit,deadline;...` for jobs,
    /// `value,weight;...` for knapsack items. Defaults to a sample per algorithm.
    #[arg(long)]
    pub input: Option<String>,

    /// Generate random input instead of parsing --input
    #[arg(long, conflicts_with = "input")]
    pub random: bool,

    /// Value to look for (linear search)
    #[arg(long, default_value = "")]
    pub target: String,

    /// Knapsack capacity
    #[arg(long, default_value = catalog::DEFAULT_CAPACITY)]
    pub capacity: String,

    /// Delay between steps
    #[arg(long, default_value = "500ms")]
    pub pace: humantime::Duration,

    /// Accept a pace outside 50ms..2s
    #[arg(long)]
    pub no_clamp: bool,

    /// Print every trace event as a JSON line
    #[arg(long, conflicts_with = "json")]
    pub trace: bool,

    /// Print JSON summary and exit
    #[arg(long)]
    pub json: bool,

    /// Run silently: suppress all output except errors
    #[arg(long)]
    pub silent: bool,

    /// Number of consecutive runs; with --random each gets fresh input
    #[arg(long, default_value_t = 1)]
    pub repeat: usize,

    /// Export the run summary as JSON
    #[arg(long)]
    pub export_json: Option<std::path::PathBuf>,
}

pub async fn run(args: Cli) -> Result<()> {
    if args.silent && !args.json {
        return Err(anyhow::anyhow!(
            "--silent can only be used with --json. Use --silent --json together."
        ));
    }
    run_trace(args).await
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> RunConfig {
    let pace = Duration::from(args.pace);
    let pace = if args.no_clamp {
        pace
    } else {
        pace.clamp(MIN_PACE, MAX_PACE)
    };
    RunConfig {
        pace,
        target: input::parse_scalar(&args.target),
        capacity: input::parse_scalar(&args.capacity).unwrap_or(f64::NAN),
    }
}

/// Build the full run request, parsing or generating the input.
pub fn build_request<R: rand::Rng>(args: &Cli, rng: &mut R) -> RunRequest {
    let mut config = build_config(args);
    let input = if args.random {
        let (input, capacity) = input::random_input(args.algorithm, rng);
        if let Some(capacity) = capacity {
            config.capacity = capacity;
        }
        input
    } else {
        let text = args
            .input
            .as_deref()
            .unwrap_or_else(|| catalog::default_input(args.algorithm));
        input::parse_input(args.algorithm, text)
    };
    RunRequest {
        algorithm: args.algorithm,
        input,
        config,
    }
}

/// What the event consumer saw for one run.
#[derive(Default)]
struct Observed {
    steps: u64,
    last: Option<Snapshot>,
}

fn consume_events(
    mut evt_rx: mpsc::UnboundedReceiver<TraceEvent>,
    out_tx: Option<mpsc::UnboundedSender<OutputLine>>,
    trace: bool,
) -> tokio::task::JoinHandle<BTreeMap<u64, Observed>> {
    tokio::spawn(async move {
        let mut observed: BTreeMap<u64, Observed> = BTreeMap::new();
        while let Some(ev) = evt_rx.recv().await {
            if let Some(tx) = out_tx.as_ref() {
                let line = if trace {
                    serde_json::to_string(&ev).ok().map(OutputLine::Stdout)
                } else {
                    match &ev {
                        TraceEvent::RunStarted { algorithm, .. } => Some(OutputLine::Stderr(
                            format!("== {} ==", catalog::info(*algorithm).name),
                        )),
                        TraceEvent::Step(s) => Some(OutputLine::Stderr(s.narration.clone())),
                        // The final summary carries the outcome; idle resets are silent.
                        TraceEvent::RunFinished { .. } | TraceEvent::Idle { .. } => None,
                    }
                };
                if let Some(line) = line {
                    let _ = tx.send(line);
                }
            }
            if let TraceEvent::Step(s) = ev {
                let entry = observed.entry(s.run_id).or_default();
                entry.steps += 1;
                entry.last = Some(*s);
            }
        }
        observed
    })
}

async fn run_trace(args: Cli) -> Result<()> {
    let (out_tx, out_handle) = if args.silent {
        (None, None)
    } else {
        let (tx, handle) = spawn_output_writer();
        (Some(tx), Some(handle))
    };
    let (evt_tx, evt_rx) = mpsc::unbounded_channel::<TraceEvent>();
    let consumer = consume_events(evt_rx, out_tx.clone(), args.trace);

    let mut rng = rand::thread_rng();
    let mut controller = RunController::new(evt_tx);
    let mut finished = Vec::new();
    for _ in 0..args.repeat.max(1) {
        let request = build_request(&args, &mut rng);
        let config = request.config.clone();
        controller.restart(request).await;

        let (report, interrupted) = tokio::select! {
            report = controller.wait() => (report, false),
            _ = tokio::signal::ctrl_c() => (controller.reset().await, true),
        };
        if let Some(report) = report {
            finished.push((config, report));
        }
        if interrupted {
            break;
        }
    }
    tracing::debug!(state = ?controller.state(), runs = finished.len(), "trace loop done");
    // Dropping the controller closes the event channel so the consumer drains and exits.
    drop(controller);
    let mut observed = consumer.await.context("event consumer task failed")?;
    anyhow::ensure!(!finished.is_empty(), "run ended without a report");

    let summaries: Vec<RunSummary> = finished
        .into_iter()
        .map(|(config, report)| {
            let seen = observed.remove(&report.run_id).unwrap_or_default();
            RunSummary {
                config,
                report,
                steps: seen.steps,
                final_snapshot: seen.last,
            }
        })
        .collect();

    if let Some(p) = args.export_json.as_deref() {
        export_json(p, &summaries)?;
    }

    if let Some(tx) = out_tx.as_ref() {
        for summary in &summaries {
            if args.json {
                let out = serde_json::to_string_pretty(summary)?;
                let _ = tx.send(OutputLine::Stdout(out));
            } else if !args.trace {
                for line in crate::text_summary::build_text_summary(summary).lines {
                    let _ = tx.send(OutputLine::Stdout(line));
                }
            }
        }
        if let Some(p) = args.export_json.as_deref() {
            let _ = tx.send(OutputLine::Stderr(format!("Exported JSON: {}", p.display())));
        }
    }

    drop(out_tx);
    if let Some(handle) = out_handle {
        let _ = handle.await;
    }
    Ok(())
}

/// Write a single summary as an object, several as an array.
fn export_json(path: &std::path::Path, summaries: &[RunSummary]) -> Result<()> {
    let json = match summaries {
        [one] => serde_json::to_string_pretty(one)?,
        many => serde_json::to_string_pretty(many)?,
    };
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AlgorithmInput;
    use rand::SeedableRng;

    fn parse(argv: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("algo-trace").chain(argv.iter().copied()))
    }

    #[test]
    fn defaults_use_sample_input_and_clamped_pace() {
        let args = parse(&["--algorithm", "job-sequencing", "--pace", "10ms"]);
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let request = build_request(&args, &mut rng);
        assert_eq!(request.config.pace, MIN_PACE);
        assert_eq!(request.config.capacity, 50.0);
        match request.input {
            AlgorithmInput::Jobs(jobs) => assert_eq!(jobs.len(), 5),
            other => panic!("unexpected input {other:?}"),
        }
    }

    #[test]
    fn unparseable_target_and_capacity_reach_the_core_as_invalid() {
        let args = parse(&["--algorithm", "linear", "--target", "abc", "--capacity", "x"]);
        let config = build_config(&args);
        assert!(config.target.is_none());
        assert!(config.capacity.is_nan());
    }

    #[test]
    fn no_clamp_keeps_zero_pace() {
        let args = parse(&["--pace", "0s", "--no-clamp"]);
        assert_eq!(build_config(&args).pace, Duration::ZERO);
    }

    #[test]
    fn random_knapsack_overrides_capacity() {
        let args = parse(&["--algorithm", "knapsack", "--random"]);
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let request = build_request(&args, &mut rng);
        assert!((50.0..150.0).contains(&request.config.capacity));
    }

    #[tokio::test]
    async fn silent_json_run_exports_summary() {
        let dir = std::env::temp_dir().join(format!("algo-trace-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("summary.json");
        let args = parse(&[
            "--algorithm",
            "knapsack",
            "--pace",
            "0s",
            "--no-clamp",
            "--json",
            "--silent",
            "--export-json",
            path.to_str().unwrap(),
        ]);
        run(args).await.unwrap();

        let summary: RunSummary =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(summary.report.algorithm, Algorithm::Knapsack);
        assert!((summary.report.stats.profit.unwrap() - 240.0).abs() < 1e-9);
        assert!(summary.steps > 0);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn repeated_random_runs_export_one_summary_each() {
        let dir = std::env::temp_dir().join(format!("algo-trace-repeat-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("runs.json");
        let args = parse(&[
            "--random",
            "--repeat",
            "3",
            "--pace",
            "0s",
            "--no-clamp",
            "--json",
            "--silent",
            "--export-json",
            path.to_str().unwrap(),
        ]);
        run(args).await.unwrap();

        let summaries: Vec<RunSummary> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let ids: Vec<u64> = summaries.iter().map(|s| s.report.run_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(summaries.iter().all(|s| s.steps > 0));
        let _ = std::fs::remove_dir_all(dir);
    }
}
