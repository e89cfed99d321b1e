//! Raw text to typed input conversion, plus random input generation.
//!
//! Malformed tokens and rows are dropped here, so the engine only ever sees
//! well-formed collections.

use crate::model::{Algorithm, AlgorithmInput, Job, KnapsackItem, MAX_DEADLINE};
use rand::Rng;

fn parse_int(token: &str) -> Option<i64> {
    token.trim().parse().ok()
}

fn parse_number(token: &str) -> Option<f64> {
    token.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Comma-separated integers, e.g. `64, 34, 25`.
pub fn parse_array(text: &str) -> Vec<i64> {
    text.split(',').filter_map(parse_int).collect()
}

/// Semicolon-separated `profit,deadline` rows. Ids follow row position,
/// including rows that are later dropped. A deadline outside `1..=MAX_DEADLINE`
/// drops its row.
pub fn parse_jobs(text: &str) -> Vec<Job> {
    text.split(';')
        .enumerate()
        .filter_map(|(idx, row)| {
            let mut fields = row.split(',');
            let profit = parse_number(fields.next()?)?;
            let deadline: u32 = fields.next()?.trim().parse().ok()?;
            (1..=MAX_DEADLINE)
                .contains(&deadline)
                .then(|| Job::new(format!("J{}", idx + 1), profit, deadline))
        })
        .collect()
}

/// Semicolon-separated `value,weight` rows; negative weights are dropped.
pub fn parse_items(text: &str) -> Vec<KnapsackItem> {
    text.split(';')
        .enumerate()
        .filter_map(|(idx, row)| {
            let mut fields = row.split(',');
            let value = parse_number(fields.next()?)?;
            let weight = parse_number(fields.next()?)?;
            (weight >= 0.0).then(|| KnapsackItem::new(format!("I{}", idx + 1), value, weight))
        })
        .collect()
}

pub fn parse_input(algorithm: Algorithm, text: &str) -> AlgorithmInput {
    match algorithm {
        Algorithm::Bubble | Algorithm::Linear => AlgorithmInput::Array(parse_array(text)),
        Algorithm::JobSequencing => AlgorithmInput::Jobs(parse_jobs(text)),
        Algorithm::Knapsack => AlgorithmInput::Items(parse_items(text)),
    }
}

/// Lenient numeric parse for the search target and capacity; `None` if unparseable.
pub fn parse_scalar(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

/// Random input for `algorithm`. Knapsack also yields a random capacity.
pub fn random_input<R: Rng>(algorithm: Algorithm, rng: &mut R) -> (AlgorithmInput, Option<f64>) {
    match algorithm {
        Algorithm::Bubble | Algorithm::Linear => {
            let size = rng.gen_range(8..18);
            let values = (0..size).map(|_| rng.gen_range(1..=100)).collect();
            (AlgorithmInput::Array(values), None)
        }
        Algorithm::JobSequencing => {
            let count = rng.gen_range(5..10);
            let max_deadline = ((count as f64 * 0.7) as u32).max(1);
            let jobs = (0..count)
                .map(|i| {
                    let profit = rng.gen_range(10..100) as f64;
                    let deadline = rng.gen_range(1..=max_deadline);
                    Job::new(format!("J{}", i + 1), profit, deadline)
                })
                .collect();
            (AlgorithmInput::Jobs(jobs), None)
        }
        Algorithm::Knapsack => {
            let count = rng.gen_range(4..9);
            let items = (0..count)
                .map(|i| {
                    let value = rng.gen_range(20..120) as f64;
                    let weight = rng.gen_range(10..50) as f64;
                    KnapsackItem::new(format!("I{}", i + 1), value, weight)
                })
                .collect();
            let capacity = rng.gen_range(50..150) as f64;
            (AlgorithmInput::Items(items), Some(capacity))
        }
    }
}
