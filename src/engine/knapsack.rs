use super::{fmt_num, RunContext, RunError, MAJOR};
use crate::model::{ItemStatus, KnapsackEntry, KnapsackItem, SnapshotView};

struct Sack {
    capacity: f64,
    current_weight: f64,
    total_value: f64,
    content: Vec<KnapsackEntry>,
}

impl Sack {
    fn view(&self, items: &[KnapsackItem]) -> SnapshotView {
        SnapshotView::Knapsack {
            items: items.to_vec(),
            content: self.content.clone(),
            capacity: self.capacity,
            current_weight: self.current_weight,
            total_value: self.total_value,
        }
    }
}

/// Ratio-greedy fractional knapsack. At most one item ends up partially taken.
pub(crate) async fn run(
    ctx: &mut RunContext,
    mut items: Vec<KnapsackItem>,
    capacity: f64,
) -> Result<String, RunError> {
    if !(capacity.is_finite() && capacity > 0.0) {
        return Err(RunError::InvalidCapacity(capacity));
    }
    for item in items.iter_mut() {
        item.status = ItemStatus::Default;
        item.fraction = None;
    }

    let mut sack = Sack {
        capacity,
        current_weight: 0.0,
        total_value: 0.0,
        content: Vec::new(),
    };

    items.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));
    ctx.publish(
        sack.view(&items),
        "Sorting items by value-to-weight ratio (descending)...",
    )?;
    ctx.pace(MAJOR).await?;

    for idx in 0..items.len() {
        items[idx].status = ItemStatus::Considering;
        let item = items[idx].clone();
        ctx.publish(
            sack.view(&items),
            format!(
                "Considering item {} (value: {}, weight: {}, ratio: {:.2})",
                item.id,
                fmt_num(item.value),
                fmt_num(item.weight),
                item.ratio
            ),
        )?;
        ctx.pace(1.0).await?;

        let remaining = capacity - sack.current_weight;
        let narration = if sack.current_weight + item.weight <= capacity {
            sack.current_weight += item.weight;
            sack.total_value += item.value;
            items[idx].status = ItemStatus::Taken;
            items[idx].fraction = Some(1.0);
            sack.content.push(KnapsackEntry {
                item_id: item.id.clone(),
                weight: item.weight,
            });
            format!("Taking all of item {}.", item.id)
        } else if remaining > 0.0 {
            // Here item.weight > remaining, so the fraction is in (0, 1).
            let fraction = remaining / item.weight;
            sack.total_value += item.value * fraction;
            sack.current_weight += remaining;
            items[idx].status = ItemStatus::FractionTaken;
            items[idx].fraction = Some(fraction);
            sack.content.push(KnapsackEntry {
                item_id: item.id.clone(),
                weight: remaining,
            });
            format!("Taking {fraction:.2} of item {}.", item.id)
        } else {
            items[idx].status = ItemStatus::Default;
            format!("Knapsack is full. Can't take item {}.", item.id)
        };

        ctx.stats.profit = Some(sack.total_value);
        ctx.stats.weight = Some(sack.current_weight);
        ctx.publish(sack.view(&items), narration)?;
        ctx.pace(MAJOR).await?;

        if sack.current_weight >= capacity {
            ctx.publish(sack.view(&items), "Knapsack is full.")?;
            break;
        }
    }

    for item in items.iter_mut() {
        if item.status == ItemStatus::Considering {
            item.status = ItemStatus::Default;
        }
    }
    ctx.stats.profit = Some(sack.total_value);
    ctx.stats.weight = Some(sack.current_weight);
    let narration = format!("Knapsack complete! Total value: {:.2}", sack.total_value);
    ctx.publish(sack.view(&items), narration.clone())?;
    Ok(narration)
}

#[cfg(test)]
mod tests {
    use crate::engine::test_support::{config, trace};
    use crate::model::{
        Algorithm, AlgorithmInput, ItemStatus, KnapsackItem, RunOutcome, RunRequest, Snapshot,
        SnapshotView,
    };
    use proptest::prelude::*;
    use std::time::Duration;
    use tokio::time::Instant;

    const EPS: f64 = 1e-9;
    const DEFAULT_ROWS: &[(f64, f64)] = &[(60.0, 10.0), (100.0, 20.0), (120.0, 30.0)];

    fn request(rows: &[(f64, f64)], capacity: f64) -> RunRequest {
        let items = rows
            .iter()
            .enumerate()
            .map(|(i, &(v, w))| KnapsackItem::new(format!("I{}", i + 1), v, w))
            .collect();
        let mut config = config();
        config.capacity = capacity;
        RunRequest {
            algorithm: Algorithm::Knapsack,
            input: AlgorithmInput::Items(items),
            config,
        }
    }

    fn final_items(steps: &[Snapshot]) -> (Vec<KnapsackItem>, f64, f64) {
        match &steps.last().unwrap().view {
            SnapshotView::Knapsack {
                items,
                current_weight,
                total_value,
                ..
            } => (items.clone(), *current_weight, *total_value),
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[tokio::test]
    async fn default_input_takes_two_whole_and_one_fraction() {
        let (report, steps) = trace(request(DEFAULT_ROWS, 50.0)).await;
        assert_eq!(report.outcome, RunOutcome::Completed);
        let (items, weight, value) = final_items(&steps);
        assert!((value - 240.0).abs() < EPS);
        assert!((weight - 50.0).abs() < EPS);
        assert_eq!(items[0].id, "I1");
        assert_eq!(items[0].status, ItemStatus::Taken);
        assert_eq!(items[1].status, ItemStatus::Taken);
        assert_eq!(items[2].status, ItemStatus::FractionTaken);
        let f = items[2].fraction.unwrap();
        assert!((f - 2.0 / 3.0).abs() < EPS);
        assert_eq!(report.narration, "Knapsack complete! Total value: 240.00");
        assert_eq!(report.stats.comparisons, 0);
    }

    #[tokio::test]
    async fn stops_once_full_and_leaves_rest_default() {
        let (_, steps) = trace(request(&[(10.0, 5.0), (1.0, 10.0), (2.0, 10.0)], 5.0)).await;
        let (items, weight, _) = final_items(&steps);
        assert_eq!(weight, 5.0);
        assert_eq!(items[0].status, ItemStatus::Taken);
        assert!(items[1..].iter().all(|i| i.status == ItemStatus::Default));
        assert!(items[1..].iter().all(|i| i.fraction.is_none()));
    }

    #[tokio::test]
    async fn filling_the_sack_is_announced_before_completion() {
        let (_, steps) = trace(request(DEFAULT_ROWS, 50.0)).await;
        let narrations: Vec<&str> = steps.iter().map(|s| s.narration.as_str()).collect();
        let last = narrations.len() - 1;
        assert_eq!(narrations[last - 1], "Knapsack is full.");
        assert_eq!(narrations[last], "Knapsack complete! Total value: 240.00");
        let full = narrations.iter().filter(|s| **s == "Knapsack is full.").count();
        assert_eq!(full, 1);
    }

    #[tokio::test]
    async fn unfilled_sack_never_claims_to_be_full() {
        let (_, steps) = trace(request(&[(10.0, 5.0), (4.0, 2.0)], 50.0)).await;
        assert!(steps.iter().all(|s| s.narration != "Knapsack is full."));
    }

    #[tokio::test(start_paused = true)]
    async fn default_input_waits_major_after_sort_and_each_resolution() {
        let mut req = request(DEFAULT_ROWS, 50.0);
        req.config.pace = Duration::from_millis(100);
        let started = Instant::now();
        let (report, _) = trace(req).await;
        let elapsed = started.elapsed();
        assert_eq!(report.outcome, RunOutcome::Completed);
        // Sort 150, then three items at 100 considering + 150 resolved; the full
        // announcement and the final step do not wait.
        let expected = Duration::from_millis(900);
        assert!(elapsed >= expected, "{elapsed:?}");
        assert!(elapsed < expected + Duration::from_millis(25), "{elapsed:?}");
    }

    #[tokio::test]
    async fn non_positive_capacity_is_rejected_untouched() {
        for capacity in [0.0, -3.0, f64::NAN] {
            let (report, steps) = trace(request(&[(60.0, 10.0)], capacity)).await;
            assert!(matches!(report.outcome, RunOutcome::Aborted(_)));
            assert!(steps.is_empty());
        }
    }

    #[tokio::test]
    async fn empty_items_complete_with_zero_value() {
        let (report, steps) = trace(request(&[], 10.0)).await;
        assert_eq!(report.outcome, RunOutcome::Completed);
        let (_, weight, value) = final_items(&steps);
        assert_eq!((weight, value), (0.0, 0.0));
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity_and_single_fraction(
            rows in proptest::collection::vec((1.0f64..100.0, 1.0f64..50.0), 0..10),
            capacity in 1.0f64..150.0,
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            let (_, steps) = rt.block_on(trace(request(&rows, capacity)));
            let (items, weight, value) = final_items(&steps);
            prop_assert!(weight <= capacity + EPS);
            let fractional = items.iter().filter(|i| i.status == ItemStatus::FractionTaken).count();
            prop_assert!(fractional <= 1);

            // Optimal fractional value computed independently.
            let mut sorted = rows.clone();
            sorted.sort_by(|a, b| (b.0 / b.1).total_cmp(&(a.0 / a.1)));
            let mut left = capacity;
            let mut best = 0.0;
            for (v, w) in sorted {
                if left <= 0.0 { break; }
                let take = w.min(left);
                best += v * take / w;
                left -= take;
            }
            prop_assert!((value - best).abs() < 1e-6);
        }
    }
}
