use super::{RunContext, RunError, MAJOR};
use crate::model::{Bar, BarState, SnapshotView};

fn view(bars: &[Bar]) -> SnapshotView {
    SnapshotView::Array(bars.to_vec())
}

fn mark(bars: &mut [Bar], a: usize, b: usize, state: BarState) {
    bars[a].state = state;
    bars[b].state = state;
}

/// Adjacent-exchange sort without the early-exit optimization: every pass
/// runs in full, so comparisons are always n(n-1)/2.
pub(crate) async fn run(ctx: &mut RunContext, values: &[i64]) -> Result<String, RunError> {
    let mut bars: Vec<Bar> = values.iter().copied().map(Bar::new).collect();
    let n = bars.len();
    if n == 0 {
        let narration = "Nothing to sort.".to_string();
        ctx.publish(view(&bars), narration.clone())?;
        return Ok(narration);
    }

    for i in 0..n - 1 {
        for j in 0..n - i - 1 {
            mark(&mut bars, j, j + 1, BarState::Comparing);
            ctx.stats.comparisons += 1;
            let (a, b) = (bars[j].value, bars[j + 1].value);
            ctx.publish(view(&bars), format!("Comparing {a} and {b}"))?;
            ctx.pace(1.0).await?;

            // Strict comparison keeps equal values in place.
            let narration = if a > b {
                mark(&mut bars, j, j + 1, BarState::Swapping);
                ctx.publish(view(&bars), format!("Swapping {a} and {b}"))?;
                ctx.pace(1.0).await?;
                bars.swap(j, j + 1);
                ctx.stats.swaps += 1;
                format!("Swapped {a} and {b}")
            } else {
                format!("{a} and {b} already in order")
            };

            mark(&mut bars, j, j + 1, BarState::Default);
            ctx.publish(view(&bars), narration)?;
        }
        let last = n - 1 - i;
        bars[last].state = BarState::Sorted;
        ctx.publish(
            view(&bars),
            format!("{} is in its final position", bars[last].value),
        )?;
        ctx.pace(MAJOR).await?;
    }

    // Idempotent when the last pass already marked it.
    bars[0].state = BarState::Sorted;
    let narration = "Visualization complete!".to_string();
    ctx.publish(view(&bars), narration.clone())?;
    Ok(narration)
}
