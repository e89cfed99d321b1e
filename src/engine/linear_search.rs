use super::{fmt_num, RunContext, RunError};
use crate::model::{Bar, BarState, SnapshotView};

pub(crate) async fn run(
    ctx: &mut RunContext,
    values: &[i64],
    target: Option<f64>,
) -> Result<String, RunError> {
    let target = match target {
        Some(t) if t.is_finite() => t,
        _ => return Err(RunError::InvalidSearchTarget),
    };
    // Integers only match an integral target; compared as i64 to stay exact above 2^53.
    let in_range = target >= i64::MIN as f64 && target < i64::MAX as f64;
    let needle = (target.fract() == 0.0 && in_range).then(|| target as i64);
    let mut bars: Vec<Bar> = values.iter().copied().map(Bar::new).collect();

    for i in 0..bars.len() {
        bars[i].state = BarState::Searching;
        ctx.stats.comparisons += 1;
        ctx.publish(
            SnapshotView::Array(bars.clone()),
            format!("Checking index {i}: value {}", bars[i].value),
        )?;
        ctx.pace(1.0).await?;

        if Some(bars[i].value) == needle {
            bars[i].state = BarState::Found;
            let narration = format!("Value {} found at index {i}!", fmt_num(target));
            ctx.publish(SnapshotView::Array(bars), narration.clone())?;
            return Ok(narration);
        }
        bars[i].state = BarState::Default;
    }

    let narration = format!("Value {} not found in array.", fmt_num(target));
    ctx.publish(SnapshotView::Array(bars), narration.clone())?;
    Ok(narration)
}
