use super::{fmt_num, RunContext, RunError, MAJOR};
use crate::model::{Job, JobStatus, SnapshotView, MAX_DEADLINE};

fn view(jobs: &[Job], slots: &[Option<Job>]) -> SnapshotView {
    SnapshotView::Jobs {
        jobs: jobs.to_vec(),
        slots: slots.to_vec(),
    }
}

/// Greedy deadline scheduling: highest profit first, each job placed in the
/// latest free slot not after its deadline.
pub(crate) async fn run(ctx: &mut RunContext, mut jobs: Vec<Job>) -> Result<String, RunError> {
    if let Some(job) = jobs.iter().find(|j| j.deadline > MAX_DEADLINE) {
        return Err(RunError::DeadlineTooLarge(job.deadline));
    }
    for job in jobs.iter_mut() {
        job.status = JobStatus::Default;
    }

    // Stable sort: equal profits keep their input order.
    jobs.sort_by(|a, b| b.profit.total_cmp(&a.profit));
    ctx.publish(view(&jobs, &[]), "Sorting jobs by profit (descending)...")?;
    ctx.pace(MAJOR).await?;

    let max_deadline = jobs.iter().map(|j| j.deadline).max().unwrap_or(0) as usize;
    let mut slots: Vec<Option<Job>> = vec![None; max_deadline];
    ctx.publish(
        view(&jobs, &slots),
        format!("Max deadline: {max_deadline}. Created {max_deadline} slots."),
    )?;
    ctx.pace(MAJOR).await?;

    let mut total_profit = 0.0;
    for idx in 0..jobs.len() {
        jobs[idx].status = JobStatus::Processing;
        let (id, profit, deadline) = (jobs[idx].id.clone(), jobs[idx].profit, jobs[idx].deadline);
        ctx.publish(
            view(&jobs, &slots),
            format!(
                "Processing job {id}: profit={}, deadline={deadline}",
                fmt_num(profit)
            ),
        )?;
        ctx.pace(1.0).await?;

        let latest = max_deadline.min(deadline as usize);
        let mut placed = false;
        for slot in (0..latest).rev() {
            ctx.stats.comparisons += 1;
            if slots[slot].is_none() {
                jobs[idx].status = JobStatus::Accepted;
                slots[slot] = Some(jobs[idx].clone());
                total_profit += profit;
                ctx.stats.profit = Some(total_profit);
                ctx.publish(
                    view(&jobs, &slots),
                    format!(
                        "Job {id} scheduled in slot {}. Total profit: {}",
                        slot + 1,
                        fmt_num(total_profit)
                    ),
                )?;
                ctx.pace(MAJOR).await?;
                placed = true;
                break;
            }
        }

        if !placed {
            jobs[idx].status = JobStatus::Rejected;
            ctx.publish(
                view(&jobs, &slots),
                format!("Job {id} rejected - no available slot."),
            )?;
            ctx.pace(1.0).await?;
        }
    }

    ctx.stats.profit = Some(total_profit);
    let narration = format!("Scheduling complete! Final profit: {}", fmt_num(total_profit));
    ctx.publish(view(&jobs, &slots), narration.clone())?;
    Ok(narration)
}
