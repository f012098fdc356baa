//! Execution engine - reconciles a batch of requests, optionally in parallel

use crate::context::{ApplyContext, ProgressCallback};
use crate::planner::{ExecutionPlan, PlanEntry};
use crate::types::{ExecuteOptions, ExecuteSummary, ReconciliationResult};
use anyhow::Result;
use rayon::prelude::*;

/// Results of one batch, in plan order
#[derive(Debug, Default)]
pub struct ExecuteReport {
    pub results: Vec<(String, ReconciliationResult)>,
    pub summary: ExecuteSummary,
}

/// Execute a plan with the given options and progress callback
///
/// Requests are independent: a failure is recorded and the batch carries
/// on. With `jobs > 1` requests run on a dedicated thread pool; each one
/// still gets its own script files and child-process environment.
pub fn execute<P: ProgressCallback>(
    plan: &ExecutionPlan<'_>,
    opts: &ExecuteOptions,
    progress: &mut P,
) -> Result<ExecuteReport> {
    let ctx = ApplyContext {
        dry_run: opts.dry_run,
    };

    if plan.is_empty() {
        return Ok(ExecuteReport::default());
    }

    progress.on_batch_start(plan.len());
    let results = if opts.jobs <= 1 || plan.len() == 1 {
        execute_sequential(&plan.entries, ctx, progress)
    } else {
        execute_parallel(&plan.entries, opts.jobs, ctx, progress)?
    };
    progress.on_batch_complete();

    let mut summary = ExecuteSummary::default();
    for (_, result) in &results {
        summary.add_result(result);
    }
    Ok(ExecuteReport { results, summary })
}

fn execute_sequential<P: ProgressCallback>(
    entries: &[PlanEntry<'_>],
    ctx: ApplyContext,
    progress: &mut P,
) -> Vec<(String, ReconciliationResult)> {
    let mut results = Vec::with_capacity(entries.len());
    for entry in entries {
        let label = entry.desired.label();
        progress.on_resource_start(&label);
        let result = entry.reconciler.apply(&entry.desired, &ctx);
        progress.on_resource_complete(&label, &result);
        results.push((label, result));
    }
    results
}

/// Execute requests in parallel using rayon
fn execute_parallel<P: ProgressCallback>(
    entries: &[PlanEntry<'_>],
    jobs: usize,
    ctx: ApplyContext,
    progress: &mut P,
) -> Result<Vec<(String, ReconciliationResult)>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {}", e))?;

    // The progress callback is not thread-safe; report once everything is in
    let results: Vec<(String, ReconciliationResult)> = pool.install(|| {
        entries
            .par_iter()
            .map(|entry| {
                let label = entry.desired.label();
                (label, entry.reconciler.apply(&entry.desired, &ctx))
            })
            .collect()
    });

    for (label, result) in &results {
        progress.on_resource_complete(label, result);
    }
    Ok(results)
}
