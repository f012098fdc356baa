pub mod apply;
pub mod discover;
pub mod params;
pub mod plan;

use anyhow::{Context as AnyhowContext, Result};
use declarative::{DesiredState, ExecutionPlan};

use crate::resource::Registry;

/// Bind every request to the reconciler for its kind, keeping manifest order.
pub(crate) fn build_plan<'r>(
    registry: &'r Registry<'_>,
    requests: Vec<DesiredState>,
    target: Option<&str>,
) -> Result<ExecutionPlan<'r>> {
    let mut plan = ExecutionPlan::new();
    for desired in requests {
        let reconciler = registry
            .get(desired.kind)
            .with_context(|| format!("No driver registered for {}", desired.kind))?;
        plan.push(desired, reconciler);
    }
    Ok(plan.filter_by_target(target))
}
