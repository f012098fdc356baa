//! `oradm discover` - list running instances

use anyhow::{Result, bail};
use colored::Colorize;
use declarative::{ApplyContext, DesiredState, Lifecycle, Reconciler, ResourceKind, Verb};
use serde_json::{Value, json};

use crate::Context;
use crate::progress;
use crate::resource::InstancesDriver;
use crate::ui;

pub fn run(ctx: &Context, json: bool) -> Result<()> {
    let gateway = ctx.settings.gateway();
    let reconciler = Reconciler::new(InstancesDriver::new(ctx.settings.ps_program()), &gateway);
    let desired = DesiredState::new(ResourceKind::Instances, "", Lifecycle::Execute(Verb::Run));

    let pb = (!json && !ctx.quiet).then(|| progress::spinner("Scanning processes..."));
    let result = reconciler.apply(&desired, &ApplyContext::default());
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    if !result.is_success() {
        bail!("{}", result.message);
    }

    let facts = result.facts.clone().unwrap_or_else(|| json!({ "instances": [] }));
    if json {
        println!("{}", serde_json::to_string_pretty(&facts)?);
        return Ok(());
    }

    let instances: Vec<&str> = facts
        .get("instances")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if instances.is_empty() {
        ui::info(&result.message);
        return Ok(());
    }
    ui::header("Running instances");
    for sid in instances {
        println!("  {} {}", "●".green(), sid);
    }
    Ok(())
}
