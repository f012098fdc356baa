//! `oradm plan` - describe and decide without acting

use anyhow::Result;
use colored::Colorize;
use declarative::Decision;
use orakit::{Secret, redact};

use crate::Context;
use crate::cli::PlanArgs;
use crate::request;
use crate::resource::Registry;
use crate::ui;

pub fn run(ctx: &Context, args: &PlanArgs) -> Result<bool> {
    let requests = request::load(&args.file, &ctx.settings.defaults)?;
    let gateway = ctx.settings.gateway();
    let registry = Registry::new(&gateway, &ctx.settings);
    let plan = super::build_plan(&registry, requests, args.target.as_deref())?;

    if plan.is_empty() {
        ui::info("No requests to plan.");
        return Ok(true);
    }

    ui::header(&format!("Plan for {}", args.file));
    let mut pending = 0usize;
    let mut failed = 0usize;
    for entry in &plan.entries {
        let label = ui::truncate_path(&entry.desired.label(), 30);
        match entry.reconciler.plan(&entry.desired) {
            Ok(decision) => {
                if !matches!(decision, Decision::NoOp { .. }) {
                    pending += 1;
                }
                println!("  {} {:<30} {}", ui::decision_symbol(decision), label, decision.to_string().dimmed());
            }
            Err(err) => {
                failed += 1;
                let secrets = entry.desired.secrets();
                let secrets: Vec<&Secret> = secrets.iter().collect();
                let message = redact(&err.to_string(), &secrets);
                println!("  {} {:<30} {}", "✗".red(), label, message.red());
            }
        }
    }

    println!();
    if pending == 0 && failed == 0 {
        ui::success("No changes needed");
    } else {
        ui::kv("Pending", &pending.to_string());
    }
    if failed > 0 {
        ui::kv("Failed", &failed.to_string());
    }
    Ok(failed == 0)
}
