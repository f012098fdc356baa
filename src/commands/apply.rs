//! `oradm apply` - converge the database with a manifest

use anyhow::Result;
use colored::Colorize;
use declarative::{ExecuteOptions, ExecuteReport, ExecuteSummary, NoProgress, ReconciliationResult, execute};
use orakit::ErrorKind;
use serde::Serialize;

use crate::Context;
use crate::cli::ApplyArgs;
use crate::progress::BatchProgress;
use crate::request;
use crate::resource::Registry;
use crate::ui;

#[derive(Serialize)]
struct ResultEntry<'a> {
    request: &'a str,
    #[serde(flatten)]
    result: &'a ReconciliationResult,
}

#[derive(Serialize)]
struct Report<'a> {
    dry_run: bool,
    results: Vec<ResultEntry<'a>>,
    summary: &'a ExecuteSummary,
}

/// Run the manifest; returns whether every request succeeded.
pub fn run(ctx: &Context, args: &ApplyArgs) -> Result<bool> {
    let json = args.json || args.file == "-";
    let requests = request::load(&args.file, &ctx.settings.defaults)?;
    let gateway = ctx.settings.gateway();
    let registry = Registry::new(&gateway, &ctx.settings);
    let plan = super::build_plan(&registry, requests, args.target.as_deref())?;

    if plan.is_empty() && !json {
        ui::info("No requests to apply.");
        return Ok(true);
    }

    let opts = ExecuteOptions {
        dry_run: args.dry_run,
        jobs: usize::from(args.jobs),
    };
    log::info!(
        "Applying {} request(s) with {} job(s){}",
        plan.len(),
        opts.jobs,
        if opts.dry_run { " (dry run)" } else { "" }
    );

    let report = if json || ctx.quiet {
        execute(&plan, &opts, &mut NoProgress)?
    } else {
        ui::header(&format!("Applying {}", args.file));
        execute(&plan, &opts, &mut BatchProgress::new("Applying"))?
    };

    if json {
        print_json(&report, opts.dry_run)?;
    } else if !ctx.quiet {
        print_summary(&report, opts.dry_run);
    }
    if ctx.quiet && !json {
        // Failures still reach stderr when progress lines are suppressed
        for (label, result) in &report.results {
            if let Some(kind) = result.error {
                ui::error(&format!("{label}: {} ({})", result.message, kind.description()));
            }
        }
    }
    Ok(report.summary.is_success())
}

fn print_json(report: &ExecuteReport, dry_run: bool) -> Result<()> {
    let output = Report {
        dry_run,
        results: report
            .results
            .iter()
            .map(|(label, result)| ResultEntry { request: label, result })
            .collect(),
        summary: &report.summary,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_summary(report: &ExecuteReport, dry_run: bool) {
    let summary = &report.summary;
    println!();
    if dry_run {
        println!("  {} Dry run - no changes made", "ℹ".blue());
    }
    if summary.is_success() {
        println!("  {} Manifest applied successfully!", "✓".green().bold());
    } else {
        println!("  {} Manifest applied with errors", "⚠".yellow().bold());
    }

    if summary.changed > 0 {
        println!("    • {} requests changed", summary.changed);
    }
    if summary.unchanged > 0 {
        println!("    • {} requests unchanged", summary.unchanged);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "requests".red());
    }

    let mut kinds: Vec<ErrorKind> = Vec::new();
    for kind in report.results.iter().filter_map(|(_, r)| r.error) {
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    for kind in kinds {
        ui::dim(&format!("{}: {}", kind.description(), kind.advice()));
    }
}
