mod cli;
mod commands;
mod config;
mod paths;
mod progress;
mod request;
mod resource;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, ParamsCommand};
use std::io;
use std::process::ExitCode;

use config::Settings;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub settings: Settings,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "oradm", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let settings = Settings::load(cli.config.as_deref())?.with_overrides(
        cli.sqlplus,
        cli.rman,
        cli.timeout,
    );
    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        settings,
    };
    log::debug!("Running with verbosity {}", ctx.verbose);

    let ok = match cli.command {
        Command::Apply(args) => commands::apply::run(&ctx, &args)?,
        Command::Plan(args) => commands::plan::run(&ctx, &args)?,
        Command::Discover { json } => {
            commands::discover::run(&ctx, json)?;
            true
        }
        Command::Params(ParamsCommand::Check { file }) => commands::params::check(&ctx, &file)?,
        Command::Completions { .. } => true,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
