use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oradm")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Idempotent Oracle administration through sqlplus and rman", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings file (default: ~/.config/oradm/config.toml)
    #[arg(long, global = true, env = "ORADM_CONFIG")]
    pub config: Option<PathBuf>,

    /// sqlplus program or path
    #[arg(long, global = true, env = "ORADM_SQLPLUS")]
    pub sqlplus: Option<String>,

    /// rman program or path
    #[arg(long, global = true, env = "ORADM_RMAN")]
    pub rman: Option<String>,

    /// Per-attempt process deadline in seconds (0 disables)
    #[arg(long, global = true, env = "ORADM_TIMEOUT")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Converge the database with a manifest
    Apply(ApplyArgs),

    /// Show what apply would do without changing anything
    Plan(PlanArgs),

    /// List Oracle instances running on this host
    Discover {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Work with parameter files
    #[command(subcommand)]
    Params(ParamsCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Manifest file (TOML or JSON), or `-` for JSON on stdin
    pub file: String,

    /// Validate requests without touching the database
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Requests reconciled concurrently
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: u16,

    /// Only apply matching requests: `kind` or `kind.name`
    #[arg(short, long)]
    pub target: Option<String>,

    /// Print results as JSON (implied when reading stdin)
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct PlanArgs {
    /// Manifest file (TOML or JSON), or `-` for JSON on stdin
    pub file: String,

    /// Only plan matching requests: `kind` or `kind.name`
    #[arg(short, long)]
    pub target: Option<String>,
}

#[derive(Subcommand)]
pub enum ParamsCommand {
    /// Check a parameter file against the known parameters
    Check {
        /// Parameter file (`name = value` per line)
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_apply_args() {
        let cli = Cli::try_parse_from([
            "oradm", "-vv", "apply", "site.toml", "--dry-run", "-j", "4", "--target", "user.scott",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Apply(args) = cli.command else {
            panic!("expected apply");
        };
        assert_eq!(args.file, "site.toml");
        assert!(args.dry_run);
        assert_eq!(args.jobs, 4);
        assert_eq!(args.target.as_deref(), Some("user.scott"));
    }

    #[test]
    fn test_zero_jobs_rejected() {
        assert!(Cli::try_parse_from(["oradm", "apply", "x.toml", "--jobs", "0"]).is_err());
    }

    #[test]
    fn test_global_overrides_after_subcommand() {
        let cli = Cli::try_parse_from(["oradm", "discover", "--rman", "/opt/rman", "--timeout", "60"])
            .unwrap();
        assert_eq!(cli.rman.as_deref(), Some("/opt/rman"));
        assert_eq!(cli.timeout, Some(60));
    }
}
