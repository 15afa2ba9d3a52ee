//! CLI command definitions for the `easyshare` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod serve;
pub mod stats;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Share accounts and subscriptions with your Telegram group.
#[derive(Parser)]
#[command(name = "easyshare", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "info,sqlx=warn,reqwest=warn",
            1 => "debug,sqlx=info,hyper=info,reqwest=info",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot: long-poll Telegram until Ctrl+C.
    Serve {
        /// Bot token (falls back to EASYSHARE_BOT_TOKEN, then BOT_TOKEN).
        #[arg(long)]
        token: Option<String>,

        /// Export tracing spans through OpenTelemetry (stdout exporter).
        #[arg(long)]
        otel: bool,
    },

    /// Show registry counts.
    Stats,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_parses_serve_with_global_flags() {
        let cli = Cli::try_parse_from(["easyshare", "serve", "--token", "1:x", "-v", "--json"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Serve { token, otel } => {
                assert_eq!(token.as_deref(), Some("1:x"));
                assert!(!otel);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_verbosity_selects_filter() {
        let quiet = Cli::try_parse_from(["easyshare", "--quiet", "stats"]).unwrap();
        assert_eq!(quiet.log_filter(), "error");
        let trace = Cli::try_parse_from(["easyshare", "-vv", "stats"]).unwrap();
        assert_eq!(trace.log_filter(), "trace");
    }
}
