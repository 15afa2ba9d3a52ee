//! easyshare entry point.
//!
//! Binary name: `easyshare`
//!
//! Parses CLI arguments, sets up tracing, opens the database and dispatches
//! to the command handler. `serve` runs the Telegram bot.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;
use easyshare_observe::TracingOptions;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the token may come from the real environment.
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Shell completions don't need config or database
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "easyshare", &mut std::io::stdout());
        return Ok(());
    }

    let (data_dir, config) = {
        let _bootstrap = easyshare_observe::bootstrap_subscriber(cli.log_filter());
        AppState::load_config().await?
    };

    let enable_otel = matches!(cli.command, Commands::Serve { otel: true, .. });
    easyshare_observe::init_tracing(&TracingOptions {
        format: config.log_format,
        default_filter: cli.log_filter().to_string(),
        enable_otel,
    })
    .map_err(|e| anyhow::anyhow!(e))?;

    let state = AppState::init(data_dir, config).await?;

    let result = match cli.command {
        Commands::Serve { token, .. } => cli::serve::serve(state, token, cli.quiet || cli.json).await,
        Commands::Stats => cli::stats::stats(&state, cli.json).await,
        Commands::Completions { .. } => Ok(()),
    };

    easyshare_observe::shutdown_tracing();
    result
}
