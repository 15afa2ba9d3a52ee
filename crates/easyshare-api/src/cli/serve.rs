//! `easyshare serve`: run the bot until Ctrl+C or SIGTERM.

use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use easyshare_core::command::BotProfile;
use easyshare_infra::config::resolve_token;
use easyshare_infra::telegram::{TelegramApi, poll_loop};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::state::AppState;

pub async fn serve(state: AppState, token: Option<String>, quiet: bool) -> Result<()> {
    let token = resolve_token(token)?;
    let api = TelegramApi::with_base_url(token, &state.config.telegram.api_base_url);

    let me = api
        .get_me()
        .await
        .context("failed to reach the Telegram Bot API (getMe)")?;
    let profile = BotProfile {
        name: me.first_name.clone(),
        username: me.username.clone(),
    };
    info!(bot = %me.first_name, username = ?me.username, "connected to Telegram");

    if !quiet {
        println!();
        println!(
            "  {} {} is running as {}",
            style("⚡").bold(),
            style(&profile.name).cyan(),
            style(format!("@{}", profile.username.as_deref().unwrap_or("?"))).cyan()
        );
        println!(
            "  {}",
            style(format!("Database: {}", state.database_path().display())).dim()
        );
        println!("  {}", style("Press Ctrl+C to stop").dim());
    }

    let dispatcher = Arc::new(state.dispatcher(api.clone(), profile));
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            info!("shutdown requested");
            cancel.cancel();
        }
    });

    poll_loop(api, dispatcher, &state.config, cancel).await;
    state.db_pool.close().await;

    if !quiet {
        println!("\n  Bot stopped.");
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
