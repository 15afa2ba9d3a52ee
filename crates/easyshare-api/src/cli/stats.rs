//! `easyshare stats`: registry counts from the local database.

use anyhow::Result;
use comfy_table::{Cell, Color, Table, presets};
use console::style;
use easyshare_core::repository::account::AccountRepository;
use easyshare_core::repository::service::ServiceRepository;
use easyshare_core::repository::usage::UsageRepository;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub services: i64,
    pub accounts: i64,
    pub claimed: i64,
    pub usages: i64,
}

pub async fn collect(state: &AppState) -> Result<Counts> {
    Ok(Counts {
        services: state.service_repo.count().await?,
        accounts: state.account_repo.count().await?,
        claimed: state.account_repo.count_claimed().await?,
        usages: UsageRepository::count(&state.usage_repo).await?,
    })
}

pub async fn stats(state: &AppState, json: bool) -> Result<()> {
    let counts = collect(state).await?;

    if json {
        let stats = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "database": state.database_path().display().to_string(),
            "services": counts.services,
            "accounts": {
                "total": counts.accounts,
                "in_use": counts.claimed,
                "available": counts.accounts - counts.claimed,
            },
            "usages": counts.usages,
        });
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!("  {} easyshare v{}", style("⚡").bold(), env!("CARGO_PKG_VERSION"));
    println!();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Metric").fg(Color::White),
        Cell::new("Count").fg(Color::White),
    ]);
    table.add_row(vec![Cell::new("Services"), Cell::new(counts.services)]);
    table.add_row(vec![Cell::new("Accounts"), Cell::new(counts.accounts)]);
    table.add_row(vec![
        Cell::new("In use"),
        Cell::new(counts.claimed).fg(Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Available"),
        Cell::new(counts.accounts - counts.claimed).fg(Color::Green),
    ]);
    table.add_row(vec![Cell::new("Usage records"), Cell::new(counts.usages)]);
    println!("{table}");
    println!();
    println!(
        "  Database: {}",
        style(state.database_path().display()).dim()
    );
    println!();

    Ok(())
}
