/*
 * Responsibility
 * - tokio runtime 起動
 * - CLI を解釈して serve / setup-db に振り分ける (ロジックは置かない)
 */
use anyhow::Result;
use clap::Parser;

mod api;
mod app;
mod cli;
mod config;
mod error;
mod middleware;
mod repos;
mod services;
mod setup;
mod state;

#[cfg(test)]
mod test_support;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    app::init_tracing();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => app::run().await,
        Command::SetupDb(args) => setup::run(args).await,
    }
}
