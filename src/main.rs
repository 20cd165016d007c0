use anyhow::Context;
use clap::Parser;
use colored::*;
use github_h_index::actors::lookup_session::{self, LookupSession};
use github_h_index::aggregator::Aggregator;
use github_h_index::cli::{Cli, Command};
use github_h_index::github::{validate_username, GitHubClient, GitHubConfig};
use github_h_index::models::LookupStatus;
use github_h_index::report::{render_report, render_status};
use github_h_index::server::{start_server, AppState};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = GitHubConfig {
        api_url: cli.api_url.clone(),
        user_agent: cli.user_agent.clone(),
        timeout: Duration::from_secs(cli.timeout_secs),
    };
    let client = GitHubClient::new(config).context("Failed to create GitHub client")?;
    let aggregator = Aggregator::new(Arc::new(client));

    match cli.command {
        Command::Lookup { username, json } => {
            let username = validate_username(&username)?;
            let result = aggregator.lookup(username).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", format!("GitHub H-Index for {}", username).bold().green());
                print!("{}", render_report(&result));
            }
        }

        Command::Interactive => run_interactive(aggregator).await?,

        Command::Serve { port } => {
            let state = AppState {
                aggregator,
                api_url: cli.api_url,
                start_time: Instant::now(),
            };
            start_server(state, port).await?;
        }
    }

    Ok(())
}

async fn run_interactive(aggregator: Aggregator) -> anyhow::Result<()> {
    let (session, mut updates) = LookupSession::spawn(aggregator)
        .await
        .context("Failed to start lookup session")?;
    let mut settled = updates.clone();

    let renderer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            println!("{}", render_status(&state).dimmed());
            if state.status == LookupStatus::Loaded {
                print!("{}", render_report(&state.result));
            }
        }
    });

    println!("{}", "Enter a GitHub username per line (Ctrl+D to quit)".yellow());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match validate_username(&line) {
            Ok(username) => {
                lookup_session::submit(&session, username).await?;
            }
            Err(e) => eprintln!("{}", e.to_string().red()),
        }
    }

    // let the latest lookup finish before shutting down
    settled
        .wait_for(|state| !state.is_loading())
        .await
        .context("Lookup session closed unexpectedly")?;

    session.stop(None);
    renderer.await?;

    Ok(())
}
