use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{FetchOutcome, GalleryController, UnsplashClient};
use shared::domain::SortKey;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod repl;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(version, about = "Search and browse photos from the terminal")]
struct Args {
    /// Config file (defaults to ./gallery.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    access_key: Option<String>,
    #[arg(long, global = true)]
    per_page: Option<u32>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one search and print the results
    Search {
        term: String,
        #[arg(long, default_value_t = SortKey::Relevant)]
        sort: SortKey,
        /// Number of pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Browse results interactively
    Interactive {
        /// Initial search term (defaults to the configured one)
        #[arg(long)]
        term: Option<String>,
        #[arg(long, default_value_t = SortKey::Relevant)]
        sort: SortKey,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    apply_overrides(&mut settings, &args);

    let client = UnsplashClient::new(settings.client_config()?)
        .context("failed to create search client")?;
    info!(
        api = %client.search_url(),
        per_page = client.per_page(),
        "search client ready"
    );
    let controller = GalleryController::new(Arc::new(client));

    match args.command {
        Command::Search { term, sort, pages } => {
            run_search(&controller, term, sort, pages).await
        }
        Command::Interactive { term, sort } => {
            let term = term.unwrap_or_else(|| settings.initial_term.clone());
            repl::run_interactive(controller, term, sort).await
        }
    }
}

fn apply_overrides(settings: &mut Settings, args: &Args) {
    if let Some(v) = &args.api_url {
        settings.api_url = v.clone();
    }
    if let Some(v) = &args.access_key {
        settings.access_key = Some(v.clone());
    }
    if let Some(v) = args.per_page {
        settings.per_page = v;
    }
}

async fn run_search(
    controller: &GalleryController,
    term: String,
    sort: SortKey,
    pages: u32,
) -> Result<()> {
    if controller.start_search(term, sort).await == FetchOutcome::Skipped {
        anyhow::bail!("search term must not be empty");
    }
    for _ in 1..pages.max(1) {
        match controller.load_more().await {
            FetchOutcome::Loaded { .. } => {}
            _ => break,
        }
    }

    let snapshot = controller.snapshot().await;
    print!("{}", render::render_list(&snapshot));
    if let Some(error) = snapshot.last_error {
        anyhow::bail!(error);
    }
    Ok(())
}
