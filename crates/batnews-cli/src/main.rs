mod output;
mod pipeline;

use std::path::PathBuf;

use anyhow::Context;
use batnews_collect::RecencyWindow;
use batnews_core::{reference_offset, AppConfig, Provider};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "batnews-cli")]
#[command(about = "Battery news collection, dedupe and ranking pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the daily pipeline and write the digest.
    Run {
        /// Print the digest instead of writing it.
        #[arg(long)]
        dry_run: bool,
        /// Overrides `BATNEWS_OUTPUT_DIR`.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Collect and rank a single provider and print the selection.
    Preview {
        #[arg(long)]
        provider: Provider,
        #[arg(long, default_value_t = 10)]
        top_k: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = batnews_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Run {
            dry_run,
            output_dir,
        } => run(&config, dry_run, output_dir).await,
        Commands::Preview { provider, top_k } => preview(&config, provider, top_k).await,
    }
}

async fn run(config: &AppConfig, dry_run: bool, output_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let sources = batnews_core::load_sources(&config.sources_path)
        .with_context(|| format!("failed to load {}", config.sources_path.display()))?;
    let now = chrono::Utc::now().with_timezone(&reference_offset());

    let digest = pipeline::run_daily(config, &sources, now).await?;
    let records = output::build_records(&digest.items, &digest.enrichments);
    let date = now.date_naive();

    if dry_run {
        println!("{}", output::render(date, records)?);
        return Ok(());
    }

    let dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
    let path = output::write_selection(&dir, date, records)?;
    tracing::info!(path = %path.display(), count = digest.items.len(), "digest written");
    Ok(())
}

async fn preview(config: &AppConfig, provider: Provider, top_k: usize) -> anyhow::Result<()> {
    let window = RecencyWindow {
        now: chrono::Utc::now().with_timezone(&reference_offset()),
        hours: config.window_hours,
    };
    let models = pipeline::ModelClients::from_config(config)?;

    let candidates = pipeline::collect_provider(config, provider, window)
        .await
        .into_items();
    let selection = pipeline::rank_pool(
        config,
        models.as_ref().map(|m| &m.classifier),
        &candidates,
        top_k,
    )
    .await;

    println!(
        "{provider}: {} candidates, {} selected",
        candidates.len(),
        selection.len()
    );
    for (i, item) in selection.items.iter().enumerate() {
        println!(
            "{:>2}. [rel {:>3} imp {:>3} x{}] {} ({})",
            i + 1,
            item.relevance,
            item.importance,
            item.group_size,
            item.candidate.title,
            item.candidate.source
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests;
