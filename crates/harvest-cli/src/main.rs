mod collect;
mod reconcile;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "harvest-cli")]
#[command(about = "Harvest catalog category listings and reconcile them across categories")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run harvesting sessions and merge new items into each category store
    Collect {
        /// Restrict the run to one configured category
        #[arg(long)]
        category: Option<String>,

        /// Cycles per category (overrides HARVEST_MAX_CYCLES)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        cycles: Option<u32>,

        /// Show which categories would be harvested without fetching anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Split stored items into per-category unique lists and cross-category conflicts
    Reconcile {
        /// Report destination (overrides HARVEST_REPORT_PATH)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = harvest_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let categories = harvest_core::load_categories(&config.categories_path)?;

    match cli.command {
        Commands::Collect {
            category,
            cycles,
            dry_run,
        } => {
            collect::run_collect(&config, &categories, category.as_deref(), cycles, dry_run)
                .await?;
        }
        Commands::Reconcile { output } => {
            let output = output.unwrap_or_else(|| config.report_path.clone());
            reconcile::run_reconcile(&config.data_dir, &categories.names(), &output)?;
        }
    }

    Ok(())
}
