use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};

use recipe_import::{
    ImportConfig, ImportError, Importer, JobResult, MemoryStore, RecipeStore, SqliteStore,
};

/// Import recipes from a CSV content feed
#[derive(Parser, Debug)]
#[command(name = "recipe-import", version, about)]
struct Cli {
    /// CSV feed to import
    csv_file: PathBuf,

    /// User id recorded as the author of every imported recipe
    #[arg(long, env = "RECIPE_IMPORT_AUTHOR")]
    author: i64,

    /// Database URL (overrides the configured one)
    #[arg(long)]
    database: Option<String>,

    /// Configuration file (defaults to ./recipe-import.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run against an in-memory store; nothing is written
    #[arg(long)]
    dry_run: bool,

    /// Do not check that image URLs are reachable
    #[arg(long)]
    no_image_check: bool,

    /// Print the job result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ImportError> {
    let mut config = ImportConfig::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database_url = database;
    }
    if cli.no_image_check {
        config.images.check = false;
    }

    let feed = tokio::fs::read(&cli.csv_file).await?;
    info!("Read {} bytes from {}", feed.len(), cli.csv_file.display());

    let store: Arc<dyn RecipeStore> = if cli.dry_run {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(SqliteStore::connect(&config.database_url).await?)
    };

    let importer = Importer::from_config(store, &config)?;
    let result = importer.run(&feed, cli.author).await?;

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to encode job result: {}", e),
        }
    } else {
        print_summary(&result);
    }
    Ok(())
}

fn print_summary(result: &JobResult) {
    println!("Imported {} recipe(s)", result.success_count());
    if !result.errors().is_empty() {
        println!("{} row(s) skipped:", result.errors().len());
        for message in result.errors() {
            println!("  - {}", message);
        }
    }
}
