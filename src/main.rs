use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blogscribe::cli::{Cli, Commands};
use blogscribe::config::Config;
use blogscribe::pipeline::BlogPipeline;
use blogscribe::store::{self, BlogStore, JsonFileStore};
use blogscribe::utils;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "blogscribe=debug"
    } else {
        "blogscribe=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().await?;

    match cli.command {
        Commands::Generate { link, user } => {
            // Check for required external tools (non-fatal)
            let missing_deps = utils::check_dependencies().await;
            if !missing_deps.is_empty() {
                eprintln!("Dependency check warnings:");
                for dep in missing_deps {
                    eprintln!("   - {}", dep);
                }
            }

            let pipeline = BlogPipeline::from_config(&config)?;

            let progress = ProgressBar::new_spinner();
            progress.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap(),
            );
            progress.set_message("Generating blog article...");
            progress.enable_steady_tick(std::time::Duration::from_millis(120));

            let result = pipeline.run(&link, &user).await;
            progress.finish_and_clear();

            match result {
                Ok(record) => {
                    println!("{}", record.source_title);
                    println!("{}", "=".repeat(record.source_title.len()));
                    println!();
                    println!("{}", record.content);
                    println!();
                    println!("Saved as {}", record.id);
                }
                Err(err) => {
                    eprintln!("{}", err.stage().user_message());
                    return Err(err.into());
                }
            }
        }
        Commands::List { user } => {
            let store = JsonFileStore::new(store::resolve_store_path(&config)?);
            let records = store.list_by_owner(&user).await?;

            if records.is_empty() {
                println!("No saved articles for {}", user);
            }
            for record in records {
                println!(
                    "{}  {}  {}",
                    record.id,
                    record.created_at.format("%Y-%m-%d %H:%M"),
                    record.source_title
                );
            }
        }
        Commands::Show { id, user } => {
            let store = JsonFileStore::new(store::resolve_store_path(&config)?);

            match store.get_by_id(id).await? {
                Some(record) if record.owner == user => {
                    println!("{}", record.source_title);
                    println!("{}", record.source_link);
                    println!();
                    println!("{}", record.content);
                }
                // Articles belong to their owner only
                Some(_) | None => anyhow::bail!("No article {} for user {}", id, user),
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Current settings (edit the config file to change them):");
                config.display();
            }
        }
    }

    Ok(())
}
