use anyhow::Context;
use clap::Parser;
use docdex::ui::cli::{Cli, Commands};
use docdex::{BasicNormalizer, Config, FileSystemWatcher, SearchEngine, WatchService};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docdex=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { base_dir } => handle_init(base_dir.as_deref()),
        Commands::Sync {
            path,
            extensions,
            base_dir,
        } => handle_sync(&path, &extensions, base_dir.as_deref()),
        Commands::Search {
            query,
            limit,
            base_dir,
        } => handle_search(&query, limit, base_dir.as_deref()),
        Commands::Watch {
            path,
            extensions,
            interval,
            base_dir,
        } => handle_watch(&path, &extensions, interval, base_dir.as_deref()),
    }
}

fn load_config(base_dir: Option<&str>) -> anyhow::Result<Config> {
    Ok(Config::new(base_dir.map(PathBuf::from))?)
}

fn ensure_initialized(config: &Config) -> anyhow::Result<()> {
    if !config.is_initialized() {
        anyhow::bail!("docdex is not initialized. Run 'docdex init' first.");
    }
    Ok(())
}

/// Replace the default extension allow-list when the user passed --ext flags
fn apply_extensions(config: &mut Config, extensions: &[String]) {
    if extensions.is_empty() {
        return;
    }
    config.extensions = extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_lowercase())
        .collect();
}

fn handle_init(base_dir: Option<&str>) -> anyhow::Result<()> {
    println!("Initializing docdex...");

    let config = load_config(base_dir)?;

    if config.is_initialized() {
        println!("docdex is already initialized at: {:?}", config.base_dir);
        println!("To reinitialize, delete the directory and run 'init' again.");
        return Ok(());
    }

    config.init()?;
    println!("✓ Created configuration directory: {:?}", config.base_dir);
    println!("✓ Created cache directory: {:?}", config.cache_dir);

    println!("\nInitialization complete!");
    println!("Next steps:");
    println!("  1. Index your documents: docdex sync /path/to/documents");
    println!("  2. Or keep them indexed: docdex watch /path/to/documents");

    Ok(())
}

fn handle_sync(path: &str, extensions: &[String], base_dir: Option<&str>) -> anyhow::Result<()> {
    println!("Syncing documents from: {}", path);

    let mut config = load_config(base_dir)?;
    ensure_initialized(&config)?;
    apply_extensions(&mut config, extensions);

    let root = PathBuf::from(path);
    let mut engine = SearchEngine::with_cache(config, Arc::new(BasicNormalizer::new()));

    let rebuilt = engine
        .sync(&root)
        .with_context(|| format!("Failed to sync {}", root.display()))?;

    if rebuilt {
        println!("✓ Index rebuilt: {} documents", engine.document_count());
    } else {
        println!(
            "✓ Index already up to date: {} documents",
            engine.document_count()
        );
    }

    Ok(())
}

fn handle_search(query: &str, limit: Option<usize>, base_dir: Option<&str>) -> anyhow::Result<()> {
    println!("Searching for: \"{}\"", query);

    let config = load_config(base_dir)?;
    ensure_initialized(&config)?;

    let limit = limit.unwrap_or(config.top_n);
    let engine = SearchEngine::with_cache(config, Arc::new(BasicNormalizer::new()));

    if engine.document_count() == 0 {
        println!("\nThe index is empty. Run 'docdex sync /path/to/documents' first.");
        return Ok(());
    }

    let results = engine.search(query, limit);
    if results.is_empty() {
        println!("\nNo results found.");
        return Ok(());
    }

    println!("\nFound {} results:", results.len());
    for (i, result) in results.iter().enumerate() {
        println!("\n{}. {} (score: {:.3})", i + 1, result.title, result.score);
        println!("   Path: {}", result.path);
        println!("   {}", result.snippet);
    }

    Ok(())
}

fn handle_watch(
    path: &str,
    extensions: &[String],
    interval: u64,
    base_dir: Option<&str>,
) -> anyhow::Result<()> {
    println!("Watching directory for changes: {}", path);

    let mut config = load_config(base_dir)?;
    ensure_initialized(&config)?;
    apply_extensions(&mut config, extensions);
    config.poll_interval = Duration::from_secs(interval);

    let root = PathBuf::from(path);
    let debounce = config.debounce;
    let poll_interval = config.poll_interval;
    let watched_extensions = config.extensions.clone();

    let mut engine = SearchEngine::with_cache(config, Arc::new(BasicNormalizer::new()));

    // Catch up first so changes made while docdex was not running are indexed
    let rebuilt = engine
        .sync(&root)
        .with_context(|| format!("Failed to sync {}", root.display()))?;
    if rebuilt {
        println!(
            "✓ Initial sync complete: {} documents",
            engine.document_count()
        );
    } else {
        println!(
            "✓ Index already up to date: {} documents",
            engine.document_count()
        );
    }

    let mut watcher = FileSystemWatcher::new(&root, watched_extensions, debounce);
    let signals = watcher
        .start()
        .with_context(|| format!("Failed to start watching {}", root.display()))?;

    println!("Press Ctrl+C to stop watching...\n");

    let mut service = WatchService::new(engine, &root, poll_interval);
    service.run(&signals);

    watcher.stop();
    Ok(())
}
