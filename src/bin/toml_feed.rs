use atlas_feed::core::ConfigProvider;
use atlas_feed::utils::{logger, validation::Validate};
use atlas_feed::{FeedEngine, FeedPipeline, LocalStorage, TomlConfig};
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml-feed")]
#[command(about = "Build a ranked marketplace feed from a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "atlas-feed.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the shuffle seed from config
    #[arg(long)]
    seed: Option<u64>,

    /// Show what would be built without fetching or writing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.log_json() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based feed build");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(seed) = args.seed {
        config.ranking.seed = Some(seed);
        tracing::info!("🔧 Shuffle seed overridden to: {}", seed);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be fetched or written");
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = FeedPipeline::new(storage, config);
    let engine = FeedEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(report) => {
            tracing::info!("✅ Feed built in {:?}", report.duration);
            println!("✅ Feed built successfully!");
            println!(
                "📊 {} listings, {} boosted, {} pages",
                report.total_listings, report.boosted_listings, report.pages
            );
            println!("📁 Output saved to: {}", report.output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Feed build failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Feed: {}", config.feed_name());
    if let Some(description) = &config.feed.description {
        println!("  Description: {}", description);
    }
    match (config.source_endpoint(), config.input_file()) {
        (Some(endpoint), _) => println!("  Source: {}", endpoint),
        (None, Some(file)) => println!("  Source file: {}", file),
        (None, None) => println!("  Source: <none>"),
    }
    println!("  Default kind: {}", config.listing_kind());
    if let Some(kind) = config.kind_filter() {
        println!("  Only kind: {}", kind);
    }
    if let Some(category) = config.category() {
        println!("  Category: {}", category);
    }
    println!("  Page size: {}", config.page_size());
    match config.shuffle_seed() {
        Some(seed) => println!("  Shuffle: seeded ({})", seed),
        None => println!("  Shuffle: random per run"),
    }
    println!("  Output: {}", config.output_path());
    let formats: Vec<String> = config
        .output_formats()
        .iter()
        .map(|f| format!("{:?}", f).to_lowercase())
        .collect();
    println!("  Formats: {}", formats.join(", "));
    if config.split_pages() {
        println!("  Per-page files: enabled");
    }
    if config.compress() {
        println!("  Compression: ZIP bundle");
    }
    println!(
        "  Timeout: {:?}, retries: {}",
        config.request_timeout(),
        config.retry_attempts()
    );

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
