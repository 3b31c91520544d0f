mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{error, info};

use plumb_core::cache::{CacheBackend, FileCacheBackend, MemoryCacheBackend};
use plumb_core::definition::{FormatTranslator, Translator};
use plumb_core::discovery::DiscoveryEngine;
use plumb_core::kernel::constants::DEFAULT_CACHE_FILE;
use plumb_core::plugin_system::{
    ClassRegistry, DefaultPluginManager, DeriverRegistry, PluginManager, PluginSystemError,
};
use plumb_core::storage::{CacheBackendKind, DiscoveryConfig};
use plumb_core::{KernelError, Result};

/// Plumb: discover, cache and inspect plugin definitions
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Print "pong" and exit
    #[arg(long)]
    ping: bool,

    /// Discovery configuration (JSON, TOML or YAML)
    #[arg(long, short, default_value = "plumb.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List discovered plugins: id, provider, class
    List {},
    /// Print one definition as JSON
    Show {
        /// Registry id, e.g. `foo` or `foo:1`
        id: String,
    },
    /// Print statistics and skipped files of a discovery pass
    Report {},
    /// Drop every cached scan result of the configured plugin kind
    ClearCache {},
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return;
    }

    if let Err(e) = logging::init(args.json_logs) {
        eprintln!("{}", e);
    }

    let Some(command) = args.command else {
        eprintln!("No command given; try --help");
        std::process::exit(2);
    };

    if let Err(e) = run(&args.config, command).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config_path: &Path, command: Commands) -> Result<()> {
    let config = DiscoveryConfig::load(config_path)?;
    info!("Loaded configuration from {}", config_path.display());
    let manager = build_manager(&config)?;

    match command {
        Commands::List {} => {
            let definitions = manager.definitions().await?;
            if definitions.is_empty() {
                println!("No plugins found.");
            }
            for (id, definition) in &definitions {
                println!(
                    "{}\t{}\t{}",
                    id,
                    definition.provider().unwrap_or("-"),
                    definition.class().unwrap_or("-")
                );
            }
        }
        Commands::Show { id } => {
            let definition = manager
                .definition(&id)
                .await?
                .ok_or_else(|| PluginSystemError::not_found(&id))?;
            let json = serde_json::to_string_pretty(&definition)
                .map_err(|e| KernelError::Other(format!("Failed to render definition: {}", e)))?;
            println!("{}", json);
            let label = definition.label().and_then(|label| label.render(&FormatTranslator));
            if let Some(label) = label {
                println!("Label: {}", label);
            }
        }
        Commands::Report {} => {
            manager.definitions().await?;
            let Some(report) = manager.last_report().await else {
                return Err(KernelError::Other("Discovery produced no report".to_string()));
            };
            let stats = report.stats;
            println!("Definitions: {}", report.definitions.len());
            println!("Files seen: {}", stats.files_seen);
            println!(
                "Cache hits: {} ({} not plugins)",
                stats.cache_hits + stats.cache_empty_hits,
                stats.cache_empty_hits
            );
            println!("Parsed: {}", stats.parsed);
            println!("Not plugins: {}", stats.not_plugins);
            println!("Collisions: {}", stats.collisions);
            println!("Skipped: {}", stats.skipped);
            for skipped in &report.skipped {
                println!(
                    "  - {} [{}]: {}",
                    skipped.path.display(),
                    skipped.class.as_deref().unwrap_or("?"),
                    skipped.reason
                );
            }
        }
        Commands::ClearCache {} => {
            manager.clear_file_cache().await?;
            println!("Cleared cache bucket {}", manager.engine().cache().bucket());
        }
    }
    Ok(())
}

/// Wire a manager from configuration, with statically registered plugin kinds
fn build_manager(config: &DiscoveryConfig) -> Result<DefaultPluginManager> {
    let backend: Arc<dyn CacheBackend> = match config.cache.backend {
        CacheBackendKind::Memory => Arc::new(MemoryCacheBackend::new()),
        CacheBackendKind::File => {
            let path = config
                .cache
                .path
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE));
            Arc::new(FileCacheBackend::open(path)?)
        }
    };
    info!("Using '{}' cache backend", backend.name());

    let mut catalog = config.catalog()?;
    if !catalog.contains(plumb_runner::RUNNER_ATTRIBUTE) {
        plumb_runner::register_attributes(&mut catalog)?;
    }
    let engine = DiscoveryEngine::new(config.options(), Arc::new(catalog), backend);

    let mut classes = ClassRegistry::new();
    plumb_runner::register_classes(&mut classes)?;
    let mut derivers = DeriverRegistry::new();
    plumb_runner::register_derivers(&mut derivers)?;

    let translator: Arc<dyn Translator> = Arc::new(FormatTranslator);
    let mut manager = DefaultPluginManager::new(engine, config.namespace_map())
        .with_classes(classes)
        .with_derivers(derivers)
        .with_translator(translator);
    if let Some(deadline) = config.deadline() {
        manager = manager.with_deadline(deadline);
    }
    Ok(manager)
}
