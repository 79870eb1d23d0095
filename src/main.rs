use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thumb_regen::batch::{self, BatchRequest};
use thumb_regen::catalog::JsonCatalog;
use thumb_regen::config::{self, RegenConfig};
use thumb_regen::cursor::{CursorStore, FileCursor};
use thumb_regen::hooks::ConfiguredHooks;
use thumb_regen::imaging::ImageGenerator;
use thumb_regen::output;
use thumb_regen::process::Regenerator;
use thumb_regen::resolve::ContentRootResolver;
use thumb_regen::storage::LocalFs;
use thumb_regen::types::AssetId;

#[derive(Parser)]
#[command(name = "thumb-regen")]
#[command(about = "Delete and regenerate stale image thumbnails")]
#[command(long_about = "\
Delete and regenerate stale image thumbnails

For each asset, every derivative on disk (recorded in metadata or named
<stem>-<W>x<H>.<ext> next to the original) is deleted, the configured sizes
are regenerated from the best available source, and the result is reported
per size: deleted, regenerated, or delete error.

Working root layout:

  site/
  ├── config.toml                  # Optional, see `gen-config`
  ├── catalog.json                 # Assets and their metadata records
  ├── .thumb-regen-state.json      # Batch resume cursor (while a batch runs)
  └── content/                     # Originals and derivatives
      └── 2024/05/
          ├── photo-scaled.jpg
          ├── photo-150x150.jpg
          └── photo-300x200.jpg

Batches run in descending id order and can be resumed after an interruption
with `batch --resume`.")]
#[command(version)]
struct Cli {
    /// Working root containing config.toml and the catalog
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Log every file action to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Regenerate thumbnails for specific assets
    Regen {
        /// Asset ids
        #[arg(required = true)]
        ids: Vec<AssetId>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Regenerate thumbnails for many assets, newest first
    Batch {
        /// Only these asset ids (comma separated)
        #[arg(long, value_delimiter = ',')]
        ids: Option<Vec<AssetId>>,
        /// Continue below the cursor of an interrupted run
        #[arg(long)]
        resume: bool,
        /// Discard any stored cursor before starting
        #[arg(long)]
        start_over: bool,
    },
    /// Show whether an interrupted batch can be resumed
    Status,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "thumb_regen=debug"
    } else {
        "thumb_regen=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Regen { ids, json } => {
            let config = config::load_config(&cli.root)?;
            let results = with_regenerator(&config, &cli.root, |regen| {
                Ok(ids.iter().map(|&id| regen.process_one(id)).collect::<Vec<_>>())
            })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                results.iter().for_each(output::print_result);
            }
            let failed = results.iter().filter(|r| !r.success()).count();
            if failed > 0 {
                return Err(format!(
                    "{} of {} assets not fully regenerated",
                    failed,
                    results.len()
                )
                .into());
            }
        }
        Command::Batch {
            ids,
            resume,
            start_over,
        } => {
            let config = config::load_config(&cli.root)?;
            let cursor = FileCursor::new(&config.state_path(&cli.root));
            let request = BatchRequest {
                ids,
                resume,
                start_over,
            };
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = with_regenerator(&config, &cli.root, |regen| {
                Ok(batch::run(regen, &cursor, &request, Some(tx))?)
            });
            printer.join().map_err(|_| "output thread panicked")?;
            let summary = result?;
            if summary.failed > 0 {
                return Err(format!("{} assets failed", summary.failed).into());
            }
        }
        Command::Status => {
            let config = config::load_config(&cli.root)?;
            let cursor = FileCursor::new(&config.state_path(&cli.root));
            output::print_status(cursor.path(), cursor.load());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }
    Ok(())
}

/// Build the production collaborators and hand a [`Regenerator`] to `f`.
fn with_regenerator<T>(
    config: &RegenConfig,
    root: &std::path::Path,
    f: impl FnOnce(&Regenerator<'_>) -> Result<T, Box<dyn std::error::Error>>,
) -> Result<T, Box<dyn std::error::Error>> {
    let files = LocalFs;
    let catalog = JsonCatalog::open(&config.catalog_path(root))?;
    let resolver = ContentRootResolver::new(&config.content_root_path(root), &files);
    let generator = ImageGenerator::new(config.sizes.clone(), config.quality());
    let hooks = ConfiguredHooks::new(&config.protect);
    let regen = Regenerator {
        catalog: &catalog,
        resolver: &resolver,
        generator: &generator,
        files: &files,
        hooks: &hooks,
    };
    f(&regen)
}
