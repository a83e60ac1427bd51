//! otrkey-index CLI
//!
//! Gathers the otrkey listings of all configured mirrors into one CSV file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use otrkey_index::{
    error::Result,
    models::{Config, FileEntry, MirrorDescriptor, ParsedFilename},
    pipeline,
    storage::LocalStorage,
};

/// otrkey-index - OTR mirror listing aggregator
#[derive(Parser, Debug)]
#[command(
    name = "otrkey-index",
    version,
    about = "Aggregates otrkey listings from OTR mirrors"
)]

struct Cli {
    /// Path to the TOML settings file (defaults apply if it does not exist)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch every mirror and replace the saved listing (default)
    Fetch {
        /// Mirror list (default: paths.mirrors_file)
        #[arg(long)]
        mirrors: Option<PathBuf>,

        /// Output CSV (default: paths.output_file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate settings and the mirror list
    Validate,

    /// Show the metadata encoded in a file name
    Parse {
        file_name: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search the saved listing by title
    Search { term: String },

    /// Show per-mirror counts of the saved listing
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config)?;

    match cli.command.unwrap_or(Command::Fetch {
        mirrors: None,
        output: None,
    }) {
        Command::Fetch { mirrors, output } => {
            if let Some(path) = mirrors {
                config.paths.mirrors_file = path;
            }
            if let Some(path) = output {
                config.paths.output_file = path;
            }
            config.validate()?;

            log::info!("Gather OTR mirror list...");
            let summary = pipeline::run_fetch(&config).await?;

            log::info!(
                "{} mirrors live, {} from fallback, finished in {:.1}s",
                summary.live_mirrors,
                summary.fallback_mirrors,
                summary.elapsed_secs()
            );
            println!(
                "Done. {} entries saved to '{}'.",
                summary.entries_saved, summary.location
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = pipeline::run_validate(&config) {
                log::error!("Validation failed: {}", e);
                return Err(e);
            }
            log::info!("All validations passed!");
        }

        Command::Parse { file_name, json } => match ParsedFilename::parse(&file_name) {
            Some(parsed) if json => println!("{}", serde_json::to_string_pretty(&parsed)?),
            Some(parsed) => {
                println!("title:     {}", parsed.title);
                if let Some(tag) = parsed.episode_tag() {
                    println!("episode:   {tag}");
                }
                println!("date:      {}", parsed.date);
                println!("time:      {}", parsed.time);
                println!("channel:   {}", parsed.channel);
                println!("duration:  {} min", parsed.duration);
                if let Some(quality) = &parsed.quality {
                    println!("quality:   {quality}");
                }
                println!("container: {}", parsed.container);
            }
            None => println!("'{file_name}' does not follow the otrkey naming scheme"),
        },

        Command::Search { term } => {
            let mirrors =
                MirrorDescriptor::load_all(&config.paths.mirrors_file, &config.quota.proxy_tag)?;
            let entries = load_saved(&config).await?;

            let groups = pipeline::search(&entries, &mirrors, &term);
            if groups.is_empty() {
                println!("No results for '{term}'.");
            }
            for group in &groups {
                println!("{}", group.heading());
                for link in &group.links {
                    println!("    [{}] {} ({})", link.label, link.url, link.mirror_name);
                }
            }
        }

        Command::Info => {
            let entries = load_saved(&config).await?;
            log::info!(
                "Listing: {} ({} entries)",
                config.paths.output_file.display(),
                entries.len()
            );
            for count in pipeline::summarize(&entries) {
                log::info!(
                    "  {}: {} files ({} parseable)",
                    count.mirror_name,
                    count.files,
                    count.parseable
                );
            }
        }
    }

    Ok(())
}

/// Read the saved listing; a missing file reads as empty.
async fn load_saved(config: &Config) -> Result<Vec<FileEntry>> {
    let storage = LocalStorage::new(&config.paths.output_file);
    match storage.load_entries().await? {
        Some(entries) => Ok(entries),
        None => {
            log::warn!(
                "No saved listing at {}. Run 'fetch' first.",
                config.paths.output_file.display()
            );
            Ok(Vec::new())
        }
    }
}
