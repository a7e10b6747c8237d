// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use std::io::Write;
use std::path::{Path, PathBuf};

use castscript::app_config::{self, Config};
use castscript::{AppError, Controller, TranscriptFormat};

/// CLI Wrapper for TranscriptFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliFormat {
    Webvtt,
    Xml,
    #[value(alias = "json_flat")]
    Json,
    #[value(name = "json_grouped")]
    JsonGrouped,
    #[value(name = "json_podcastindex")]
    JsonPodcastindex,
}

impl From<CliFormat> for TranscriptFormat {
    fn from(cli_format: CliFormat) -> Self {
        match cli_format {
            CliFormat::Webvtt => TranscriptFormat::WebVtt,
            CliFormat::Xml => TranscriptFormat::Xml,
            CliFormat::Json => TranscriptFormat::JsonFlat,
            CliFormat::JsonGrouped => TranscriptFormat::JsonGrouped,
            CliFormat::JsonPodcastindex => TranscriptFormat::JsonPodcastIndex,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum EpisodeCommands {
    /// Register an episode
    Add {
        /// Episode slug, also used in permalinks
        slug: String,
    },
    /// Delete an episode and its transcript
    Delete { slug: String },
}

#[derive(Subcommand, Debug)]
enum ContributorCommands {
    /// Register a contributor
    Add {
        /// Identifier matched exactly against voice labels
        identifier: String,
        /// Display name shown to listeners
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List contributors
    List,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage episodes
    Episode {
        #[command(subcommand)]
        action: EpisodeCommands,
    },

    /// Manage contributors
    Contributor {
        #[command(subcommand)]
        action: ContributorCommands,
    },

    /// Import a WebVTT file for an episode
    Import {
        slug: String,
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Fetch and import the episode's remote transcript file
    ImportAsset { slug: String },

    /// Re-import after an episode asset changed (only vtt files are imported)
    AssetChanged {
        slug: String,
        /// Extension of the changed file
        extension: String,
    },

    /// Render an episode transcript
    Render {
        slug: String,
        #[arg(short, long, value_enum, default_value = "webvtt")]
        format: CliFormat,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the voices of an episode and their contributors
    Voices { slug: String },

    /// Assign a voice label to a contributor
    Assign {
        slug: String,
        voice: String,
        identifier: String,
    },

    /// Print transcript URLs and feed tags of an episode
    Links { slug: String },

    /// Export all transcripts and voice assignments to a JSON file
    Export { file: PathBuf },

    /// Replace all transcripts and voice assignments from a JSON file
    Restore { file: PathBuf },

    /// Show database statistics
    Stats,

    /// Generate shell completions for castscript
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// castscript - Podcast episode transcripts
///
/// Imports WebVTT captions for podcast episodes and renders them as WebVTT,
/// XML and JSON.
#[derive(Parser, Debug)]
#[command(name = "castscript")]
#[command(version)]
#[command(about = "Podcast transcript import and rendering")]
#[command(long_about = "castscript imports WebVTT captions for podcast episodes, maps speaker voices to contributors and renders transcripts in several formats.

EXAMPLES:
    castscript episode add ep-001                        # Register an episode
    castscript contributor add roger --name \"Roger\"      # Register a contributor
    castscript import ep-001 captions.vtt                # Import a transcript
    castscript render ep-001 -f json_podcastindex        # Render for podcast apps
    castscript links ep-001                              # Show transcript URLs
    castscript completions bash > castscript.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and emoji for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌ "),
            Level::Warn => ("1;33", "🚧 "),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍 "),
            Level::Trace => ("1;35", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, emoji) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Trace so the max level alone decides what is shown once the config is read
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "castscript", &mut std::io::stdout());
        return Ok(());
    }

    if let Err(e) = run(cli).await {
        match &e {
            AppError::Import(import_error) => error!("{}", import_error.public_message()),
            other => error!("{}", other),
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(options: CommandLineOptions) -> Result<(), AppError> {
    let mut config = Config::load_or_create(Path::new(&options.config_path))
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;

    // Command line log level wins over the configured one
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    match options.command {
        Commands::Episode { action } => match action {
            EpisodeCommands::Add { slug } => {
                let episode = controller.add_episode(&slug).await?;
                println!("{}\t{}", episode.id, episode.slug);
            }
            EpisodeCommands::Delete { slug } => controller.delete_episode(&slug).await?,
        },
        Commands::Contributor { action } => match action {
            ContributorCommands::Add { identifier, name } => {
                let contributor = controller
                    .add_contributor(&identifier, name.as_deref())
                    .await?;
                println!("{}\t{}", contributor.id, contributor.identifier);
            }
            ContributorCommands::List => {
                for contributor in controller.list_contributors().await? {
                    println!("{}\t{}\t{}", contributor.id, contributor.identifier, contributor.label());
                }
            }
        },
        Commands::Import { slug, file } => {
            let summary = controller.import_file(&slug, &file).await?;
            info!("Stored {} cues for '{}'", summary.cue_count, slug);
        }
        Commands::ImportAsset { slug } => {
            let summary = controller.import_asset(&slug).await?;
            info!("Stored {} cues for '{}'", summary.cue_count, slug);
        }
        Commands::AssetChanged { slug, extension } => {
            match controller.asset_changed(&slug, &extension).await? {
                Some(summary) => info!("Stored {} cues for '{}'", summary.cue_count, slug),
                None => info!("Nothing to import for '{}' asset", extension),
            }
        }
        Commands::Render { slug, format, output } => {
            let rendered = controller.render(&slug, format.into()).await?;
            match output {
                Some(path) => std::fs::write(&path, rendered.body)?,
                None => print!("{}", rendered.body),
            }
        }
        Commands::Voices { slug } => {
            for entry in controller.voices(&slug).await? {
                let label = entry
                    .contributor
                    .as_ref()
                    .map(|contributor| contributor.label().to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{}\t{}", entry.voice, label);
            }
        }
        Commands::Assign { slug, voice, identifier } => {
            controller.assign_voice(&slug, &voice, &identifier).await?;
        }
        Commands::Links { slug } => {
            let links = controller.links(&slug).await?;
            println!("permalink\t{}", links.permalink);
            for (format, url) in &links.formats {
                println!("{}\t{}", format, url);
            }
            if let Some(player) = &links.player {
                println!("player\t{}", player);
            }
            for link in &links.feed {
                println!("{}", link.to_feed_tag());
            }
        }
        Commands::Export { file } => {
            let export = controller.export(&file).await?;
            info!("Wrote {} cues to {}", export.transcripts.len(), file.display());
        }
        Commands::Restore { file } => {
            let export = controller.restore(&file).await?;
            info!("Restored {} cues from {}", export.transcripts.len(), file.display());
        }
        Commands::Stats => println!("{}", controller.stats()?),
        Commands::Completions { .. } => {}
    }

    Ok(())
}
