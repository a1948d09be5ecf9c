use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taleweave::config::{Config, ConfigLoader};
use taleweave::types::TicketTier;

/// Parse ticket tier from string
fn parse_ticket_tier(s: &str) -> Result<TicketTier, String> {
    s.parse()
}

#[derive(Parser)]
#[command(name = "taleweave")]
#[command(
    version,
    about = "Story-generation pipeline with retry/backoff and content-safety gating"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Load configuration from this file instead of the resolution chain
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fairy tale for a topic
    Fairytale {
        #[arg(help = "Story topic, any language")]
        subject: String,
        #[arg(
            long,
            short,
            default_value = "EN-US",
            help = "Language the finished story is returned in"
        )]
        target_language: String,
    },

    /// Illustrate a story paragraph (consumes one ticket)
    Image {
        #[arg(help = "Paragraph text to illustrate")]
        script: String,
        #[arg(long, short = 't', value_parser = parse_ticket_tier, help = "Ticket tier: golden, silver, pink")]
        ticket: TicketTier,
    },

    /// Translate a story detail page
    Translate {
        #[arg(help = "Story title")]
        title: String,
        #[arg(help = "Story paragraphs", num_args = 1..)]
        paragraphs: Vec<String>,
        #[arg(long, short, help = "Target language code")]
        target_language: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mtaleweave encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        default_hook(panic_info);
    }));
}

fn load_config(path: &Option<PathBuf>) -> taleweave::types::Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Fairytale {
            subject,
            target_language,
        } => {
            let config = load_config(&cli.config)?;
            let pipeline = taleweave::cli::build_pipeline(&config)?;
            let rt = Runtime::new()?;
            rt.block_on(taleweave::cli::commands::fairytale::run(
                &pipeline,
                &subject,
                &target_language,
            ))?;
        }
        Commands::Image { script, ticket } => {
            let config = load_config(&cli.config)?;
            let pipeline = taleweave::cli::build_pipeline(&config)?;
            let rt = Runtime::new()?;
            rt.block_on(taleweave::cli::commands::image::run(
                &pipeline, &script, ticket,
            ))?;
        }
        Commands::Translate {
            title,
            paragraphs,
            target_language,
        } => {
            let config = load_config(&cli.config)?;
            let pipeline = taleweave::cli::build_pipeline(&config)?;
            let rt = Runtime::new()?;
            rt.block_on(taleweave::cli::commands::translate::run(
                &pipeline,
                &title,
                &paragraphs,
                &target_language,
            ))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                taleweave::cli::commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                taleweave::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                taleweave::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
