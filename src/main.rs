use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use formsmith::ProviderKind;
use formsmith::cli::commands::config::parse_format;
use formsmith::cli::commands::generate::{GenerateOptions, OutputFormat};
use formsmith::config::ConfigFormat;

#[derive(Parser)]
#[command(name = "formsmith")]
#[command(
    version,
    about = "AI-driven form generator with multi-provider fallback"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Config file to use instead of global/project files")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate form fields from a description or a topic
    Generate {
        #[arg(long, short, help = "Free-form description of the form", conflicts_with = "topic")]
        prompt: Option<String>,
        #[arg(long, short, help = "Topic to write questions about")]
        topic: Option<String>,
        #[arg(long, short, requires = "topic", help = "Extra context for the topic")]
        description: Option<String>,
        #[arg(long, short = 'n', requires = "topic", help = "Number of questions (default: 5)")]
        count: Option<u32>,
        #[arg(long, help = "Provider for this call: grok, claude, gemini")]
        provider: Option<ProviderKind>,
        #[arg(long = "no-fallback", help = "Never fall back to the secondary provider")]
        no_fallback: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: OutputFormat,
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
            default_value = "toml",
            value_parser = parse_format,
            help = "Output format: toml, json"
        )]
        format: ConfigFormat,
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
        eprintln!("\x1b[31mformsmith encountered an unexpected error:\x1b[0m");
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

        // Default hook prints the backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the command succeeded
fn run_cli() -> anyhow::Result<bool> {
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
        Commands::Generate {
            prompt,
            topic,
            description,
            count,
            provider,
            no_fallback,
            format,
        } => {
            let rt = Runtime::new()?;
            let succeeded = rt.block_on(formsmith::cli::commands::generate::run(
                GenerateOptions {
                    prompt,
                    topic,
                    description,
                    count,
                    provider,
                    no_fallback,
                    format,
                    config_path: cli.config,
                },
            ))?;
            return Ok(succeeded);
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                formsmith::cli::commands::config::show(format, cli.config.as_deref())?;
            }
            ConfigAction::Path => {
                formsmith::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                formsmith::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(true)
}
