use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wikiplan::cli::commands;

#[derive(Parser)]
#[command(name = "wikiplan")]
#[command(
    version,
    about = "Plan wiki documentation for a repository checkout"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a checkout and produce its documentation plan
    Plan {
        #[arg(default_value = ".", help = "Repository checkout")]
        path: PathBuf,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
        #[arg(long, short, help = "Write the plan to a file")]
        output: Option<PathBuf>,
    },

    /// Print the trees generated for a checkout
    Tree {
        #[arg(default_value = ".", help = "Repository checkout")]
        path: PathBuf,
        #[arg(long, help = "Print the flat path list")]
        flat: bool,
        #[arg(long, help = "Skip the line budget")]
        full: bool,
    },

    /// Run the documentation service handler on a request body
    Request {
        #[arg(long, help = "JSON request body file")]
        body: PathBuf,
        #[arg(long, env = "WIKI_SERVICE_TOKEN", help = "Bearer token to send")]
        token: Option<String>,
    },

    /// Check that the generation endpoint is reachable
    Check,

    /// List available prompt templates
    Prompts,

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
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
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
        eprintln!("\x1b[31mwikiplan encountered an unexpected error:\x1b[0m");
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

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
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
        Commands::Plan {
            path,
            format,
            output,
        } => commands::plan::run(&path, &format, output)?,
        Commands::Tree { path, flat, full } => commands::tree::run(&path, flat, full)?,
        Commands::Request { body, token } => commands::request::run(&body, token.as_deref())?,
        Commands::Check => commands::check::run()?,
        Commands::Prompts => commands::prompts::run()?,
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => commands::config::show(global, &format)?,
            ConfigAction::Path => commands::config::path()?,
            ConfigAction::Init { global, force } => commands::config::init(global, force)?,
        },
    }

    Ok(())
}
