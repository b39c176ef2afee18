#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod backend;
mod commands;
pub mod config;
pub mod connectivity;
mod errors;
pub mod monitor;
pub mod resolver;
mod webdriver_manager;

use backend::BackendKind;
use errors::PortalError;

#[derive(Parser)]
#[command(name = "portalwatch")]
#[command(about = "Automatic captive-portal WiFi login", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Env file with WIFI_USERNAME / WIFI_PASSWORD / TARGET_SSID
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Append log output to this file in addition to stderr
    #[arg(long, global = true, default_value = "portalwatch.log")]
    log_file: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor the network and log in whenever a captive portal appears
    Watch {
        /// Submission strategy
        #[arg(long, default_value = "http")]
        backend: BackendKind,

        /// Browser to use with the browser backend
        #[arg(short, long, default_value = "firefox")]
        browser: String,

        /// Run the browser in visible mode (disables headless)
        #[arg(long = "no-headless")]
        no_headless: bool,

        /// Seconds between connectivity checks
        #[arg(long)]
        interval: Option<u64>,

        /// Minimum seconds between two login-attempt sequences
        #[arg(long)]
        cooldown: Option<u64>,
    },

    /// Attempt the portal login once and exit (0 = online, 1 = failed)
    Login {
        /// Submission strategy
        #[arg(long, default_value = "http")]
        backend: BackendKind,

        /// Browser to use with the browser backend
        #[arg(short, long, default_value = "firefox")]
        browser: String,

        /// Run the browser in visible mode (disables headless)
        #[arg(long = "no-headless")]
        no_headless: bool,
    },

    /// Report current SSID and internet reachability as JSON
    Status,

    /// Inspect the live login page and suggest field names for the catalog
    Analyze {
        /// Browser to use
        #[arg(short, long, default_value = "firefox")]
        browser: String,

        /// Run the browser in visible mode (disables headless)
        #[arg(long = "no-headless")]
        no_headless: bool,
    },

    /// Generate OS auto-start artifacts that run `login` on network changes
    Install {
        /// Write artifacts here instead of the platform's standard location
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(()) => {}
        Err(e) => {
            let portal_err = PortalError::from(e);
            eprintln!("Error: {}", portal_err);
            std::process::exit(portal_err.exit_code());
        }
    }
}

fn init_tracing(log_file: &std::path::Path) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "portalwatch=info".into());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // Append-only local log next to the console mirror; plain text only.
    let file_layer = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .ok()
        .map(|file| {
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_target(false)
                .with_ansi(false)
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_file);

    match cli.command {
        Commands::Watch {
            backend,
            browser,
            no_headless,
            interval,
            cooldown,
        } => {
            commands::watch::handle_watch(
                cli.env_file,
                backend,
                browser,
                no_headless,
                interval,
                cooldown,
            )
            .await?
        }

        Commands::Login {
            backend,
            browser,
            no_headless,
        } => commands::login::handle_login(cli.env_file, backend, browser, no_headless).await?,

        Commands::Status => commands::status::handle_status(cli.env_file).await?,

        Commands::Analyze {
            browser,
            no_headless,
        } => commands::analyze::handle_analyze(cli.env_file, browser, no_headless).await?,

        Commands::Install { dir } => commands::install::handle_install(cli.env_file, dir).await?,
    }

    Ok(())
}
