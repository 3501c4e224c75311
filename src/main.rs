use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::Level;

use osenv::config::Config;
use osenv::openstack::{Credentials, OpenStackClient};
use osenv::resource::{self, loader, ManagerRegistry};

/// Declarative environment seeding for OpenStack
#[derive(Parser, Debug)]
#[command(name = "osenv", version, about, long_about = None)]
struct Args {
    /// Credentials file (JSON)
    #[arg(short, long)]
    credentials: PathBuf,

    /// Resource manifest to apply (JSON or YAML)
    #[arg(short, long)]
    resources: PathBuf,

    /// Provisioning timeout for asynchronously created resources, in seconds
    #[arg(long)]
    poll_timeout: Option<u64>,

    /// Interval between status queries, in seconds
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Also append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file);

        tracing_subscriber::fmt()
            .with_max_level(tracing_level)
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .init();

        return Ok(Some(guard));
    }

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    Ok(None)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level, args.log_file.as_deref())?;

    let config = Config::load();
    let poll = config.poll_policy(args.poll_timeout, args.poll_interval);

    let credentials = Credentials::from_file(&args.credentials)?;
    let definitions =
        loader::load(&args.resources).context("failed to load resource manifest")?;

    tracing::info!(
        "applying {} resource definitions from {}",
        definitions.len(),
        args.resources.display()
    );

    let client = OpenStackClient::connect(credentials)
        .await
        .context("failed to connect to OpenStack")?;
    let registry = ManagerRegistry::with_default_managers(poll);

    let report = resource::apply(&definitions, &client, &registry)
        .await
        .context("apply pass aborted")?;

    tracing::info!(
        "apply complete: {} created, {} already existed, {} failed",
        report.created(),
        report.already_existed(),
        report.failed()
    );

    Ok(())
}
