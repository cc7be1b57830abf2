use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pubsubforge::{
    config::{BackendSettings, Settings, DEFAULT_PATTERN, EMULATOR_HOST_ENV},
    PubSubForge,
};
use tracing_subscriber::{filter::LevelFilter, fmt::writer::BoxMakeWriter, EnvFilter};

const NAME: &str = "pubsubforge";

#[derive(Parser)]
#[command(
    name = NAME,
    about = "Create Pub/Sub topics and subscriptions from PUBSUB_PROJECT_* variables",
    after_help = "Example: env PUBSUB_PROJECT_1=\"project1,topic1,topic2:subscription1\" pubsubforge",
    disable_version_flag = true
)]
struct Cli {
    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Display version information
    #[arg(long)]
    version: bool,

    /// Abort the remaining projects after the first failure
    #[arg(long)]
    stop_on_error: bool,

    /// Wildcard pattern selecting the configuration variables
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pattern: String,

    /// Pub/Sub emulator host, e.g. localhost:8085
    #[arg(long, env = EMULATOR_HOST_ENV)]
    emulator_host: Option<String>,

    /// Per-request timeout against the emulator
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Parse and plan without contacting a backend
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let backend = if self.dry_run {
            BackendSettings::DryRun
        } else {
            let host = self
                .emulator_host
                .clone()
                .with_context(|| format!("{} is not set; pass --emulator-host or --dry-run", EMULATOR_HOST_ENV))?;
            BackendSettings::Emulator {
                host,
                request_timeout: self.timeout_secs.map(Duration::from_secs),
            }
        };
        Ok(Settings {
            pattern: self.pattern.clone(),
            stop_on_error: self.stop_on_error,
            backend,
        })
    }
}

fn version_string() -> String {
    format!(
        "{} {} - build {} ({}) running on {}",
        NAME,
        env!("CARGO_PKG_VERSION"),
        option_env!("PUBSUBFORGE_REVISION").unwrap_or("<not set>"),
        option_env!("PUBSUBFORGE_COMMIT").unwrap_or("<not set>"),
        env!("PUBSUBFORGE_RUSTC_VERSION"),
    )
}

/// Logs go to stdout unless stdout carries the JSON report. `--debug` wins
/// over `RUST_LOG` for this crate's own output.
fn init_tracing(debug: bool, json: bool) {
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    if debug {
        if let Ok(directive) = format!("{}=debug", env!("CARGO_CRATE_NAME")).parse() {
            filter = filter.add_directive(directive);
        }
    }
    let writer = if json {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(std::io::stdout)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .init();
}

async fn run(cli: &Cli) -> Result<bool> {
    let settings = cli.settings()?;
    let forge = PubSubForge::from_settings(settings);
    let projects = forge.discover();
    let report = forge.run(&projects).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report).context("Failed to encode report")?);
    }
    for (project, err) in report.failures() {
        eprintln!("{}: {}: {}", NAME, project.variable, err);
    }
    let skipped = report.skipped().count();
    if skipped > 0 {
        eprintln!("{}: skipped {} remaining project(s)", NAME, skipped);
    }
    Ok(report.is_success())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("{}", version_string());
        return ExitCode::SUCCESS;
    }

    init_tracing(cli.debug, cli.json);

    match run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{}: {}", NAME, err);
            ExitCode::FAILURE
        }
    }
}
