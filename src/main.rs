use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use upwatch::commands::check::{self, CheckReport};
use upwatch::commands::status;
use upwatch::config::{MonitorArgs, MonitorConfig};
use upwatch::notify::CallMeBotNotifier;
use upwatch::probe::HttpProber;

#[derive(Parser)]
#[command(name = "upwatch")]
#[command(about = "HTTP availability monitor with WhatsApp alerts", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    monitor: MonitorArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe every configured URL once and update the snapshot (default)
    Check,

    /// Show the persisted snapshot without probing
    Status,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Check) {
        Commands::Check => run_check(cli.monitor),
        Commands::Status => run_status(cli.monitor),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Exit codes: 0 all URLs up, 1 at least one down or the run failed,
/// 2 unusable configuration.
fn run_check(args: MonitorArgs) -> ExitCode {
    let config = match MonitorConfig::resolve(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e}", "✗".red());
            return ExitCode::from(2);
        }
    };

    match execute_check(&config) {
        Ok(report) if report.all_up() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{} {e:#}", "✗".red());
            ExitCode::from(1)
        }
    }
}

fn execute_check(config: &MonitorConfig) -> Result<CheckReport> {
    let prober = HttpProber::new(config.timeout_secs, config.expect.clone())?;
    let notifier = CallMeBotNotifier::new(
        config.callmebot_phone.clone(),
        config.callmebot_apikey.clone(),
    )?;
    check::execute(config, &prober, &notifier)
}

fn run_status(args: MonitorArgs) -> ExitCode {
    match status::execute(args.state_file, args.state_schema_version) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "✗".red());
            ExitCode::from(1)
        }
    }
}
