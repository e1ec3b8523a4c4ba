use std::io;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use radiator_core::{BleConfig, BleConnector};

mod cli;
mod commands;
mod config;
mod format;
mod util;

use cli::{Cli, Commands, OutputFormat};
use commands::{Target, cmd_config, cmd_get, cmd_set};
use config::{Config, resolve_device, resolve_format, resolve_pin, resolve_timeout};
use util::{exit, exit_code, require_device, require_pin};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "radiator", &mut io::stdout());
        return ExitCode::from(exit::SUCCESS);
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(exit::FAILURE);
        }
    };

    init_tracing(&cli, &config);

    match run(cli, config).await {
        Ok(()) => ExitCode::from(exit::SUCCESS),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Logs go to stderr so terse output on stdout stays parseable.
fn init_tracing(cli: &Cli, config: &Config) {
    let terse_by_config = cli.requested_format().is_none()
        && matches!(resolve_format(None, config), Ok(OutputFormat::Terse));

    let filter = if cli.is_quiet() || terse_by_config {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    if let Some(Commands::Config { action }) = cli.command {
        return cmd_config(action, &config, &mut io::stdout());
    }

    let target = Target {
        address: require_device(resolve_device(cli.device.clone(), &config))?,
        pin: require_pin(resolve_pin(cli.pin, &config))?,
        profile: config.firmware_profile(),
    };

    let mut ble = BleConfig::default();
    if let Some(secs) = resolve_timeout(cli.timeout, &config) {
        let timeout = Duration::from_secs(secs);
        ble = ble.scan_timeout(timeout).connection_timeout(timeout);
    }
    let connector = BleConnector::new(ble);

    if cli.get {
        let format = resolve_format(cli.requested_format(), &config)?;
        cmd_get(&connector, &target, format, &mut io::stdout()).await
    } else {
        cmd_set(&connector, &target, cli.set, cli.offset).await
    }
}
