//! MDL Deployer - Entry Point
//!
//! Deploys an MDL manifest to the engine and waits until the engine reports it
//! is serving that version.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use colored::Colorize;
use serde::Serialize;
use tracing::{error, info};

use mdl_deployer::app::options::AppOptions;
use mdl_deployer::app::run::{run_deploy, run_status};
use mdl_deployer::deploy::{DeployStatus, TracingEventSink};
use mdl_deployer::filesys::file::File;
use mdl_deployer::logs::{init_logging, LogLevel, LogOptions};
use mdl_deployer::storage::settings::Settings;
use mdl_deployer::utils::version_info;

const DEFAULT_SETTINGS_PATH: &str = "/etc/mdl-deployer/settings.json";

const USAGE: &str = "\
Usage:
  mdl-deployer --deploy --manifest=<path> [--hash=<version>]
  mdl-deployer --status
  mdl-deployer --version

Options:
  --settings=<path>    settings file (default /etc/mdl-deployer/settings.json)
  --endpoint=<url>     engine base URL (overrides settings and MDL_ENGINE_ENDPOINT)
  --log-level=<level>  trace, debug, info, warn or error";

#[tokio::main]
async fn main() {
    let code = run_cli().await;
    std::process::exit(code);
}

async fn run_cli() -> i32 {
    // Parse command line arguments
    let cli_args = parse_args(env::args().skip(1));

    // Print version and exit
    if cli_args.contains_key("version") {
        return print_json(&version_info());
    }

    if cli_args.contains_key("help") {
        println!("{USAGE}");
        return 0;
    }

    // Retrieve the settings file
    let settings_path = cli_args
        .get("settings")
        .cloned()
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
    let mut settings = match Settings::load(&File::new(&settings_path)).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to read settings file {settings_path}: {e}");
            return 2;
        }
    };
    settings.apply_env();
    if let Some(endpoint) = cli_args.get("endpoint") {
        settings.engine.endpoint = endpoint.clone();
    }
    if let Some(level) = cli_args.get("log-level") {
        match level.parse::<LogLevel>() {
            Ok(level) => settings.log_level = level,
            Err(e) => {
                eprintln!("{e}");
                return 2;
            }
        }
    }

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        log_dir: settings.log_dir.clone(),
        json_format: settings.log_json,
        ..Default::default()
    };
    let _log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    let options = match AppOptions::from_settings(&settings) {
        Ok(options) => options,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return 2;
        }
    };

    if cli_args.contains_key("status") {
        return match run_status(&options).await {
            Ok(status) => print_json(&status),
            Err(e) => {
                error!("Failed to read engine status: {}", e);
                1
            }
        };
    }

    if cli_args.contains_key("deploy") {
        let Some(manifest_path) = cli_args.get("manifest") else {
            eprintln!("--deploy requires --manifest=<path>\n\n{USAGE}");
            return 2;
        };

        let result = run_deploy(
            &options,
            Arc::new(TracingEventSink),
            &File::new(manifest_path),
            cli_args.get("hash").cloned(),
            await_shutdown_signal(),
        )
        .await;

        return match result {
            Ok(result) => {
                match result.status() {
                    DeployStatus::Success => eprintln!("{}", "SUCCESS".green().bold()),
                    DeployStatus::Failed => eprintln!(
                        "{} {}",
                        "FAILED".red().bold(),
                        result.error().unwrap_or_default()
                    ),
                }
                let code = print_json(&result);
                if result.is_success() {
                    code
                } else {
                    1
                }
            }
            Err(e) => {
                error!("Unable to deploy {}: {}", manifest_path, e);
                2
            }
        };
    }

    eprintln!("{USAGE}");
    2
}

/// Collect `--key=value` pairs and standalone `--flag`s
fn parse_args(args: impl Iterator<Item = String>) -> HashMap<String, String> {
    let mut cli_args = HashMap::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    cli_args
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(e) => {
            eprintln!("Failed to serialize output: {e}");
            1
        }
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, cancelling deploy...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, cancelling deploy...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received, cancelling deploy...");
        } else {
            std::future::pending::<()>().await;
        }
    }
}
