//! Network Speed Tester - Main CLI Application
//!
//! Measures ping, download throughput and an estimated upload figure against
//! public HTTP endpoints and prints the results to the terminal.

use clap::Parser;
use network_speed_tester::{
    build_info,
    cli::Cli,
    client::ClientFactory,
    config::{display_config_summary, load_config, EnvManager},
    error::{AppError, ErrorReporter, Result},
    logging::LoggerFactory,
    measure::CancellationHandle,
    netinfo::{NetworkInfoFetcher, NetworkInfoSource},
    output::{ConsoleProgress, OutputCoordinator, OutputFormatterFactory},
    session::{MeasurementSession, NoopObserver, SessionReport},
};
use std::process;

/// Exit code used when a second Ctrl+C aborts the program
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("Please report this issue together with the output of --debug");
        process::exit(1);
    }));

    // Parse command line arguments
    let cli = Cli::parse();

    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        process::exit(1);
    }

    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    // Handle the actual application logic
    if let Err(e) = run_application(cli).await {
        reporter.report_error(&e);
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    if let Some(path) = cli.write_env_example.as_deref() {
        EnvManager::save_example_env_file(path)?;
        println!("Wrote example configuration to {}", path.display());
        return Ok(());
    }

    // Debug chatter goes to stderr so --json output stays parseable
    if cli.debug {
        eprintln!("{}", build_info());
        eprintln!("Debug mode enabled");
        eprintln!();
    }

    // Load and validate configuration
    let config = load_config(cli)?;

    if !config.enable_color {
        colored::control::set_override(false);
    }

    if config.debug {
        eprintln!("Configuration loaded successfully:");
        eprintln!("{}", display_config_summary(&config));
        for warning in EnvManager::validate_current_env() {
            eprintln!("{}", warning);
        }
        eprintln!();
    }

    let logger_factory = LoggerFactory::new(config.clone());
    let logger = logger_factory.create_measurement_logger().await;
    let client = ClientFactory::for_config(&config)?;

    let network = if config.show_network_info {
        Some(NetworkInfoFetcher::new(client.clone()).fetch_network_info().await)
    } else {
        None
    };

    let mut session = MeasurementSession::from_config(&config, client, logger)?;
    spawn_interrupt_handler(session.cancellation_handle());

    if config.json_output {
        session.run(&NoopObserver).await?;
        let report = finished_report(&session, network)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let formatter = OutputFormatterFactory::create_formatter(config.enable_color, config.verbose);
    let coordinator = OutputCoordinator::new(formatter, config.verbose);

    println!("{}", coordinator.display_banner(network.as_ref())?);
    println!();

    let progress = ConsoleProgress::new(&coordinator);
    session.run(&progress).await?;

    let report = finished_report(&session, network)?;
    println!();
    println!("{}", coordinator.display_report(&report)?);

    if config.debug {
        eprintln!();
        eprintln!("Run ID: {} (log session {})", report.run_id, logger_factory.session_id());
    }

    Ok(())
}

fn finished_report(
    session: &MeasurementSession,
    network: Option<network_speed_tester::NetworkInfo>,
) -> Result<SessionReport> {
    session
        .report(network)
        .ok_or_else(|| AppError::internal("Session finished without a result"))
}

/// First Ctrl+C closes the download window early, a second one exits
fn spawn_interrupt_handler(cancel: CancellationHandle) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        cancel.cancel();
        eprintln!();
        eprintln!("Interrupted: closing the download window early, press Ctrl+C again to quit");

        if tokio::signal::ctrl_c().await.is_ok() {
            process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
}
