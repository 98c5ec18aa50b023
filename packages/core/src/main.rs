use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::signal;

use site_monitor::alerts::{AlertDispatcher, SmtpMailer};
use site_monitor::api;
use site_monitor::cli::Cli;
use site_monitor::config::Config;
use site_monitor::error::AppError;
use site_monitor::logging::init_logging;
use site_monitor::metrics::AppMetrics;
use site_monitor::monitor::CycleRunner;
use site_monitor::scheduler::Scheduler;
use site_monitor::services::HttpProber;
use site_monitor::sources::{load_targets, load_template};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    cli.apply(&mut config);

    let _log_guard = match init_logging(config.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Service started with config: {:?}", config);

    match run(config, cli.once).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config, once: bool) -> Result<(), AppError> {
    let targets = Arc::new(load_targets(&config.targets_file).await?);
    let template = Arc::new(load_template(&config.template_file).await?);
    tracing::info!(
        "Loaded {} targets from {}",
        targets.len(),
        config.targets_file.display()
    );

    let metrics = Arc::new(
        AppMetrics::new().map_err(|err| AppError::startup(format!("Metrics setup failed: {}", err)))?,
    );

    let prober = Arc::new(HttpProber::new(&config.probe)?);
    let mailer = Arc::new(SmtpMailer::new(&config.smtp).map_err(|err| AppError::config(err.to_string()))?);
    let dispatcher = AlertDispatcher::new(mailer).with_metrics(metrics.clone());
    let runner = CycleRunner::new(prober, dispatcher, targets, template).with_metrics(metrics.clone());
    let mut scheduler = Scheduler::new(runner, config.check_interval());

    if once {
        scheduler.run_once().await;
        return Ok(());
    }

    if let Some(port) = config.metrics_port {
        api::spawn_server(port, metrics).await?;
    }

    scheduler.run_until(shutdown_signal()).await;
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
