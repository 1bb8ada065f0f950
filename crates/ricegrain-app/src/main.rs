//! Ricegrain
//!
//! Web form and command line front end for the rice type classifier.

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use ricegrain_app::cli::{Cli, Commands, ModelArgs};
use ricegrain_app::config::AppConfig;
use ricegrain_app::server::run_server;
use ricegrain_app::state::AppState;
use ricegrain_classifiers::synthetic::{self, SyntheticConfig};
use ricegrain_classifiers::ModelArtifact;
use ricegrain_core::FeatureVector;
use ricegrain_telemetry::metrics::{
    PREDICTIONS_TOTAL, PREDICTION_ERRORS_TOTAL, PREDICTION_LATENCY_US,
};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            address,
            model,
            verbose,
        } => {
            init_tracing(verbose);

            let mut config = load_config(&model)?;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(address) = address {
                config.server.address = address;
            }
            let addr: SocketAddr =
                format!("{}:{}", config.server.address, config.server.port).parse()?;

            let metrics_handle = init_metrics()?;

            // Strict mode fails here, before anything is served
            let state = AppState::new(config)
                .context("Failed to load the classifier")?
                .with_prometheus(metrics_handle);

            let shutdown = async {
                shutdown_signal().await;
                warn!("Shutdown signal received, stopping server...");
            };

            run_server(state, addr, shutdown).await?;
        }

        Commands::Predict {
            features,
            model,
            json,
            chart,
            verbose,
        } => {
            init_tracing(verbose);

            let config = load_config(&model)?;
            let state = AppState::new(config).context("Failed to load the classifier")?;
            let response = state.predict(FeatureVector::from(features))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                if response.degraded {
                    println!("Warning: no trained model available, this prediction is not meaningful");
                }
                println!("{}", response.message);
                for (class, probability) in &response.probabilities {
                    println!("  {:<10} {:.3}", class, probability);
                }
            }

            if let Some(path) = chart {
                std::fs::write(&path, response.chart.to_plot().to_html())
                    .with_context(|| format!("Failed to write chart to {}", path.display()))?;
                info!("Chart written to {}", path.display());
            }
        }

        Commands::ExportModel {
            output,
            n_estimators,
            samples,
            seed,
            verbose,
        } => {
            init_tracing(verbose);

            let forest = synthetic::synthesize(&SyntheticConfig {
                samples,
                n_estimators,
                seed,
            })?;
            ModelArtifact::random_forest(forest).save(&output)?;

            println!("Wrote demonstration artifact to {}", output.display());
            println!("It is fit on random data and has no predictive validity.");
        }
    }

    Ok(())
}

fn load_config(args: &ModelArgs) -> Result<AppConfig> {
    let config = AppConfig::load(&args.config, args)?;
    info!(
        source = ?config.model.source,
        path = %config.model.path.display(),
        fallback = ?config.model.fallback,
        policy = ?config.decision.policy,
        "Configuration loaded"
    );
    Ok(config)
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("ricegrain=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("ricegrain=info,tower_http=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        PREDICTIONS_TOTAL,
        "Total number of predictions served by displayed label"
    );
    metrics::describe_counter!(
        PREDICTION_ERRORS_TOTAL,
        "Total number of failed prediction requests by error kind"
    );
    metrics::describe_histogram!(
        PREDICTION_LATENCY_US,
        metrics::Unit::Microseconds,
        "Classifier latency in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
