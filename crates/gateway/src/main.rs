use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer as _;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig as _;
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};

use cw_domain::config::{Config, ObservabilityConfig};
use cw_gateway::api;
use cw_gateway::bootstrap;
use cw_gateway::cli::{Cli, Command, ConfigCommand, SettingsCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to serve when no subcommand is given.
        None | Some(Command::Serve) => {
            let (config, _config_path) = cw_gateway::cli::load_config()?;
            let tracer_provider = init_tracing(&config.observability);
            run_server(Arc::new(config), tracer_provider).await
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = cw_gateway::cli::load_config()?;
            if !cw_gateway::cli::config::validate(&config, &config_path) {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _config_path) = cw_gateway::cli::load_config()?;
            cw_gateway::cli::config::show(&config)
        }
        Some(Command::Settings(cmd)) => {
            init_cli_tracing();
            let (config, _) = cw_gateway::cli::load_config()?;
            match cmd {
                SettingsCommand::List => cw_gateway::cli::settings::list(&config),
                SettingsCommand::Get { option } => cw_gateway::cli::settings::get(&config, &option),
                SettingsCommand::Set { option, value } => {
                    cw_gateway::cli::settings::set(&config, &option, &value)
                }
            }
        }
        Some(Command::Sign { email, verify }) => {
            init_cli_tracing();
            let (config, _) = cw_gateway::cli::load_config()?;
            if !cw_gateway::cli::sign::run(&config, &email, verify.as_deref())? {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Render {
            email,
            name,
            id,
            reset_pending,
        }) => {
            init_cli_tracing();
            let (config, _) = cw_gateway::cli::load_config()?;
            cw_gateway::cli::render::run(config, email, name, id, reset_pending).await
        }
        Some(Command::Version) => {
            println!("chatwoot-gate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Initialize structured tracing for the `serve` command.
///
/// Log lines go to stdout as JSON (or compact text when `json_logs` is
/// off).  With `otlp_endpoint` set, spans are also exported over
/// OTLP/gRPC; the returned provider must be shut down on exit so the
/// batch exporter flushes.
fn init_tracing(obs: &ObservabilityConfig) -> Option<SdkTracerProvider> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&obs.log_filter));

    let fmt_layer = if obs.json_logs {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().compact().boxed()
    };

    let tracer_provider = obs
        .otlp_endpoint
        .as_deref()
        .and_then(|endpoint| otlp_tracer_provider(obs, endpoint));
    let otel_layer = tracer_provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("chatwoot-gate")));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .init();

    tracer_provider
}

/// Batch OTLP exporter with ratio sampling; `None` when the exporter
/// cannot be built, in which case the server runs without OpenTelemetry.
fn otlp_tracer_provider(obs: &ObservabilityConfig, endpoint: &str) -> Option<SdkTracerProvider> {
    let exporter = match opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
    {
        Ok(e) => e,
        Err(e) => {
            // Tracing is not up yet.
            eprintln!("WARNING: OTLP exporter for {endpoint} failed: {e}; continuing without it");
            return None;
        }
    };

    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(obs.service_name.clone())
        .build();

    Some(
        SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_sampler(Sampler::TraceIdRatioBased(obs.sample_rate))
            .with_resource(resource)
            .build(),
    )
}

/// Initialize compact stderr-only tracing for CLI one-shot commands.
///
/// Defaults to `warn` level so diagnostic output does not pollute stdout.
fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Start the gateway server with the given configuration.
async fn run_server(
    config: Arc<Config>,
    tracer_provider: Option<SdkTracerProvider>,
) -> anyhow::Result<()> {
    tracing::info!("chatwoot-gate starting");

    let state = bootstrap::build_app_state(config.clone())?;

    // ── Concurrency limit (backpressure protection) ────────────────
    let max_concurrent = config.server.max_concurrent_requests.max(1);
    tracing::info!(max_concurrent, "concurrency limit set");

    // ── Rate-limit layer (per-IP token bucket via governor) ─────────
    let governor_layer = match config.server.rate_limit.as_ref() {
        Some(rl) => {
            use tower_governor::governor::GovernorConfigBuilder;
            use tower_governor::GovernorLayer;

            let gov_config = GovernorConfigBuilder::default()
                .per_second(rl.requests_per_second)
                .burst_size(rl.burst_size)
                .finish()
                .context("rate_limit: requests_per_second and burst_size must be > 0")?;

            tracing::info!(
                requests_per_second = rl.requests_per_second,
                burst_size = rl.burst_size,
                "per-IP rate limiting enabled"
            );
            Some(GovernorLayer {
                config: Arc::new(gov_config),
            })
        }
        None => {
            tracing::info!("per-IP rate limiting disabled (no [server.rate_limit] in config)");
            None
        }
    };

    if !config.site.pages_dir.exists() {
        tracing::warn!(
            pages_dir = %config.site.pages_dir.display(),
            "pages directory does not exist; only gateway routes will respond"
        );
    }

    // ── Router ───────────────────────────────────────────────────────
    let app = api::app(state)
        .layer(TraceLayer::new_for_http())
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_concurrent));
    let app = match governor_layer {
        Some(gov) => app.layer(gov),
        None => app,
    };

    // ── Bind ─────────────────────────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    tracing::info!(addr = %addr, "chatwoot-gate listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("axum server error")?;

    // Flush and shut down the OTel tracer provider so pending spans
    // are exported before the process exits.
    if let Some(provider) = tracer_provider {
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = ?e, "OpenTelemetry tracer provider shutdown failed");
        }
    }

    tracing::info!("shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM, then return to trigger graceful shutdown
/// of the Axum server.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
                    _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to register SIGTERM handler");
                let _ = ctrl_c.await;
                tracing::info!("received SIGINT, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        tracing::info!("received SIGINT, shutting down");
    }
}
