mod bootstrap;
mod observability;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tonic::transport::Server as TonicServer;
use tracing::info;

use pinguin_grpc::SubmissionService;
use pinguin_http::{AppState, StubSessionValidator};
use pinguin_proto::notification_submission_server::NotificationSubmissionServer;
use pinguin_scheduler::{DispatchScheduler, SchedulerConfig};
use pinguin_store_postgres::{PostgresConfig, PostgresNotificationStore};

/// Runs the Pinguin notification dispatch service.
#[derive(Parser, Debug)]
#[command(name = "pinguin-server")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "pinguin.yaml")]
    config: PathBuf,

    /// Run schema migrations and exit, without starting any server.
    #[arg(long, default_value_t = false)]
    migrate_only: bool,

    /// Overrides `server.logLevel` from the configuration file.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = pinguin_config::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    let log_level = cli.log_level.as_deref().unwrap_or(&config.server.log_level);
    observability::init_tracing(log_level);

    info!(config_path = %cli.config.display(), "loaded configuration");

    let vault = bootstrap::build_vault(&config)?;
    let tenants = Arc::new(bootstrap::build_tenant_registry(&config, &vault)?);

    let postgres_config = PostgresConfig {
        url: config.server.database_path.clone(),
        ..PostgresConfig::default()
    };
    let store = Arc::new(
        PostgresNotificationStore::connect(pinguin_store_postgres::create_pool(&postgres_config).await?)
            .await
            .context("failed to connect to the notification store")?,
    );

    if cli.migrate_only {
        info!("schema ensured, exiting (--migrate-only)");
        return Ok(());
    }

    let senders = bootstrap::sender_factory(vault);

    let scheduler = Arc::new(DispatchScheduler::new(
        store.clone(),
        tenants.clone(),
        senders.clone(),
        SchedulerConfig::default(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scheduler_handle = tokio::spawn({
        let scheduler = scheduler.clone();
        let shutdown_rx = shutdown_rx.clone();
        async move { scheduler.run(shutdown_rx).await }
    });

    let grpc_addr: SocketAddr = config
        .server
        .grpc_listen_addr
        .parse()
        .context("invalid server.grpcListenAddr")?;
    let submission_service = SubmissionService::new(
        store.clone(),
        tenants.clone(),
        config.server.grpc_auth_token.clone(),
        config.server.max_schedule_horizon_days,
    );
    let grpc_shutdown = shutdown_rx.clone();
    let grpc_handle = tokio::spawn(async move {
        TonicServer::builder()
            .add_service(NotificationSubmissionServer::new(submission_service))
            .serve_with_shutdown(grpc_addr, wait_for_shutdown(grpc_shutdown))
            .await
    });

    let http_handle = if config.web.enabled {
        let http_addr: SocketAddr = config.web.listen_addr.parse().context("invalid web.listenAddr")?;
        let state = AppState::new(store.clone(), tenants.clone(), Arc::new(StubSessionValidator));
        let router = pinguin_http::build_router(state, &config.web.allowed_origins);
        let mut http_shutdown = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(http_addr).await?;
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = http_shutdown.changed().await;
                })
                .await
        }))
    } else {
        None
    };

    info!(grpc_addr = %grpc_addr, web_enabled = config.web.enabled, "pinguin started");

    tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);

    scheduler_handle.await.context("scheduler task panicked")?;
    grpc_handle
        .await
        .context("gRPC server task panicked")?
        .context("gRPC server failed")?;
    if let Some(handle) = http_handle {
        handle
            .await
            .context("HTTP server task panicked")?
            .context("HTTP server failed")?;
    }

    observability::shutdown_tracing();
    Ok(())
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    let _ = rx.changed().await;
}
