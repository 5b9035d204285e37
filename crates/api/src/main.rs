use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thermowatch_core::ingest::IngestionGate;
use thermowatch_core::scripting::ScriptPredictor;
use thermowatch_db::PgStore;
use thermowatch_events::{AlertMailer, EmailConfig, EmailDelivery, EventBus};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use thermowatch_api::config::{MonitorConfig, ServerConfig};
use thermowatch_api::router::build_app_router;
use thermowatch_api::state::AppState;
use thermowatch_api::ws;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "thermowatch_api=debug,thermowatch_core=info,tower_http=debug".into()
    });
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let monitor = MonitorConfig::from_env();
    let rule = monitor.alert_rule().expect("Invalid alert configuration");
    let risk = monitor
        .risk_thresholds()
        .expect("Invalid risk threshold configuration");
    monitor
        .check_timeouts(&config)
        .expect("Invalid predictor timeout configuration");
    tracing::info!(
        high_threshold = monitor.high_threshold,
        medium_threshold = monitor.medium_threshold,
        cooldown_secs = monitor.alert_cooldown.as_secs(),
        "Loaded monitor configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = thermowatch_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    thermowatch_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    thermowatch_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- WebSocket manager ---
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_cancel = CancellationToken::new();
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager), heartbeat_cancel.clone());

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    let relay_handle = tokio::spawn(
        ws::FeedRelay::new(Arc::clone(&ws_manager)).run(event_bus.subscribe()),
    );

    let mailer_handle = match EmailConfig::from_env() {
        Some(email) => {
            let mailer = AlertMailer::new(EmailDelivery::new(email), monitor.high_threshold);
            Some(tokio::spawn(mailer.run(event_bus.subscribe())))
        }
        None => {
            tracing::info!("SMTP_HOST or ALERT_EMAIL_TO not set, alert e-mails disabled");
            None
        }
    };
    tracing::info!("Event services started (feed relay, alert mailer)");

    // --- Ingestion + prediction ---
    let gate = Arc::new(IngestionGate::new(
        PgStore::new(pool.clone()),
        Arc::clone(&event_bus),
        rule,
    ));
    let predictor = Arc::new(ScriptPredictor::new(
        monitor.python_executable.clone(),
        monitor.predictor_script.clone(),
        monitor.predictor_timeout,
    )
    .with_transport(monitor.predictor_input));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        monitor: Arc::new(monitor),
        ws_manager: Arc::clone(&ws_manager),
        event_bus: Arc::clone(&event_bus),
        gate,
        predictor,
        risk,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let grace = Duration::from_secs(config.shutdown_timeout_secs);

    // Last sender: dropping it closes the channel and ends the relay and mailer.
    drop(event_bus);
    let _ = tokio::time::timeout(grace, relay_handle).await;
    if let Some(handle) = mailer_handle {
        let _ = tokio::time::timeout(grace, handle).await;
    }
    tracing::info!("Event services shut down");

    ws_manager.shutdown_all().await;

    heartbeat_cancel.cancel();
    let _ = tokio::time::timeout(grace, heartbeat_handle).await;
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
