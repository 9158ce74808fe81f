//! spinfeed-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST, webhook, and SSE endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use spinfeed_gateway::api;
use spinfeed_gateway::app_state::{AppState, AuthTokens};
use spinfeed_gateway::config::GatewayConfig;
use spinfeed_gateway::domain::Broadcaster;
use spinfeed_gateway::ledger::PostgresLedger;
use spinfeed_gateway::sealed::{ClientKeyIssuer, EnvelopeCodec, SealedCodec};
use spinfeed_gateway::service::SubscriptionService;
use spinfeed_gateway::sse::{spawn_heartbeat, stream_handler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting spinfeed-gateway");

    // Database pool + migrations
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    // Build domain layer
    let broadcaster = Arc::new(Broadcaster::new());
    let envelope: Arc<dyn EnvelopeCodec> =
        Arc::new(SealedCodec::new(config.envelope_key.as_bytes()));
    let client_keys = ClientKeyIssuer::new(Arc::clone(&envelope), config.client_key_ttl_secs);

    // Build application state
    let app_state = AppState {
        broadcaster: Arc::clone(&broadcaster),
        ledger: Arc::new(PostgresLedger::new(pool.clone())),
        side_effect: Arc::new(SubscriptionService::new(pool)),
        envelope,
        client_keys,
        auth: Arc::new(AuthTokens {
            webhook_access_token: config.webhook_access_token.clone(),
            producer_token: config.producer_token.clone(),
        }),
    };

    // Keep-alive cadence for all live SSE subscribers
    let heartbeat = spawn_heartbeat(broadcaster, config.heartbeat_interval_secs);

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/api/v1/streams/{channel}", get(stream_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    heartbeat.abort();
    Ok(())
}
