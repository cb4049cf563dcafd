use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gigflow_core::store::{memory::MemoryStore, postgres::PostgresStore};
use gigflow_server::{AppState, Config, NotificationHub, auth::AuthKeys, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let hub = Arc::new(NotificationHub::new());
    let auth = AuthKeys::new(&config.jwt_secret);

    let state = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("failed to connect to PostgreSQL")?;
            let store = Arc::new(PostgresStore::new(pool));
            store
                .run_migrations()
                .await
                .context("database migration failed")?;
            info!("connected to PostgreSQL, migrations applied");
            AppState::new(store, hub, auth)
        }
        None => {
            warn!("DATABASE_URL not set - using in-memory store, state is not persisted");
            AppState::new(Arc::new(MemoryStore::new()), hub, auth)
        }
    };

    let app = create_app(state, &config)?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("gigflow-server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn create_app(state: AppState, config: &Config) -> anyhow::Result<Router> {
    let cors_layer = match &config.cors_origin {
        Some(origin) => {
            let origin = HeaderValue::from_str(origin)
                .with_context(|| format!("invalid CORS origin: {origin}"))?;
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PATCH])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        }
        None => CorsLayer::permissive(),
    };

    Ok(routes::create_api_router(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http()))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to install shutdown signal handler");
    }
    info!("shutdown signal received");
}
