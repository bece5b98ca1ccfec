/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (repo, AuthService) → Router 組み立て
 * - Middleware の適用 (CORS / request-id / trace など)
 * - axum::serve() で起動 (graceful shutdown)
 *
 * ストレージの作成・破棄はここでは行わない (setup-db の責務)
 */
use std::{panic, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware,
    repos::{DrinkRepo, MemoryDrinkRepo, PgDrinkRepo},
    services::auth::build_auth_service,
    state::AppState,
};

pub fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,drinks_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook() {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics via tracing so they don't get "lost".
        // The request is answered by CatchPanicLayer; the process keeps serving.
        tracing::error!(?info, "panic");
        default_hook(info);
    }))
}

pub async fn run() -> Result<()> {
    let config = Config::from_env()?;
    init_panic_hook();

    tracing::info!(
        "starting drinks API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let drinks: Arc<dyn DrinkRepo> = match &config.database_url {
        Some(url) => Arc::new(
            PgDrinkRepo::connect(url, config.database_max_connections)
                .await
                .context("failed to connect to DATABASE_URL")?,
        ),
        None => {
            tracing::warn!("DATABASE_URL is not set; drinks are kept in memory and lost on restart");
            Arc::new(MemoryDrinkRepo::new())
        }
    };

    let auth = build_auth_service(&config.auth).await?;

    Ok(AppState::new(drinks, auth))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::routes(state);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
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

    tracing::info!("shutdown signal received");
}
