/*
 * Responsibility
 * - load Config -> build the shared clients -> assemble the Router
 * - apply middleware (CORS / HTTP-level / access)
 * - serve with axum::serve() and drain in-flight requests on shutdown
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use tokio::sync::Notify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware,
    services::{
        auth::Authenticator,
        cache::{IdentityCache, ValkeyClient},
        resolver::{GrpcResolver, RpcTimeouts},
    },
    state::AppState,
};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,api_gateway=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics via tracing so they don't get lost with stderr.
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting gateway in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    serve(listener, app, config.timeouts.shutdown_grace).await
}

async fn build_state(config: &Config) -> Result<AppState> {
    // Long-lived, shared clients: built once here and injected, never global.
    let valkey =
        ValkeyClient::new(&config.redis_url).context("invalid token cache address")?;

    // The cache only saves resolver calls: start without it and keep retrying.
    match tokio::time::timeout(config.timeouts.cache, valkey.connect()).await {
        Ok(Ok(())) => tracing::info!("token cache connected"),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "token cache unavailable, validating through the resolver")
        }
        Err(_) => tracing::warn!(
            timeout_ms = config.timeouts.cache.as_millis() as u64,
            "token cache not ready, validating through the resolver"
        ),
    }
    let token_cache = Arc::new(IdentityCache::new(
        valkey,
        config.token_cache_prefix.clone(),
        config.timeouts.cache,
    ));

    let resolver = Arc::new(
        GrpcResolver::connect_lazy(
            &config.auth_service_addr,
            &config.user_service_addr,
            RpcTimeouts {
                auth: config.timeouts.auth_rpc,
                profile: config.timeouts.profile_rpc,
            },
        )
        .context("failed to set up backend clients")?,
    );

    let auth = Arc::new(Authenticator::new(
        token_cache.clone(),
        resolver.clone(),
        config.timeouts.auth_rpc,
    ));

    Ok(AppState::new(auth, resolver, token_cache))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .merge(api::routes(state.clone()))
        .with_state(state);

    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config.timeouts.request)
}

async fn serve(listener: tokio::net::TcpListener, app: Router, grace: Duration) -> Result<()> {
    let stop = Arc::new(Notify::new());
    let stopped = stop.clone();

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { stopped.notified().await })
            .await
    });

    tokio::select! {
        joined = &mut server => {
            joined.context("server task panicked")?.context("server error")?;
            return Ok(());
        }
        _ = shutdown_signal() => {
            tracing::info!("received shutdown signal");
        }
    }

    // Stop accepting; in-flight requests get `grace` to finish.
    stop.notify_one();

    match tokio::time::timeout(grace, &mut server).await {
        Ok(joined) => {
            joined.context("server task panicked")?.context("server error")?;
            tracing::info!("server stopped");
        }
        Err(_) => {
            tracing::warn!(grace_secs = grace.as_secs(), "shutdown grace period elapsed, aborting");
            server.abort();
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
}
