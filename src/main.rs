//! LLM Codegen server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use llm_codegen::cache::{CacheBackend, FailOpenCache, MemoryCache};
use llm_codegen::config::{CacheBackendKind, Config, LogFormat};
use llm_codegen::llm::select_backend;
use llm_codegen::{create_router, spawn_cleanup_task, AppState, CodeGenerationService};

/// Main entry point for the code generation server.
///
/// # Startup Sequence
/// 1. Load configuration from environment variables
/// 2. Initialize tracing
/// 3. Select the LLM backend (fatal if none is configured)
/// 4. Open the cache store and start the TTL sweep for the in-memory store
/// 5. Serve the API until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(config.log_format);

    info!("Starting LLM Codegen server");
    info!(
        port = config.server_port,
        max_entries = config.max_entries,
        cleanup_interval = config.cleanup_interval,
        provider = %config.llm.provider,
        "Configuration loaded"
    );

    let handle = select_backend(&config.llm).map_err(|err| {
        error!(error = %err, "No usable LLM backend");
        err
    })?;

    let (backend, memory) = open_cache(&config).await;
    let cache = FailOpenCache::with_timeout(backend, config.cache_op_timeout);
    info!(backend = cache.backend_name(), "Cache store initialized");

    let cleanup_handle = memory.map(|memory| {
        info!("Background cleanup task started");
        spawn_cleanup_task(memory, config.cleanup_interval)
    });

    let service = CodeGenerationService::new(handle, cache).with_request_timeout(config.request_timeout);
    let app = create_router(AppState::new(service, config.debug));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "llm_codegen=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Opens the configured cache store. Returns the in-memory store as well
/// when that is what ended up in use, so the sweep task can be started.
async fn open_cache(config: &Config) -> (Arc<dyn CacheBackend>, Option<MemoryCache>) {
    if config.cache_backend == CacheBackendKind::Redis {
        match connect_redis(config).await {
            Some(redis) => return (redis, None),
            None => warn!("Falling back to the in-memory cache"),
        }
    }

    let memory = MemoryCache::new(config.max_entries);
    (Arc::new(memory.clone()), Some(memory))
}

#[cfg(feature = "redis")]
async fn connect_redis(config: &Config) -> Option<Arc<dyn CacheBackend>> {
    use llm_codegen::cache::RedisCache;

    let connect = RedisCache::connect(&config.redis_url);
    match tokio::time::timeout(config.cache_op_timeout * 4, connect).await {
        Ok(Ok(redis)) => Some(Arc::new(redis)),
        Ok(Err(err)) => {
            warn!(url = %config.redis_url, error = %err, "Redis unavailable");
            None
        }
        Err(_) => {
            warn!(url = %config.redis_url, "Redis connection timed out");
            None
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn connect_redis(_config: &Config) -> Option<Arc<dyn CacheBackend>> {
    warn!("CACHE_BACKEND=redis but this build has no redis support");
    None
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep task.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
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
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
