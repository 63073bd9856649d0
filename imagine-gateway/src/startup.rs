//! Router wiring and server lifecycle.

use crate::config::{AllowedOrigins, GatewayConfig};
use crate::handlers::{
    chat::chat,
    health::{health_check, metrics},
    imagine::imagine,
    pages::{not_found, CHAT_PAGE, IMAGINE_PAGE, INDEX_PAGE, NOT_FOUND_PAGE},
};
use crate::middleware::blocked_paths::block_sensitive_paths;
use crate::services::providers::creart::CreartImageProvider;
use crate::services::providers::ImageProvider;
use crate::services::{ChatClient, Denylist, ImageOrchestrator};
use crate::AppState;
use axum::{
    handler::Handler,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState, allowed_origins: &AllowedOrigins) -> Router {
    let pages = state.site.pages_dir.clone();
    let assets = ServeDir::new(&state.site.public_dir)
        .not_found_service(not_found.with_state(state.clone()));

    Router::new()
        .route_service("/", ServeFile::new(pages.join(INDEX_PAGE)))
        .route_service("/imagine", ServeFile::new(pages.join(IMAGINE_PAGE)))
        .route_service("/chat", ServeFile::new(pages.join(CHAT_PAGE)))
        .route_service("/404", ServeFile::new(pages.join(NOT_FOUND_PAGE)))
        .route("/api/imagine", get(imagine))
        .route("/api/chat", get(chat))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .nest_service("/public", assets.clone())
        .fallback_service(assets)
        .layer(from_fn_with_state(state.clone(), block_sensitive_paths))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &AllowedOrigins) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    match allowed_origins {
        AllowedOrigins::Any => cors.allow_origin(Any),
        AllowedOrigins::List(origins) => cors.allow_origin(
            origins
                .iter()
                .filter_map(|o| match o.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                        None
                    }
                })
                .collect::<Vec<HeaderValue>>(),
        ),
    }
}

/// Build the shared state from configuration.
pub fn build_state(config: &GatewayConfig) -> Result<AppState, AppError> {
    let provider: Arc<dyn ImageProvider> = Arc::new(
        CreartImageProvider::new(&config.image_provider)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?,
    );
    tracing::info!(url = %config.image_provider.url, "Initialized image provider");

    let chat_client = Arc::new(
        ChatClient::new(config.chat_provider.clone())
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?,
    );
    tracing::info!(model = %chat_client.model(), "Initialized chat client");

    Ok(state_with_provider(config, provider, chat_client))
}

/// Build the shared state around an explicit image provider.
pub fn state_with_provider(
    config: &GatewayConfig,
    provider: Arc<dyn ImageProvider>,
    chat_client: Arc<ChatClient>,
) -> AppState {
    let denylist = Denylist::new(&config.denylist);
    tracing::info!(words = denylist.len(), "Loaded prompt denylist");

    AppState::new(
        Arc::new(ImageOrchestrator::new(provider, denylist)),
        chat_client,
        config.verbosity,
        config.site.clone(),
    )
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        let state = build_state(&config)?;
        Self::build_with_state(config, state).await
    }

    /// Build around prepared state (port 0 = random port for testing).
    pub async fn build_with_state(config: GatewayConfig, state: AppState) -> Result<Self, AppError> {
        crate::services::metrics::init_metrics();

        let router = build_router(state, &config.allowed_origins);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(verbosity = ?config.verbosity, "imagine-gateway listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl-C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
