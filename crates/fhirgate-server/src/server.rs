//! Main server implementation

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::get,
    Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    config::ServerConfig,
    error::{Result, ServerError},
    routes,
    state::AppState,
};

/// FHIR HTTP server
pub struct Server {
    config: ServerConfig,
    app_state: Arc<AppState>,
}

impl Server {
    /// Create a new server instance; fails when the FHIR engine cannot be bound
    pub fn new(config: ServerConfig) -> Result<Self> {
        let app_state = Arc::new(AppState::new(config.clone())?);
        Ok(Self { config, app_state })
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr = self.socket_addr()?;
        let app = self.router();

        info!(
            fhir_version = %self.config.fhir.version,
            strict = self.config.fhir.strict_validation,
            "Starting fhirgate server on {}",
            addr
        );

        let listener = tokio::net::TcpListener::bind(&addr).await?;

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        info!("Server stopped gracefully");
        Ok(())
    }

    /// The complete application with middleware applied
    pub fn router(&self) -> Router {
        let app = Router::new()
            .route("/health", get(routes::health::health_check))
            .nest("/api/v1", Self::api_routes())
            .with_state(self.app_state.clone());

        self.add_middleware_layers(app)
    }

    fn api_routes() -> Router<Arc<AppState>> {
        Router::new()
            .nest("/parser", routes::parser::create_routes())
            .nest("/validation", routes::validation::create_routes())
            .route("/info", get(routes::info::server_info))
    }

    fn add_middleware_layers(&self, mut app: Router) -> Router {
        let settings = &self.config.server;

        app = app.layer(DefaultBodyLimit::max(settings.max_body_size));

        if settings.compression_enabled {
            app = app.layer(CompressionLayer::new());
        }

        if settings.cors_enabled {
            app = app.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods([Method::GET, Method::POST])
                    .allow_headers([header::CONTENT_TYPE, header::ACCEPT]),
            );
        }

        app.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(settings.timeout))),
        )
    }

    fn socket_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        addr.parse().map_err(|e| {
            ServerError::Config(config::ConfigError::Message(format!(
                "Invalid server address '{}': {}",
                addr, e
            )))
        })
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    warn!("Starting graceful shutdown...");
}
