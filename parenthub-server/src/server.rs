use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware;
use tokio::net::TcpListener;
use tokio::signal;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::data::storage::local::LOCAL_PUBLIC_PREFIX;
use crate::infrastructure::settings::{Settings, StorageSettings};
use crate::presentation::AppState;
use crate::presentation::http::middleware::auth::identity_middleware;
use crate::presentation::http::middleware::cors::apply_cors;
use crate::presentation::http::middleware::trace::apply_trace;
use crate::presentation::http::openapi::ApiDoc;
use crate::presentation::http::routes;

pub(crate) async fn run_http(settings: &Settings, state: AppState) -> anyhow::Result<()> {
    let app = build_router(settings, state);
    let app = apply_trace(app);
    let app = apply_cors(app, settings)?;

    let listener = TcpListener::bind(&settings.http_addr).await?;

    info!("HTTP server listening on {}", settings.http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

pub(crate) fn build_router(settings: &Settings, state: AppState) -> Router {
    let mut api = routes::router()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ))
        .with_state(state);

    if let StorageSettings::Local { dir } = &settings.storage {
        api = api.nest_service(LOCAL_PUBLIC_PREFIX, ServeDir::new(dir));
    }

    api.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(settings.http_request_body_limit_bytes))
        .layer(RequestBodyLimitLayer::new(
            settings.http_request_body_limit_bytes,
        ))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(settings.http_request_timeout_secs),
        ))
        .layer(GlobalConcurrencyLimitLayer::new(
            settings.http_concurrency_limit,
        ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
