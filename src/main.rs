mod config;
mod errors;
mod extractors;
mod instrumentation;
mod models;
mod response;
mod routes;
mod utilities;
mod validation;

#[cfg(test)]
mod tests;

#[cfg(not(unix))]
use std::future;
use std::{sync::Arc, time::Duration};

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
    Extension, Router,
};
use config::Config;
use routes::{listing::list_endpoint, upload::upload_endpoint};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Arc<Config>,
}

fn router(cfg: Config) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::OPTIONS,
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers(Any)
        .expose_headers(Any)
        .max_age(Duration::from_secs(cfg.cors.max_age_secs));

    let mut router = Router::new()
        .route("/api/uploadFile", post(upload_endpoint))
        .route("/api/getFileUrl", get(list_endpoint));

    if cfg.general.serve_uploads {
        let mount = cfg.general.public_prefix.trim_end_matches('/');
        if mount.is_empty() {
            tracing::warn!("public prefix is `/`, not serving stored files");
        } else {
            router = router.nest_service(mount, ServeDir::new(&cfg.general.storage_dir));
        }
    }

    let router = router.layer((
        DefaultBodyLimit::max(cfg.general.max_upload_bytes),
        Extension(AppContext { cfg: Arc::new(cfg) }),
        cors_layer,
    ));

    instrumentation::add_layer(router)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_from_env().await?;
    instrumentation::setup(&cfg.instrumentation.directives)?;

    let listener = TcpListener::bind(&cfg.general.bind_address).await?;
    tracing::info!("api is available on http://{}", cfg.general.bind_address);
    tracing::info!(
        "storing uploads in {}",
        cfg.general.storage_dir.display()
    );

    axum::serve(listener, router(cfg))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutting down");
}
