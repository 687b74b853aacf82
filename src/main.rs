use std::{env, net::SocketAddr, sync::Arc, time::Duration};

#[macro_use]
extern crate lazy_static;

use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::header::CONTENT_TYPE,
    http::Method,
    routing::{get, post},
    BoxError, Router,
};
use tokio_util::sync::CancellationToken;
use tower::{buffer::BufferLayer, limit::RateLimitLayer, ServiceBuilder};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use crate::{
    app::{envy::Envy, errors::DefaultApiError},
    tryon::apis::gradio::{
        config::GradioConfig, service::GradioClient, transport::ReqwestTransport,
    },
};

mod app;
mod tryon;

pub struct AppState {
    pub envy: Envy,
    pub http: reqwest::Client,
    pub gradio: GradioClient,
    pub shutdown: CancellationToken,
}

#[tokio::main]
async fn main() {
    // tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // environment
    let app_env = env::var("APP_ENV").unwrap_or("development".to_string());
    let _ = dotenvy::from_filename(format!(".env.{}", app_env));
    let envy = match envy::from_env::<Envy>() {
        Ok(config) => config,
        Err(e) => panic!("{:#?}", e),
    };
    let gradio_config = match GradioConfig::from_envy(&envy) {
        Ok(config) => config,
        Err(e) => panic!("{}", e),
    };

    // properties
    let port = envy.port.to_owned().unwrap_or(3000);
    let body_limit = envy.body_limit_bytes;
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::POST, Method::GET]);

    let http = reqwest::Client::builder()
        .timeout(gradio_config.request_timeout)
        .build()
        .expect("failed to build http client");
    let transport = Arc::new(ReqwestTransport::new(http.clone()));
    let gradio = GradioClient::new(transport, &gradio_config);

    tracing::info!(
        "using try-on endpoints {:?} ({} attempts every {:?})",
        gradio_config.endpoints,
        gradio_config.poll_policy.max_attempts,
        gradio_config.poll_policy.interval
    );

    let shutdown = CancellationToken::new();
    let state = Arc::new(AppState {
        envy,
        http,
        gradio,
        shutdown: shutdown.clone(),
    });

    // app
    let app = Router::new()
        .route("/", get(app::controller::get_root))
        // tryon
        .route("/tryon", post(tryon::controller::try_on))
        .route("/generate", post(tryon::controller::generate))
        // layers
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|err: BoxError| async move {
                    tracing::warn!("request rejected by middleware: {}", err);
                    DefaultApiError::InternalServerError.value()
                }))
                .layer(BufferLayer::new(1024))
                .layer(RateLimitLayer::new(20, Duration::from_secs(1))),
        )
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .expect("server error");
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }

    tracing::info!("shutting down, abandoning in-flight try-on jobs");
    shutdown.cancel();
}
