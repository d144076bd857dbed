use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use reservas_api::{app, AppState, ProxyTarget};
use reservas_store::{BackendClient, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "reservas_api=debug,reservas_core=debug,reservas_store=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting reservas on port {}", config.server.port);
    tracing::info!("Reservation backend at {}", config.backend.base_url);

    let backend = Arc::new(BackendClient::new(&config.backend).expect("Failed to build backend client"));

    let mut app_state = AppState::new(
        backend.clone(),
        backend,
        config.identity.clone(),
        config.booking.clone(),
    );

    if let Some(target) = config.proxy.target.clone() {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.backend.timeout_seconds))
            .build()
            .expect("Failed to build proxy client");
        app_state = app_state.with_proxy(ProxyTarget {
            prefix: config.proxy.prefix.clone(),
            target,
            http,
        });
    }

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
