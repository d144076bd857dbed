use axum::{http::Method, routing::any, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod catalog;
pub mod error;
pub mod proxy;
pub mod shell;
pub mod spaces;
pub mod state;

pub use state::{AppState, ProxyTarget};

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let mut router = Router::new()
        .merge(shell::routes())
        .merge(catalog::routes())
        .merge(spaces::routes())
        .merge(admin::routes());

    if let Some(proxy) = &state.proxy {
        let prefix = proxy.prefix.trim_end_matches('/');
        tracing::info!("Forwarding {}/* to {}", prefix, proxy.target);
        router = router.route(&format!("{prefix}/{{*path}}"), any(proxy::forward));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
