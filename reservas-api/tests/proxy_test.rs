use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Method, Request, StatusCode, Uri},
    routing::any,
    Router,
};
use reservas_api::{app, AppState, ProxyTarget};
use reservas_core::{
    BookingRules, GatewayError, GatewayResult, Identity, ReservationGateway, SpaceFilter, SpaceGateway, SpaceQuery,
};
use reservas_shared::{CreateReservationRequest, CreatedReservation, Reservation, Space};
use serde_json::Value;
use tower::ServiceExt;

/// Gateways are not involved in proxying; every call fails.
struct Offline;

#[async_trait]
impl SpaceGateway for Offline {
    async fn list_spaces(&self, _query: &SpaceQuery) -> GatewayResult<Vec<Space>> {
        Err(GatewayError::Transport("offline".into()))
    }

    async fn get_space(&self, _id: &str) -> GatewayResult<Option<Space>> {
        Err(GatewayError::Transport("offline".into()))
    }
}

#[async_trait]
impl ReservationGateway for Offline {
    async fn create_reservation(&self, _request: &CreateReservationRequest) -> GatewayResult<CreatedReservation> {
        Err(GatewayError::Transport("offline".into()))
    }

    async fn cancel_reservation(&self, _id: &str) -> GatewayResult<Option<Value>> {
        Err(GatewayError::Transport("offline".into()))
    }

    async fn list_reservations(&self, _filter: &SpaceFilter) -> GatewayResult<Vec<Reservation>> {
        Err(GatewayError::Transport("offline".into()))
    }
}

#[derive(Debug, Clone)]
struct Received {
    method: Method,
    path: String,
    query: Option<String>,
    content_type: Option<String>,
    body: Bytes,
}

type Log = Arc<Mutex<Vec<Received>>>;

async fn upstream(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], &'static str) {
    log.lock().unwrap().push(Received {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        content_type: headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(str::to_string),
        body,
    });

    (StatusCode::CREATED, [(header::CONTENT_TYPE, "application/json")], r#"{"status":"success","data":{"id":7}}"#)
}

async fn spawn_upstream() -> (String, Log) {
    let log = Log::default();
    let router = Router::new().route("/{*rest}", any(upstream)).with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}"), log)
}

fn state() -> AppState {
    AppState::new(Arc::new(Offline), Arc::new(Offline), Identity::default(), BookingRules::default())
}

#[tokio::test]
async fn test_proxy_forwards_request_and_relays_reply() {
    let (target, log) = spawn_upstream().await;
    let router = app(state().with_proxy(ProxyTarget {
        prefix: "/api".into(),
        target,
        http: reqwest::Client::new(),
    }));

    let request = Request::builder()
        .method("POST")
        .uri("/api/reservas/crear?x=1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"titulo":"Comité"}"#))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], br#"{"status":"success","data":{"id":7}}"#);

    let seen = log.lock().unwrap()[0].clone();
    assert_eq!(seen.method, Method::POST);
    assert_eq!(seen.path, "/reservas/crear");
    assert_eq!(seen.query.as_deref(), Some("x=1"));
    assert_eq!(seen.content_type.as_deref(), Some("application/json"));
    assert_eq!(seen.body, Bytes::from(r#"{"titulo":"Comité"}"#));
}

#[tokio::test]
async fn test_proxy_route_absent_without_target() {
    let request = Request::builder()
        .method("GET")
        .uri("/api/espacios")
        .body(Body::empty())
        .unwrap();
    let response = app(state()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
