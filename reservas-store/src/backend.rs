//! HTTP gateway to the external reservation backend.
//!
//! One request per operation, no retries. Non-2xx replies and `status != "success"`
//! bodies become `GatewayError::Rejected` carrying the server's `message` when it sent one.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{IntoUrl, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use reservas_core::{
    GatewayError, GatewayResult, ReservationGateway, SpaceFilter, SpaceGateway, SpaceQuery,
};
use reservas_shared::{
    CancelReservationResponse, CreateReservationRequest, CreateReservationResponse,
    CreatedReservation, Listing, Reservation, Space,
};

use crate::app_config::BackendConfig;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `{base_url}/{collection}/{id}` with `id` escaped as one path segment, so
    /// `/`, `%` and the like in an id never reach another backend route.
    pub fn item_url(&self, collection: &str, id: &str) -> GatewayResult<Url> {
        if matches!(id, "" | "." | "..") {
            return Err(GatewayError::InvalidId(id.to_string()));
        }
        let mut url = Url::parse(&self.url(collection)).map_err(|e| GatewayError::Transport(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Transport(format!("{} cannot carry a path", self.base_url)))?
            .push(id);
        Ok(url)
    }

    fn request(&self, method: Method, url: impl IntoUrl) -> (RequestBuilder, Uuid) {
        let request_id = Uuid::new_v4();
        let mut builder = self
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }
        (builder, request_id)
    }

    async fn send(&self, builder: RequestBuilder, request_id: Uuid) -> GatewayResult<(StatusCode, Vec<u8>)> {
        let response = builder.send().await.map_err(|e| {
            error!("Backend request {} failed: {}", request_id, e);
            GatewayError::Transport(e.to_string())
        })?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        debug!("Backend request {} answered {} ({} bytes)", request_id, status, body.len());
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl SpaceGateway for BackendClient {
    async fn list_spaces(&self, query: &SpaceQuery) -> GatewayResult<Vec<Space>> {
        let (builder, request_id) = self.request(Method::GET, self.url("espacios"));
        info!("Listing spaces {:?} ({})", query.query_pairs(), request_id);
        let (status, body) = self.send(builder.query(&query.query_pairs()), request_id).await?;
        interpret_listing(status, &body)
    }

    async fn get_space(&self, id: &str) -> GatewayResult<Option<Space>> {
        let (builder, request_id) = self.request(Method::GET, self.item_url("espacios", id)?);
        info!("Fetching space {} ({})", id, request_id);
        let (status, body) = self.send(builder, request_id).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        interpret_single(status, &body).map(Some)
    }
}

#[async_trait]
impl ReservationGateway for BackendClient {
    async fn create_reservation(
        &self,
        request: &CreateReservationRequest,
    ) -> GatewayResult<CreatedReservation> {
        let (builder, request_id) = self.request(Method::POST, self.url("reservas/crear"));
        info!("Sending reservation request for space {} ({})", request.space_id, request_id);
        let (status, body) = self.send(builder.json(request), request_id).await?;

        let created = interpret_create(status, &body).map_err(|e| {
            error!("Reservation request {} rejected: {}", request_id, e);
            e
        })?;
        info!("Reservation {} created ({})", created.id, request_id);
        Ok(created)
    }

    async fn cancel_reservation(&self, id: &str) -> GatewayResult<Option<serde_json::Value>> {
        let (builder, request_id) = self.request(Method::DELETE, self.item_url("reservas", id)?);
        info!("Sending cancellation for reservation {} ({})", id, request_id);
        let (status, body) = self.send(builder, request_id).await?;

        interpret_cancel(status, &body).map_err(|e| {
            error!("Cancellation {} rejected: {}", request_id, e);
            e
        })
    }

    async fn list_reservations(&self, filter: &SpaceFilter) -> GatewayResult<Vec<Reservation>> {
        let (builder, request_id) = self.request(Method::GET, self.url("reservas"));
        info!("Listing reservations {:?} ({})", filter.query_pairs(), request_id);
        let (status, body) = self.send(builder.query(&filter.query_pairs()), request_id).await?;
        interpret_listing(status, &body)
    }
}

/// `message`, else `error`, from a JSON error body.
pub fn server_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(|m| m.as_str()))
        .map(str::to_string)
}

fn reject(status: StatusCode, body: &[u8]) -> GatewayError {
    GatewayError::rejected(Some(status.as_u16()), server_message(body))
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> GatewayResult<T> {
    serde_json::from_slice(body).map_err(|e| GatewayError::Decode(e.to_string()))
}

pub fn interpret_create(status: StatusCode, body: &[u8]) -> GatewayResult<CreatedReservation> {
    if !status.is_success() {
        return Err(reject(status, body));
    }
    let reply: CreateReservationResponse = decode(body)?;
    if !reply.is_success() {
        return Err(GatewayError::rejected(Some(status.as_u16()), reply.message));
    }
    reply
        .data
        .ok_or_else(|| GatewayError::Decode("success reply without data".to_string()))
}

pub fn interpret_cancel(status: StatusCode, body: &[u8]) -> GatewayResult<Option<serde_json::Value>> {
    if !status.is_success() {
        return Err(reject(status, body));
    }
    let reply: CancelReservationResponse = decode(body)?;
    if !reply.is_success() {
        return Err(GatewayError::rejected(Some(status.as_u16()), reply.message));
    }
    Ok(reply.data)
}

pub fn interpret_listing<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> GatewayResult<Vec<T>> {
    if !status.is_success() {
        return Err(reject(status, body));
    }
    decode::<Listing<T>>(body).map(Listing::into_items)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Single<T> {
    Bare(T),
    Wrapped { data: T },
}

fn interpret_single<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> GatewayResult<T> {
    if !status.is_success() {
        return Err(reject(status, body));
    }
    decode::<Single<T>>(body).map(|single| match single {
        Single::Bare(item) | Single::Wrapped { data: item } => item,
    })
}
