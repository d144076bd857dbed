use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::codec;

/// Body of `POST {API_BASE}/reservas/crear`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateReservationRequest {
    #[serde(rename = "idEspacio")]
    pub space_id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "inicio", with = "codec::wire")]
    pub start: NaiveDateTime,
    #[serde(rename = "fin", with = "codec::wire")]
    pub end: NaiveDateTime,
    #[serde(rename = "idUsuario")]
    pub user_id: String,
    #[serde(rename = "nombreUsuario")]
    pub user_name: String,
    #[serde(rename = "correoUsuario")]
    pub user_email: String,
    #[serde(rename = "detalles")]
    pub details: ReservationDetails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReservationDetails {
    #[serde(rename = "equiposNecesarios", default)]
    pub equipment: Vec<String>,
    #[serde(rename = "comentarios", default)]
    pub comments: String,
}

/// `{status, message?, data:{id, created_at, inicio, fin}}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateReservationResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<CreatedReservation>,
}

impl CreateReservationResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatedReservation {
    #[serde(deserialize_with = "codec::id_string")]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(rename = "inicio", default)]
    pub start: Option<String>,
    #[serde(rename = "fin", default)]
    pub end: Option<String>,
}

/// Reply of `DELETE {API_BASE}/reservas/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelReservationResponse {
    #[serde(default, deserialize_with = "codec::truthy")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl CancelReservationResponse {
    pub const CANCELLED_MESSAGE: &'static str = "Reserva cancelada con éxito.";

    pub fn is_success(&self) -> bool {
        self.success || self.message.as_deref() == Some(Self::CANCELLED_MESSAGE)
    }
}

/// Listing endpoints answer either with a bare array or a `{"data": [...]}` envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Wrapped { data: items } => items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_create_request_uses_backend_field_names() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let req = CreateReservationRequest {
            space_id: "E-12".into(),
            title: "Comité".into(),
            description: String::new(),
            start: day.and_hms_opt(9, 0, 0).unwrap(),
            end: day.and_hms_opt(11, 0, 0).unwrap(),
            user_id: "U001".into(),
            user_name: "Juan Pérez".into(),
            user_email: "juan.perez@example.com".into(),
            details: ReservationDetails {
                equipment: vec!["Proyector".into()],
                comments: "Reserva realizada desde el sistema".into(),
            },
        };

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["idEspacio"], "E-12");
        assert_eq!(value["inicio"], "01/05/2024 09:00");
        assert_eq!(value["fin"], "01/05/2024 11:00");
        assert_eq!(value["detalles"]["equiposNecesarios"][0], "Proyector");
    }

    #[test]
    fn test_cancel_success_rules() {
        let by_flag: CancelReservationResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(by_flag.is_success());

        let by_message: CancelReservationResponse =
            serde_json::from_str(r#"{"message": "Reserva cancelada con éxito."}"#).unwrap();
        assert!(by_message.is_success());

        let refused: CancelReservationResponse =
            serde_json::from_str(r#"{"success": false, "message": "No existe"}"#).unwrap();
        assert!(!refused.is_success());

        let loose = |flag: &str| -> bool {
            let reply: CancelReservationResponse =
                serde_json::from_str(&format!("{{\"success\": {flag}}}")).unwrap();
            reply.is_success()
        };
        assert!(loose("1"));
        assert!(loose("\"true\""));
        assert!(!loose("0"));
        assert!(!loose("\"\""));
        assert!(!loose("null"));
    }

    #[test]
    fn test_listing_accepts_both_shapes() {
        let bare: Listing<u8> = serde_json::from_str("[1,2]").unwrap();
        let wrapped: Listing<u8> = serde_json::from_str(r#"{"data":[3]}"#).unwrap();
        assert_eq!(bare.into_items(), vec![1, 2]);
        assert_eq!(wrapped.into_items(), vec![3]);
    }
}
