use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::codec;

/// A booked interval against a space, as the backend reports it.
///
/// The same shape is returned embedded in a space (`idReserva`, `inicio`,
/// `fin`) and by the admin listing (`id`, `hora_inicio`, `hora_fin`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reservation {
    #[serde(alias = "idReserva", deserialize_with = "codec::id_string")]
    pub id: String,
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "estado", default)]
    pub status: Option<String>,
    #[serde(rename = "usuario", default)]
    pub owner: Option<ReservationOwner>,
    #[serde(rename = "espacio", default)]
    pub space: Option<SpaceRef>,
    /// `None` when the backend sent a blank or unreadable timestamp.
    #[serde(rename = "inicio", alias = "hora_inicio", default, with = "codec::wire_lenient")]
    pub start: Option<NaiveDateTime>,
    #[serde(rename = "fin", alias = "hora_fin", default, with = "codec::wire_lenient")]
    pub end: Option<NaiveDateTime>,
}

impl Reservation {
    /// Start and end, when both could be read.
    pub fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.start.zip(self.end)
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner.as_ref().and_then(|o| o.id.as_deref())
    }

    pub fn booked_by(&self) -> String {
        let name = self.owner.as_ref().map(|o| o.name.as_str()).unwrap_or_default();
        format!("Reservado por: {name}")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReservationOwner {
    #[serde(default, alias = "idUsuario", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "correo", alias = "correoUsuario", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Space summary attached to admin listing rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpaceRef {
    #[serde(rename = "codigo", default)]
    pub code: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(rename = "tipo_espacio", default)]
    pub kind: Option<String>,
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
}
