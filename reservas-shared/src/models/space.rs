use serde::{Deserialize, Serialize};

use crate::codec;
use crate::models::reservation::Reservation;

/// A reservable physical resource. Read-only from this side; the embedded
/// reservation list is a denormalised snapshot taken when the space was fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Space {
    #[serde(rename = "idEspacio", deserialize_with = "codec::id_string")]
    pub id: String,
    #[serde(rename = "sede", default)]
    pub site: String,
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(rename = "capacidad", default, deserialize_with = "codec::lenient_u32")]
    pub capacity: Option<u32>,
    #[serde(rename = "ubicacion", default)]
    pub location: Option<String>,
    #[serde(rename = "localidad", default)]
    pub locality: Option<String>,
    #[serde(rename = "espaciofisico", default)]
    pub physical_space: String,
    #[serde(rename = "tiporecurso", default)]
    pub resource_type: String,
    #[serde(rename = "recurso", default)]
    pub resource: Option<String>,
    #[serde(rename = "horainicio", default)]
    pub opens_at: Option<String>,
    #[serde(rename = "horafinal", default)]
    pub closes_at: Option<String>,
    #[serde(rename = "reservas", default)]
    pub reservations: Vec<Reservation>,
}
