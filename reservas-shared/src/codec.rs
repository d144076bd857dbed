//! Serde helpers for the reservation backend's loosely typed JSON.
//!
//! Timestamps travel as `dd/MM/yyyy HH:mm` strings on the way out. On the way
//! in the backend is less consistent (the admin listing returns ISO strings),
//! so parsing accepts every shape seen in practice.

use chrono::{DateTime, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serializer};

/// Outbound timestamp layout, e.g. `01/05/2024 09:00`.
pub const WIRE_FORMAT: &str = "%d/%m/%Y %H:%M";

const ACCEPTED_FORMATS: &[&str] = &[
    WIRE_FORMAT,
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn format_wire(at: &NaiveDateTime) -> String {
    at.format(WIRE_FORMAT).to_string()
}

/// Parses any timestamp layout the backend is known to emit.
/// Offsets (RFC 3339) are dropped in favour of the wall-clock time they carry.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
}

/// `#[serde(with = "codec::wire")]` for `NaiveDateTime` fields.
pub mod wire {
    use super::*;

    pub fn serialize<S: Serializer>(at: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_wire(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("unrecognised timestamp: {raw}")))
    }
}

/// `#[serde(with = "codec::wire_lenient")]` for `Option<NaiveDateTime>` fields.
///
/// Blank, null or unreadable values come through as `None` instead of failing
/// the surrounding document.
pub mod wire_lenient {
    use super::*;

    pub fn serialize<S: Serializer>(at: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match at {
            Some(at) => s.serialize_str(&format_wire(at)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
        Ok(match Option::<serde_json::Value>::deserialize(d)? {
            Some(serde_json::Value::String(raw)) => parse_timestamp(&raw),
            _ => None,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
}

/// Identifiers arrive as either strings or numbers depending on the endpoint.
pub fn id_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Scalar::deserialize(d)? {
        Scalar::Text(s) => s,
        Scalar::Int(n) => n.to_string(),
        Scalar::Float(f) => f.to_string(),
    })
}

/// JSON truthiness for flags the backend sends as `true`, `1` or `"true"`.
/// `null`, `false`, `0` and `""` are false; everything else is true.
pub fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    use serde_json::Value;

    Ok(match Value::deserialize(d)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Capacity is sometimes a number, sometimes a numeric string, sometimes blank.
pub fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(match Option::<Scalar>::deserialize(d)? {
        None => None,
        Some(Scalar::Int(n)) => u32::try_from(n).ok(),
        Some(Scalar::Float(f)) if f >= 0.0 => Some(f as u32),
        Some(Scalar::Float(_)) => None,
        Some(Scalar::Text(s)) => s.trim().parse().ok(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_wire_format_is_day_first() {
        assert_eq!(format_wire(&at(9, 0)), "01/05/2024 09:00");
    }

    #[test]
    fn test_parse_accepts_backend_variants() {
        assert_eq!(parse_timestamp("01/05/2024 09:00"), Some(at(9, 0)));
        assert_eq!(parse_timestamp("2024-05-01T09:00:00"), Some(at(9, 0)));
        assert_eq!(parse_timestamp("2024-05-01 09:30:00.000"), Some(at(9, 30)));
        assert_eq!(parse_timestamp("2024-05-01T09:00:00-05:00"), Some(at(9, 0)));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_lenient_timestamps() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, with = "wire_lenient")]
            at: Option<NaiveDateTime>,
        }

        let parse = |json: &str| serde_json::from_str::<Row>(json).unwrap().at;
        assert_eq!(parse(r#"{"at":"01/05/2024 09:00"}"#), Some(at(9, 0)));
        assert_eq!(parse(r#"{"at":""}"#), None);
        assert_eq!(parse(r#"{"at":"31/02/2024 25:00"}"#), None);
        assert_eq!(parse(r#"{"at":null}"#), None);
        assert_eq!(parse(r#"{"at":1714554000}"#), None);
        assert_eq!(parse("{}"), None);
    }

    #[test]
    fn test_lenient_ids_and_capacity() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(deserialize_with = "id_string")]
            id: String,
            #[serde(default, deserialize_with = "lenient_u32")]
            cap: Option<u32>,
        }

        let row: Row = serde_json::from_str(r#"{"id": 42, "cap": "30"}"#).unwrap();
        assert_eq!(row.id, "42");
        assert_eq!(row.cap, Some(30));

        let row: Row = serde_json::from_str(r#"{"id": "E-7"}"#).unwrap();
        assert_eq!(row.id, "E-7");
        assert_eq!(row.cap, None);
    }
}
