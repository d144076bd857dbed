use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use reservas_shared::Space;
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Active search criteria. Every field is optional; `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceFilter {
    #[serde(rename = "sede", default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(rename = "capacidad", default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(rename = "espaciofisico", default, skip_serializing_if = "Option::is_none")]
    pub physical_space: Option<String>,
    #[serde(rename = "tiporecurso", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(rename = "clseFechainicio", default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(rename = "clseFechafinal", default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    #[serde(rename = "horainicio", default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub time_from: Option<NaiveTime>,
    #[serde(rename = "horafinal", default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub time_to: Option<NaiveTime>,
}

/// The recognised form controls, named as the backend names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterField {
    #[serde(rename = "sede")]
    Site,
    #[serde(rename = "capacidad")]
    Capacity,
    #[serde(rename = "espaciofisico")]
    PhysicalSpace,
    #[serde(rename = "tiporecurso")]
    ResourceType,
    #[serde(rename = "clseFechainicio")]
    DateFrom,
    #[serde(rename = "clseFechafinal")]
    DateTo,
    #[serde(rename = "horainicio")]
    TimeFrom,
    #[serde(rename = "horafinal")]
    TimeTo,
}

impl FilterField {
    pub const ALL: [FilterField; 8] = [
        FilterField::Site,
        FilterField::Capacity,
        FilterField::PhysicalSpace,
        FilterField::ResourceType,
        FilterField::DateFrom,
        FilterField::DateTo,
        FilterField::TimeFrom,
        FilterField::TimeTo,
    ];

    pub fn wire_name(&self) -> &'static str {
        match self {
            FilterField::Site => "sede",
            FilterField::Capacity => "capacidad",
            FilterField::PhysicalSpace => "espaciofisico",
            FilterField::ResourceType => "tiporecurso",
            FilterField::DateFrom => "clseFechainicio",
            FilterField::DateTo => "clseFechafinal",
            FilterField::TimeFrom => "horainicio",
            FilterField::TimeTo => "horafinal",
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for FilterField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterField::ALL
            .into_iter()
            .find(|field| field.wire_name() == s)
            .ok_or_else(|| CoreError::UnknownFilterField(s.to_string()))
    }
}

impl SpaceFilter {
    /// Applies one form edit. A blank value clears the field.
    pub fn apply(&mut self, field: FilterField, raw: &str) -> CoreResult<()> {
        let raw = raw.trim();
        let text = || (!raw.is_empty()).then(|| raw.to_string());

        match field {
            FilterField::Site => self.site = text(),
            FilterField::PhysicalSpace => self.physical_space = text(),
            FilterField::ResourceType => self.resource_type = text(),
            FilterField::Capacity => self.capacity = parse_with(raw, field, parse_capacity)?,
            FilterField::DateFrom => self.date_from = parse_with(raw, field, parse_date)?,
            FilterField::DateTo => self.date_to = parse_with(raw, field, parse_date)?,
            FilterField::TimeFrom => self.time_from = parse_with(raw, field, parse_time)?,
            FilterField::TimeTo => self.time_to = parse_with(raw, field, parse_time)?,
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = SpaceFilter::default();
    }

    pub fn is_empty(&self) -> bool {
        self == &SpaceFilter::default()
    }

    /// Query-string pairs for the set fields, in form order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |field: FilterField, value: Option<String>| {
            if let Some(value) = value {
                pairs.push((field.wire_name(), value));
            }
        };

        push(FilterField::Site, self.site.clone());
        push(FilterField::Capacity, self.capacity.map(|c| c.to_string()));
        push(FilterField::PhysicalSpace, self.physical_space.clone());
        push(FilterField::ResourceType, self.resource_type.clone());
        push(FilterField::DateFrom, self.date_from.map(|d| d.format("%Y-%m-%d").to_string()));
        push(FilterField::DateTo, self.date_to.map(|d| d.format("%Y-%m-%d").to_string()));
        push(FilterField::TimeFrom, self.time_from.map(|t| t.format("%H:%M").to_string()));
        push(FilterField::TimeTo, self.time_to.map(|t| t.format("%H:%M").to_string()));
        pairs
    }
}

fn parse_with<T>(
    raw: &str,
    field: FilterField,
    parse: fn(&str) -> Option<T>,
) -> CoreResult<Option<T>> {
    if raw.is_empty() {
        return Ok(None);
    }
    parse(raw)
        .map(Some)
        .ok_or_else(|| CoreError::ValidationError(format!("invalid value for {field}: {raw}")))
}

fn parse_capacity(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|c| *c >= 1)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_str(&t.format("%H:%M").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse_time(raw.trim())
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid time: {raw}"))),
        }
    }
}

/// A filtered, paginated listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpaceQuery {
    pub filter: SpaceFilter,
    pub page: Option<usize>,
}

impl SpaceQuery {
    pub fn page(filter: SpaceFilter, page: usize) -> Self {
        Self { filter, page: Some(page) }
    }

    /// Every space, no paging. Used to harvest filter options.
    pub fn unfiltered() -> Self {
        Self::default()
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs.extend(self.filter.query_pairs());
        pairs
    }
}

/// Choices offered by the select controls, first-seen order, blanks dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub sites: Vec<String>,
    pub physical_spaces: Vec<String>,
    pub resource_types: Vec<String>,
}

impl FilterOptions {
    pub fn from_spaces(spaces: &[Space]) -> Self {
        fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
            let mut out: Vec<String> = Vec::new();
            for v in values {
                if !v.is_empty() && !out.contains(v) {
                    out.push(v.clone());
                }
            }
            out
        }

        Self {
            sites: distinct(spaces.iter().map(|s| &s.site)),
            physical_spaces: distinct(spaces.iter().map(|s| &s.physical_space)),
            resource_types: distinct(spaces.iter().map(|s| &s.resource_type)),
        }
    }
}
