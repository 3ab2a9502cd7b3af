// ── Reservation domain type ──

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::{lenient, validate};
use crate::error::CoreError;
use crate::resource::{Draft, Resource, ResourceKind, text_cell};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReservationStatus {
    Active,
    Pending,
    Completed,
    Cancelled,
}

/// Vehicle class a reservation holds a space for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum CarType {
    B,
    C,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: EntityId,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub spot_id: Option<String>,
    #[serde(default)]
    pub car_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Resource for Reservation {
    type Draft = ReservationDraft;
    type Update = ReservationDraft;

    const KIND: ResourceKind = ResourceKind::Reservations;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![Cow::Owned(self.id.to_string())];
        fields.extend(
            [
                &self.status,
                &self.car_type,
                &self.user_id,
                &self.spot_id,
                &self.start_time,
                &self.end_time,
            ]
            .into_iter()
            .flatten()
            .map(|s| Cow::Borrowed(s.as_str())),
        );
        fields
    }

    fn category(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn cell(&self, column: &str) -> String {
        match column {
            "id" => self.id.to_string(),
            "start_time" => text_cell(self.start_time.as_deref()),
            "end_time" => text_cell(self.end_time.as_deref()),
            "status" => text_cell(self.status.as_deref()),
            "car_type" => text_cell(self.car_type.as_deref()),
            "user_id" => text_cell(self.user_id.as_deref()),
            "spot_id" => text_cell(self.spot_id.as_deref()),
            "created_at" => text_cell(self.created_at.as_deref()),
            _ => String::new(),
        }
    }
}

/// `POST /reservations` and `PUT /reservations/{id}`. Times are RFC 3339.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationDraft {
    pub start_time: String,
    pub end_time: String,
    pub status: ReservationStatus,
    pub car_type: CarType,
    pub user_id: EntityId,
    pub spot_id: EntityId,
}

fn timestamp(field: &str, value: &str) -> Result<DateTime<FixedOffset>, CoreError> {
    validate::required(field, value)?;
    DateTime::parse_from_rfc3339(value.trim())
        .map_err(|e| CoreError::validation(field, format!("must be an RFC 3339 timestamp ({e})")))
}

impl Draft for ReservationDraft {
    fn validate(&self) -> Result<(), CoreError> {
        let start = timestamp("start_time", &self.start_time)?;
        let end = timestamp("end_time", &self.end_time)?;
        if end <= start {
            return Err(CoreError::validation("end_time", "must be after start_time"));
        }
        validate::required("user_id", &self.user_id.to_string())?;
        validate::required("spot_id", &self.spot_id.to_string())?;
        Ok(())
    }
}
