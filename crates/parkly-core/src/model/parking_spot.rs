// ── Parking spot domain types ──
//
// A spot holds three vehicle classes: B (cars), C (trucks), and EV
// charging bays. Each class has a total and a currently-available count.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::{lenient, validate};
use crate::error::CoreError;
use crate::resource::{Draft, Resource, ResourceKind, format_number, number_cell, text_cell};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ParkingType {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingSpot {
    pub id: EntityId,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub b_total_spots: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub c_total_spots: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub b_available_spots: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub c_available_spots: u32,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub b_cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub c_cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub ev_total_spots: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub ev_available_spots: u32,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub ev_charging_cost: Option<f64>,
    #[serde(default)]
    pub parking_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub admin_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Resource for ParkingSpot {
    type Draft = ParkingSpotDraft;
    type Update = ParkingSpotDraft;

    const KIND: ResourceKind = ResourceKind::ParkingSpots;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_key(&self) -> Option<&str> {
        self.location_name.as_deref().filter(|s| !s.is_empty())
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        [&self.location_name, &self.address]
            .into_iter()
            .flatten()
            .map(|s| Cow::Borrowed(s.as_str()))
            .collect()
    }

    fn category(&self) -> Option<&str> {
        self.parking_type.as_deref()
    }

    fn cell(&self, column: &str) -> String {
        match column {
            "id" => self.id.to_string(),
            "location_name" => text_cell(self.location_name.as_deref()),
            "address" => text_cell(self.address.as_deref()),
            "longitude" => self.longitude.map(|v| v.to_string()).unwrap_or_default(),
            "latitude" => self.latitude.map(|v| v.to_string()).unwrap_or_default(),
            "b_total_spots" => self.b_total_spots.to_string(),
            "c_total_spots" => self.c_total_spots.to_string(),
            "b_available_spots" => self.b_available_spots.to_string(),
            "c_available_spots" => self.c_available_spots.to_string(),
            "b_cost" => number_cell(self.b_cost),
            "c_cost" => number_cell(self.c_cost),
            "ev_total_spots" => self.ev_total_spots.to_string(),
            "ev_available_spots" => self.ev_available_spots.to_string(),
            "ev_charging_cost" => number_cell(self.ev_charging_cost),
            "parking_type" => text_cell(self.parking_type.as_deref()),
            "admin_id" => text_cell(self.admin_id.as_deref()),
            _ => String::new(),
        }
    }
}

// ── Requests ────────────────────────────────────────────────────────

/// `POST /parking-spots` and `PUT /parking-spots/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingSpotDraft {
    pub location_name: String,
    pub address: String,
    pub longitude: f64,
    pub latitude: f64,
    pub b_total_spots: u32,
    pub b_cost: f64,
    pub c_total_spots: u32,
    pub c_cost: f64,
    pub ev_total_spots: u32,
    pub ev_charging_cost: f64,
    pub parking_type: ParkingType,
    pub admin_id: EntityId,
}

impl Draft for ParkingSpotDraft {
    fn validate(&self) -> Result<(), CoreError> {
        validate::required("location_name", &self.location_name)?;
        validate::required("address", &self.address)?;
        validate::within("longitude", self.longitude, -180.0, 180.0)?;
        validate::within("latitude", self.latitude, -90.0, 90.0)?;
        validate::non_negative("b_cost", self.b_cost)?;
        validate::non_negative("c_cost", self.c_cost)?;
        validate::non_negative("ev_charging_cost", self.ev_charging_cost)?;
        validate::required("admin_id", &self.admin_id.to_string())?;
        Ok(())
    }
}

/// `PATCH /parking-spots/{id}?bSpots=&cSpots=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityUpdate {
    pub b_spots: u32,
    pub c_spots: u32,
}

impl AvailabilityUpdate {
    /// Available counts may not exceed the spot's totals.
    pub fn check_against(&self, spot: &ParkingSpot) -> Result<(), CoreError> {
        if self.b_spots > spot.b_total_spots {
            return Err(CoreError::validation(
                "b_spots",
                format!("must be at most {}", spot.b_total_spots),
            ));
        }
        if self.c_spots > spot.c_total_spots {
            return Err(CoreError::validation(
                "c_spots",
                format!("must be at most {}", spot.c_total_spots),
            ));
        }
        Ok(())
    }
}

// ── Detail view ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotImage {
    pub id: EntityId,
    pub image: String,
}

/// Customer review attached to a spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotComment {
    pub id: EntityId,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub user_id: Option<String>,
    #[serde(
        default,
        rename = "raiting",
        alias = "rating",
        deserialize_with = "lenient::opt_f64"
    )]
    pub rating: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `GET /parking-spots/{id}`: the record plus images, reviews, and rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingSpotDetail {
    #[serde(flatten)]
    pub spot: ParkingSpot,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub images: Vec<SpotImage>,
    #[serde(default)]
    pub comments: Vec<SpotComment>,
}

impl ParkingSpotDetail {
    /// Label/value pairs for a single-record view.
    pub fn summary_rows(&self) -> Vec<(&'static str, String)> {
        let s = &self.spot;
        vec![
            ("ID", s.id.to_string()),
            ("Location", text_cell(s.location_name.as_deref())),
            ("Address", text_cell(s.address.as_deref())),
            (
                "Coordinates",
                match (s.longitude, s.latitude) {
                    (Some(lon), Some(lat)) => format!("{lon}, {lat}"),
                    _ => String::new(),
                },
            ),
            ("Type", text_cell(s.parking_type.as_deref())),
            (
                "B free / total",
                format!("{} / {}", s.b_available_spots, s.b_total_spots),
            ),
            (
                "C free / total",
                format!("{} / {}", s.c_available_spots, s.c_total_spots),
            ),
            (
                "EV free / total",
                format!("{} / {}", s.ev_available_spots, s.ev_total_spots),
            ),
            ("Cost", number_cell(self.cost)),
            ("Rating", self.rating.map(format_number).unwrap_or_default()),
            ("Images", self.images.len().to_string()),
            ("Comments", self.comments.len().to_string()),
        ]
    }
}

// ── Nearby search ───────────────────────────────────────────────────

/// `GET /parking-spots/{radius}/{longitude}/{latitude}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearbyQuery {
    /// Search radius in kilometres.
    pub radius: f64,
    pub longitude: f64,
    pub latitude: f64,
}

impl NearbyQuery {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(CoreError::validation("radius", "must be greater than zero"));
        }
        validate::within("longitude", self.longitude, -180.0, 180.0)?;
        validate::within("latitude", self.latitude, -90.0, 90.0)?;
        Ok(())
    }

    pub fn path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            ResourceKind::ParkingSpots.collection_path(),
            self.radius,
            self.longitude,
            self.latitude
        )
    }
}

/// A spot returned by the nearby search, with its distance in kilometres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbySpot {
    #[serde(flatten)]
    pub spot: ParkingSpot,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub distance: Option<f64>,
}
