// ── Resource abstraction ──
//
// One generic table controller drives all four entity kinds. Everything
// that differs per kind (endpoint, sort key, searchable fields, category
// field, column set, page size) is declared here.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::EntityId;

/// Synthetic column holding the per-row action hints.
pub const ACTIONS_COLUMN: &str = "actions";

/// A displayable column of a resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub key: &'static str,
    pub label: &'static str,
    pub default_visible: bool,
}

impl ColumnDef {
    pub const fn shown(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            default_visible: true,
        }
    }

    pub const fn hidden(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            default_visible: false,
        }
    }
}

// ── Kinds ────────────────────────────────────────────────────────────

/// The four collections managed by the console.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ResourceKind {
    Users,
    ParkingSpots,
    Payments,
    Reservations,
}

impl ResourceKind {
    /// Collection endpoint, relative to the API base URL.
    pub fn collection_path(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::ParkingSpots => "parking-spots",
            Self::Payments => "payments",
            Self::Reservations => "reservations",
        }
    }

    pub fn item_path(self, id: &EntityId) -> String {
        format!("{}/{id}", self.collection_path())
    }

    /// Human label for one record, used in notifications.
    pub fn singular(self) -> &'static str {
        match self {
            Self::Users => "User",
            Self::ParkingSpots => "Parking spot",
            Self::Payments => "Payment",
            Self::Reservations => "Reservation",
        }
    }

    pub fn page_size(self) -> usize {
        match self {
            Self::ParkingSpots => 5,
            Self::Users | Self::Payments | Self::Reservations => 10,
        }
    }

    /// Category values always present in counts, even at zero.
    pub fn category_seed(self) -> &'static [&'static str] {
        match self {
            Self::Users => &["USER", "PARKING_ADMIN", "ADMIN"],
            Self::ParkingSpots => &["open", "closed"],
            Self::Payments => &["pending", "completed", "failed"],
            Self::Reservations => &["active", "pending", "completed", "cancelled"],
        }
    }

    /// Field the category counts are keyed on.
    pub fn category_field(self) -> &'static str {
        match self {
            Self::Users => "role",
            Self::ParkingSpots => "parking_type",
            Self::Payments => "payment_status",
            Self::Reservations => "status",
        }
    }

    /// Actions offered per row.
    pub fn row_actions(self) -> &'static str {
        match self {
            Self::Users => "update · delete",
            Self::ParkingSpots => "detail · update · delete",
            Self::Payments | Self::Reservations => "get · update · delete",
        }
    }

    pub fn columns(self) -> &'static [ColumnDef] {
        match self {
            Self::Users => USER_COLUMNS,
            Self::ParkingSpots => PARKING_SPOT_COLUMNS,
            Self::Payments => PAYMENT_COLUMNS,
            Self::Reservations => RESERVATION_COLUMNS,
        }
    }
}

const USER_COLUMNS: &[ColumnDef] = &[
    ColumnDef::shown("id", "ID"),
    ColumnDef::shown("full_name", "Full name"),
    ColumnDef::shown("email", "Email"),
    ColumnDef::shown("phone_number", "Phone"),
    ColumnDef::shown("role", "Role"),
    ColumnDef::shown(ACTIONS_COLUMN, "Actions"),
];

const PARKING_SPOT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::shown("id", "ID"),
    ColumnDef::shown("location_name", "Location"),
    ColumnDef::shown("address", "Address"),
    ColumnDef::hidden("longitude", "Longitude"),
    ColumnDef::hidden("latitude", "Latitude"),
    ColumnDef::shown("b_total_spots", "B total"),
    ColumnDef::shown("c_total_spots", "C total"),
    ColumnDef::hidden("b_available_spots", "B free"),
    ColumnDef::hidden("c_available_spots", "C free"),
    ColumnDef::hidden("b_cost", "B cost"),
    ColumnDef::hidden("c_cost", "C cost"),
    ColumnDef::hidden("ev_total_spots", "EV total"),
    ColumnDef::hidden("ev_available_spots", "EV free"),
    ColumnDef::hidden("ev_charging_cost", "EV charging cost"),
    ColumnDef::shown("parking_type", "Type"),
    ColumnDef::hidden("admin_id", "Admin ID"),
    ColumnDef::shown(ACTIONS_COLUMN, "Actions"),
];

const PAYMENT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::shown("id", "ID"),
    ColumnDef::shown("amount", "Amount"),
    ColumnDef::shown("payment_method", "Method"),
    ColumnDef::shown("payment_status", "Status"),
    ColumnDef::shown("transaction_id", "Transaction"),
    ColumnDef::shown("created_at", "Created"),
    ColumnDef::shown(ACTIONS_COLUMN, "Actions"),
];

const RESERVATION_COLUMNS: &[ColumnDef] = &[
    ColumnDef::shown("id", "ID"),
    ColumnDef::shown("start_time", "Start"),
    ColumnDef::shown("end_time", "End"),
    ColumnDef::shown("status", "Status"),
    ColumnDef::shown("car_type", "Car type"),
    ColumnDef::shown("user_id", "User"),
    ColumnDef::shown("spot_id", "Spot"),
    ColumnDef::shown(ACTIONS_COLUMN, "Actions"),
];

// ── Traits ───────────────────────────────────────────────────────────

/// A request payload that can be checked before it is sent.
pub trait Draft: Serialize + Send + Sync {
    fn validate(&self) -> Result<(), CoreError>;
}

/// A record type managed by [`ResourceTable`](crate::table::ResourceTable).
pub trait Resource: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Payload for `create`.
    type Draft: Draft;
    /// Payload for `update`.
    type Update: Draft;

    const KIND: ResourceKind;

    fn id(&self) -> &EntityId;

    /// Canonical sort key. Records returning `None` keep backend order
    /// after the sorted ones.
    fn display_key(&self) -> Option<&str> {
        None
    }

    /// Values matched by free-text search.
    fn search_fields(&self) -> Vec<Cow<'_, str>>;

    /// Value of the kind's category field.
    fn category(&self) -> Option<&str> {
        None
    }

    /// Rendered value of one column (empty when absent).
    fn cell(&self, column: &str) -> String;

    /// Case-insensitive substring match over the searchable fields.
    fn matches(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty()
            || self
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(needle_lower))
    }
}

// ── Cell formatting ──────────────────────────────────────────────────

pub(crate) fn text_cell(value: Option<&str>) -> String {
    value.unwrap_or_default().to_owned()
}

pub(crate) fn number_cell(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_default()
}

/// Integers print without a fractional part; others with up to two decimals.
pub fn format_number(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        let s = format!("{value:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_owned()
    }
}
