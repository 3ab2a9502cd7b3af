// ── Dashboard aggregation ──
//
// Fans out the four list fetches concurrently and reduces them into one
// snapshot. A failed fetch degrades to an empty collection so the other
// panels still render.

use parkly_api::Gateway;
use serde::Serialize;
use tracing::{info, warn};

use crate::model::{ParkingSpot, Payment, Reservation, User};
use crate::resource::{Resource, ResourceKind};
use crate::stats::{self, CategoryCounts, CountPolicy};

/// Per-class space counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassTotals {
    pub b: u64,
    pub c: u64,
    pub ev: u64,
}

impl ClassTotals {
    pub fn all(&self) -> u64 {
        self.b + self.c + self.ev
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub total: usize,
    pub by_role: CategoryCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParkingStats {
    pub total: usize,
    pub available: ClassTotals,
    pub capacity: ClassTotals,
    pub by_type: CategoryCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentStats {
    pub total: usize,
    pub total_amount: f64,
    pub by_status: CategoryCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationStats {
    pub total: usize,
    pub by_status: CategoryCounts,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub users: UserStats,
    pub parking: ParkingStats,
    pub payments: PaymentStats,
    pub reservations: ReservationStats,
    /// Collections that failed to load and are shown as empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<ResourceKind>,
}

impl DashboardSnapshot {
    /// Reduce four full collections. Unknown categories are kept so
    /// nothing the backend reports is hidden.
    pub fn from_collections(
        users: &[User],
        spots: &[ParkingSpot],
        payments: &[Payment],
        reservations: &[Reservation],
    ) -> Self {
        let policy = CountPolicy::KeepUnknown;

        let class_sum =
            |f: fn(&ParkingSpot) -> u32| -> u64 { spots.iter().map(|s| u64::from(f(s))).sum() };

        Self {
            users: UserStats {
                total: users.len(),
                by_role: stats::summarize(users, policy).counts,
            },
            parking: ParkingStats {
                total: spots.len(),
                available: ClassTotals {
                    b: class_sum(|s| s.b_available_spots),
                    c: class_sum(|s| s.c_available_spots),
                    ev: class_sum(|s| s.ev_available_spots),
                },
                capacity: ClassTotals {
                    b: class_sum(|s| s.b_total_spots),
                    c: class_sum(|s| s.c_total_spots),
                    ev: class_sum(|s| s.ev_total_spots),
                },
                by_type: stats::summarize(spots, policy).counts,
            },
            payments: PaymentStats {
                total: payments.len(),
                total_amount: stats::sum(payments, |p| p.amount),
                by_status: stats::summarize(payments, policy).counts,
            },
            reservations: ReservationStats {
                total: reservations.len(),
                by_status: stats::summarize(reservations, policy).counts,
            },
            degraded: Vec::new(),
        }
    }
}

/// Fetch all four collections concurrently and reduce them.
pub async fn fetch_snapshot(gateway: &Gateway) -> DashboardSnapshot {
    info!("loading dashboard");

    let (users_res, spots_res, payments_res, reservations_res) = tokio::join!(
        gateway.list::<User>(User::KIND.collection_path()),
        gateway.list::<ParkingSpot>(ParkingSpot::KIND.collection_path()),
        gateway.list::<Payment>(Payment::KIND.collection_path()),
        gateway.list::<Reservation>(Reservation::KIND.collection_path()),
    );

    let mut degraded = Vec::new();
    let users = unwrap_or_empty(users_res, &mut degraded);
    let spots = unwrap_or_empty(spots_res, &mut degraded);
    let payments = unwrap_or_empty(payments_res, &mut degraded);
    let reservations = unwrap_or_empty(reservations_res, &mut degraded);

    let mut snapshot = DashboardSnapshot::from_collections(&users, &spots, &payments, &reservations);
    snapshot.degraded = degraded;
    snapshot
}

fn unwrap_or_empty<R: Resource>(
    result: Result<Vec<R>, parkly_api::Error>,
    degraded: &mut Vec<ResourceKind>,
) -> Vec<R> {
    match result {
        Ok(items) => items,
        Err(e) => {
            warn!(kind = %R::KIND, error = %e, "dashboard fetch failed, treating as empty");
            degraded.push(R::KIND);
            Vec::new()
        }
    }
}
