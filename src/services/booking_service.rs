use crate::models::activity::{ActivityKind, NewActivity};
use crate::models::booking::{Booking, BookingStatus, CreateBookingRequest};
use crate::models::facility::SpotStatus;
use crate::services::activity_log::ActivityLogger;
use crate::store::SharedStore;
use crate::utils::error::{AppError, AppResult};
use serde_json::json;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info};

/// Status a spot moves to when a booking is created on it.
pub const HOLD_STATUS: SpotStatus = SpotStatus::Reserved;

/// One async mutex per spot id. Holding it covers the whole
/// read-check-transition of a booking on that spot. Entries live only while
/// some caller holds or waits on them.
#[derive(Default)]
struct SpotLocks {
    locks: Mutex<HashMap<i32, Arc<AsyncMutex<()>>>>,
}

/// Exclusive hold on one spot; dropping it prunes the spot's entry once idle.
struct SpotLease {
    locks: Arc<SpotLocks>,
    spot_id: i32,
    guard: Option<OwnedMutexGuard<()>>,
}

impl SpotLocks {
    async fn acquire(self: &Arc<Self>, spot_id: i32) -> SpotLease {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(spot_id).or_default().clone()
        };
        SpotLease {
            locks: self.clone(),
            spot_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for SpotLease {
    fn drop(&mut self) {
        let mut locks = self.locks.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // release the mutex while the map is held so nobody clones in between
        self.guard.take();
        let idle = locks
            .get(&self.spot_id)
            .map_or(false, |lock| Arc::strong_count(lock) == 1);
        if idle {
            locks.remove(&self.spot_id);
        }
    }
}

// Both terminal states hand the spot back; an admin override to
// maintenance in the meantime is preserved by the store.
fn releases_spot(status: BookingStatus) -> bool {
    status.is_terminal()
}

pub fn parse_booking_status(raw: &str) -> AppResult<BookingStatus> {
    BookingStatus::from_str(&raw.trim().to_ascii_lowercase()).map_err(|_| {
        AppError::ValidationError(format!(
            "Unknown booking status '{}', expected active, completed or cancelled",
            raw
        ))
    })
}

#[derive(Clone)]
pub struct BookingService {
    store: SharedStore,
    activity: ActivityLogger,
    spot_locks: Arc<SpotLocks>,
}

impl BookingService {
    pub fn new(store: SharedStore) -> Self {
        BookingService {
            activity: ActivityLogger::new(store.clone()),
            store,
            spot_locks: Arc::new(SpotLocks::default()),
        }
    }

    pub async fn create_booking(
        &self,
        user_id: i32,
        request: CreateBookingRequest,
    ) -> AppResult<Booking> {
        validator::Validate::validate(&request)?;

        // ownership first, regardless of spot state
        match self.store.get_vehicle(request.vehicle_id).await? {
            Some(vehicle) if vehicle.is_owned_by(user_id) => {}
            _ => {
                return Err(AppError::OwnershipError(
                    "Vehicle does not belong to user".into(),
                ))
            }
        }

        let spot_id = request.spot_id;
        let spot_missing = || AppError::NotFound(format!("Spot {} not found", spot_id));

        // unknown ids never get a lock entry
        if self.store.get_spot(spot_id).await?.is_none() {
            return Err(spot_missing());
        }

        let lease = self.spot_locks.acquire(spot_id).await;

        let spot = self.store.get_spot(spot_id).await?.ok_or_else(spot_missing)?;

        if spot.status != SpotStatus::Available {
            debug!(spot_id, status = %spot.status, "spot not available");
            return Err(AppError::Conflict("Spot is not available".into()));
        }

        // another process may have taken the spot since the read
        let booking = self
            .store
            .insert_booking_holding_spot(request.into_new_booking(user_id), HOLD_STATUS)
            .await?
            .ok_or_else(|| AppError::Conflict("Spot is not available".into()))?;

        drop(lease);

        info!(
            booking_id = booking.id,
            user_id,
            spot_id,
            "booking created"
        );
        self.activity.record(
            NewActivity::new(
                ActivityKind::BookingCreated,
                format!("Spot {} reserved", spot.spot_number),
            )
            .by_user(user_id)
            .related_to(booking.id)
            .with_metadata(json!({
                "spot_id": spot_id,
                "facility_id": spot.facility_id,
                "vehicle_id": booking.vehicle_id,
            })),
        );

        Ok(booking)
    }

    pub async fn update_booking_status(
        &self,
        booking_id: i32,
        status: &str,
        caller_user_id: i32,
        caller_is_admin: bool,
    ) -> AppResult<Booking> {
        let status = parse_booking_status(status)?;

        let booking = self
            .store
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

        if booking.user_id != caller_user_id && !caller_is_admin {
            return Err(AppError::AuthorizationError(
                "Only the booking owner or an administrator may change this booking".into(),
            ));
        }

        if booking.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Booking is already {}",
                booking.status
            )));
        }
        if status == BookingStatus::Active {
            return Err(AppError::Conflict("Booking is already active".into()));
        }

        let lease = self.spot_locks.acquire(booking.spot_id).await;

        let updated = self
            .store
            .finish_booking(booking_id, status, releases_spot(status))
            .await?
            .ok_or_else(|| AppError::Conflict("Booking is no longer active".into()))?;

        drop(lease);

        info!(booking_id, %status, caller_user_id, "booking status updated");
        let kind = match status {
            BookingStatus::Cancelled => ActivityKind::BookingCancelled,
            _ => ActivityKind::BookingCompleted,
        };
        self.activity.record(
            NewActivity::new(kind, format!("Booking {} {}", booking_id, status))
                .by_user(caller_user_id)
                .related_to(booking_id),
        );

        Ok(updated)
    }

    pub async fn get_bookings_for_user(&self, user_id: i32) -> AppResult<Vec<Booking>> {
        self.store.get_bookings_by_user(user_id).await
    }

    pub async fn get_active_bookings_for_user(&self, user_id: i32) -> AppResult<Vec<Booking>> {
        self.store.get_active_bookings_by_user(user_id).await
    }

    pub async fn get_recent_bookings(&self, limit: usize) -> AppResult<Vec<Booking>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.store.get_recent_bookings(limit).await
    }
}
