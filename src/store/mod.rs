//! Persistence collaborators consumed by the services.
//!
//! Every service holds an `Arc<dyn ParkingStore>`; the in-memory store backs
//! local runs and tests, the MySQL store backs deployments.

pub mod memory;

use crate::models::activity::{Activity, NewActivity};
use crate::models::booking::{Booking, BookingStatus, NewBooking};
use crate::models::facility::{Facility, NewFacility, NewSpot, Spot, SpotStatus};
use crate::models::user::{NewUser, User};
use crate::models::vehicle::{NewVehicle, Vehicle};
use crate::utils::error::AppResult;
use async_trait::async_trait;
use std::sync::Arc;

pub use memory::MemoryStore;

pub type SharedStore = Arc<dyn ParkingStore>;

#[async_trait]
pub trait ParkingStore: Send + Sync {
    // User operations
    async fn get_user(&self, id: i32) -> AppResult<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>>;
    /// Fails with `Conflict` when the username is already taken.
    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    // Vehicle operations
    async fn get_vehicle(&self, id: i32) -> AppResult<Option<Vehicle>>;
    async fn get_vehicles_by_user(&self, user_id: i32) -> AppResult<Vec<Vehicle>>;
    async fn create_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle>;

    // Facility operations
    async fn get_facility(&self, id: i32) -> AppResult<Option<Facility>>;
    async fn get_all_facilities(&self) -> AppResult<Vec<Facility>>;
    async fn create_facility(&self, facility: NewFacility) -> AppResult<Facility>;

    // Spot operations
    async fn get_spot(&self, id: i32) -> AppResult<Option<Spot>>;
    async fn get_spots_by_facility(&self, facility_id: i32) -> AppResult<Vec<Spot>>;
    async fn create_spot(&self, spot: NewSpot) -> AppResult<Spot>;
    /// Unconditional write, used by administrative overrides.
    async fn set_spot_status(&self, id: i32, status: SpotStatus) -> AppResult<Option<Spot>>;

    // Booking operations
    async fn get_booking(&self, id: i32) -> AppResult<Option<Booking>>;
    /// All bookings of a user, newest first.
    async fn get_bookings_by_user(&self, user_id: i32) -> AppResult<Vec<Booking>>;
    /// Active bookings of a user, earliest start first.
    async fn get_active_bookings_by_user(&self, user_id: i32) -> AppResult<Vec<Booking>>;
    /// Most recently created bookings, newest first, ties broken by id.
    async fn get_recent_bookings(&self, limit: usize) -> AppResult<Vec<Booking>>;

    /// Moves the spot from `available` to `hold` and inserts the booking as one unit.
    ///
    /// Returns `None` without writing anything when the spot is missing or no
    /// longer available at write time.
    async fn insert_booking_holding_spot(
        &self,
        booking: NewBooking,
        hold: SpotStatus,
    ) -> AppResult<Option<Booking>>;

    /// Moves an `active` booking to `status` and, when `release_spot` is set,
    /// returns a `reserved`/`occupied` spot to `available` in the same unit.
    ///
    /// Returns `None` when the booking is missing or no longer active.
    async fn finish_booking(
        &self,
        booking_id: i32,
        status: BookingStatus,
        release_spot: bool,
    ) -> AppResult<Option<Booking>>;

    // Activity operations
    async fn append_activity(&self, activity: NewActivity) -> AppResult<Activity>;
    async fn get_recent_activities(&self, limit: usize) -> AppResult<Vec<Activity>>;
}
