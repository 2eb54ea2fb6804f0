use super::ParkingStore;
use crate::models::activity::{Activity, ActivityKind, NewActivity};
use crate::models::booking::{Booking, BookingStatus, NewBooking};
use crate::models::facility::{Facility, NewFacility, NewSpot, Spot, SpotStatus};
use crate::models::user::{NewUser, User};
use crate::models::vehicle::{NewVehicle, Vehicle};
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Map-backed store. One lock guards every table, so each trait call is a
/// single-writer transaction.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    users: BTreeMap<i32, User>,
    vehicles: BTreeMap<i32, Vehicle>,
    facilities: BTreeMap<i32, Facility>,
    spots: BTreeMap<i32, Spot>,
    bookings: BTreeMap<i32, Booking>,
    activities: BTreeMap<i32, Activity>,
    ids: IdCounters,
}

#[derive(Default)]
struct IdCounters {
    user: i32,
    vehicle: i32,
    facility: i32,
    spot: i32,
    booking: i32,
    activity: i32,
}

fn next(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with demo facilities, spots and activities.
    pub fn with_sample_data() -> Self {
        Self::with_sample_data_from(&mut rand::thread_rng())
    }

    pub fn with_sample_data_from<R: Rng>(rng: &mut R) -> Self {
        let mut state = StoreState::default();
        state.seed(rng);
        MemoryStore {
            state: RwLock::new(state),
        }
    }
}

impl StoreState {
    fn insert_facility(&mut self, facility: NewFacility) -> Facility {
        let facility = Facility {
            id: next(&mut self.ids.facility),
            name: facility.name,
            address: facility.address,
            total_spots: facility.total_spots,
            hourly_rate: facility.hourly_rate,
        };
        self.facilities.insert(facility.id, facility.clone());
        facility
    }

    fn insert_spot(&mut self, spot: NewSpot) -> Spot {
        let spot = Spot {
            id: next(&mut self.ids.spot),
            facility_id: spot.facility_id,
            spot_number: spot.spot_number,
            status: spot.status,
            sensor_id: spot.sensor_id,
        };
        self.spots.insert(spot.id, spot.clone());
        spot
    }

    fn insert_activity(&mut self, activity: NewActivity) -> Activity {
        let activity = Activity {
            id: next(&mut self.ids.activity),
            user_id: activity.user_id,
            kind: activity.kind,
            description: activity.description,
            timestamp: activity.timestamp.unwrap_or_else(Utc::now),
            related_id: activity.related_id,
            metadata: activity.metadata,
        };
        self.activities.insert(activity.id, activity.clone());
        activity
    }

    fn seed<R: Rng>(&mut self, rng: &mut R) {
        // (name, address, total spots, hourly rate, row prefix, sensor prefix, availability threshold)
        let sites = [
            ("Downtown Garage", "123 Main St, Downtown", 50, 250, 'A', "DT", 0.6),
            ("Central Mall Parking", "456 Market St, Center City", 100, 300, 'B', "CM", 0.5),
            ("Airport Terminal P3", "789 Airport Blvd, Runway City", 200, 400, 'C', "AT", 0.7),
        ];

        for (name, address, total_spots, hourly_rate, row, sensor, threshold) in sites {
            let facility = self.insert_facility(NewFacility {
                name: name.to_string(),
                address: address.to_string(),
                total_spots,
                hourly_rate,
            });

            for i in 1..=20 {
                let status = if rng.gen::<f64>() > threshold {
                    SpotStatus::Available
                } else {
                    SpotStatus::Occupied
                };
                self.insert_spot(NewSpot {
                    facility_id: facility.id,
                    spot_number: format!("{}{}", row, i),
                    status,
                    sensor_id: Some(format!("{}-{}{}", sensor, row, i)),
                });
            }
        }

        let kinds = [
            ActivityKind::SpotOccupied,
            ActivityKind::SpotAvailable,
            ActivityKind::BookingCreated,
            ActivityKind::PaymentProcessed,
        ];
        let now = Utc::now();
        for _ in 0..10 {
            let kind = kinds[rng.gen_range(0..kinds.len())];
            let spot_label = format!(
                "{}{}",
                char::from(b'A' + rng.gen_range(0..3u8)),
                rng.gen_range(1..=20)
            );
            let description = match kind {
                ActivityKind::SpotOccupied => format!("Vehicle entered spot {}", spot_label),
                ActivityKind::SpotAvailable => format!("Spot {} became available", spot_label),
                ActivityKind::BookingCreated => "New reservation made".to_string(),
                _ => "Payment processed".to_string(),
            };
            let age = Duration::milliseconds(rng.gen_range(0..3_600_000));
            self.insert_activity(NewActivity::new(kind, description).at(now - age));
        }
    }
}

#[async_trait]
impl ParkingStore for MemoryStore {
    async fn get_user(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(AppError::Conflict("Username already exists".into()));
        }
        let user = User {
            id: next(&mut state.ids.user),
            username: user.username,
            password: user.password,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_vehicle(&self, id: i32) -> AppResult<Option<Vehicle>> {
        Ok(self.state.read().await.vehicles.get(&id).cloned())
    }

    async fn get_vehicles_by_user(&self, user_id: i32) -> AppResult<Vec<Vehicle>> {
        let state = self.state.read().await;
        Ok(state
            .vehicles
            .values()
            .filter(|vehicle| vehicle.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        let mut state = self.state.write().await;
        let vehicle = Vehicle {
            id: next(&mut state.ids.vehicle),
            user_id: vehicle.user_id,
            make: vehicle.make,
            model: vehicle.model,
            license_plate: vehicle.license_plate,
            color: vehicle.color,
        };
        state.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    async fn get_facility(&self, id: i32) -> AppResult<Option<Facility>> {
        Ok(self.state.read().await.facilities.get(&id).cloned())
    }

    async fn get_all_facilities(&self) -> AppResult<Vec<Facility>> {
        Ok(self.state.read().await.facilities.values().cloned().collect())
    }

    async fn create_facility(&self, facility: NewFacility) -> AppResult<Facility> {
        Ok(self.state.write().await.insert_facility(facility))
    }

    async fn get_spot(&self, id: i32) -> AppResult<Option<Spot>> {
        Ok(self.state.read().await.spots.get(&id).cloned())
    }

    async fn get_spots_by_facility(&self, facility_id: i32) -> AppResult<Vec<Spot>> {
        let state = self.state.read().await;
        Ok(state
            .spots
            .values()
            .filter(|spot| spot.facility_id == facility_id)
            .cloned()
            .collect())
    }

    async fn create_spot(&self, spot: NewSpot) -> AppResult<Spot> {
        Ok(self.state.write().await.insert_spot(spot))
    }

    async fn set_spot_status(&self, id: i32, status: SpotStatus) -> AppResult<Option<Spot>> {
        let mut state = self.state.write().await;
        Ok(state.spots.get_mut(&id).map(|spot| {
            spot.status = status;
            spot.clone()
        }))
    }

    async fn get_booking(&self, id: i32) -> AppResult<Option<Booking>> {
        Ok(self.state.read().await.bookings.get(&id).cloned())
    }

    async fn get_bookings_by_user(&self, user_id: i32) -> AppResult<Vec<Booking>> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|booking| booking.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(bookings)
    }

    async fn get_active_bookings_by_user(&self, user_id: i32) -> AppResult<Vec<Booking>> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|booking| booking.user_id == user_id && booking.status == BookingStatus::Active)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        Ok(bookings)
    }

    async fn get_recent_bookings(&self, limit: usize) -> AppResult<Vec<Booking>> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state.bookings.values().cloned().collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        bookings.truncate(limit);
        Ok(bookings)
    }

    async fn insert_booking_holding_spot(
        &self,
        booking: NewBooking,
        hold: SpotStatus,
    ) -> AppResult<Option<Booking>> {
        let mut state = self.state.write().await;

        match state.spots.get_mut(&booking.spot_id) {
            Some(spot) if spot.status == SpotStatus::Available => spot.status = hold,
            _ => return Ok(None),
        }

        let booking = Booking {
            id: next(&mut state.ids.booking),
            user_id: booking.user_id,
            vehicle_id: booking.vehicle_id,
            spot_id: booking.spot_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
            status: BookingStatus::Active,
            amount: booking.amount,
            created_at: Utc::now(),
        };
        state.bookings.insert(booking.id, booking.clone());
        Ok(Some(booking))
    }

    async fn finish_booking(
        &self,
        booking_id: i32,
        status: BookingStatus,
        release_spot: bool,
    ) -> AppResult<Option<Booking>> {
        let mut state = self.state.write().await;

        let booking = match state.bookings.get_mut(&booking_id) {
            Some(booking) if booking.status == BookingStatus::Active => {
                booking.status = status;
                booking.clone()
            }
            _ => return Ok(None),
        };

        // the spot may have been forced free and booked again since
        let rebooked = state
            .bookings
            .values()
            .any(|b| b.spot_id == booking.spot_id && b.status == BookingStatus::Active);

        if release_spot && !rebooked {
            if let Some(spot) = state.spots.get_mut(&booking.spot_id) {
                if spot.status.is_held() {
                    spot.status = SpotStatus::Available;
                }
            }
        }

        Ok(Some(booking))
    }

    async fn append_activity(&self, activity: NewActivity) -> AppResult<Activity> {
        Ok(self.state.write().await.insert_activity(activity))
    }

    async fn get_recent_activities(&self, limit: usize) -> AppResult<Vec<Activity>> {
        let state = self.state.read().await;
        let mut activities: Vec<Activity> = state.activities.values().cloned().collect();
        activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        activities.truncate(limit);
        Ok(activities)
    }
}
