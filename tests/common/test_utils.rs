#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::OnceCell;
use smart_parking::models::facility::{Facility, NewFacility, NewSpot, Spot, SpotStatus};
use smart_parking::models::user::{NewUser, Role, User};
use smart_parking::models::vehicle::{NewVehicle, Vehicle};
use smart_parking::store::{MemoryStore, ParkingStore, SharedStore};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

static LOGGING: OnceCell<()> = OnceCell::new();

// Install a test subscriber once per test binary; RUST_LOG controls verbosity
pub fn init_test_logging() {
    LOGGING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Fresh in-memory store plus helpers to populate it directly.
pub struct TestStore {
    pub store: SharedStore,
}

impl TestStore {
    pub fn new() -> Self {
        init_test_logging();
        TestStore {
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub async fn add_user(&self, username: &str, role: Role) -> anyhow::Result<User> {
        // booking tests never log in, so the password is stored as-is
        let user = self
            .store
            .create_user(NewUser {
                username: username.to_string(),
                password: "not-a-hash".to_string(),
                email: None,
                first_name: None,
                last_name: None,
                role,
            })
            .await?;
        Ok(user)
    }

    pub async fn add_vehicle(&self, user_id: i32, plate: &str) -> anyhow::Result<Vehicle> {
        let vehicle = self
            .store
            .create_vehicle(NewVehicle {
                user_id,
                make: "Toyota".to_string(),
                model: "Corolla".to_string(),
                license_plate: plate.to_string(),
                color: None,
            })
            .await?;
        Ok(vehicle)
    }

    /// Facility with `count` spots, all in `status`.
    pub async fn add_facility(
        &self,
        name: &str,
        count: i32,
        status: SpotStatus,
    ) -> anyhow::Result<(Facility, Vec<Spot>)> {
        let facility = self
            .store
            .create_facility(NewFacility {
                name: name.to_string(),
                address: format!("{} address", name),
                total_spots: count,
                hourly_rate: 250,
            })
            .await?;

        let mut spots = Vec::new();
        for i in 1..=count {
            let spot = self
                .store
                .create_spot(NewSpot {
                    facility_id: facility.id,
                    spot_number: format!("A{}", i),
                    status,
                    sensor_id: Some(format!("T-A{}", i)),
                })
                .await?;
            spots.push(spot);
        }
        Ok((facility, spots))
    }

    pub async fn spot_status(&self, spot_id: i32) -> SpotStatus {
        self.store
            .get_spot(spot_id)
            .await
            .expect("store read failed")
            .expect("spot exists")
            .status
    }
}

pub fn window(start_in_hours: i64, length_hours: i64) -> (DateTime<Utc>, Option<DateTime<Utc>>) {
    let start = Utc::now() + Duration::hours(start_in_hours);
    (start, Some(start + Duration::hours(length_hours)))
}
