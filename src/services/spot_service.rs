use crate::models::activity::{ActivityKind, NewActivity};
use crate::models::facility::{Facility, Spot, SpotStatus};
use crate::services::activity_log::ActivityLogger;
use crate::store::SharedStore;
use crate::utils::error::{AppError, AppResult};
use std::str::FromStr;

#[derive(Clone)]
pub struct SpotService {
    store: SharedStore,
    activity: ActivityLogger,
}

impl SpotService {
    pub fn new(store: SharedStore) -> Self {
        SpotService {
            activity: ActivityLogger::new(store.clone()),
            store,
        }
    }

    pub async fn get_all_facilities(&self) -> AppResult<Vec<Facility>> {
        self.store.get_all_facilities().await
    }

    pub async fn get_facility(&self, facility_id: i32) -> AppResult<Facility> {
        self.store
            .get_facility(facility_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Facility not found".into()))
    }

    pub async fn get_spots_by_facility(&self, facility_id: i32) -> AppResult<Vec<Spot>> {
        self.store.get_spots_by_facility(facility_id).await
    }

    pub async fn get_available_spots(&self, facility_id: i32) -> AppResult<Vec<Spot>> {
        let spots = self.store.get_spots_by_facility(facility_id).await?;
        Ok(spots
            .into_iter()
            .filter(|spot| spot.status == SpotStatus::Available)
            .collect())
    }

    /// Administrative override, bypasses the booking flow entirely.
    pub async fn override_spot_status(
        &self,
        admin_user_id: i32,
        spot_id: i32,
        status: &str,
    ) -> AppResult<Spot> {
        let status = SpotStatus::from_str(&status.trim().to_ascii_lowercase())
            .map_err(|_| AppError::ValidationError("Invalid status".into()))?;

        let spot = self
            .store
            .set_spot_status(spot_id, status)
            .await?
            .ok_or_else(|| AppError::NotFound("Spot not found".into()))?;

        tracing::info!(spot_id, %status, admin_user_id, "spot status overridden");
        self.activity.record(
            NewActivity::new(
                ActivityKind::SpotStatusChanged,
                format!("Spot {} set to {}", spot.spot_number, status),
            )
            .by_user(admin_user_id)
            .related_to(spot_id),
        );

        Ok(spot)
    }
}
