use crate::models::vehicle::{Vehicle, VehicleRegistrationRequest};
use crate::store::SharedStore;
use crate::utils::error::AppResult;
use validator::Validate;

#[derive(Clone)]
pub struct VehicleService {
    store: SharedStore,
}

impl VehicleService {
    pub fn new(store: SharedStore) -> Self {
        VehicleService { store }
    }

    pub async fn get_vehicles_for_user(&self, user_id: i32) -> AppResult<Vec<Vehicle>> {
        self.store.get_vehicles_by_user(user_id).await
    }

    // Register a vehicle for the calling user
    pub async fn register_vehicle(
        &self,
        user_id: i32,
        request: VehicleRegistrationRequest,
    ) -> AppResult<Vehicle> {
        request.validate()?;
        let vehicle = self
            .store
            .create_vehicle(request.into_new_vehicle(user_id))
            .await?;
        tracing::info!(vehicle_id = vehicle.id, user_id, "vehicle registered");
        Ok(vehicle)
    }
}
