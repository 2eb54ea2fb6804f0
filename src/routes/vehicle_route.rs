use crate::models::vehicle::{Vehicle, VehicleRegistrationRequest};
use crate::services::vehicle_service::VehicleService;
use crate::utils::error::AppError;
use crate::utils::jwt::AuthenticatedUser;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// List the caller's vehicles
#[openapi(tag = "Vehicles")]
#[get("/vehicles")]
pub async fn list_vehicles(
    auth: AuthenticatedUser,
    vehicle_service: &State<VehicleService>,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    let vehicles = vehicle_service.get_vehicles_for_user(auth.user_id).await?;
    Ok(Json(vehicles))
}

/// Register a vehicle for the caller
#[openapi(tag = "Vehicles")]
#[post("/vehicles", format = "json", data = "<request>")]
pub async fn register_vehicle(
    request: Json<VehicleRegistrationRequest>,
    auth: AuthenticatedUser,
    vehicle_service: &State<VehicleService>,
) -> Result<Json<Vehicle>, AppError> {
    let vehicle = vehicle_service
        .register_vehicle(auth.user_id, request.into_inner())
        .await?;
    Ok(Json(vehicle))
}
