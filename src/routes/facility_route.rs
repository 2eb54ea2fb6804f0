use crate::models::facility::{Facility, Spot};
use crate::services::spot_service::SpotService;
use crate::utils::error::AppError;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// List all parking facilities
#[openapi(tag = "Facilities")]
#[get("/facilities")]
pub async fn list_facilities(
    spot_service: &State<SpotService>,
) -> Result<Json<Vec<Facility>>, AppError> {
    Ok(Json(spot_service.get_all_facilities().await?))
}

/// Get one facility
#[openapi(tag = "Facilities")]
#[get("/facilities/<id>")]
pub async fn get_facility(
    id: i32,
    spot_service: &State<SpotService>,
) -> Result<Json<Facility>, AppError> {
    Ok(Json(spot_service.get_facility(id).await?))
}

/// List every spot of a facility
#[openapi(tag = "Facilities")]
#[get("/facilities/<id>/spots")]
pub async fn list_spots(
    id: i32,
    spot_service: &State<SpotService>,
) -> Result<Json<Vec<Spot>>, AppError> {
    Ok(Json(spot_service.get_spots_by_facility(id).await?))
}

/// List the currently available spots of a facility
#[openapi(tag = "Facilities")]
#[get("/facilities/<id>/available")]
pub async fn list_available_spots(
    id: i32,
    spot_service: &State<SpotService>,
) -> Result<Json<Vec<Spot>>, AppError> {
    Ok(Json(spot_service.get_available_spots(id).await?))
}
