use crate::config::AppConfig;
use crate::models::activity::Activity;
use crate::models::booking::Booking;
use crate::models::facility::{Spot, SpotStatusRequest};
use crate::services::activity_log::ActivityLogger;
use crate::services::booking_service::BookingService;
use crate::services::spot_service::SpotService;
use crate::utils::error::AppError;
use crate::utils::jwt::AuthenticatedUser;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// Most recently created bookings across all users
#[openapi(tag = "Admin")]
#[get("/admin/bookings/recent?<limit>")]
pub async fn recent_bookings(
    limit: Option<usize>,
    auth: AuthenticatedUser,
    config: &State<AppConfig>,
    booking_service: &State<BookingService>,
) -> Result<Json<Vec<Booking>>, AppError> {
    auth.require_admin()?;
    let limit = limit.unwrap_or(config.recent_bookings_limit);
    Ok(Json(booking_service.get_recent_bookings(limit).await?))
}

/// Force a spot into a status, e.g. maintenance
#[openapi(tag = "Admin")]
#[put("/admin/spots/<id>/status", format = "json", data = "<request>")]
pub async fn override_spot_status(
    id: i32,
    request: Json<SpotStatusRequest>,
    auth: AuthenticatedUser,
    spot_service: &State<SpotService>,
) -> Result<Json<Spot>, AppError> {
    auth.require_admin()?;
    let spot = spot_service
        .override_spot_status(auth.user_id, id, &request.status)
        .await?;
    Ok(Json(spot))
}

/// Latest entries of the activity feed
#[openapi(tag = "Admin")]
#[get("/admin/activities?<limit>")]
pub async fn recent_activities(
    limit: Option<usize>,
    auth: AuthenticatedUser,
    config: &State<AppConfig>,
    activity_log: &State<ActivityLogger>,
) -> Result<Json<Vec<Activity>>, AppError> {
    auth.require_admin()?;
    let limit = limit.unwrap_or(config.recent_bookings_limit);
    Ok(Json(activity_log.recent(limit).await?))
}
