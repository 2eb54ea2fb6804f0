use crate::models::booking::{Booking, CreateBookingRequest, UpdateBookingStatusRequest};
use crate::services::booking_service::BookingService;
use crate::utils::error::AppError;
use crate::utils::jwt::AuthenticatedUser;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// Book a parking spot for one of the caller's vehicles
#[openapi(tag = "Bookings")]
#[post("/bookings", format = "json", data = "<request>")]
pub async fn create_booking(
    request: Json<CreateBookingRequest>,
    auth: AuthenticatedUser,
    booking_service: &State<BookingService>,
) -> Result<Json<Booking>, AppError> {
    let booking = booking_service
        .create_booking(auth.user_id, request.into_inner())
        .await?;
    Ok(Json(booking))
}

/// All bookings of the caller, newest first
#[openapi(tag = "Bookings")]
#[get("/bookings")]
pub async fn list_bookings(
    auth: AuthenticatedUser,
    booking_service: &State<BookingService>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(booking_service.get_bookings_for_user(auth.user_id).await?))
}

/// Active bookings of the caller, earliest start first
#[openapi(tag = "Bookings")]
#[get("/bookings/active")]
pub async fn list_active_bookings(
    auth: AuthenticatedUser,
    booking_service: &State<BookingService>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(
        booking_service
            .get_active_bookings_for_user(auth.user_id)
            .await?,
    ))
}

/// Complete or cancel a booking
#[openapi(tag = "Bookings")]
#[put("/bookings/<id>/status", format = "json", data = "<request>")]
pub async fn update_booking_status(
    id: i32,
    request: Json<UpdateBookingStatusRequest>,
    auth: AuthenticatedUser,
    booking_service: &State<BookingService>,
) -> Result<Json<Booking>, AppError> {
    let booking = booking_service
        .update_booking_status(id, &request.status, auth.user_id, auth.is_admin)
        .await?;
    Ok(Json(booking))
}
