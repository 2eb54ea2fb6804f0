use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Booking {
    pub id: i32,
    pub user_id: i32,
    pub vehicle_id: i32,
    pub spot_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: BookingStatus,
    pub amount: Option<i64>,
    pub created_at: DateTime<Utc>,
}

// Booking Status Enum
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(type_name = "ENUM", rename_all = "lowercase")]
pub enum BookingStatus {
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

// Validated insert shape handed to the store
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: i32,
    pub vehicle_id: i32,
    pub spot_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub amount: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[validate(schema(function = "validate_booking_window"))]
pub struct CreateBookingRequest {
    #[validate(range(min = 1, message = "vehicle_id must be a positive identifier"))]
    pub vehicle_id: i32,
    #[validate(range(min = 1, message = "spot_id must be a positive identifier"))]
    pub spot_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    #[validate(range(min = 0, message = "amount cannot be negative"))]
    pub amount: Option<i64>,
}

fn validate_booking_window(request: &CreateBookingRequest) -> Result<(), ValidationError> {
    match request.end_time {
        Some(end) if end <= request.start_time => {
            let mut err = ValidationError::new("booking_window");
            err.message = Some("end_time must be after start_time".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

impl CreateBookingRequest {
    pub fn into_new_booking(self, user_id: i32) -> NewBooking {
        NewBooking {
            user_id,
            vehicle_id: self.vehicle_id,
            spot_id: self.spot_id,
            start_time: self.start_time,
            end_time: self.end_time,
            amount: self.amount,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateBookingStatusRequest {
    pub status: String,
}
