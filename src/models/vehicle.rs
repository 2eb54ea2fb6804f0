use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A vehicle is owned by exactly one user and is never reassigned.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Vehicle {
    pub id: i32,
    pub user_id: i32,
    pub make: String,
    pub model: String,
    pub license_plate: String,
    pub color: Option<String>,
}

impl Vehicle {
    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.user_id == user_id
    }
}

#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub user_id: i32,
    pub make: String,
    pub model: String,
    pub license_plate: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct VehicleRegistrationRequest {
    #[validate(custom(function = "not_blank", message = "make is required"))]
    pub make: String,
    #[validate(custom(function = "not_blank", message = "model is required"))]
    pub model: String,
    #[validate(
        custom(function = "not_blank", message = "license_plate is required"),
        length(max = 16, message = "license_plate must be at most 16 characters")
    )]
    pub license_plate: String,
    pub color: Option<String>,
}

// fields are stored trimmed, so whitespace alone counts as missing
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

impl VehicleRegistrationRequest {
    pub fn into_new_vehicle(self, user_id: i32) -> NewVehicle {
        NewVehicle {
            user_id,
            make: self.make.trim().to_string(),
            model: self.model.trim().to_string(),
            license_plate: self.license_plate.trim().to_uppercase(),
            color: self.color,
        }
    }
}
