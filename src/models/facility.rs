use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Facility {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub total_spots: i32,
    // minor currency units, 250 == 2.50 per hour
    pub hourly_rate: i64,
}

#[derive(Debug, Clone)]
pub struct NewFacility {
    pub name: String,
    pub address: String,
    pub total_spots: i32,
    pub hourly_rate: i64,
}

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Spot {
    pub id: i32,
    pub facility_id: i32,
    pub spot_number: String,
    pub status: SpotStatus,
    pub sensor_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSpot {
    pub facility_id: i32,
    pub spot_number: String,
    pub status: SpotStatus,
    pub sensor_id: Option<String>,
}

// Spot Status Enum
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Display, EnumString, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(type_name = "ENUM", rename_all = "lowercase")]
pub enum SpotStatus {
    Available,
    Occupied,
    Reserved,
    Maintenance,
}

impl SpotStatus {
    /// Statuses a spot only reaches through a booking and leaves when that booking ends.
    pub fn is_held(self) -> bool {
        matches!(self, SpotStatus::Reserved | SpotStatus::Occupied)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SpotStatusRequest {
    pub status: String,
}
