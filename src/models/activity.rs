use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Activity {
    pub id: i32,
    pub user_id: Option<i32>,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub related_id: Option<i32>,
    pub metadata: Option<String>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(type_name = "ENUM", rename_all = "snake_case")]
pub enum ActivityKind {
    SpotOccupied,
    SpotAvailable,
    SpotStatusChanged,
    BookingCreated,
    BookingCompleted,
    BookingCancelled,
    PaymentProcessed,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: Option<i32>,
    pub kind: ActivityKind,
    pub description: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub related_id: Option<i32>,
    pub metadata: Option<String>,
}

impl NewActivity {
    pub fn new(kind: ActivityKind, description: impl Into<String>) -> Self {
        NewActivity {
            user_id: None,
            kind,
            description: description.into(),
            timestamp: None,
            related_id: None,
            metadata: None,
        }
    }

    pub fn by_user(mut self, user_id: i32) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn related_to(mut self, related_id: i32) -> Self {
        self.related_id = Some(related_id);
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata.to_string());
        self
    }
}
