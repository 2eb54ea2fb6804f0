pub mod activity_log;
pub mod booking_service;
pub mod spot_service;
pub mod user_service;
pub mod vehicle_service;
