pub mod admin_route;
pub mod booking_route;
pub mod facility_route;
pub mod user_route;
pub mod vehicle_route;
