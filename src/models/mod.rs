pub mod activity;
pub mod booking;
pub mod facility;
pub mod user;
pub mod vehicle;
