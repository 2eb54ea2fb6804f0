#[macro_use]
extern crate rocket;

pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use crate::config::AppConfig;
use crate::db::{Database, MySqlStore};
use crate::services::activity_log::ActivityLogger;
use crate::services::booking_service::BookingService;
use crate::services::spot_service::SpotService;
use crate::services::user_service::UserService;
use crate::services::vehicle_service::VehicleService;
use crate::store::{MemoryStore, SharedStore};
use crate::utils::error::AppResult;
use rocket::fairing::AdHoc;
use rocket::{Build, Rocket};
use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::{make_swagger_ui, SwaggerUIConfig};
use std::sync::Arc;

/// Opens the configured store: MySQL when a database is configured,
/// otherwise an in-memory store (seeded on request).
pub async fn open_store(config: &AppConfig) -> AppResult<SharedStore> {
    match &config.database {
        Some(db_config) => {
            let database = Database::new(db_config).await?;
            database.init_schema().await?;
            tracing::info!("connected to MySQL store");
            Ok(Arc::new(MySqlStore::from(database)))
        }
        None if config.seed_sample_data => Ok(Arc::new(MemoryStore::with_sample_data())),
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Opens the store, creates the bootstrap administrator and assembles the server.
pub async fn bootstrap(config: AppConfig) -> AppResult<Rocket<Build>> {
    let store = open_store(&config).await?;

    if let Some(admin) = &config.admin {
        UserService::new(store.clone(), config.clone())
            .ensure_admin(&admin.username, &admin.password)
            .await?;
    }

    Ok(build_rocket(config, store))
}

pub fn build_rocket(config: AppConfig, store: SharedStore) -> Rocket<Build> {
    let user_service = UserService::new(store.clone(), config.clone());
    let vehicle_service = VehicleService::new(store.clone());
    let spot_service = SpotService::new(store.clone());
    let booking_service = BookingService::new(store.clone());
    let activity_log = ActivityLogger::new(store);

    rocket::build()
        .manage(config)
        .manage(user_service)
        .manage(vehicle_service)
        .manage(spot_service)
        .manage(booking_service)
        .manage(activity_log)
        .mount(
            "/api",
            openapi_get_routes![
                routes::user_route::register,
                routes::user_route::login,
                routes::user_route::me,
                routes::vehicle_route::list_vehicles,
                routes::vehicle_route::register_vehicle,
                routes::facility_route::list_facilities,
                routes::facility_route::get_facility,
                routes::facility_route::list_spots,
                routes::facility_route::list_available_spots,
                routes::booking_route::create_booking,
                routes::booking_route::list_bookings,
                routes::booking_route::list_active_bookings,
                routes::booking_route::update_booking_status,
                routes::admin_route::recent_bookings,
                routes::admin_route::override_spot_status,
                routes::admin_route::recent_activities,
            ],
        )
        .mount(
            "/swagger",
            make_swagger_ui(&SwaggerUIConfig {
                url: "/api/openapi.json".to_string(),
                ..Default::default()
            }),
        )
        .attach(AdHoc::on_response("CORS", |_, res| {
            Box::pin(async move {
                res.set_header(rocket::http::Header::new(
                    "Access-Control-Allow-Origin",
                    "*",
                ));
            })
        }))
}
