use async_trait::async_trait;
use smart_parking::{
    models::{
        facility::{Facility, SpotStatus},
        vehicle::VehicleRegistrationRequest,
    },
    services::{spot_service::SpotService, vehicle_service::VehicleService},
    store::ParkingStore,
    utils::error::AppError,
};
use test_context::{test_context, AsyncTestContext};

mod common {
    pub mod test_utils;
}
use common::test_utils::{init_test_logging, TestStore};
use ctor::ctor;

#[ctor]
fn setup_logging() {
    init_test_logging();
}

struct SpotServiceContext {
    db: TestStore,
    spot_service: SpotService,
    vehicle_service: VehicleService,
    garage: Facility,
}

#[async_trait]
impl AsyncTestContext for SpotServiceContext {
    async fn setup() -> Self {
        let db = TestStore::new();
        let (garage, spots) = db
            .add_facility("Central Mall Parking", 4, SpotStatus::Available)
            .await
            .expect("facility");
        db.store
            .set_spot_status(spots[1].id, SpotStatus::Occupied)
            .await
            .expect("spot update");
        db.add_facility("Airport Terminal P3", 2, SpotStatus::Occupied)
            .await
            .expect("facility");

        SpotServiceContext {
            spot_service: SpotService::new(db.store.clone()),
            vehicle_service: VehicleService::new(db.store.clone()),
            db,
            garage,
        }
    }
}

#[test_context(SpotServiceContext)]
#[tokio::test]
async fn test_facility_queries(ctx: &SpotServiceContext) {
    let facilities = ctx.spot_service.get_all_facilities().await.unwrap();
    assert_eq!(facilities.len(), 2);

    let garage = ctx.spot_service.get_facility(ctx.garage.id).await.unwrap();
    assert_eq!(garage.name, "Central Mall Parking");

    assert!(matches!(
        ctx.spot_service.get_facility(404).await,
        Err(AppError::NotFound(_))
    ));

    let spots = ctx.spot_service.get_spots_by_facility(ctx.garage.id).await.unwrap();
    assert_eq!(spots.len(), 4);
    assert!(spots.iter().all(|s| s.facility_id == ctx.garage.id));

    let available = ctx.spot_service.get_available_spots(ctx.garage.id).await.unwrap();
    assert_eq!(available.len(), 3);
    assert!(available.iter().all(|s| s.status == SpotStatus::Available));
}

#[test_context(SpotServiceContext)]
#[tokio::test]
async fn test_admin_override(ctx: &SpotServiceContext) {
    let spots = ctx.spot_service.get_spots_by_facility(ctx.garage.id).await.unwrap();
    let spot_id = spots[0].id;

    let updated = ctx
        .spot_service
        .override_spot_status(1, spot_id, "Maintenance")
        .await
        .unwrap();
    assert_eq!(updated.status, SpotStatus::Maintenance);
    assert_eq!(ctx.db.spot_status(spot_id).await, SpotStatus::Maintenance);

    assert!(matches!(
        ctx.spot_service.override_spot_status(1, spot_id, "closed").await,
        Err(AppError::ValidationError(_))
    ));
    assert!(matches!(
        ctx.spot_service.override_spot_status(1, 9_999, "available").await,
        Err(AppError::NotFound(_))
    ));
}

#[test_context(SpotServiceContext)]
#[tokio::test]
async fn test_vehicle_registration(ctx: &SpotServiceContext) {
    let owner = ctx
        .db
        .add_user("driver", smart_parking::models::user::Role::User)
        .await
        .unwrap();

    let vehicle = ctx
        .vehicle_service
        .register_vehicle(
            owner.id,
            VehicleRegistrationRequest {
                make: " Honda ".to_string(),
                model: "Civic".to_string(),
                license_plate: "abc-123".to_string(),
                color: Some("blue".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(vehicle.user_id, owner.id);
    assert_eq!(vehicle.make, "Honda");
    assert_eq!(vehicle.license_plate, "ABC-123");

    let missing_make = ctx
        .vehicle_service
        .register_vehicle(
            owner.id,
            VehicleRegistrationRequest {
                make: String::new(),
                model: "Civic".to_string(),
                license_plate: "XYZ-1".to_string(),
                color: None,
            },
        )
        .await;
    assert!(matches!(missing_make, Err(AppError::ValidationError(_))));

    let blank_fields = ctx
        .vehicle_service
        .register_vehicle(
            owner.id,
            VehicleRegistrationRequest {
                make: "   ".to_string(),
                model: " ".to_string(),
                license_plate: "  ".to_string(),
                color: None,
            },
        )
        .await;
    match blank_fields {
        Err(AppError::ValidationError(msg)) => {
            assert!(msg.contains("make is required"), "{}", msg);
            assert!(msg.contains("license_plate is required"), "{}", msg);
        }
        other => panic!("blank fields accepted: {:?}", other),
    }

    let vehicles = ctx.vehicle_service.get_vehicles_for_user(owner.id).await.unwrap();
    assert_eq!(vehicles.len(), 1);
}
