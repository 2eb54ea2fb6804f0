use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use smart_parking::{
    models::{
        booking::{BookingStatus, CreateBookingRequest},
        facility::SpotStatus,
        user::Role,
    },
    services::booking_service::BookingService,
    store::ParkingStore,
    utils::error::AppError,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use test_context::{test_context, AsyncTestContext};
use tokio::task::JoinSet;

mod common {
    pub mod test_utils;
}
use common::test_utils::{init_test_logging, window, TestStore};
use ctor::ctor;

#[ctor]
fn setup_logging() {
    init_test_logging();
}

struct ThroughputContext {
    db: TestStore,
    booking_service: BookingService,
    // (user_id, vehicle_id)
    drivers: Vec<(i32, i32)>,
    spot_ids: Vec<i32>,
}

#[derive(Debug, Clone, Copy)]
enum MixedRequest {
    Booking { driver: usize, spot_id: i32 },
    Finish { driver: usize, status: BookingStatus },
}

#[async_trait]
impl AsyncTestContext for ThroughputContext {
    async fn setup() -> Self {
        let db = TestStore::new();

        let mut spot_ids = Vec::new();
        for name in ["Downtown Garage", "Central Mall Parking", "Airport Terminal P3"] {
            let (_, spots) = db
                .add_facility(name, 20, SpotStatus::Available)
                .await
                .expect("facility");
            spot_ids.extend(spots.iter().map(|s| s.id));
        }

        let mut drivers = Vec::new();
        for i in 0..100 {
            let user = db
                .add_user(&format!("perf_test_user_{}", i), Role::User)
                .await
                .expect("user");
            let vehicle = db
                .add_vehicle(user.id, &format!("PERF-{}", i))
                .await
                .expect("vehicle");
            drivers.push((user.id, vehicle.id));
        }

        ThroughputContext {
            booking_service: BookingService::new(db.store.clone()),
            db,
            drivers,
            spot_ids,
        }
    }
}

struct PerformanceMetrics {
    total_requests: u32,
    successful_requests: u32,
    conflicts: u32,
    min_latency: Duration,
    max_latency: Duration,
    total_latency: Duration,
}

impl PerformanceMetrics {
    fn new() -> Self {
        PerformanceMetrics {
            total_requests: 0,
            successful_requests: 0,
            conflicts: 0,
            min_latency: Duration::MAX,
            max_latency: Duration::ZERO,
            total_latency: Duration::ZERO,
        }
    }

    fn record(&mut self, latency: Duration, outcome: &Result<(), AppError>) {
        self.total_requests += 1;
        match outcome {
            Ok(()) => self.successful_requests += 1,
            Err(AppError::Conflict(_)) => self.conflicts += 1,
            Err(_) => {}
        }
        self.min_latency = self.min_latency.min(latency);
        self.max_latency = self.max_latency.max(latency);
        self.total_latency += latency;
    }

    fn print_summary(&self, test_name: &str, total_duration: Duration) {
        let avg = self.total_latency / self.total_requests.max(1);
        tracing::info!(
            test = test_name,
            total = self.total_requests,
            ok = self.successful_requests,
            conflicts = self.conflicts,
            min = ?self.min_latency,
            max = ?self.max_latency,
            avg = ?avg,
            throughput = self.total_requests as f64 / total_duration.as_secs_f64(),
            "performance summary"
        );
    }
}

async fn run_request(
    booking_service: &BookingService,
    drivers: &[(i32, i32)],
    request: MixedRequest,
) -> Result<(), AppError> {
    match request {
        MixedRequest::Booking { driver, spot_id } => {
            let (user_id, vehicle_id) = drivers[driver];
            let (start_time, end_time) = window(1, 1);
            booking_service
                .create_booking(
                    user_id,
                    CreateBookingRequest {
                        vehicle_id,
                        spot_id,
                        start_time,
                        end_time,
                        amount: Some(250),
                    },
                )
                .await
                .map(|_| ())
        }
        MixedRequest::Finish { driver, status } => {
            let (user_id, _) = drivers[driver];
            let active = booking_service.get_active_bookings_for_user(user_id).await?;
            match active.first() {
                Some(booking) => booking_service
                    .update_booking_status(booking.id, &status.to_string(), user_id, false)
                    .await
                    .map(|_| ()),
                None => Ok(()),
            }
        }
    }
}

#[test_context(ThroughputContext)]
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_mixed_workload_keeps_spots_consistent(ctx: &ThroughputContext) {
    let test_name = "test_mixed_workload_keeps_spots_consistent";
    let num_requests = 3000;

    let mut rng = rand::thread_rng();
    let mut requests = Vec::with_capacity(num_requests);
    for _ in 0..num_requests {
        let driver = rng.gen_range(0..ctx.drivers.len());
        if rng.gen_bool(0.6) {
            let spot_id = *ctx.spot_ids.choose(&mut rng).expect("spots");
            requests.push(MixedRequest::Booking { driver, spot_id });
        } else {
            let status = if rng.gen_bool(0.5) {
                BookingStatus::Completed
            } else {
                BookingStatus::Cancelled
            };
            requests.push(MixedRequest::Finish { driver, status });
        }
    }
    requests.shuffle(&mut rng);

    let metrics = Arc::new(Mutex::new(PerformanceMetrics::new()));
    let drivers = Arc::new(ctx.drivers.clone());
    let start_time = Instant::now();

    let mut join_set = JoinSet::new();
    for request in requests {
        let booking_service = ctx.booking_service.clone();
        let drivers = drivers.clone();
        let metrics = metrics.clone();
        join_set.spawn(async move {
            let started = Instant::now();
            let outcome = run_request(&booking_service, &drivers, request).await;
            metrics.lock().unwrap().record(started.elapsed(), &outcome);
            outcome
        });
    }

    while let Some(result) = join_set.join_next().await {
        match result.expect("task panicked") {
            Ok(()) | Err(AppError::Conflict(_)) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    let total_duration = start_time.elapsed();
    {
        let metrics = metrics.lock().unwrap();
        metrics.print_summary(test_name, total_duration);
        assert_eq!(metrics.total_requests as usize, num_requests);
    }

    // no spot may carry two active bookings, and holds match bookings
    let all = ctx
        .booking_service
        .get_recent_bookings(usize::MAX)
        .await
        .unwrap();
    assert!(!all.is_empty());
    let mut active_per_spot: HashMap<i32, usize> = HashMap::new();
    for booking in all.iter().filter(|b| b.status == BookingStatus::Active) {
        *active_per_spot.entry(booking.spot_id).or_default() += 1;
    }

    for spot_id in &ctx.spot_ids {
        let active = active_per_spot.get(spot_id).copied().unwrap_or(0);
        assert!(active <= 1, "spot {} has {} active bookings", spot_id, active);

        let spot = ctx.db.store.get_spot(*spot_id).await.unwrap().unwrap();
        let expected = if active == 1 {
            SpotStatus::Reserved
        } else {
            SpotStatus::Available
        };
        assert_eq!(spot.status, expected, "spot {}", spot_id);
    }
}
