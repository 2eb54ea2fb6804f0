use crate::config::DatabaseConfig;
use crate::models::activity::{Activity, NewActivity};
use crate::models::booking::{Booking, BookingStatus, NewBooking};
use crate::models::facility::{Facility, NewFacility, NewSpot, Spot, SpotStatus};
use crate::models::user::{NewUser, User};
use crate::models::vehicle::{NewVehicle, Vehicle};
use crate::store::ParkingStore;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;

const BOOKING_COLUMNS: &str = "id, user_id, vehicle_id, spot_id, start_time, end_time, status, amount, created_at";
const SPOT_COLUMNS: &str = "id, facility_id, spot_number, status, sensor_id";
const USER_COLUMNS: &str = "id, username, password, email, first_name, last_name, role";

const SCHEMA: [&str; 6] = [
    "CREATE TABLE IF NOT EXISTS user (
        id INT AUTO_INCREMENT PRIMARY KEY,
        username CHAR(64) NOT NULL,
        password CHAR(255) NOT NULL,
        email CHAR(255) NULL,
        first_name CHAR(255) NULL,
        last_name CHAR(255) NULL,
        role ENUM('admin', 'user') DEFAULT 'user' NOT NULL,
        CONSTRAINT user_username_uindex UNIQUE (username)
    )",
    "CREATE TABLE IF NOT EXISTS vehicle (
        id INT AUTO_INCREMENT PRIMARY KEY,
        user_id INT NOT NULL,
        make CHAR(255) NOT NULL,
        model CHAR(255) NOT NULL,
        license_plate CHAR(16) NOT NULL,
        color CHAR(64) NULL,
        CONSTRAINT vehicle_user_id_fk
            FOREIGN KEY (user_id) REFERENCES user(id)
            ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS facility (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name CHAR(255) NOT NULL,
        address CHAR(255) NOT NULL,
        total_spots INT NOT NULL,
        hourly_rate BIGINT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS spot (
        id INT AUTO_INCREMENT PRIMARY KEY,
        facility_id INT NOT NULL,
        spot_number CHAR(16) NOT NULL,
        status ENUM('available', 'occupied', 'reserved', 'maintenance') DEFAULT 'available' NOT NULL,
        sensor_id CHAR(64) NULL,
        CONSTRAINT spot_facility_id_fk
            FOREIGN KEY (facility_id) REFERENCES facility(id)
            ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS booking (
        id INT AUTO_INCREMENT PRIMARY KEY,
        user_id INT NOT NULL,
        vehicle_id INT NOT NULL,
        spot_id INT NOT NULL,
        start_time TIMESTAMP(6) NOT NULL,
        end_time TIMESTAMP(6) NULL,
        status ENUM('active', 'completed', 'cancelled') DEFAULT 'active' NOT NULL,
        amount BIGINT NULL,
        created_at TIMESTAMP(6) NOT NULL,
        INDEX booking_user_status_index (user_id, status),
        INDEX booking_created_index (created_at),
        CONSTRAINT booking_vehicle_id_fk FOREIGN KEY (vehicle_id) REFERENCES vehicle(id),
        CONSTRAINT booking_spot_id_fk FOREIGN KEY (spot_id) REFERENCES spot(id)
    )",
    "CREATE TABLE IF NOT EXISTS activity (
        id INT AUTO_INCREMENT PRIMARY KEY,
        user_id INT NULL,
        kind ENUM('spot_occupied', 'spot_available', 'spot_status_changed', 'booking_created',
            'booking_completed', 'booking_cancelled', 'payment_processed') NOT NULL,
        description VARCHAR(1024) NOT NULL,
        timestamp TIMESTAMP(6) NOT NULL,
        related_id INT NULL,
        metadata TEXT NULL
    )",
];

// Database connection manager
pub struct Database {
    pub pool: MySqlPool,
}

impl Database {
    // Create a new database connection pool
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;

        Ok(Database { pool })
    }

    // Create the tables if they do not exist yet
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        for create_sql in SCHEMA {
            sqlx::query(create_sql).execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// MySQL-backed store. Conditional updates guarded by row counts keep the
/// spot hold correct across server processes sharing one database.
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlStore { pool }
    }
}

impl From<Database> for MySqlStore {
    fn from(db: Database) -> Self {
        MySqlStore::new(db.pool)
    }
}

#[async_trait]
impl ParkingStore for MySqlStore {
    async fn get_user(&self, id: i32) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM user WHERE id = ?", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM user WHERE username = ?", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let result = sqlx::query(
            r#"INSERT INTO user (username, password, email, first_name, last_name, role)
            VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            // user_username_uindex
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Username already exists".into())
            }
            other => AppError::from(other),
        })?;

        Ok(User {
            id: result.last_insert_id() as i32,
            username: user.username,
            password: user.password,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
        })
    }

    async fn get_vehicle(&self, id: i32) -> AppResult<Option<Vehicle>> {
        Ok(sqlx::query_as::<_, Vehicle>(
            "SELECT id, user_id, make, model, license_plate, color FROM vehicle WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn get_vehicles_by_user(&self, user_id: i32) -> AppResult<Vec<Vehicle>> {
        Ok(sqlx::query_as::<_, Vehicle>(
            "SELECT id, user_id, make, model, license_plate, color FROM vehicle WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        let result = sqlx::query(
            "INSERT INTO vehicle (user_id, make, model, license_plate, color) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(vehicle.user_id)
        .bind(&vehicle.make)
        .bind(&vehicle.model)
        .bind(&vehicle.license_plate)
        .bind(&vehicle.color)
        .execute(&self.pool)
        .await?;

        Ok(Vehicle {
            id: result.last_insert_id() as i32,
            user_id: vehicle.user_id,
            make: vehicle.make,
            model: vehicle.model,
            license_plate: vehicle.license_plate,
            color: vehicle.color,
        })
    }

    async fn get_facility(&self, id: i32) -> AppResult<Option<Facility>> {
        Ok(sqlx::query_as::<_, Facility>(
            "SELECT id, name, address, total_spots, hourly_rate FROM facility WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn get_all_facilities(&self) -> AppResult<Vec<Facility>> {
        Ok(sqlx::query_as::<_, Facility>(
            "SELECT id, name, address, total_spots, hourly_rate FROM facility ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_facility(&self, facility: NewFacility) -> AppResult<Facility> {
        let result = sqlx::query(
            "INSERT INTO facility (name, address, total_spots, hourly_rate) VALUES (?, ?, ?, ?)",
        )
        .bind(&facility.name)
        .bind(&facility.address)
        .bind(facility.total_spots)
        .bind(facility.hourly_rate)
        .execute(&self.pool)
        .await?;

        Ok(Facility {
            id: result.last_insert_id() as i32,
            name: facility.name,
            address: facility.address,
            total_spots: facility.total_spots,
            hourly_rate: facility.hourly_rate,
        })
    }

    async fn get_spot(&self, id: i32) -> AppResult<Option<Spot>> {
        let sql = format!("SELECT {} FROM spot WHERE id = ?", SPOT_COLUMNS);
        Ok(sqlx::query_as::<_, Spot>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_spots_by_facility(&self, facility_id: i32) -> AppResult<Vec<Spot>> {
        let sql = format!(
            "SELECT {} FROM spot WHERE facility_id = ? ORDER BY id",
            SPOT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Spot>(&sql)
            .bind(facility_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_spot(&self, spot: NewSpot) -> AppResult<Spot> {
        let result = sqlx::query(
            "INSERT INTO spot (facility_id, spot_number, status, sensor_id) VALUES (?, ?, ?, ?)",
        )
        .bind(spot.facility_id)
        .bind(&spot.spot_number)
        .bind(spot.status.to_string())
        .bind(&spot.sensor_id)
        .execute(&self.pool)
        .await?;

        Ok(Spot {
            id: result.last_insert_id() as i32,
            facility_id: spot.facility_id,
            spot_number: spot.spot_number,
            status: spot.status,
            sensor_id: spot.sensor_id,
        })
    }

    async fn set_spot_status(&self, id: i32, status: SpotStatus) -> AppResult<Option<Spot>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE spot SET status = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let sql = format!("SELECT {} FROM spot WHERE id = ?", SPOT_COLUMNS);
        let spot = sqlx::query_as::<_, Spot>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(spot)
    }

    async fn get_booking(&self, id: i32) -> AppResult<Option<Booking>> {
        let sql = format!("SELECT {} FROM booking WHERE id = ?", BOOKING_COLUMNS);
        Ok(sqlx::query_as::<_, Booking>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_bookings_by_user(&self, user_id: i32) -> AppResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {} FROM booking WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            BOOKING_COLUMNS
        );
        Ok(sqlx::query_as::<_, Booking>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_active_bookings_by_user(&self, user_id: i32) -> AppResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {} FROM booking WHERE user_id = ? AND status = 'active' ORDER BY start_time ASC, id ASC",
            BOOKING_COLUMNS
        );
        Ok(sqlx::query_as::<_, Booking>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_recent_bookings(&self, limit: usize) -> AppResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {} FROM booking ORDER BY created_at DESC, id DESC LIMIT ?",
            BOOKING_COLUMNS
        );
        Ok(sqlx::query_as::<_, Booking>(&sql)
            .bind(limit as u64)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert_booking_holding_spot(
        &self,
        booking: NewBooking,
        hold: SpotStatus,
    ) -> AppResult<Option<Booking>> {
        let mut tx = self.pool.begin().await?;

        // the status guard makes the hold a compare-and-set
        let update_result = sqlx::query(
            r#"
            UPDATE spot
            SET status = ?
            WHERE id = ?
            AND status = 'available'
            "#,
        )
        .bind(hold.to_string())
        .bind(booking.spot_id)
        .execute(&mut *tx)
        .await?;

        if update_result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO booking (user_id, vehicle_id, spot_id, start_time, end_time, status, amount, created_at)
            VALUES (?, ?, ?, ?, ?, 'active', ?, ?)
            "#,
        )
        .bind(booking.user_id)
        .bind(booking.vehicle_id)
        .bind(booking.spot_id)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.amount)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        let booking_id = result.last_insert_id() as i32;
        tx.commit().await?;

        Ok(Some(Booking {
            id: booking_id,
            user_id: booking.user_id,
            vehicle_id: booking.vehicle_id,
            spot_id: booking.spot_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
            status: BookingStatus::Active,
            amount: booking.amount,
            created_at,
        }))
    }

    async fn finish_booking(
        &self,
        booking_id: i32,
        status: BookingStatus,
        release_spot: bool,
    ) -> AppResult<Option<Booking>> {
        let mut tx = self.pool.begin().await?;

        let update_result = sqlx::query(
            "UPDATE booking SET status = ? WHERE id = ? AND status = 'active'",
        )
        .bind(status.to_string())
        .bind(booking_id)
        .execute(&mut *tx)
        .await?;

        if update_result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let sql = format!("SELECT {} FROM booking WHERE id = ?", BOOKING_COLUMNS);
        let booking = sqlx::query_as::<_, Booking>(&sql)
            .bind(booking_id)
            .fetch_one(&mut *tx)
            .await?;

        if release_spot {
            sqlx::query(
                r#"
                UPDATE spot
                SET status = 'available'
                WHERE id = ?
                AND status IN ('reserved', 'occupied')
                AND NOT EXISTS (
                    SELECT 1 FROM booking WHERE spot_id = ? AND status = 'active'
                )
                "#,
            )
            .bind(booking.spot_id)
            .bind(booking.spot_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(booking))
    }

    async fn append_activity(&self, activity: NewActivity) -> AppResult<Activity> {
        let timestamp = activity.timestamp.unwrap_or_else(Utc::now);
        let result = sqlx::query(
            r#"
            INSERT INTO activity (user_id, kind, description, timestamp, related_id, metadata)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(activity.user_id)
        .bind(activity.kind.to_string())
        .bind(&activity.description)
        .bind(timestamp)
        .bind(activity.related_id)
        .bind(&activity.metadata)
        .execute(&self.pool)
        .await?;

        Ok(Activity {
            id: result.last_insert_id() as i32,
            user_id: activity.user_id,
            kind: activity.kind,
            description: activity.description,
            timestamp,
            related_id: activity.related_id,
            metadata: activity.metadata,
        })
    }

    async fn get_recent_activities(&self, limit: usize) -> AppResult<Vec<Activity>> {
        Ok(sqlx::query_as::<_, Activity>(
            r#"
            SELECT id, user_id, kind, description, timestamp, related_id, metadata
            FROM activity
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit as u64)
        .fetch_all(&self.pool)
        .await?)
    }
}
