use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    domain::booking::{Booking, BookingDetails, BookingStatus},
    domain::car::Car,
    domain::review::Review,
    repository::errors::RepositoryError,
    usecase::contracts::{BookingRepository, CarDirectory, ReviewRepository},
};

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

const BOOKING_DETAILS_SELECT: &str = r#"
    SELECT b.id, b.car_id, b.renter_id, b.start_date, b.end_date,
           b.total_price, b.status, b.created_at, b.updated_at, b.deleted_at,
           c.brand AS car_brand, c.model AS car_model, u.name AS renter_name
    FROM bookings b
    JOIN cars c ON c.id = b.car_id
    JOIN users u ON u.id = b.renter_id
"#;

pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Serializes conflict checks per car: concurrent writers for the same
    /// car queue on the advisory lock until the transaction ends.
    async fn lock_car(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        car_id: Uuid,
    ) -> Result<(), RepositoryError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(car_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    async fn conflict_exists(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        car_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<bool, RepositoryError> {
        let candidates = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, car_id, renter_id, start_date, end_date,
                   total_price, status, created_at, updated_at, deleted_at
            FROM bookings
            WHERE car_id = $1 AND deleted_at IS NULL AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(car_id)
        .bind(exclude)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(candidates
            .iter()
            .any(|b| b.conflicts_with(start_date, end_date)))
    }
}

impl BookingRepository for PostgresBookingRepository {
    #[tracing::instrument(skip(self, booking), fields(booking_id = %booking.id, car_id = %booking.car_id))]
    async fn insert(&self, booking: &Booking) -> Result<(), RepositoryError> {
        tracing::debug!("inserting booking");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Self::lock_car(&mut tx, booking.car_id).await?;

        if Self::conflict_exists(
            &mut tx,
            booking.car_id,
            booking.start_date,
            booking.end_date,
            None,
        )
        .await?
        {
            return Err(RepositoryError::Conflict);
        }

        sqlx::query(
            r#"
            INSERT INTO bookings (id, car_id, renter_id, start_date, end_date,
                                  total_price, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(booking.id)
        .bind(booking.car_id)
        .bind(booking.renter_id)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.total_price)
        .bind(booking.status)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tracing::debug!("booking inserted successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(booking_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, RepositoryError> {
        tracing::debug!("finding booking by id");

        sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, car_id, renter_id, start_date, end_date,
                   total_price, status, created_at, updated_at, deleted_at
            FROM bookings
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    #[tracing::instrument(skip(self), fields(booking_id = %id))]
    async fn find_details(&self, id: Uuid) -> Result<Option<BookingDetails>, RepositoryError> {
        tracing::debug!("finding booking details");

        let query = format!("{BOOKING_DETAILS_SELECT} WHERE b.id = $1 AND b.deleted_at IS NULL");
        sqlx::query_as::<_, BookingDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    #[tracing::instrument(skip(self))]
    async fn list_details(&self) -> Result<Vec<BookingDetails>, RepositoryError> {
        tracing::debug!("listing bookings");

        let query = format!("{BOOKING_DETAILS_SELECT} WHERE b.deleted_at IS NULL");
        let bookings = sqlx::query_as::<_, BookingDetails>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tracing::debug!(count = bookings.len(), "bookings listed");
        Ok(bookings)
    }

    #[tracing::instrument(skip(self), fields(renter_id = %renter_id))]
    async fn find_by_renter(
        &self,
        renter_id: Uuid,
    ) -> Result<Vec<BookingDetails>, RepositoryError> {
        tracing::debug!("finding bookings by renter");

        let query = format!(
            "{BOOKING_DETAILS_SELECT} WHERE b.renter_id = $1 AND b.deleted_at IS NULL ORDER BY b.start_date DESC"
        );
        sqlx::query_as::<_, BookingDetails>(&query)
            .bind(renter_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    #[tracing::instrument(skip(self), fields(owner_id = %owner_id))]
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<BookingDetails>, RepositoryError> {
        tracing::debug!("finding bookings by car owner");

        let query = format!(
            "{BOOKING_DETAILS_SELECT} WHERE c.owner_id = $1 AND b.deleted_at IS NULL ORDER BY b.start_date DESC"
        );
        sqlx::query_as::<_, BookingDetails>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    #[tracing::instrument(skip(self), fields(car_id = %car_id, %start_date, %end_date))]
    async fn has_overlap(
        &self,
        car_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<bool, RepositoryError> {
        tracing::debug!("checking for overlapping bookings");

        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE car_id = $1
                  AND status <> $2
                  AND deleted_at IS NULL
                  AND start_date <= $4
                  AND end_date >= $3
                  AND ($5::uuid IS NULL OR id <> $5)
            )
            "#,
        )
        .bind(car_id)
        .bind(BookingStatus::Rejected)
        .bind(start_date)
        .bind(end_date)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    #[tracing::instrument(skip(self, booking), fields(booking_id = %booking.id, car_id = %booking.car_id))]
    async fn reschedule(&self, booking: &Booking) -> Result<(), RepositoryError> {
        tracing::debug!("rescheduling booking");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Self::lock_car(&mut tx, booking.car_id).await?;

        if Self::conflict_exists(
            &mut tx,
            booking.car_id,
            booking.start_date,
            booking.end_date,
            Some(booking.id),
        )
        .await?
        {
            return Err(RepositoryError::Conflict);
        }

        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET car_id = $2, start_date = $3, end_date = $4, total_price = $5, updated_at = $6
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(booking.id)
        .bind(booking.car_id)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.total_price)
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tracing::debug!("booking rescheduled successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self, booking), fields(booking_id = %booking.id, status = %booking.status))]
    async fn set_status(&self, booking: &Booking) -> Result<(), RepositoryError> {
        tracing::debug!("updating booking status");

        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $2, updated_at = $3
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(booking.id)
        .bind(booking.status)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::debug!("booking status updated successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self, booking), fields(booking_id = %booking.id))]
    async fn soft_delete(&self, booking: &Booking) -> Result<(), RepositoryError> {
        tracing::debug!("soft-deleting booking");

        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $2, deleted_at = $3, updated_at = $4
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(booking.id)
        .bind(booking.status)
        .bind(booking.deleted_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::debug!("booking soft-deleted successfully");
        Ok(())
    }
}

pub struct PostgresCarDirectory {
    pool: PgPool,
}

impl PostgresCarDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CarDirectory for PostgresCarDirectory {
    #[tracing::instrument(skip(self), fields(car_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Car>, RepositoryError> {
        tracing::debug!("finding car by id");

        sqlx::query_as::<_, Car>(
            r#"
            SELECT id, owner_id, brand, model, price_per_day, is_active
            FROM cars
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    #[tracing::instrument(skip(self), fields(car_id = %car_id, user_id = %user_id))]
    async fn is_owned_by(&self, car_id: Uuid, user_id: Uuid) -> Result<bool, RepositoryError> {
        tracing::debug!("checking car ownership");

        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM cars
                WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            )
            "#,
        )
        .bind(car_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }
}

pub struct PostgresReviewRepository {
    pool: PgPool,
}

impl PostgresReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ReviewRepository for PostgresReviewRepository {
    #[tracing::instrument(skip(self, review), fields(review_id = %review.id, booking_id = %review.booking_id))]
    async fn create(&self, review: &Review) -> Result<(), RepositoryError> {
        tracing::debug!("creating review");

        sqlx::query(
            r#"
            INSERT INTO reviews (id, booking_id, author_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(review.id)
        .bind(review.booking_id)
        .bind(review.author_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            // The UNIQUE (booking_id) constraint backs the one-review rule.
            sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict,
            other => RepositoryError::DatabaseError(other.to_string()),
        })?;

        tracing::debug!("review created successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(booking_id = %booking_id))]
    async fn find_by_booking_id(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<Review>, RepositoryError> {
        tracing::debug!("finding review by booking id");

        sqlx::query_as::<_, Review>(
            r#"
            SELECT id, booking_id, author_id, rating, comment, created_at
            FROM reviews
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }
}
