use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::booking::{Booking, BookingDetails, BookingStatus};
use crate::domain::user::{AuthContext, UserRole};
use crate::usecase::contracts::{BookingRepository, CarDirectory};
use crate::usecase::error::UsecaseError;

/// The only component that mutates bookings. Enforces role and ownership
/// rules and delegates availability to the repository, which re-checks
/// under a per-car lock on every write.
pub struct BookingsUseCase<B, C>
where
    B: BookingRepository,
    C: CarDirectory,
{
    booking_repository: B,
    car_directory: C,
}

impl<B, C> BookingsUseCase<B, C>
where
    B: BookingRepository,
    C: CarDirectory,
{
    pub fn new(booking_repository: B, car_directory: C) -> Self {
        Self {
            booking_repository,
            car_directory,
        }
    }

    #[tracing::instrument(skip(self), fields(user_id = %ctx.user_id, car_id = %car_id, %start_date, %end_date))]
    pub async fn create_booking(
        &self,
        ctx: AuthContext,
        car_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<BookingDetails, UsecaseError> {
        tracing::debug!("creating booking");

        if ctx.role != UserRole::User {
            tracing::warn!(role = %ctx.role, "non-renter booking attempt");
            return Err(UsecaseError::Forbidden(
                "Only users can make bookings".to_string(),
            ));
        }

        validate_range(start_date, end_date)?;

        let car = self
            .car_directory
            .find_by_id(car_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Car".to_string()))?;

        if !car.is_active {
            return Err(UsecaseError::Unavailable(
                "Car is not available.".to_string(),
            ));
        }

        if self
            .booking_repository
            .has_overlap(car_id, start_date, end_date, None)
            .await?
        {
            return Err(UsecaseError::Conflict(
                "This car is already booked in the selected period.".to_string(),
            ));
        }

        let booking = Booking::new(car_id, ctx.user_id, start_date, end_date, car.price_per_day);
        // The insert re-checks the range under a per-car lock, so a
        // concurrent creation that slipped past the check above still
        // surfaces as Conflict.
        self.booking_repository.insert(&booking).await?;

        let details = self
            .booking_repository
            .find_details(booking.id)
            .await?
            .ok_or_else(|| {
                UsecaseError::Internal("booking missing after insert".to_string())
            })?;

        tracing::info!(booking_id = %booking.id, total_price = booking.total_price, "booking created successfully");
        Ok(details)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<BookingDetails>, UsecaseError> {
        tracing::debug!("listing bookings");

        let bookings = self.booking_repository.list_details().await?;

        tracing::debug!(count = bookings.len(), "bookings listed");
        Ok(bookings)
    }

    #[tracing::instrument(skip(self), fields(booking_id = %booking_id))]
    pub async fn get_booking(&self, booking_id: Uuid) -> Result<BookingDetails, UsecaseError> {
        tracing::debug!("getting booking");

        self.booking_repository
            .find_details(booking_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Booking".to_string()))
    }

    #[tracing::instrument(skip(self), fields(user_id = %ctx.user_id, booking_id = %booking_id))]
    pub async fn update_booking(
        &self,
        ctx: AuthContext,
        booking_id: Uuid,
        car_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<BookingDetails, UsecaseError> {
        tracing::debug!("updating booking");

        let mut booking = self
            .booking_repository
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Booking".to_string()))?;

        if booking.renter_id != ctx.user_id || booking.status != BookingStatus::Pending {
            tracing::warn!("unauthorized booking update attempt");
            return Err(UsecaseError::Forbidden(
                "You are not allowed to modify this booking.".to_string(),
            ));
        }

        validate_range(start_date, end_date)?;

        let car = self
            .car_directory
            .find_by_id(car_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Car".to_string()))?;

        if !car.is_active {
            return Err(UsecaseError::Unavailable(
                "Car is not available.".to_string(),
            ));
        }

        if self
            .booking_repository
            .has_overlap(car_id, start_date, end_date, Some(booking_id))
            .await?
        {
            return Err(UsecaseError::Conflict(
                "This car is already booked in the selected period.".to_string(),
            ));
        }

        booking.reschedule(car_id, start_date, end_date, car.price_per_day);
        self.booking_repository.reschedule(&booking).await?;

        let details = self
            .booking_repository
            .find_details(booking_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Booking".to_string()))?;

        tracing::info!(total_price = booking.total_price, "booking updated successfully");
        Ok(details)
    }

    #[tracing::instrument(skip(self), fields(user_id = %ctx.user_id, booking_id = %booking_id))]
    pub async fn cancel_booking(
        &self,
        ctx: AuthContext,
        booking_id: Uuid,
    ) -> Result<BookingDetails, UsecaseError> {
        tracing::debug!("cancelling booking");

        let mut details = self
            .booking_repository
            .find_details(booking_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Booking".to_string()))?;

        if details.booking.renter_id != ctx.user_id && !ctx.is_admin() {
            tracing::warn!("unauthorized booking cancel attempt");
            return Err(UsecaseError::Forbidden(
                "You are not allowed to cancel this booking.".to_string(),
            ));
        }

        details.booking.cancel();
        self.booking_repository.soft_delete(&details.booking).await?;

        tracing::info!("booking cancelled successfully");
        Ok(details)
    }

    #[tracing::instrument(skip(self), fields(user_id = %ctx.user_id, booking_id = %booking_id, requested = %requested))]
    pub async fn accept_or_reject(
        &self,
        ctx: AuthContext,
        booking_id: Uuid,
        requested: BookingStatus,
    ) -> Result<BookingDetails, UsecaseError> {
        tracing::debug!("deciding booking");

        if requested != BookingStatus::Accepted && requested != BookingStatus::Rejected {
            return Err(UsecaseError::Validation(
                "Invalid booking status".to_string(),
            ));
        }

        let mut booking = self
            .booking_repository
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Booking".to_string()))?;

        let owns_car = self
            .car_directory
            .is_owned_by(booking.car_id, ctx.user_id)
            .await?;
        if !owns_car && !ctx.is_admin() {
            tracing::warn!("non-owner decision attempt");
            return Err(UsecaseError::Forbidden(
                "Only the car owner can accept or reject this booking.".to_string(),
            ));
        }

        if booking.status != BookingStatus::Pending {
            return Err(UsecaseError::InvalidState(
                "Only pending bookings can be updated".to_string(),
            ));
        }

        match requested {
            BookingStatus::Accepted => booking.accept(),
            BookingStatus::Rejected => booking.reject(),
            _ => unreachable!("validated above"),
        }
        self.booking_repository.set_status(&booking).await?;

        let details = self
            .booking_repository
            .find_details(booking_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Booking".to_string()))?;

        tracing::info!(status = %booking.status, "booking decided successfully");
        Ok(details)
    }

    #[tracing::instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn user_history(
        &self,
        ctx: AuthContext,
    ) -> Result<Vec<BookingDetails>, UsecaseError> {
        tracing::debug!("getting renter booking history");

        let bookings = self.booking_repository.find_by_renter(ctx.user_id).await?;

        tracing::debug!(count = bookings.len(), "renter history retrieved");
        Ok(bookings)
    }

    #[tracing::instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn owner_history(
        &self,
        ctx: AuthContext,
    ) -> Result<Vec<BookingDetails>, UsecaseError> {
        tracing::debug!("getting owner booking history");

        let bookings = self.booking_repository.find_by_owner(ctx.user_id).await?;

        tracing::debug!(count = bookings.len(), "owner history retrieved");
        Ok(bookings)
    }
}

fn validate_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), UsecaseError> {
    if end_date < start_date {
        return Err(UsecaseError::Validation(
            "End date must not be before start date".to_string(),
        ));
    }
    Ok(())
}
