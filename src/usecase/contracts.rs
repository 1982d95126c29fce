use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::booking::{Booking, BookingDetails};
use crate::domain::car::Car;
use crate::domain::review::Review;
use crate::repository::errors::RepositoryError;

#[cfg_attr(test, mockall::automock)]
pub trait BookingRepository: Send + Sync {
    /// Persist a new booking. Implementations must re-check availability
    /// atomically with the insert and return `Conflict` if the range is
    /// already taken.
    async fn insert(&self, booking: &Booking) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, RepositoryError>;
    async fn find_details(&self, id: Uuid) -> Result<Option<BookingDetails>, RepositoryError>;
    async fn list_details(&self) -> Result<Vec<BookingDetails>, RepositoryError>;
    async fn find_by_renter(&self, renter_id: Uuid) -> Result<Vec<BookingDetails>, RepositoryError>;
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<BookingDetails>, RepositoryError>;
    /// Any non-rejected, non-deleted booking for `car_id` overlapping the
    /// inclusive range, optionally excluding one booking id.
    async fn has_overlap(
        &self,
        car_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<bool, RepositoryError>;
    /// Persist new car/dates/price for an existing booking. Same atomic
    /// availability re-check as `insert`, excluding the booking itself.
    async fn reschedule(&self, booking: &Booking) -> Result<(), RepositoryError>;
    async fn set_status(&self, booking: &Booking) -> Result<(), RepositoryError>;
    async fn soft_delete(&self, booking: &Booking) -> Result<(), RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait CarDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Car>, RepositoryError>;
    async fn is_owned_by(&self, car_id: Uuid, user_id: Uuid) -> Result<bool, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait ReviewRepository: Send + Sync {
    async fn create(&self, review: &Review) -> Result<(), RepositoryError>;
    async fn find_by_booking_id(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<Review>, RepositoryError>;
}
