use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "PascalCase")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
    Completed,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Accepted => "Accepted",
            BookingStatus::Rejected => "Rejected",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Completed => "Completed",
        };
        f.write_str(s)
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(BookingStatus::Pending),
            "Accepted" => Ok(BookingStatus::Accepted),
            "Rejected" => Ok(BookingStatus::Rejected),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            "Completed" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

/// A reservation of a car for an inclusive date range.
///
/// `total_price` is derived from the range and the car's daily rate at
/// creation or reschedule time; `deleted_at` marks a cancelled booking that
/// is excluded from normal queries.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub car_id: Uuid,
    pub renter_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn new(
        car_id: Uuid,
        renter_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        price_per_day: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            car_id,
            renter_id,
            start_date,
            end_date,
            total_price: Self::total_price(start_date, end_date, price_per_day),
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Number of billed days, counting both endpoints.
    pub fn rental_days(start_date: NaiveDate, end_date: NaiveDate) -> i64 {
        (end_date - start_date).num_days() + 1
    }

    pub fn total_price(start_date: NaiveDate, end_date: NaiveDate, price_per_day: i64) -> i64 {
        Self::rental_days(start_date, end_date) * price_per_day
    }

    /// Inclusive range overlap: the two ranges share at least one day.
    pub fn overlaps(&self, start_date: NaiveDate, end_date: NaiveDate) -> bool {
        self.start_date <= end_date && self.end_date >= start_date
    }

    /// Whether this booking blocks the given range. Rejected and cancelled
    /// bookings never block.
    pub fn conflicts_with(&self, start_date: NaiveDate, end_date: NaiveDate) -> bool {
        self.status != BookingStatus::Rejected
            && !self.is_deleted()
            && self.overlaps(start_date, end_date)
    }

    /// Move the booking to a new car and range, repricing at the new car's
    /// daily rate. Callers must have verified the booking is still Pending.
    pub fn reschedule(
        &mut self,
        car_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        price_per_day: i64,
    ) {
        self.car_id = car_id;
        self.start_date = start_date;
        self.end_date = end_date;
        self.total_price = Self::total_price(start_date, end_date, price_per_day);
        self.updated_at = Utc::now();
    }

    pub fn accept(&mut self) {
        self.status = BookingStatus::Accepted;
        self.updated_at = Utc::now();
    }

    pub fn reject(&mut self) {
        self.status = BookingStatus::Rejected;
        self.updated_at = Utc::now();
    }

    pub fn cancel(&mut self) {
        let now = Utc::now();
        self.status = BookingStatus::Cancelled;
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Status as presented to clients: cancelled bookings show `Cancelled`,
    /// accepted bookings whose end date has passed show `Completed`.
    pub fn effective_status(&self, today: NaiveDate) -> BookingStatus {
        if self.is_deleted() {
            return BookingStatus::Cancelled;
        }
        if self.status == BookingStatus::Accepted && self.end_date < today {
            return BookingStatus::Completed;
        }
        self.status
    }
}

/// A booking joined with the display fields every read endpoint returns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingDetails {
    #[sqlx(flatten)]
    pub booking: Booking,
    pub car_brand: String,
    pub car_model: String,
    pub renter_name: String,
}
