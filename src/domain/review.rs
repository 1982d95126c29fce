use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A renter's review of a completed booking, one per booking.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub author_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(booking_id: Uuid, author_id: Uuid, rating: i16, comment: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id,
            author_id,
            rating,
            comment,
            created_at: Utc::now(),
        }
    }
}
