use chrono::Utc;
use uuid::Uuid;

use crate::domain::booking::BookingStatus;
use crate::domain::review::Review;
use crate::domain::user::AuthContext;
use crate::usecase::contracts::{BookingRepository, ReviewRepository};
use crate::usecase::error::UsecaseError;

/// Permits review creation only once a booking is accepted and finished,
/// and only by the renter, exactly once.
pub struct ReviewsUseCase<B, R>
where
    B: BookingRepository,
    R: ReviewRepository,
{
    booking_repository: B,
    review_repository: R,
}

impl<B, R> ReviewsUseCase<B, R>
where
    B: BookingRepository,
    R: ReviewRepository,
{
    pub fn new(booking_repository: B, review_repository: R) -> Self {
        Self {
            booking_repository,
            review_repository,
        }
    }

    #[tracing::instrument(skip(self), fields(booking_id = %booking_id))]
    pub async fn get_review(&self, booking_id: Uuid) -> Result<Review, UsecaseError> {
        tracing::debug!("getting review for booking");

        self.review_repository
            .find_by_booking_id(booking_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Review".to_string()))
    }

    #[tracing::instrument(skip(self, comment), fields(user_id = %ctx.user_id, booking_id = %booking_id, rating))]
    pub async fn create_review(
        &self,
        ctx: AuthContext,
        booking_id: Uuid,
        rating: i16,
        comment: String,
    ) -> Result<Review, UsecaseError> {
        tracing::debug!("creating review");

        if !(1..=5).contains(&rating) {
            return Err(UsecaseError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let booking = self
            .booking_repository
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Booking".to_string()))?;

        if booking.renter_id != ctx.user_id {
            tracing::warn!("review attempt on another renter's booking");
            return Err(UsecaseError::Forbidden(
                "You can review only your own bookings".to_string(),
            ));
        }

        if booking.status != BookingStatus::Accepted {
            return Err(UsecaseError::InvalidState(
                "You can review only accepted bookings".to_string(),
            ));
        }

        let today = Utc::now().date_naive();
        if booking.end_date > today {
            return Err(UsecaseError::InvalidState(
                "Booking not finished yet".to_string(),
            ));
        }

        if self
            .review_repository
            .find_by_booking_id(booking_id)
            .await?
            .is_some()
        {
            return Err(UsecaseError::Conflict(
                "This booking already has a review".to_string(),
            ));
        }

        let review = Review::new(booking_id, ctx.user_id, rating, comment);
        self.review_repository.create(&review).await?;

        tracing::info!(review_id = %review.id, "review created successfully");
        Ok(review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::Booking;
    use crate::domain::user::UserRole;
    use crate::usecase::contracts::{MockBookingRepository, MockReviewRepository};
    use chrono::Duration;
    use mockall::predicate::eq;

    fn renter_ctx() -> AuthContext {
        AuthContext::new(Uuid::new_v4(), UserRole::User)
    }

    fn finished_accepted_booking(renter_id: Uuid) -> Booking {
        let today = Utc::now().date_naive();
        let mut booking = Booking::new(
            Uuid::new_v4(),
            renter_id,
            today - Duration::days(10),
            today - Duration::days(5),
            50,
        );
        booking.accept();
        booking
    }

    #[tokio::test]
    async fn test_create_review_success() {
        let mut booking_repo = MockBookingRepository::new();
        let mut review_repo = MockReviewRepository::new();
        let ctx = renter_ctx();
        let booking = finished_accepted_booking(ctx.user_id);
        let booking_id = booking.id;

        booking_repo
            .expect_find_by_id()
            .with(eq(booking_id))
            .times(1)
            .returning(move |_| Ok(Some(booking.clone())));
        review_repo
            .expect_find_by_booking_id()
            .with(eq(booking_id))
            .times(1)
            .returning(|_| Ok(None));
        review_repo
            .expect_create()
            .withf(move |r| r.booking_id == booking_id && r.rating == 4)
            .times(1)
            .returning(|_| Ok(()));

        let usecase = ReviewsUseCase::new(booking_repo, review_repo);
        let result = usecase
            .create_review(ctx, booking_id, 4, "Smooth rental".to_string())
            .await;

        assert!(result.is_ok());
        assert_eq!(result.unwrap().author_id, ctx.user_id);
    }

    #[tokio::test]
    async fn test_create_review_invalid_rating() {
        for rating in [0, 6, -1] {
            let booking_repo = MockBookingRepository::new();
            let review_repo = MockReviewRepository::new();

            let usecase = ReviewsUseCase::new(booking_repo, review_repo);
            let result = usecase
                .create_review(renter_ctx(), Uuid::new_v4(), rating, String::new())
                .await;

            assert!(matches!(result, Err(UsecaseError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_create_review_booking_not_found() {
        let mut booking_repo = MockBookingRepository::new();
        let review_repo = MockReviewRepository::new();

        booking_repo
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let usecase = ReviewsUseCase::new(booking_repo, review_repo);
        let result = usecase
            .create_review(renter_ctx(), Uuid::new_v4(), 5, String::new())
            .await;

        assert!(matches!(result, Err(UsecaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_review_forbidden_for_other_renter() {
        let mut booking_repo = MockBookingRepository::new();
        let review_repo = MockReviewRepository::new();
        let booking = finished_accepted_booking(Uuid::new_v4());
        let booking_id = booking.id;

        booking_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(booking.clone())));

        let usecase = ReviewsUseCase::new(booking_repo, review_repo);
        let result = usecase
            .create_review(renter_ctx(), booking_id, 5, String::new())
            .await;

        assert!(matches!(result, Err(UsecaseError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_review_requires_accepted_status() {
        let mut booking_repo = MockBookingRepository::new();
        let review_repo = MockReviewRepository::new();
        let ctx = renter_ctx();
        let mut booking = finished_accepted_booking(ctx.user_id);
        booking.status = BookingStatus::Pending;
        let booking_id = booking.id;

        booking_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(booking.clone())));

        let usecase = ReviewsUseCase::new(booking_repo, review_repo);
        let result = usecase
            .create_review(ctx, booking_id, 5, String::new())
            .await;

        assert!(matches!(result, Err(UsecaseError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_create_review_requires_finished_booking() {
        let mut booking_repo = MockBookingRepository::new();
        let review_repo = MockReviewRepository::new();
        let ctx = renter_ctx();
        let today = Utc::now().date_naive();
        let mut booking = Booking::new(
            Uuid::new_v4(),
            ctx.user_id,
            today,
            today + Duration::days(5),
            50,
        );
        booking.accept();
        let booking_id = booking.id;

        booking_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(booking.clone())));

        let usecase = ReviewsUseCase::new(booking_repo, review_repo);
        let result = usecase
            .create_review(ctx, booking_id, 5, String::new())
            .await;

        assert!(matches!(result, Err(UsecaseError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_create_review_only_once() {
        let mut booking_repo = MockBookingRepository::new();
        let mut review_repo = MockReviewRepository::new();
        let ctx = renter_ctx();
        let booking = finished_accepted_booking(ctx.user_id);
        let booking_id = booking.id;

        booking_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(booking.clone())));
        review_repo
            .expect_find_by_booking_id()
            .times(1)
            .returning(move |id| Ok(Some(Review::new(id, Uuid::new_v4(), 5, String::new()))));

        let usecase = ReviewsUseCase::new(booking_repo, review_repo);
        let result = usecase
            .create_review(ctx, booking_id, 3, String::new())
            .await;

        assert!(matches!(result, Err(UsecaseError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_get_review_not_found() {
        let booking_repo = MockBookingRepository::new();
        let mut review_repo = MockReviewRepository::new();

        review_repo
            .expect_find_by_booking_id()
            .times(1)
            .returning(|_| Ok(None));

        let usecase = ReviewsUseCase::new(booking_repo, review_repo);
        let result = usecase.get_review(Uuid::new_v4()).await;

        assert!(matches!(result, Err(UsecaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_review_success() {
        let booking_repo = MockBookingRepository::new();
        let mut review_repo = MockReviewRepository::new();
        let booking_id = Uuid::new_v4();

        review_repo
            .expect_find_by_booking_id()
            .with(eq(booking_id))
            .times(1)
            .returning(move |id| Ok(Some(Review::new(id, Uuid::new_v4(), 4, "ok".to_string()))));

        let usecase = ReviewsUseCase::new(booking_repo, review_repo);
        let result = usecase.get_review(booking_id).await;

        assert_eq!(result.unwrap().booking_id, booking_id);
    }
}
