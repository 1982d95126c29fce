use uuid::Uuid;

/// Read projection of a car listing, owned by the listing service. The
/// booking service only needs the fields that drive availability, pricing
/// and presentation.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Car {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub brand: String,
    pub model: String,
    pub price_per_day: i64,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_car_fields() {
        let id = Uuid::new_v4();
        let owner_id = Uuid::new_v4();

        let car = Car {
            id,
            owner_id,
            brand: "Toyota".to_string(),
            model: "Corolla".to_string(),
            price_per_day: 50,
            is_active: true,
        };

        assert_eq!(car.id, id);
        assert_eq!(car.owner_id, owner_id);
        assert_eq!(car.price_per_day, 50);
        assert!(car.is_active);
    }
}
