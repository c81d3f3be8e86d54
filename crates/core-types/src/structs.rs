use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    /// The stored password hash. Never written out when a user is serialized.
    #[serde(skip_serializing)]
    pub password: String,
}

/// The fields needed to register a new user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    /// Rejects registrations that the `users` table would accept but that are
    /// obviously unusable (blank fields, an email without an `@`).
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidInput("name".to_string(), "must not be blank".to_string()));
        }
        if !self.email.contains('@') {
            return Err(CoreError::InvalidInput(
                "email".to_string(),
                format!("'{}' is not an email address", self.email),
            ));
        }
        if self.password.is_empty() {
            return Err(CoreError::InvalidInput("password".to_string(), "must not be empty".to_string()));
        }
        Ok(())
    }
}

/// A row from the `properties` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Property {
    pub id: i32,
    pub owner_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_photo_url: String,
    pub cover_photo_url: String,
    /// Nightly price in minor currency units (cents).
    pub cost_per_night: i32,
    pub parking_spaces: i32,
    pub number_of_bathrooms: i32,
    pub number_of_bedrooms: i32,
    pub country: String,
    pub street: String,
    pub city: String,
    pub province: String,
    pub post_code: String,
    pub active: bool,
}

/// A property together with the average of its review ratings, as returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PropertyListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub property: Property,
    pub average_rating: Option<Decimal>,
}

/// One of a guest's reservations joined with the reserved property and its rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ReservationListing {
    pub reservation_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub property: Property,
    pub average_rating: Option<Decimal>,
}

/// The insertable columns of a property listing.
///
/// The field order here is the column order of the `INSERT` statement and
/// the order in which values are bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProperty {
    pub owner_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_photo_url: String,
    pub cover_photo_url: String,
    /// Nightly price in minor currency units (cents).
    pub cost_per_night: i32,
    pub street: String,
    pub city: String,
    pub province: String,
    pub post_code: String,
    pub country: String,
    pub parking_spaces: i32,
    pub number_of_bathrooms: i32,
    pub number_of_bedrooms: i32,
}

impl NewProperty {
    /// Number of columns written by an insert.
    pub const COLUMN_COUNT: usize = 14;

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::InvalidInput("title".to_string(), "must not be blank".to_string()));
        }
        if self.city.trim().is_empty() {
            return Err(CoreError::InvalidInput("city".to_string(), "must not be blank".to_string()));
        }
        let counts = [
            ("cost_per_night", self.cost_per_night),
            ("parking_spaces", self.parking_spaces),
            ("number_of_bathrooms", self.number_of_bathrooms),
            ("number_of_bedrooms", self.number_of_bedrooms),
        ];
        for (field, value) in counts {
            if value < 0 {
                return Err(CoreError::InvalidInput(field.to_string(), format!("{value} is negative")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cottage() -> NewProperty {
        NewProperty {
            owner_id: 1,
            title: "Lakeside cottage".to_string(),
            description: Some("Quiet, two canoes".to_string()),
            thumbnail_photo_url: "https://img.example/thumb.jpg".to_string(),
            cover_photo_url: "https://img.example/cover.jpg".to_string(),
            cost_per_night: 12_500,
            street: "1 Shore Rd".to_string(),
            city: "Huntsville".to_string(),
            province: "Ontario".to_string(),
            post_code: "P1H 1A1".to_string(),
            country: "Canada".to_string(),
            parking_spaces: 2,
            number_of_bathrooms: 1,
            number_of_bedrooms: 3,
        }
    }

    #[test]
    fn test_user_password_is_not_serialized() {
        let user = User {
            id: 7,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "$2a$10$hash".to_string(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["email"], "ada@example.com");
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_new_user_validation() {
        let mut user = NewUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(user.validate().is_ok());

        user.email = "not-an-email".to_string();
        assert!(matches!(user.validate(), Err(CoreError::InvalidInput(field, _)) if field == "email"));

        user.email = "ada@example.com".to_string();
        user.name = "   ".to_string();
        assert!(matches!(user.validate(), Err(CoreError::InvalidInput(field, _)) if field == "name"));
    }

    #[test]
    fn test_new_property_validation() {
        assert!(cottage().validate().is_ok());

        let mut negative = cottage();
        negative.number_of_bedrooms = -1;
        assert!(matches!(
            negative.validate(),
            Err(CoreError::InvalidInput(field, _)) if field == "number_of_bedrooms"
        ));

        let mut untitled = cottage();
        untitled.title = String::new();
        assert!(untitled.validate().is_err());
    }

    #[test]
    fn test_listing_serializes_flat() {
        let listing = PropertyListing {
            property: Property {
                id: 3,
                owner_id: 1,
                title: "Loft".to_string(),
                description: None,
                thumbnail_photo_url: String::new(),
                cover_photo_url: String::new(),
                cost_per_night: 9_900,
                parking_spaces: 0,
                number_of_bathrooms: 1,
                number_of_bedrooms: 1,
                country: "Germany".to_string(),
                street: "Torstr. 1".to_string(),
                city: "Berlin".to_string(),
                province: "Berlin".to_string(),
                post_code: "10119".to_string(),
                active: true,
            },
            average_rating: Some(Decimal::new(425, 2)),
        };
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["city"], "Berlin");
        assert_eq!(json["cost_per_night"], 9_900);
        assert!(json.get("property").is_none());
    }
}
