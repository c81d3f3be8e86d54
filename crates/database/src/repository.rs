use crate::query::PropertySearch;
use crate::DbError;
use core_types::{NewProperty, NewUser, Property, PropertyFilter, PropertyListing, ReservationListing, User};
use sqlx::postgres::PgPool;

const USER_BY_EMAIL: &str = "SELECT id, name, email, password FROM users WHERE email = $1";

const USER_BY_ID: &str = "SELECT id, name, email, password FROM users WHERE id = $1";

const INSERT_USER: &str = r#"
    INSERT INTO users (name, email, password)
    VALUES ($1, $2, $3)
    RETURNING id, name, email, password
    "#;

/// `reservations.id` is aliased so it does not overwrite the property's `id`.
const RESERVATIONS_FOR_GUEST: &str = r#"
    SELECT
        properties.*,
        reservations.id AS reservation_id,
        reservations.start_date,
        reservations.end_date,
        avg(property_reviews.rating) AS average_rating
    FROM reservations
    JOIN properties ON reservations.property_id = properties.id
    JOIN property_reviews ON properties.id = property_reviews.property_id
    WHERE reservations.guest_id = $1
    GROUP BY properties.id, reservations.id
    ORDER BY reservations.start_date
    LIMIT $2
    "#;

const INSERT_PROPERTY: &str = r#"
    INSERT INTO properties (
        owner_id, title, description, thumbnail_photo_url, cover_photo_url,
        cost_per_night, street, city, province, post_code,
        country, parking_spaces, number_of_bathrooms, number_of_bedrooms
    ) VALUES (
        $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14
    )
    RETURNING *
    "#;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the LightBnB database. It encapsulates all SQL queries and data access logic.
///
/// Every method issues exactly one statement against the pool; nothing is
/// cached between calls.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches a single user by email address. Returns `None` when no user has that email.
    #[tracing::instrument(skip(self))]
    pub async fn get_user_with_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(USER_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        tracing::debug!(found = user.is_some(), "Looked up user by email.");
        Ok(user)
    }

    /// Fetches a single user by id. Returns `None` when the id is unknown.
    #[tracing::instrument(skip(self))]
    pub async fn get_user_with_id(&self, id: i32) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(USER_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        tracing::debug!(found = user.is_some(), "Looked up user by id.");
        Ok(user)
    }

    /// Inserts a new user and returns the stored row.
    ///
    /// A duplicate email surfaces as `DbError::Conflict`.
    #[tracing::instrument(skip(self, user), fields(email = %user.email))]
    pub async fn add_user(&self, user: &NewUser) -> Result<User, DbError> {
        user.validate()?;

        let created = sqlx::query_as::<_, User>(INSERT_USER)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(user_id = created.id, "User created.");
        Ok(created)
    }

    /// Fetches a guest's reservations, earliest start date first, each with the
    /// reserved property and that property's average rating.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_reservations(
        &self,
        guest_id: i32,
        limit: i64,
    ) -> Result<Vec<ReservationListing>, DbError> {
        let reservations = sqlx::query_as::<_, ReservationListing>(RESERVATIONS_FOR_GUEST)
            .bind(guest_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = reservations.len(), "Fetched reservations.");
        Ok(reservations)
    }

    /// Searches properties matching `filter`, cheapest first.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_properties(
        &self,
        filter: &PropertyFilter,
        limit: i64,
    ) -> Result<Vec<PropertyListing>, DbError> {
        let query = PropertySearch::build(filter, limit);
        tracing::debug!(sql = %query.sql, params = ?query.params, "Built property search.");

        let listings = query
            .query_as::<PropertyListing>()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = listings.len(), "Fetched properties.");
        Ok(listings)
    }

    /// Inserts a property listing and returns the inserted row(s).
    ///
    /// An `owner_id` that matches no user surfaces as `DbError::ForeignKey`.
    #[tracing::instrument(skip(self, property), fields(owner_id = property.owner_id, city = %property.city))]
    pub async fn add_property(&self, property: &NewProperty) -> Result<Vec<Property>, DbError> {
        property.validate()?;

        let rows = sqlx::query_as::<_, Property>(INSERT_PROPERTY)
            .bind(property.owner_id)
            .bind(&property.title)
            .bind(property.description.as_deref())
            .bind(&property.thumbnail_photo_url)
            .bind(&property.cover_photo_url)
            .bind(property.cost_per_night)
            .bind(&property.street)
            .bind(&property.city)
            .bind(&property.province)
            .bind(&property.post_code)
            .bind(&property.country)
            .bind(property.parking_spaces)
            .bind(property.number_of_bathrooms)
            .bind(property.number_of_bedrooms)
            .fetch_all(&self.pool)
            .await?;

        tracing::info!(count = rows.len(), "Property created.");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::CoreError;
    use sqlx::postgres::PgPoolOptions;

    /// A pool that never opens a connection unless a statement is actually run.
    fn lazy_repository() -> DbRepository {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://lightbnb@localhost/lightbnb")
            .unwrap();
        DbRepository::new(pool)
    }

    #[test]
    fn test_insert_property_binds_every_column() {
        let placeholders = INSERT_PROPERTY.matches('$').count();
        assert_eq!(placeholders, NewProperty::COLUMN_COUNT);

        let columns = INSERT_PROPERTY
            .split_once('(')
            .and_then(|(_, rest)| rest.split_once(')'))
            .map(|(columns, _)| columns.split(',').count())
            .unwrap();
        assert_eq!(columns, NewProperty::COLUMN_COUNT);
    }

    /// Every `$n` in the statement, in order of appearance.
    fn placeholders(sql: &str) -> Vec<&str> {
        sql.split('$')
            .skip(1)
            .map(|rest| rest.split(|c: char| !c.is_ascii_digit()).next().unwrap_or(""))
            .collect()
    }

    #[test]
    fn test_user_lookups_bind_a_single_key() {
        assert_eq!(placeholders(USER_BY_EMAIL), vec!["1"]);
        assert!(USER_BY_EMAIL.ends_with("WHERE email = $1"));
        assert_eq!(placeholders(USER_BY_ID), vec!["1"]);
        assert!(USER_BY_ID.ends_with("WHERE id = $1"));
    }

    #[test]
    fn test_insert_user_binds_name_email_password() {
        assert_eq!(placeholders(INSERT_USER), vec!["1", "2", "3"]);
        assert!(INSERT_USER.contains("INSERT INTO users (name, email, password)"));
        assert!(INSERT_USER.contains("RETURNING id, name, email, password"));
    }

    #[test]
    fn test_reservations_sorted_by_start_date_and_limited() {
        assert_eq!(placeholders(RESERVATIONS_FOR_GUEST), vec!["1", "2"]);
        assert!(RESERVATIONS_FOR_GUEST.contains("WHERE reservations.guest_id = $1"));
        assert!(RESERVATIONS_FOR_GUEST.contains("ORDER BY reservations.start_date\n"));
        assert!(!RESERVATIONS_FOR_GUEST.contains("DESC"));
        assert!(RESERVATIONS_FOR_GUEST.trim_end().ends_with("LIMIT $2"));
    }

    #[test]
    fn test_reservation_id_does_not_shadow_property_id() {
        assert!(RESERVATIONS_FOR_GUEST.contains("reservations.id AS reservation_id"));
        let selected = RESERVATIONS_FOR_GUEST
            .split_once("FROM reservations")
            .map(|(select, _)| select)
            .unwrap();
        assert!(!selected.contains("reservations.id,"));
    }

    #[tokio::test]
    async fn test_add_user_rejects_invalid_input_before_querying() {
        let repo = lazy_repository();
        let user = NewUser {
            name: "Ada".to_string(),
            email: "no-at-sign".to_string(),
            password: "secret".to_string(),
        };

        let err = repo.add_user(&user).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidInput(CoreError::InvalidInput(field, _)) if field == "email"));
    }

    #[tokio::test]
    async fn test_add_property_rejects_negative_cost() {
        let repo = lazy_repository();
        let property = NewProperty {
            owner_id: 1,
            title: "Loft".to_string(),
            description: None,
            thumbnail_photo_url: String::new(),
            cover_photo_url: String::new(),
            cost_per_night: -100,
            street: "Torstr. 1".to_string(),
            city: "Berlin".to_string(),
            province: "Berlin".to_string(),
            post_code: "10119".to_string(),
            country: "Germany".to_string(),
            parking_spaces: 0,
            number_of_bathrooms: 1,
            number_of_bedrooms: 1,
        };

        let err = repo.add_property(&property).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidInput(_)));
    }
}
