//! The property search query builder.
//!
//! A search starts from a fixed `SELECT` over `properties` joined with
//! `property_reviews` and grows one predicate per filter that is present.
//! Clause text and bound values are appended together, so the `$n`
//! placeholders always line up with the parameter list.

use core_types::PropertyFilter;
use sqlx::postgres::{PgArguments, PgRow, Postgres};
use sqlx::query::QueryAs;
use sqlx::FromRow;

/// Number of rows returned when the caller does not ask for a specific limit.
pub const DEFAULT_LIMIT: i64 = 10;

const BASE_QUERY: &str = "
SELECT properties.*, avg(property_reviews.rating) AS average_rating
FROM properties
JOIN property_reviews ON properties.id = property_reviews.property_id
";

const GROUP_BY: &str = "GROUP BY properties.id\n";

/// A single positional value bound to a built query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Text(String),
    Int(i64),
    Float(f64),
}

/// SQL text together with the values for its `$1..$n` placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

impl BuiltQuery {
    /// Prepares the statement with every parameter bound, ready to fetch rows as `O`.
    pub fn query_as<'q, O>(&'q self) -> QueryAs<'q, Postgres, O, PgArguments>
    where
        O: for<'r> FromRow<'r, PgRow>,
    {
        self.params
            .iter()
            .fold(sqlx::query_as::<Postgres, O>(&self.sql), |query, param| match param {
                QueryParam::Text(value) => query.bind(value.as_str()),
                QueryParam::Int(value) => query.bind(*value),
                QueryParam::Float(value) => query.bind(*value),
            })
    }
}

/// Incrementally assembles a property search.
#[derive(Debug)]
pub struct PropertySearch {
    sql: String,
    params: Vec<QueryParam>,
    predicates: usize,
}

impl PropertySearch {
    /// Builds the search statement for `filter`, returning at most `limit` rows
    /// ordered by nightly cost.
    ///
    /// Filters are applied in a fixed order: city, owner, minimum price,
    /// maximum price. The rating bound is checked against the aggregate in a
    /// `HAVING` clause, and the limit is always the last parameter.
    pub fn build(filter: &PropertyFilter, limit: i64) -> BuiltQuery {
        let mut search = Self {
            sql: BASE_QUERY.to_string(),
            params: Vec::new(),
            predicates: 0,
        };

        if let Some(pattern) = filter.city_pattern() {
            search.predicate("city LIKE", QueryParam::Text(pattern));
        }
        if let Some(owner_id) = filter.owner_id {
            search.predicate("properties.owner_id =", QueryParam::Int(i64::from(owner_id)));
        }
        if let Some(cents) = filter.minimum_price_cents() {
            search.predicate("properties.cost_per_night >=", QueryParam::Int(cents));
        }
        if let Some(cents) = filter.maximum_price_cents() {
            search.predicate("properties.cost_per_night <=", QueryParam::Int(cents));
        }

        search.sql.push_str(GROUP_BY);

        if let Some(rating) = filter.minimum_rating {
            let index = search.bind(QueryParam::Float(rating));
            search
                .sql
                .push_str(&format!("HAVING avg(property_reviews.rating) >= ${index}\n"));
        }

        let index = search.bind(QueryParam::Int(limit));
        search
            .sql
            .push_str(&format!("ORDER BY cost_per_night\nLIMIT ${index};"));

        BuiltQuery {
            sql: search.sql,
            params: search.params,
        }
    }

    /// Pushes a value and returns its 1-based placeholder index.
    fn bind(&mut self, param: QueryParam) -> usize {
        self.params.push(param);
        self.params.len()
    }

    fn predicate(&mut self, column_and_operator: &str, param: QueryParam) {
        let index = self.bind(param);
        let keyword = if self.predicates == 0 { "WHERE" } else { "AND" };
        self.predicates += 1;
        self.sql
            .push_str(&format!("{keyword} {column_and_operator} ${index}\n"));
    }
}
