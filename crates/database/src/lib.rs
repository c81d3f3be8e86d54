//! # LightBnB Database Crate
//!
//! This crate is the data-access layer of the LightBnB application. It owns
//! every SQL statement the application issues against PostgreSQL.
//!
//! ## Architectural Principles
//!
//! - **Injected Pool:** Nothing here holds a global connection. Callers build a
//!   `PgPool` with [`connect`] and hand it to [`DbRepository::new`].
//! - **One Statement Per Call:** Each repository method runs a single
//!   parameterized statement. There is no cross-call state and no transaction.
//! - **Typed Failures:** Execution errors come back as [`DbError`] variants so
//!   callers can tell a duplicate email from a missing table without parsing
//!   messages. Lookups that find nothing return `Ok(None)`.
//!
//! ## Public API
//!
//! - `connect`: Builds the connection pool from `DatabaseSettings`.
//! - `DbRepository`: Users, reservations and property listings.
//! - `PropertySearch`: Turns a `PropertyFilter` into SQL plus its bound values.
//! - `DbError`: The specific error types that can be returned from this crate.

pub mod connection;
pub mod error;
pub mod query;
pub mod repository;

pub use connection::connect;
pub use error::DbError;
pub use query::{BuiltQuery, DEFAULT_LIMIT, PropertySearch, QueryParam};
pub use repository::DbRepository;
