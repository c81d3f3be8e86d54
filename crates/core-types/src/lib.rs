pub mod error;
pub mod filters;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use filters::PropertyFilter;
pub use structs::{NewProperty, NewUser, Property, PropertyListing, ReservationListing, User};
