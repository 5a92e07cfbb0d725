//! Customers and reservations of the restaurant, and the gateway that persists them.
//! - Entities validate their own mutation and never hold a connection.
//! - All store access goes through the [`repository::Gateway`] trait.
//! - `repo::seaorm` implements it on top of the `models` entities.

pub mod errors;
pub mod domain;
pub mod repository;
pub mod repo;
pub mod directory;
#[cfg(test)]
pub mod test_support;

pub use directory::{CustomerDetail, CustomerDirectory, CustomerSummary, ReservationDetail};
pub use errors::{ServiceError, ValidationError};
pub use repo::SeaOrmGateway;
pub use repository::Gateway;
