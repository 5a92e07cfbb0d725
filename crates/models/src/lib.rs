//! Row-level SeaORM entities for the `customers` and `reservations` tables.
//!
//! These types mirror the store schema one-to-one; the validated domain entities
//! live in the `service` crate and are mapped to/from these rows by its gateway.

pub mod db;
pub mod customer;
pub mod reservation;
