//! In-memory entities with validated mutation.
//!
//! Entities hold no connection; operations that touch the store take a
//! [`Gateway`](crate::repository::Gateway) argument.

mod customer;
mod reservation;

pub use customer::{Customer, CustomerFields, CustomerForm};
pub use reservation::{Reservation, ReservationFields, ReservationForm, StartAt};

use crate::errors::ValidationError;

/// Assign a write-once field.
///
/// An empty slot takes the new value; a populated slot accepts only the value it
/// already holds.
pub(crate) fn assign_once<T: PartialEq>(
    slot: &mut Option<T>,
    value: T,
    field: &'static str,
) -> Result<(), ValidationError> {
    match slot {
        Some(current) if *current != value => Err(ValidationError::Immutable { field }),
        Some(_) => Ok(()),
        None => {
            *slot = Some(value);
            Ok(())
        }
    }
}

/// Missing or empty notes are stored as `""`.
pub(crate) fn normalize_notes(notes: Option<String>) -> String {
    notes.unwrap_or_default()
}
