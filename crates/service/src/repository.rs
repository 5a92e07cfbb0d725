use async_trait::async_trait;

use crate::domain::{Customer, Reservation};
use crate::errors::{ServiceError, ValidationError};

/// Number of customers returned by the "best customers" ranking unless configured otherwise.
pub const DEFAULT_TOP_LIMIT: u64 = 10;

/// Row limits are bound as signed 64-bit integers by the store.
pub fn checked_limit(limit: u64) -> Result<u64, ValidationError> {
    match i64::try_from(limit) {
        Ok(_) => Ok(limit),
        Err(_) => Err(ValidationError::LimitOutOfRange { limit }),
    }
}

/// Persistence gateway: the only component that talks to the store and maps
/// rows to entities.
///
/// Lookups by id fail with [`ServiceError::NotFound`]; list queries return an
/// empty vec when nothing matches.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// All customers ordered by last name, then first name.
    async fn list_customers(&self) -> Result<Vec<Customer>, ServiceError>;
    async fn get_customer(&self, id: i32) -> Result<Customer, ServiceError>;
    /// Case-insensitive substring match on first, middle or last name, ordered like
    /// [`list_customers`](Self::list_customers).
    async fn find_customers_by_name(&self, fragment: &str) -> Result<Vec<Customer>, ServiceError>;
    /// Customers with at least one reservation, most reservations first, at most `limit`.
    /// A limit above `i64::MAX` fails with [`ValidationError::LimitOutOfRange`].
    async fn top_customers_by_reservation_count(&self, limit: u64) -> Result<Vec<Customer>, ServiceError>;
    /// Returns the generated id.
    async fn insert_customer(&self, customer: &Customer) -> Result<i32, ServiceError>;
    async fn update_customer(&self, customer: &Customer) -> Result<(), ServiceError>;

    /// Reservations of one customer ordered by start time ascending.
    async fn list_reservations_for_customer(&self, customer_id: i32) -> Result<Vec<Reservation>, ServiceError>;
    async fn get_reservation(&self, id: i32) -> Result<Reservation, ServiceError>;
    /// Returns the generated id.
    async fn insert_reservation(&self, reservation: &Reservation) -> Result<i32, ServiceError>;
    async fn update_reservation(&self, reservation: &Reservation) -> Result<(), ServiceError>;
}

/// Simple in-memory gateway for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    struct State {
        customers: BTreeMap<i32, Customer>,
        reservations: BTreeMap<i32, Reservation>,
        next_customer_id: i32,
        next_reservation_id: i32,
    }

    #[derive(Default)]
    pub struct MockGateway {
        state: Mutex<State>,
    }

    impl MockGateway {
        fn state(&self) -> Result<MutexGuard<'_, State>, ServiceError> {
            self.state.lock().map_err(|_| ServiceError::Db("mock gateway lock poisoned".into()))
        }
    }

    fn name_matches(customer: &Customer, needle: &str) -> bool {
        [Some(customer.first_name()), customer.middle_name(), Some(customer.last_name())]
            .into_iter()
            .flatten()
            .any(|name| name.to_lowercase().contains(needle))
    }

    fn stored_id(id: Option<i32>, entity: &'static str) -> Result<i32, ServiceError> {
        id.ok_or_else(|| ServiceError::Db(format!("cannot update unsaved {entity}")))
    }

    fn sort_by_name(customers: &mut [Customer]) {
        customers.sort_by(|a, b| {
            (a.last_name(), a.first_name(), a.id()).cmp(&(b.last_name(), b.first_name(), b.id()))
        });
    }

    #[async_trait]
    impl Gateway for MockGateway {
        async fn list_customers(&self) -> Result<Vec<Customer>, ServiceError> {
            let mut all: Vec<Customer> = self.state()?.customers.values().cloned().collect();
            sort_by_name(&mut all);
            Ok(all)
        }

        async fn get_customer(&self, id: i32) -> Result<Customer, ServiceError> {
            self.state()?.customers.get(&id).cloned().ok_or_else(|| ServiceError::not_found("customer", id))
        }

        async fn find_customers_by_name(&self, fragment: &str) -> Result<Vec<Customer>, ServiceError> {
            let needle = fragment.to_lowercase();
            let mut found: Vec<Customer> =
                self.state()?.customers.values().filter(|c| name_matches(c, &needle)).cloned().collect();
            sort_by_name(&mut found);
            Ok(found)
        }

        async fn top_customers_by_reservation_count(&self, limit: u64) -> Result<Vec<Customer>, ServiceError> {
            let limit = checked_limit(limit)?;
            let state = self.state()?;
            let mut counts: HashMap<i32, usize> = HashMap::new();
            for r in state.reservations.values() {
                *counts.entry(r.customer_id()).or_default() += 1;
            }
            let mut ranked: Vec<(i32, usize)> = counts.into_iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            Ok(ranked
                .into_iter()
                .filter_map(|(id, _)| state.customers.get(&id).cloned())
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect())
        }

        async fn insert_customer(&self, customer: &Customer) -> Result<i32, ServiceError> {
            let mut state = self.state()?;
            state.next_customer_id += 1;
            let id = state.next_customer_id;
            let mut stored = customer.clone();
            stored.set_id(id)?;
            state.customers.insert(id, stored);
            Ok(id)
        }

        async fn update_customer(&self, customer: &Customer) -> Result<(), ServiceError> {
            let id = stored_id(customer.id(), "customer")?;
            let mut state = self.state()?;
            let slot = state.customers.get_mut(&id).ok_or_else(|| ServiceError::not_found("customer", id))?;
            *slot = customer.clone();
            Ok(())
        }

        async fn list_reservations_for_customer(&self, customer_id: i32) -> Result<Vec<Reservation>, ServiceError> {
            let mut found: Vec<Reservation> = self
                .state()?
                .reservations
                .values()
                .filter(|r| r.customer_id() == customer_id)
                .cloned()
                .collect();
            found.sort_by_key(|r| *r.start_at());
            Ok(found)
        }

        async fn get_reservation(&self, id: i32) -> Result<Reservation, ServiceError> {
            self.state()?.reservations.get(&id).cloned().ok_or_else(|| ServiceError::not_found("reservation", id))
        }

        async fn insert_reservation(&self, reservation: &Reservation) -> Result<i32, ServiceError> {
            if !reservation.start_at().is_valid() {
                return Err(ValidationError::InvalidStartAt.into());
            }
            let mut state = self.state()?;
            let owner = reservation.customer_id();
            if !state.customers.contains_key(&owner) {
                return Err(ServiceError::Db(format!("customer {owner} does not exist")));
            }
            state.next_reservation_id += 1;
            let id = state.next_reservation_id;
            let mut stored = reservation.clone();
            stored.set_id(id)?;
            state.reservations.insert(id, stored);
            Ok(id)
        }

        async fn update_reservation(&self, reservation: &Reservation) -> Result<(), ServiceError> {
            let id = stored_id(reservation.id(), "reservation")?;
            let mut state = self.state()?;
            let slot = state.reservations.get_mut(&id).ok_or_else(|| ServiceError::not_found("reservation", id))?;
            *slot = reservation.clone();
            Ok(())
        }
    }
}
