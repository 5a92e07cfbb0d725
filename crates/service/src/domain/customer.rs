use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{assign_once, normalize_notes, Reservation};
use crate::errors::{ServiceError, ValidationError};
use crate::repository::{Gateway, DEFAULT_TOP_LIMIT};

/// Customer of the restaurant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Customer {
    id: Option<i32>,
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    phone: String,
    notes: String,
}

/// Field set a [`Customer`] is built from.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CustomerFields {
    pub id: Option<i32>,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub phone: String,
    pub notes: Option<String>,
}

impl Customer {
    pub fn new(fields: CustomerFields) -> Self {
        Self {
            id: fields.id,
            first_name: fields.first_name,
            middle_name: fields.middle_name,
            last_name: fields.last_name,
            phone: fields.phone,
            notes: normalize_notes(fields.notes),
        }
    }

    pub fn id(&self) -> Option<i32> { self.id }
    pub fn first_name(&self) -> &str { &self.first_name }
    pub fn middle_name(&self) -> Option<&str> { self.middle_name.as_deref() }
    pub fn last_name(&self) -> &str { &self.last_name }
    pub fn phone(&self) -> &str { &self.phone }
    pub fn notes(&self) -> &str { &self.notes }

    pub fn set_id(&mut self, id: i32) -> Result<(), ValidationError> {
        assign_once(&mut self.id, id, "id")
    }

    pub fn set_first_name(&mut self, name: impl Into<String>) { self.first_name = name.into(); }
    pub fn set_middle_name(&mut self, name: Option<String>) { self.middle_name = name; }
    pub fn set_last_name(&mut self, name: impl Into<String>) { self.last_name = name.into(); }
    pub fn set_phone(&mut self, phone: impl Into<String>) { self.phone = phone.into(); }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = normalize_notes(notes);
    }

    /// First, middle (when present) and last name joined by single spaces.
    pub fn full_name(&self) -> String {
        match self.middle_name.as_deref() {
            Some(middle) if !middle.is_empty() => {
                format!("{} {} {}", self.first_name, middle, self.last_name)
            }
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }

    /// All customers ordered by last name, then first name.
    pub async fn all<G: Gateway + ?Sized>(gateway: &G) -> Result<Vec<Customer>, ServiceError> {
        gateway.list_customers().await
    }

    pub async fn get<G: Gateway + ?Sized>(gateway: &G, id: i32) -> Result<Customer, ServiceError> {
        gateway.get_customer(id).await
    }

    /// Case-insensitive search over first, middle and last name.
    pub async fn find<G: Gateway + ?Sized>(gateway: &G, name: &str) -> Result<Vec<Customer>, ServiceError> {
        gateway.find_customers_by_name(name).await
    }

    /// Top customers by number of reservations.
    pub async fn best_customers<G: Gateway + ?Sized>(gateway: &G) -> Result<Vec<Customer>, ServiceError> {
        gateway.top_customers_by_reservation_count(DEFAULT_TOP_LIMIT).await
    }

    /// This customer's reservations, earliest first. Unsaved customers have none.
    pub async fn get_reservations<G: Gateway + ?Sized>(&self, gateway: &G) -> Result<Vec<Reservation>, ServiceError> {
        match self.id {
            Some(id) => gateway.list_reservations_for_customer(id).await,
            None => Ok(Vec::new()),
        }
    }

    /// First entry of [`get_reservations`](Self::get_reservations).
    ///
    /// That list is ordered by start time ascending, so this is the *earliest*
    /// reservation, not the latest one. Kept as-is pending a decision from the
    /// product owner.
    pub async fn most_recent_reservation<G: Gateway + ?Sized>(
        &self,
        gateway: &G,
    ) -> Result<Option<Reservation>, ServiceError> {
        Ok(self.get_reservations(gateway).await?.into_iter().next())
    }

    /// Insert when unsaved (adopting the generated id), otherwise update every mutable field.
    pub async fn save<G: Gateway + ?Sized>(&mut self, gateway: &G) -> Result<(), ServiceError> {
        match self.id {
            None => {
                let id = gateway.insert_customer(self).await?;
                self.set_id(id)?;
                debug!(customer_id = id, "customer inserted");
            }
            Some(id) => {
                gateway.update_customer(self).await?;
                debug!(customer_id = id, "customer updated");
            }
        }
        Ok(())
    }
}

/// Raw add/edit form values as submitted by the presentation layer.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CustomerForm {
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub phone: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CustomerForm {
    fn middle(&self) -> Option<String> {
        self.middle_name.clone().filter(|m| !m.trim().is_empty())
    }

    /// New, unsaved customer from the add form.
    pub fn into_customer(self) -> Customer {
        Customer::new(CustomerFields {
            id: None,
            middle_name: self.middle(),
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            notes: self.notes,
        })
    }

    /// Overwrite the mutable fields of an existing customer from the edit form.
    pub fn apply_to(self, customer: &mut Customer) {
        customer.set_middle_name(self.middle());
        customer.set_first_name(self.first_name);
        customer.set_last_name(self.last_name);
        customer.set_phone(self.phone);
        customer.set_notes(self.notes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::mock::MockGateway;
    use crate::domain::{ReservationFields, StartAt};

    fn ada(middle: Option<&str>) -> Customer {
        Customer::new(CustomerFields {
            first_name: "Ada".into(),
            middle_name: middle.map(str::to_string),
            last_name: "Lovelace".into(),
            phone: "555-0100".into(),
            ..CustomerFields::default()
        })
    }

    #[test]
    fn full_name_skips_empty_middle() {
        assert_eq!(ada(None).full_name(), "Ada Lovelace");
        assert_eq!(ada(Some("")).full_name(), "Ada Lovelace");
        assert_eq!(ada(Some("B")).full_name(), "Ada B Lovelace");
    }

    #[test]
    fn notes_are_always_a_string() {
        let mut c = ada(None);
        assert_eq!(c.notes(), "");
        c.set_notes(Some("prefers booths".into()));
        assert_eq!(c.notes(), "prefers booths");
        c.set_notes(None);
        assert_eq!(c.notes(), "");
        c.set_notes(Some(String::new()));
        assert_eq!(c.notes(), "");
    }

    #[test]
    fn id_is_write_once() {
        let mut c = ada(None);
        c.set_id(3).unwrap();
        c.set_id(3).unwrap();
        let err = c.set_id(4).unwrap_err();
        assert_eq!(err, ValidationError::Immutable { field: "id" });
        assert_eq!(c.id(), Some(3));
    }

    #[tokio::test]
    async fn save_then_get_round_trips() -> Result<(), ServiceError> {
        let gw = MockGateway::default();
        let mut c = ada(Some("B"));
        c.set_notes(Some("regular".into()));
        c.save(&gw).await?;
        let id = c.id().expect("id assigned on save");

        let loaded = Customer::get(&gw, id).await?;
        assert_eq!(loaded, c);

        c.set_phone("555-0199");
        c.save(&gw).await?;
        assert_eq!(c.id(), Some(id));
        assert_eq!(Customer::get(&gw, id).await?.phone(), "555-0199");
        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_customer_is_not_found() {
        let gw = MockGateway::default();
        let err = Customer::get(&gw, 42).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn most_recent_reservation_is_the_earliest() -> Result<(), ServiceError> {
        let gw = MockGateway::default();
        let mut c = ada(None);
        c.save(&gw).await?;
        assert!(c.most_recent_reservation(&gw).await?.is_none());

        let id = c.id().unwrap();
        for start in ["2024-05-01T19:00:00Z", "2024-04-09T13:00:00Z", "2024-06-12T20:30:00Z"] {
            let mut r = Reservation::new(ReservationFields {
                id: None,
                customer_id: id,
                num_guests: 2,
                start_at: StartAt::from(start),
                notes: None,
            })?;
            r.save(&gw).await?;
        }

        let all = c.get_reservations(&gw).await?;
        assert_eq!(all.len(), 3);
        let first = c.most_recent_reservation(&gw).await?.unwrap();
        assert_eq!(first.start_at(), &StartAt::from("2024-04-09T13:00:00Z"));
        Ok(())
    }

    #[tokio::test]
    async fn unsaved_customer_has_no_reservations() -> Result<(), ServiceError> {
        let gw = MockGateway::default();
        assert!(ada(None).get_reservations(&gw).await?.is_empty());
        Ok(())
    }

    #[test]
    fn form_blank_middle_name_is_absent() {
        let form = CustomerForm {
            first_name: "Grace".into(),
            middle_name: Some("  ".into()),
            last_name: "Hopper".into(),
            phone: "555-0101".into(),
            notes: None,
        };
        let c = form.into_customer();
        assert_eq!(c.middle_name(), None);
        assert_eq!(c.full_name(), "Grace Hopper");
        assert_eq!(c.id(), None);
    }

    #[test]
    fn form_apply_keeps_id() {
        let mut c = ada(None);
        c.set_id(8).unwrap();
        CustomerForm {
            first_name: "Augusta".into(),
            middle_name: Some("Ada".into()),
            last_name: "King".into(),
            phone: "555-0102".into(),
            notes: Some("countess".into()),
        }
        .apply_to(&mut c);
        assert_eq!(c.id(), Some(8));
        assert_eq!(c.full_name(), "Augusta Ada King");
        assert_eq!(c.notes(), "countess");
    }
}
