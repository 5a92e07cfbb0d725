use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::{Customer, Reservation};
use crate::errors::ServiceError;
use crate::repository::{Gateway, DEFAULT_TOP_LIMIT};

/// A customer as shown in listings, with the reservation the listing highlights.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CustomerSummary {
    pub customer: Customer,
    pub full_name: String,
    /// Earliest reservation of the customer, see [`Customer::most_recent_reservation`].
    pub most_recent_reservation: Option<Reservation>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CustomerDetail {
    pub customer: Customer,
    pub full_name: String,
    pub reservations: Vec<Reservation>,
}

/// A reservation together with the customer who booked it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReservationDetail {
    pub reservation: Reservation,
    pub formatted_start_at: String,
    pub customer: Customer,
    pub customer_name: String,
}

/// Read-side queries over customers, independent of any presentation layer.
pub struct CustomerDirectory<G: Gateway> {
    gateway: Arc<G>,
    top_limit: u64,
}

impl<G: Gateway> CustomerDirectory<G> {
    pub fn new(gateway: Arc<G>) -> Self { Self { gateway, top_limit: DEFAULT_TOP_LIMIT } }

    pub fn with_top_limit(gateway: Arc<G>, top_limit: u64) -> Self { Self { gateway, top_limit } }

    pub fn gateway(&self) -> &G { &self.gateway }

    async fn summarize(&self, customers: Vec<Customer>) -> Result<Vec<CustomerSummary>, ServiceError> {
        let mut out = Vec::with_capacity(customers.len());
        for customer in customers {
            let most_recent_reservation = customer.most_recent_reservation(self.gateway.as_ref()).await?;
            out.push(CustomerSummary { full_name: customer.full_name(), customer, most_recent_reservation });
        }
        Ok(out)
    }

    /// Every customer, ordered by name.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::directory::CustomerDirectory;
    /// use service::domain::CustomerForm;
    /// use service::repository::mock::MockGateway;
    /// let gw = Arc::new(MockGateway::default());
    /// let mut c = CustomerForm { first_name: "Ada".into(), last_name: "Lovelace".into(), phone: "555-0100".into(), ..Default::default() }.into_customer();
    /// tokio_test::block_on(c.save(gw.as_ref())).unwrap();
    /// let dir = CustomerDirectory::new(gw);
    /// let listed = tokio_test::block_on(dir.list()).unwrap();
    /// assert_eq!(listed[0].full_name, "Ada Lovelace");
    /// assert!(listed[0].most_recent_reservation.is_none());
    /// ```
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<CustomerSummary>, ServiceError> {
        let customers = Customer::all(self.gateway.as_ref()).await?;
        self.summarize(customers).await
    }

    #[instrument(skip(self))]
    pub async fn search(&self, name: &str) -> Result<Vec<CustomerSummary>, ServiceError> {
        let customers = Customer::find(self.gateway.as_ref(), name).await?;
        debug!(matches = customers.len(), "customer search");
        self.summarize(customers).await
    }

    /// Customers with the most reservations, at most the configured limit.
    #[instrument(skip(self), fields(limit = self.top_limit))]
    pub async fn best_customers(&self) -> Result<Vec<CustomerSummary>, ServiceError> {
        let customers = self.gateway.top_customers_by_reservation_count(self.top_limit).await?;
        self.summarize(customers).await
    }

    #[instrument(skip(self))]
    pub async fn detail(&self, id: i32) -> Result<CustomerDetail, ServiceError> {
        let customer = Customer::get(self.gateway.as_ref(), id).await?;
        let reservations = customer.get_reservations(self.gateway.as_ref()).await?;
        Ok(CustomerDetail { full_name: customer.full_name(), customer, reservations })
    }

    #[instrument(skip(self))]
    pub async fn reservation_detail(&self, id: i32) -> Result<ReservationDetail, ServiceError> {
        let reservation = Reservation::get(self.gateway.as_ref(), id).await?;
        let customer = Customer::get(self.gateway.as_ref(), reservation.customer_id()).await?;
        Ok(ReservationDetail {
            formatted_start_at: reservation.formatted_start_at(),
            reservation,
            customer_name: customer.full_name(),
            customer,
        })
    }
}
