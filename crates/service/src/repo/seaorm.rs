use chrono::{DateTime, FixedOffset};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::{debug, instrument};

use models::{customer, reservation};

use crate::domain::{Customer, CustomerFields, Reservation, ReservationFields};
use crate::errors::{ServiceError, ValidationError};
use crate::repository::{checked_limit, Gateway};

/// SeaORM-backed gateway. Every call checks a connection out of the pool and
/// returns it when the call completes, on success or error.
#[derive(Clone)]
pub struct SeaOrmGateway {
    pub db: DatabaseConnection,
}

impl SeaOrmGateway {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn customer_from_row(row: customer::Model) -> Customer {
    Customer::new(CustomerFields {
        id: Some(row.id),
        first_name: row.first_name,
        middle_name: row.middle_name,
        last_name: row.last_name,
        phone: row.phone,
        notes: Some(row.notes),
    })
}

fn reservation_from_row(row: reservation::Model) -> Result<Reservation, ServiceError> {
    let reservation = Reservation::new(ReservationFields {
        id: Some(row.id),
        customer_id: row.customer_id,
        num_guests: row.num_guests,
        start_at: row.start_at.into(),
        notes: Some(row.notes),
    })?;
    Ok(reservation)
}

fn start_at_value(reservation: &Reservation) -> Result<DateTime<FixedOffset>, ServiceError> {
    reservation
        .start_at()
        .datetime()
        .map(DateTime::<FixedOffset>::from)
        .ok_or_else(|| ValidationError::InvalidStartAt.into())
}

fn stored_id(id: Option<i32>, entity: &'static str) -> Result<i32, ServiceError> {
    id.ok_or_else(|| ServiceError::Db(format!("cannot update unsaved {entity}")))
}

fn not_updated(e: DbErr, entity: &'static str, id: i32) -> ServiceError {
    match e {
        DbErr::RecordNotUpdated => ServiceError::not_found(entity, id),
        other => other.into(),
    }
}

/// `%fragment%`, lowercased, with LIKE wildcards escaped.
fn contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for ch in fragment.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn lower_like(column: customer::Column, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(pattern)
}

#[async_trait::async_trait]
impl Gateway for SeaOrmGateway {
    async fn list_customers(&self) -> Result<Vec<Customer>, ServiceError> {
        let rows = customer::Entity::find()
            .order_by_asc(customer::Column::LastName)
            .order_by_asc(customer::Column::FirstName)
            .order_by_asc(customer::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(customer_from_row).collect())
    }

    async fn get_customer(&self, id: i32) -> Result<Customer, ServiceError> {
        customer::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(customer_from_row)
            .ok_or_else(|| ServiceError::not_found("customer", id))
    }

    #[instrument(skip(self))]
    async fn find_customers_by_name(&self, fragment: &str) -> Result<Vec<Customer>, ServiceError> {
        let pattern = contains_pattern(fragment);
        let rows = customer::Entity::find()
            .filter(
                Condition::any()
                    .add(lower_like(customer::Column::FirstName, &pattern))
                    .add(lower_like(customer::Column::MiddleName, &pattern))
                    .add(lower_like(customer::Column::LastName, &pattern)),
            )
            .order_by_asc(customer::Column::LastName)
            .order_by_asc(customer::Column::FirstName)
            .order_by_asc(customer::Column::Id)
            .all(&self.db)
            .await?;
        debug!(matches = rows.len(), "customer search");
        Ok(rows.into_iter().map(customer_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn top_customers_by_reservation_count(&self, limit: u64) -> Result<Vec<Customer>, ServiceError> {
        let limit = checked_limit(limit)?;
        let reservation_count =
            SimpleExpr::from(Func::count(Expr::col((reservation::Entity, reservation::Column::Id))));
        let rows = customer::Entity::find()
            .inner_join(reservation::Entity)
            .group_by(customer::Column::Id)
            .order_by_desc(reservation_count)
            .order_by_asc(customer::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(customer_from_row).collect())
    }

    #[instrument(skip_all)]
    async fn insert_customer(&self, c: &Customer) -> Result<i32, ServiceError> {
        let am = customer::ActiveModel {
            id: NotSet,
            first_name: Set(c.first_name().to_string()),
            middle_name: Set(c.middle_name().map(str::to_string)),
            last_name: Set(c.last_name().to_string()),
            phone: Set(c.phone().to_string()),
            notes: Set(c.notes().to_string()),
        };
        let row = am.insert(&self.db).await?;
        Ok(row.id)
    }

    #[instrument(skip_all, fields(customer_id = ?c.id()))]
    async fn update_customer(&self, c: &Customer) -> Result<(), ServiceError> {
        let id = stored_id(c.id(), "customer")?;
        let am = customer::ActiveModel {
            id: Unchanged(id),
            first_name: Set(c.first_name().to_string()),
            middle_name: Set(c.middle_name().map(str::to_string)),
            last_name: Set(c.last_name().to_string()),
            phone: Set(c.phone().to_string()),
            notes: Set(c.notes().to_string()),
        };
        am.update(&self.db).await.map_err(|e| not_updated(e, "customer", id))?;
        Ok(())
    }

    async fn list_reservations_for_customer(&self, customer_id: i32) -> Result<Vec<Reservation>, ServiceError> {
        reservation::Entity::find()
            .filter(reservation::Column::CustomerId.eq(customer_id))
            .order_by_asc(reservation::Column::StartAt)
            .order_by_asc(reservation::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(reservation_from_row)
            .collect()
    }

    async fn get_reservation(&self, id: i32) -> Result<Reservation, ServiceError> {
        let row = reservation::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("reservation", id))?;
        reservation_from_row(row)
    }

    #[instrument(skip_all, fields(customer_id = r.customer_id()))]
    async fn insert_reservation(&self, r: &Reservation) -> Result<i32, ServiceError> {
        let am = reservation::ActiveModel {
            id: NotSet,
            customer_id: Set(r.customer_id()),
            start_at: Set(start_at_value(r)?),
            num_guests: Set(r.num_guests()),
            notes: Set(r.notes().to_string()),
        };
        let row = am.insert(&self.db).await?;
        Ok(row.id)
    }

    #[instrument(skip_all, fields(reservation_id = ?r.id()))]
    async fn update_reservation(&self, r: &Reservation) -> Result<(), ServiceError> {
        let id = stored_id(r.id(), "reservation")?;
        let am = reservation::ActiveModel {
            id: Unchanged(id),
            customer_id: Set(r.customer_id()),
            start_at: Set(start_at_value(r)?),
            num_guests: Set(r.num_guests()),
            notes: Set(r.notes().to_string()),
        };
        am.update(&self.db).await.map_err(|e| not_updated(e, "reservation", id))?;
        Ok(())
    }
}
