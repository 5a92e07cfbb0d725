use thiserror::Error;

/// Entity-level invariant violations, raised at assignment time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("party size must be at least 1")]
    PartySizeTooSmall,
    #[error("{field} is immutable")]
    Immutable { field: &'static str },
    #[error("start time is not a valid date")]
    InvalidStartAt,
    #[error("{field} must be a number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("limit {limit} is out of range")]
    LimitOutOfRange { limit: u64 },
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("No such {entity}: {id}")]
    NotFound { entity: &'static str, id: i32 },
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: i32) -> Self { Self::NotFound { entity, id } }

    /// HTTP status an adapter should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::NotFound { .. } => 404,
            ServiceError::Db(_) => 500,
        }
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(ValidationError::PartySizeTooSmall) => 1001,
            ServiceError::Validation(ValidationError::Immutable { .. }) => 1002,
            ServiceError::Validation(ValidationError::InvalidStartAt) => 1003,
            ServiceError::Validation(ValidationError::InvalidNumber { .. }) => 1004,
            ServiceError::Validation(ValidationError::LimitOutOfRange { .. }) => 1005,
            ServiceError::NotFound { .. } => 1100,
            ServiceError::Db(_) => 1200,
        }
    }

    pub fn is_not_found(&self) -> bool { matches!(self, ServiceError::NotFound { .. }) }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { ServiceError::Db(e.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_distinct_statuses() {
        let v = ServiceError::from(ValidationError::PartySizeTooSmall);
        let nf = ServiceError::not_found("reservation", 9);
        let db = ServiceError::Db("connection refused".into());
        assert_eq!(v.status_code(), 400);
        assert_eq!(nf.status_code(), 404);
        assert_eq!(db.status_code(), 500);
        assert!(nf.is_not_found());
        assert_eq!(nf.to_string(), "No such reservation: 9");
    }

    #[test]
    fn validation_messages() {
        assert_eq!(ValidationError::Immutable { field: "id" }.to_string(), "id is immutable");
        assert_eq!(
            ValidationError::Immutable { field: "customer association" }.to_string(),
            "customer association is immutable"
        );
    }
}
