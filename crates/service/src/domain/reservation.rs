use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use super::{assign_once, normalize_notes};
use crate::errors::{ServiceError, ValidationError};
use crate::repository::Gateway;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Reservation start time.
///
/// Every input coerces to a value; input that is not a recognisable timestamp
/// becomes [`StartAt::Invalid`], which renders as `"Invalid date"` and cannot be saved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StartAt {
    At(DateTime<Utc>),
    Invalid,
}

impl StartAt {
    /// Parse RFC 3339, `YYYY-MM-DD[T ]HH:MM[:SS]` (taken as UTC) or a bare date (midnight UTC).
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return dt.into();
        }
        for pattern in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(input, pattern) {
                return naive.into();
            }
        }
        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map_or(StartAt::Invalid, StartAt::from)
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            StartAt::At(dt) => Some(*dt),
            StartAt::Invalid => None,
        }
    }

    pub fn is_valid(&self) -> bool { matches!(self, StartAt::At(_)) }

    /// Human-readable rendering such as `April 9th 2024, 1:00 pm` (UTC).
    pub fn formatted(&self) -> String {
        match self {
            StartAt::At(dt) => format!(
                "{} {}{} {}",
                dt.format("%B"),
                dt.day(),
                ordinal_suffix(dt.day()),
                dt.format("%Y, %-I:%M %P"),
            ),
            StartAt::Invalid => "Invalid date".to_string(),
        }
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

impl fmt::Display for StartAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.formatted()) }
}

impl From<&str> for StartAt {
    fn from(value: &str) -> Self { StartAt::parse(value) }
}

impl From<String> for StartAt {
    fn from(value: String) -> Self { StartAt::parse(&value) }
}

impl From<DateTime<Utc>> for StartAt {
    fn from(value: DateTime<Utc>) -> Self { StartAt::At(value) }
}

impl From<DateTime<FixedOffset>> for StartAt {
    fn from(value: DateTime<FixedOffset>) -> Self { StartAt::At(value.with_timezone(&Utc)) }
}

impl From<NaiveDateTime> for StartAt {
    fn from(value: NaiveDateTime) -> Self { StartAt::At(Utc.from_utc_datetime(&value)) }
}

impl Serialize for StartAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.datetime().serialize(serializer)
    }
}

/// A reservation for a party.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Reservation {
    id: Option<i32>,
    customer_id: i32,
    num_guests: i32,
    start_at: StartAt,
    notes: String,
}

#[derive(Clone, Debug)]
pub struct ReservationFields {
    pub id: Option<i32>,
    pub customer_id: i32,
    pub num_guests: i32,
    pub start_at: StartAt,
    pub notes: Option<String>,
}

impl Reservation {
    /// Build a reservation; the party size check runs here too.
    pub fn new(fields: ReservationFields) -> Result<Self, ValidationError> {
        let mut reservation = Self {
            id: fields.id,
            customer_id: fields.customer_id,
            num_guests: 1,
            start_at: fields.start_at,
            notes: normalize_notes(fields.notes),
        };
        reservation.set_num_guests(fields.num_guests)?;
        Ok(reservation)
    }

    pub fn id(&self) -> Option<i32> { self.id }
    pub fn customer_id(&self) -> i32 { self.customer_id }
    pub fn num_guests(&self) -> i32 { self.num_guests }
    pub fn start_at(&self) -> &StartAt { &self.start_at }
    pub fn notes(&self) -> &str { &self.notes }

    pub fn set_id(&mut self, id: i32) -> Result<(), ValidationError> {
        assign_once(&mut self.id, id, "id")
    }

    /// The owning customer never changes; re-assigning the same id is a no-op.
    pub fn set_customer_id(&mut self, customer_id: i32) -> Result<(), ValidationError> {
        if self.customer_id != customer_id {
            return Err(ValidationError::Immutable { field: "customer association" });
        }
        Ok(())
    }

    pub fn set_num_guests(&mut self, num_guests: i32) -> Result<(), ValidationError> {
        if num_guests < 1 {
            return Err(ValidationError::PartySizeTooSmall);
        }
        self.num_guests = num_guests;
        Ok(())
    }

    pub fn set_start_at(&mut self, start_at: impl Into<StartAt>) { self.start_at = start_at.into(); }

    pub fn set_notes(&mut self, notes: Option<String>) { self.notes = normalize_notes(notes); }

    pub fn formatted_start_at(&self) -> String { self.start_at.formatted() }

    pub async fn get<G: Gateway + ?Sized>(gateway: &G, id: i32) -> Result<Reservation, ServiceError> {
        gateway.get_reservation(id).await
    }

    /// Reservations of one customer, earliest first.
    pub async fn get_reservations_for_customer<G: Gateway + ?Sized>(
        gateway: &G,
        customer_id: i32,
    ) -> Result<Vec<Reservation>, ServiceError> {
        gateway.list_reservations_for_customer(customer_id).await
    }

    /// Insert when unsaved (adopting the generated id), otherwise update the stored row.
    pub async fn save<G: Gateway + ?Sized>(&mut self, gateway: &G) -> Result<(), ServiceError> {
        if !self.start_at.is_valid() {
            return Err(ValidationError::InvalidStartAt.into());
        }
        match self.id {
            None => {
                let id = gateway.insert_reservation(self).await?;
                self.set_id(id)?;
                debug!(reservation_id = id, customer_id = self.customer_id, "reservation inserted");
            }
            Some(id) => {
                gateway.update_reservation(self).await?;
                debug!(reservation_id = id, customer_id = self.customer_id, "reservation updated");
            }
        }
        Ok(())
    }
}

/// Raw reservation form values as submitted by the presentation layer.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReservationForm {
    pub start_at: String,
    pub num_guests: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ReservationForm {
    fn parsed_num_guests(&self) -> Result<i32, ValidationError> {
        self.num_guests.trim().parse().map_err(|_| ValidationError::InvalidNumber {
            field: "num_guests",
            value: self.num_guests.clone(),
        })
    }

    /// New, unsaved reservation for `customer_id`.
    pub fn into_reservation(self, customer_id: i32) -> Result<Reservation, ValidationError> {
        let num_guests = self.parsed_num_guests()?;
        Reservation::new(ReservationFields {
            id: None,
            customer_id,
            num_guests,
            start_at: StartAt::parse(&self.start_at),
            notes: self.notes,
        })
    }

    /// Update start time, party size and notes; on error the reservation is left untouched.
    pub fn apply_to(self, reservation: &mut Reservation) -> Result<(), ValidationError> {
        let num_guests = self.parsed_num_guests()?;
        reservation.set_num_guests(num_guests)?;
        reservation.set_start_at(self.start_at.as_str());
        reservation.set_notes(self.notes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Customer, CustomerFields};
    use crate::repository::mock::MockGateway;

    /// Gateway holding a single customer with id 1.
    async fn seeded() -> MockGateway {
        let gw = MockGateway::default();
        let mut c = Customer::new(CustomerFields {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            ..CustomerFields::default()
        });
        c.save(&gw).await.unwrap();
        assert_eq!(c.id(), Some(1));
        gw
    }

    fn fields(num_guests: i32) -> ReservationFields {
        ReservationFields {
            id: None,
            customer_id: 1,
            num_guests,
            start_at: StartAt::from("2024-04-09T13:00:00Z"),
            notes: None,
        }
    }

    #[test]
    fn party_size_below_one_is_rejected() {
        for n in [0, -1, -100, i32::MIN] {
            assert_eq!(Reservation::new(fields(n)).unwrap_err(), ValidationError::PartySizeTooSmall);
        }
        let mut r = Reservation::new(fields(2)).unwrap();
        assert_eq!(r.set_num_guests(0).unwrap_err(), ValidationError::PartySizeTooSmall);
        assert_eq!(r.num_guests(), 2);
    }

    #[test]
    fn party_size_of_one_or_more_round_trips() {
        for n in [1, 2, 12, 500] {
            assert_eq!(Reservation::new(fields(n)).unwrap().num_guests(), n);
        }
    }

    #[test]
    fn customer_association_is_immutable() {
        let mut r = Reservation::new(fields(2)).unwrap();
        assert!(r.set_customer_id(1).is_ok());
        let err = r.set_customer_id(2).unwrap_err();
        assert_eq!(err, ValidationError::Immutable { field: "customer association" });
        assert_eq!(err.to_string(), "customer association is immutable");
        assert_eq!(r.customer_id(), 1);
    }

    #[test]
    fn id_is_write_once() {
        let mut r = Reservation::new(ReservationFields { id: Some(7), ..fields(2) }).unwrap();
        assert!(r.set_id(7).is_ok());
        assert_eq!(r.set_id(8).unwrap_err(), ValidationError::Immutable { field: "id" });
        assert_eq!(r.id(), Some(7));
    }

    #[test]
    fn notes_are_normalized() {
        let mut r = Reservation::new(fields(2)).unwrap();
        assert_eq!(r.notes(), "");
        r.set_notes(Some("birthday".into()));
        assert_eq!(r.notes(), "birthday");
        r.set_notes(Some(String::new()));
        assert_eq!(r.notes(), "");
    }

    #[test]
    fn start_at_coerces_common_inputs() {
        let expected = Utc.with_ymd_and_hms(2024, 4, 9, 13, 0, 0).unwrap();
        for input in [
            "2024-04-09T13:00:00Z",
            "2024-04-09T15:00:00+02:00",
            "2024-04-09T13:00",
            "2024-04-09 13:00:00",
            " 2024-04-09 13:00 ",
        ] {
            assert_eq!(StartAt::parse(input), StartAt::At(expected), "input {input:?}");
        }
        assert_eq!(
            StartAt::parse("2024-04-09").datetime(),
            Some(Utc.with_ymd_and_hms(2024, 4, 9, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn garbage_start_at_is_invalid_not_an_error() {
        let mut r = Reservation::new(fields(2)).unwrap();
        r.set_start_at("next tuesday-ish");
        assert_eq!(r.start_at(), &StartAt::Invalid);
        assert_eq!(r.formatted_start_at(), "Invalid date");
    }

    #[test]
    fn formats_like_a_calendar() {
        let r = Reservation::new(fields(2)).unwrap();
        assert_eq!(r.formatted_start_at(), "April 9th 2024, 1:00 pm");

        let cases = [
            ("2024-01-01T09:05:00Z", "January 1st 2024, 9:05 am"),
            ("2024-03-02T00:30:00Z", "March 2nd 2024, 12:30 am"),
            ("2024-05-03T12:00:00Z", "May 3rd 2024, 12:00 pm"),
            ("2024-06-11T18:45:00Z", "June 11th 2024, 6:45 pm"),
            ("2024-07-12T18:45:00Z", "July 12th 2024, 6:45 pm"),
            ("2024-08-13T18:45:00Z", "August 13th 2024, 6:45 pm"),
            ("2024-09-21T18:45:00Z", "September 21st 2024, 6:45 pm"),
            ("2024-10-22T18:45:00Z", "October 22nd 2024, 6:45 pm"),
            ("2024-12-23T23:59:00Z", "December 23rd 2024, 11:59 pm"),
        ];
        for (input, expected) in cases {
            assert_eq!(StartAt::from(input).formatted(), expected);
        }
    }

    #[tokio::test]
    async fn save_then_get_round_trips() -> Result<(), ServiceError> {
        let gw = seeded().await;
        let mut r = Reservation::new(ReservationFields { notes: Some("patio".into()), ..fields(4) })?;
        r.save(&gw).await?;
        let id = r.id().expect("id assigned on save");
        assert_eq!(Reservation::get(&gw, id).await?, r);

        r.set_num_guests(6)?;
        r.save(&gw).await?;
        assert_eq!(r.id(), Some(id));
        assert_eq!(Reservation::get(&gw, id).await?.num_guests(), 6);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_start_at_cannot_be_saved() {
        let gw = seeded().await;
        let mut r = Reservation::new(fields(2)).unwrap();
        r.set_start_at("not a date");
        let err = r.save(&gw).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ValidationError::InvalidStartAt)));
        assert_eq!(r.id(), None);
    }

    #[tokio::test]
    async fn unknown_customer_is_rejected_by_the_store() {
        let gw = seeded().await;
        let mut r = Reservation::new(ReservationFields { customer_id: 99, ..fields(2) }).unwrap();
        assert!(matches!(r.save(&gw).await, Err(ServiceError::Db(_))));
    }

    #[tokio::test]
    async fn get_unknown_reservation_is_not_found() {
        let gw = MockGateway::default();
        let err = Reservation::get(&gw, 404).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "reservation", id: 404 }));
    }

    #[test]
    fn form_builds_and_updates() {
        let form = ReservationForm {
            start_at: "2024-04-09T13:00".into(),
            num_guests: " 3 ".into(),
            notes: None,
        };
        let mut r = form.into_reservation(5).unwrap();
        assert_eq!(r.customer_id(), 5);
        assert_eq!(r.num_guests(), 3);
        assert_eq!(r.formatted_start_at(), "April 9th 2024, 1:00 pm");

        let bad = ReservationForm { start_at: "2024-05-01 19:00".into(), num_guests: "0".into(), notes: None };
        assert_eq!(bad.apply_to(&mut r).unwrap_err(), ValidationError::PartySizeTooSmall);
        assert_eq!(r.num_guests(), 3);

        let nan = ReservationForm { num_guests: "lots".into(), ..ReservationForm::default() };
        assert!(matches!(nan.into_reservation(5), Err(ValidationError::InvalidNumber { .. })));
    }
}
