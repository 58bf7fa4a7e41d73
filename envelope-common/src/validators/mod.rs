use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;

use crate::money::Money;
use crate::month::{MAX_YEAR, MIN_YEAR};

pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_NOTE_LENGTH: usize = 4096;
/// Amounts must be strictly smaller than this in magnitude, which keeps every sum the
/// calculators take far from the decimal type's limit.
pub const AMOUNT_LIMIT: i64 = 1_000_000_000_000_000;

#[derive(Debug, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid(String),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        match &self {
            Validity::Valid => true,
            Validity::Invalid(_) => false,
        }
    }

    /// Returns the first invalid result, or `Valid` if there is none.
    pub fn all<I: IntoIterator<Item = Validity>>(checks: I) -> Validity {
        checks
            .into_iter()
            .find(|v| !v.is_valid())
            .unwrap_or(Validity::Valid)
    }
}

pub fn validate_name(name: &str) -> Validity {
    if name.trim().is_empty() {
        return Validity::Invalid(String::from("Name cannot be blank."));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Validity::Invalid(format!(
            "Name cannot be longer than {MAX_NAME_LENGTH} characters."
        ));
    }

    Validity::Valid
}

pub fn validate_note(note: &str) -> Validity {
    if note.chars().count() > MAX_NOTE_LENGTH {
        return Validity::Invalid(format!(
            "Note cannot be longer than {MAX_NOTE_LENGTH} characters."
        ));
    }

    Validity::Valid
}

pub fn validate_transaction_amount(amount: &Money) -> Validity {
    if !amount.is_positive() {
        return Validity::Invalid(String::from(
            "Transaction amount must be greater than zero.",
        ));
    }

    validate_amount_limit(amount)
}

pub fn validate_allocation_amount(amount: &Money) -> Validity {
    validate_amount_limit(amount)
}

fn validate_amount_limit(amount: &Money) -> Validity {
    if amount.amount().abs() >= Decimal::from(AMOUNT_LIMIT) {
        return Validity::Invalid(format!(
            "Amount must be smaller than {AMOUNT_LIMIT} in magnitude."
        ));
    }

    Validity::Valid
}

pub fn validate_allocation_year(year: i32) -> Validity {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Validity::Invalid(format!(
            "Year must be between {MIN_YEAR} and {MAX_YEAR}."
        ));
    }

    Validity::Valid
}

pub fn validate_date(date: &DateTime<Utc>) -> Validity {
    if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        return Validity::Invalid(format!(
            "Dates must fall between the years {MIN_YEAR} and {MAX_YEAR}."
        ));
    }

    Validity::Valid
}

pub fn validate_allocation_month(month: i16) -> Validity {
    if !(1..=12).contains(&month) {
        return Validity::Invalid(String::from("Month must be between 1 and 12."));
    }

    Validity::Valid
}

pub fn validate_distinct_accounts(source: uuid::Uuid, destination: uuid::Uuid) -> Validity {
    if source == destination {
        return Validity::Invalid(String::from(
            "Source and destination accounts must be different.",
        ));
    }

    Validity::Valid
}
