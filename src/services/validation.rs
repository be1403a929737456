use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

use crate::error::ApiError;

pub const MAX_TEXT_LENGTH: usize = 255;

/// Exclusive upper bound for money amounts, matching `NUMERIC(14, 2)`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

const REQUIRED: &str = "This field is required";

/// Collects per-field problems so one response can report all of them.
#[derive(Debug, Default)]
pub struct FieldErrors {
    fields: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Trimmed, non-blank text.
    pub fn required_text(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim) {
            None | Some("") => {
                self.add(field, REQUIRED);
                None
            }
            Some(text) => self.bounded(field, text),
        }
    }

    /// Absent is fine; present must be non-blank.
    pub fn optional_text(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim) {
            None => None,
            Some("") => {
                self.add(field, "Must not be blank");
                None
            }
            Some(text) => self.bounded(field, text),
        }
    }

    fn bounded(&mut self, field: &str, text: &str) -> Option<String> {
        if text.chars().count() > MAX_TEXT_LENGTH {
            self.add(field, format!("Must be at most {} characters", MAX_TEXT_LENGTH));
            None
        } else {
            Some(text.to_string())
        }
    }

    pub fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, REQUIRED);
        }
        value
    }

    /// Money amount: zero or more, below `MAX_AMOUNT`, kept to exactly two
    /// decimal places.
    pub fn amount(&mut self, field: &str, value: Option<Decimal>) -> Option<Decimal> {
        let value = value?;
        if value < Decimal::ZERO {
            self.add(field, "Must be zero or greater");
            return None;
        }
        let mut value = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if value >= MAX_AMOUNT {
            self.add(field, format!("Must be less than {}", MAX_AMOUNT));
            return None;
        }
        value.rescale(2);
        Some(value)
    }

    pub fn count(&mut self, field: &str, value: Option<i64>) -> Option<i64> {
        let value = value?;
        if value < 0 {
            self.add(field, "Must be zero or greater");
            return None;
        }
        Some(value)
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        let email = self.required_text(field, value)?;
        let valid = email
            .split_once('@')
            .map_or(false, |(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid || email.contains(char::is_whitespace) {
            self.add(field, "Must be a valid email address");
            return None;
        }
        Some(email.to_lowercase())
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation("Validation failed", Some(self.fields)))
        }
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
/// Use together with `#[serde(default)]`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
