use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Optional constraints for a property search.
///
/// Every field is independent; `None` means "no constraint". Prices are given
/// in major currency units and converted to cents by [`PropertyFilter::minimum_price_cents`]
/// and [`PropertyFilter::maximum_price_cents`].
///
/// Numeric fields accept either numbers or strings, and a blank string counts
/// as absent, so a submitted search form can be deserialized as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyFilter {
    /// Substring of the city name.
    pub city: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub owner_id: Option<i32>,
    #[serde(deserialize_with = "blank_as_none")]
    pub minimum_price_per_night: Option<Decimal>,
    #[serde(deserialize_with = "blank_as_none")]
    pub maximum_price_per_night: Option<Decimal>,
    /// Lower bound on the average review rating.
    #[serde(deserialize_with = "blank_as_none")]
    pub minimum_rating: Option<f64>,
}

impl PropertyFilter {
    /// The city constraint, if one was given. Blank input counts as absent.
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|city| !city.is_empty())
    }

    /// The `LIKE` pattern matching any city containing the requested text.
    pub fn city_pattern(&self) -> Option<String> {
        self.city().map(|city| format!("%{city}%"))
    }

    pub fn minimum_price_cents(&self) -> Option<i64> {
        self.minimum_price_per_night.map(to_cents)
    }

    pub fn maximum_price_cents(&self) -> Option<i64> {
        self.maximum_price_per_night.map(to_cents)
    }

    /// True when no constraint at all is set.
    pub fn is_empty(&self) -> bool {
        self.city().is_none()
            && self.owner_id.is_none()
            && self.minimum_price_per_night.is_none()
            && self.maximum_price_per_night.is_none()
            && self.minimum_rating.is_none()
    }
}

/// Converts a major-unit amount to whole cents, rounding half away from zero.
/// Amounts outside the `i64` range saturate.
fn to_cents(amount: Decimal) -> i64 {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|cents| cents.to_i64())
        .unwrap_or(if amount.is_sign_negative() { i64::MIN } else { i64::MAX })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FormValue<T> {
    Value(T),
    Text(String),
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    match Option::<FormValue<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FormValue::Value(value)) => Ok(Some(value)),
        Some(FormValue::Text(text)) => match text.trim() {
            "" => Ok(None),
            text => text.parse().map(Some).map_err(de::Error::custom),
        },
    }
}
