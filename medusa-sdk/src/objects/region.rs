use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::cart::PaymentProvider;
use super::coerce;
use super::datetime::flexible;
use super::dynamic::Metadata;
use super::null_as_default;

/// A selling region; fixes the cart currency and the available providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency_code: String,
    #[serde(default, deserialize_with = "coerce::flag")]
    pub automatic_taxes: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub countries: Vec<Country>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_providers: Option<Vec<PaymentProvider>>,
    #[serde(default, with = "flexible::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "flexible::option")]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Region {
    pub fn ships_to(&self, country_code: &str) -> bool {
        self.countries
            .iter()
            .any(|country| country.iso_2.eq_ignore_ascii_case(country_code))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub iso_2: String,
    #[serde(default)]
    pub iso_3: Option<String>,
    /// Some servers send this as a string, some as a number.
    #[serde(default, deserialize_with = "coerce::lenient_integer")]
    pub num_code: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}
