use serde::{Deserialize, Serialize};

use super::coerce;
use super::dynamic::Metadata;
use super::null_as_default;

/// How the price of a shipping option is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    #[default]
    Flat,
    Calculated,
    #[serde(other)]
    Unknown,
}

/// A fulfillment option the cart is eligible for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingOption {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price_type: PriceType,
    /// Price in minor units; calculated options may not carry one until
    /// the provider has priced them.
    #[serde(default, deserialize_with = "coerce::strict_integer")]
    pub amount: Option<i64>,
    #[serde(default, deserialize_with = "coerce::flag")]
    pub is_tax_inclusive: bool,
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub service_zone_id: Option<String>,
    #[serde(default)]
    pub shipping_profile_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}
