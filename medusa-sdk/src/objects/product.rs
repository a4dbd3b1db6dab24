//! Catalog entities. Dimension and inventory attributes are decoded
//! leniently since storefronts see them as numbers, strings or nothing.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::coerce;
use super::datetime::flexible;
use super::dynamic::Metadata;
use super::null_as_default;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Draft,
    Proposed,
    #[default]
    Published,
    Rejected,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default, deserialize_with = "coerce::flag")]
    pub is_giftcard: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ProductStatus,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<ProductImage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<ProductOption>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variants: Vec<ProductVariant>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<ProductCategory>,
    #[serde(default)]
    pub collection_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_integer")]
    pub weight: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_integer")]
    pub length: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_integer")]
    pub height: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_integer")]
    pub width: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_boolean")]
    pub discountable: Option<bool>,
    #[serde(default, with = "flexible::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "flexible::option")]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Product {
    /// Lowest calculated variant price, if the listing was region-priced.
    pub fn from_price(&self) -> Option<i64> {
        self.variants
            .iter()
            .filter_map(|variant| variant.calculated_price.as_ref()?.calculated_amount)
            .min()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: String,
    pub url: String,
    #[serde(default, deserialize_with = "coerce::lenient_integer")]
    pub rank: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<ProductOptionValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOptionValue {
    pub id: String,
    pub value: String,
    #[serde(default)]
    pub option_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_boolean")]
    pub allow_backorder: Option<bool>,
    #[serde(default, deserialize_with = "coerce::lenient_boolean")]
    pub manage_inventory: Option<bool>,
    #[serde(default, deserialize_with = "coerce::lenient_integer")]
    pub inventory_quantity: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_integer")]
    pub weight: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_integer")]
    pub length: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_integer")]
    pub height: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_integer")]
    pub width: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<ProductOptionValue>,
    /// Present only when the listing was requested with a region.
    #[serde(default)]
    pub calculated_price: Option<CalculatedPrice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl ProductVariant {
    /// Whether the variant can be added to a cart at the given quantity.
    pub fn can_order(&self, quantity: u32) -> bool {
        if self.manage_inventory != Some(true) || self.allow_backorder == Some(true) {
            return true;
        }
        self.inventory_quantity
            .is_some_and(|available| available >= i64::from(quantity))
    }
}

/// Region-specific price of a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedPrice {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_integer")]
    pub calculated_amount: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_integer")]
    pub original_amount: Option<i64>,
    #[serde(default)]
    pub currency_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_category_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_integer")]
    pub rank: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}
