//! Request bodies for the Store API.
//!
//! Optional fields are omitted when `None`. Fields the server can clear use
//! [`Patch`], so omission and explicit `null` are different requests.

use serde::{Serialize, Serializer};

use super::address::AddressInput;
use super::dynamic::Metadata;

/// Tri-state update of a nullable field.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    /// Leave the server value untouched; the field is not sent.
    #[default]
    Keep,
    /// Send an explicit `null`.
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    /// `None` clears, `Some` sets.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Patch::Set(value),
            None => Patch::Clear,
        }
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Only reachable when a field forgets `skip_serializing_if`.
            Patch::Keep | Patch::Clear => serializer.serialize_none(),
            Patch::Set(value) => serializer.serialize_some(value),
        }
    }
}

/// Body of `POST /store/carts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateCartRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<AddLineItemRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl CreateCartRequest {
    pub fn in_region(region_id: impl Into<String>) -> Self {
        Self {
            region_id: Some(region_id.into()),
            ..Self::default()
        }
    }
}

/// Body of `POST /store/carts/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateCartRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub email: Patch<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_channel_id: Option<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub shipping_address: Patch<AddressInput>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub billing_address: Patch<AddressInput>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub metadata: Patch<Metadata>,
}

impl UpdateCartRequest {
    /// True when serializing would produce `{}`.
    pub fn is_empty(&self) -> bool {
        self.region_id.is_none()
            && self.email.is_keep()
            && self.customer_id.is_none()
            && self.sales_channel_id.is_none()
            && self.shipping_address.is_keep()
            && self.billing_address.is_keep()
            && self.metadata.is_keep()
    }
}

/// Body of `POST /store/carts/{id}/line-items`, also used for the items of
/// a new cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddLineItemRequest {
    pub variant_id: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Body of `POST /store/carts/{id}/line-items/{line_id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateLineItemRequest {
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Body of `POST /store/carts/{id}/shipping-methods`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddShippingMethodRequest {
    pub option_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Metadata>,
}

/// Body of `POST /store/payment-collections`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePaymentCollectionRequest {
    pub cart_id: String,
}

/// Body of `POST /store/payment-collections/{id}/payment-sessions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitPaymentSessionRequest {
    pub provider_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Metadata>,
}

/// Body of the `/store/carts/{id}/promotions` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromoCodesRequest {
    pub promo_codes: Vec<String>,
}

/// Query of `GET /store/products`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub limit: u32,
    pub offset: u32,
    pub category_ids: Vec<String>,
    pub collection_ids: Vec<String>,
    pub region_id: Option<String>,
    pub q: Option<String>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            category_ids: Vec::new(),
            collection_ids: Vec::new(),
            region_id: None,
            q: None,
        }
    }
}

impl ProductQuery {
    /// Render as a query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut params = vec![
            format!("limit={}", self.limit),
            format!("offset={}", self.offset),
        ];
        for id in &self.category_ids {
            params.push(format!("category_id[]={}", urlencoding::encode(id)));
        }
        for id in &self.collection_ids {
            params.push(format!("collection_id[]={}", urlencoding::encode(id)));
        }
        if let Some(region_id) = &self.region_id {
            params.push(format!("region_id={}", urlencoding::encode(region_id)));
        }
        if let Some(q) = &self.q {
            params.push(format!("q={}", urlencoding::encode(q)));
        }
        params.join("&")
    }
}
