//! The order produced by completing a cart. Read-only on the client.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::address::Address;
use super::cart::{LineItem, ShippingMethod, Totals};
use super::coerce;
use super::datetime::flexible;
use super::dynamic::Metadata;
use super::null_as_default;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Draft,
    Archived,
    Canceled,
    RequiresAction,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    NotPaid,
    Awaiting,
    Authorized,
    PartiallyAuthorized,
    Captured,
    PartiallyCaptured,
    Refunded,
    PartiallyRefunded,
    Canceled,
    RequiresAction,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    #[default]
    NotFulfilled,
    PartiallyFulfilled,
    Fulfilled,
    PartiallyShipped,
    Shipped,
    PartiallyDelivered,
    Delivered,
    Canceled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Human-facing sequential number.
    #[serde(default, deserialize_with = "coerce::lenient_integer")]
    pub display_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_status: PaymentStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fulfillment_status: FulfillmentStatus,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency_code: String,
    #[serde(default)]
    pub region_id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub billing_address: Option<Address>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shipping_methods: Vec<ShippingMethod>,
    #[serde(flatten)]
    pub totals: Totals,
    #[serde(default, with = "flexible::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Order {
    /// `#1042` style label, falling back to the raw id.
    pub fn label(&self) -> String {
        match self.display_id {
            Some(display_id) => format!("#{display_id}"),
            None => self.id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_decode_with_unknown_statuses() {
        let order: Order = serde_json::from_value(json!({
            "id": "order_01",
            "display_id": "1042",
            "status": "pending",
            "payment_status": "authorized",
            "fulfillment_status": "teleported",
            "email": "a@b.co",
            "currency_code": "eur",
            "items": [],
            "total": 3500,
            "created_at": "2025-06-28T10:15:30Z"
        }))
        .unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Authorized);
        assert_eq!(order.fulfillment_status, FulfillmentStatus::Unknown);
        assert_eq!(order.totals.total, 3500);
        assert_eq!(order.totals.shipping_total, 0);
        assert_eq!(order.label(), "#1042");
    }
}
