//! The cart resource and its nested entities.
//!
//! Every computed amount is optional on the wire and decodes to `0` when the
//! server leaves it out. Amounts are integers in the currency's minor unit.
//! The client never recomputes totals; the only derived value is
//! [`LineItem::total`], which falls back to `unit_price × quantity` when the
//! server omits the line total.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::address::Address;
use super::coerce;
use super::datetime::flexible;
use super::dynamic::Metadata;
use super::null_as_default;
use super::region::Region;

/// Server-computed totals shared by carts and orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    #[serde(default, deserialize_with = "coerce::amount")]
    pub total: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub subtotal: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub tax_total: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub discount_total: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub discount_subtotal: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub discount_tax_total: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub original_total: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub original_tax_total: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub item_total: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub item_subtotal: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub item_tax_total: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub original_item_total: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub original_item_subtotal: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub original_item_tax_total: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub shipping_total: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub shipping_subtotal: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub shipping_tax_total: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub original_shipping_total: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub original_shipping_subtotal: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub original_shipping_tax_total: i64,
}

/// The central checkout resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency_code: String,
    #[serde(default)]
    pub region_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub sales_channel_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub billing_address: Option<Address>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shipping_methods: Vec<ShippingMethod>,
    #[serde(default)]
    pub payment_collection: Option<PaymentCollection>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub promotions: Vec<Promotion>,
    #[serde(flatten)]
    pub totals: Totals,
    #[serde(default, with = "flexible::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "flexible::option")]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(default, with = "flexible::option")]
    pub completed_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Cart {
    pub fn item(&self, line_item_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == line_item_id)
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    /// Sum of item quantities.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// The payment session the server currently treats as selected.
    ///
    /// Store API v2 keeps one live session per provider choice in the
    /// payment collection; a session counts unless it was explicitly
    /// deselected (`is_selected: false`) or is canceled / errored.
    pub fn selected_payment_session(&self) -> Option<&PaymentSession> {
        self.payment_collection
            .as_ref()?
            .payment_sessions
            .iter()
            .find(|session| session.is_selected.unwrap_or(true) && session.status.is_live())
    }

    /// Codes of the promotions currently applied.
    pub fn promo_codes(&self) -> Vec<&str> {
        self.promotions
            .iter()
            .filter_map(|promotion| promotion.code.as_deref())
            .collect()
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// One variant + quantity entry within a cart or order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    #[serde(default)]
    pub cart_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_title: Option<String>,
    #[serde(deserialize_with = "coerce::amount")]
    pub quantity: i64,
    #[serde(deserialize_with = "coerce::amount")]
    pub unit_price: i64,
    #[serde(default, deserialize_with = "coerce::strict_integer")]
    pub compare_at_unit_price: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_boolean")]
    pub requires_shipping: Option<bool>,
    #[serde(default, deserialize_with = "coerce::flag")]
    pub is_tax_inclusive: bool,
    /// Line total as reported by the server, if it reported one.
    #[serde(
        rename = "total",
        default,
        deserialize_with = "coerce::strict_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub reported_total: Option<i64>,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub subtotal: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub tax_total: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub discount_total: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub original_total: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tax_lines: Vec<TaxLine>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub adjustments: Vec<Adjustment>,
    #[serde(default, with = "flexible::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "flexible::option")]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl LineItem {
    /// Line total: the server's figure, else `unit_price × quantity`.
    pub fn total(&self) -> i64 {
        self.reported_total
            .unwrap_or_else(|| self.unit_price.saturating_mul(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxLine {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Percentage, not money.
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub total: i64,
}

/// A promotion adjustment applied to a line item or shipping method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub promotion_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub amount: i64,
}

/// A fulfillment option attached to the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingMethod {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub shipping_option_id: Option<String>,
    #[serde(default, alias = "price", deserialize_with = "coerce::amount")]
    pub amount: i64,
    #[serde(default, deserialize_with = "coerce::flag")]
    pub is_tax_inclusive: bool,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub total: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub subtotal: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub tax_total: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Metadata,
    #[serde(default, deserialize_with = "null_as_default")]
    pub adjustments: Vec<Adjustment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Groups the payment sessions opened for a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCollection {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency_code: String,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub amount: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_sessions: Vec<PaymentSession>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_providers: Vec<PaymentProvider>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentSessionStatus {
    #[default]
    Pending,
    Authorized,
    Captured,
    RequiresMore,
    Error,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl PaymentSessionStatus {
    /// The session can still be used to pay.
    pub fn is_live(&self) -> bool {
        !matches!(self, PaymentSessionStatus::Error | PaymentSessionStatus::Canceled)
    }
}

/// A payment provider session proposed for the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSession {
    pub id: String,
    pub provider_id: String,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub amount: i64,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: PaymentSessionStatus,
    /// Provider-specific opaque payload (client secrets and the like).
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Metadata,
    /// Only sent by older servers.
    #[serde(
        default,
        deserialize_with = "coerce::lenient_boolean",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_selected: Option<bool>,
    #[serde(default, with = "flexible::option")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentProvider {
    pub id: String,
    #[serde(
        default,
        alias = "is_installed",
        deserialize_with = "coerce::lenient_boolean"
    )]
    pub is_enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "coerce::flag")]
    pub is_automatic: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_cart() -> serde_json::Value {
        json!({
            "id": "cart_01",
            "currency_code": "eur",
            "region_id": "reg_01",
            "items": [{
                "id": "item_01",
                "title": "Mug",
                "variant_id": "variant_01",
                "quantity": 2,
                "unit_price": 1500
            }],
            "created_at": "2025-06-28T10:15:30.123Z",
            "metadata": { "source": "ios", "attempt": 1 }
        })
    }

    #[test]
    fn test_missing_totals_decode_as_zero() {
        let cart: Cart = serde_json::from_value(minimal_cart()).unwrap();
        assert_eq!(cart.totals.tax_total, 0);
        assert_eq!(cart.totals.total, 0);
        assert_eq!(cart.totals.discount_subtotal, 0);
        assert!(cart.shipping_methods.is_empty());
        assert!(cart.payment_collection.is_none());
    }

    #[test]
    fn test_line_total_fallback_is_consistent() {
        let cart: Cart = serde_json::from_value(minimal_cart()).unwrap();
        let item = cart.item("item_01").unwrap();
        assert_eq!(item.reported_total, None);
        assert_eq!(item.total(), 3000);

        let mut value = minimal_cart();
        value["items"][0]["total"] = json!(2700);
        let cart: Cart = serde_json::from_value(value).unwrap();
        assert_eq!(cart.items[0].total(), 2700);
    }

    #[test]
    fn test_reported_totals_are_kept_verbatim() {
        let mut value = minimal_cart();
        value["total"] = json!(3350);
        value["tax_total"] = json!(350);
        value["shipping_total"] = json!("500");
        let cart: Cart = serde_json::from_value(value).unwrap();
        assert_eq!(cart.totals.total, 3350);
        assert_eq!(cart.totals.tax_total, 350);
        assert_eq!(cart.totals.shipping_total, 500);
    }

    #[test]
    fn test_null_collections_decode_as_empty() {
        let mut value = minimal_cart();
        value["items"] = json!(null);
        value["promotions"] = json!(null);
        let cart: Cart = serde_json::from_value(value).unwrap();
        assert!(!cart.has_items());
        assert!(cart.promo_codes().is_empty());
    }

    #[test]
    fn test_cart_round_trip_keeps_metadata() {
        let cart: Cart = serde_json::from_value(minimal_cart()).unwrap();
        let encoded = serde_json::to_value(&cart).unwrap();
        assert_eq!(encoded["metadata"], json!({ "source": "ios", "attempt": 1 }));
        assert_eq!(encoded["items"][0]["variant_id"], json!("variant_01"));
        let decoded: Cart = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, cart);
    }

    #[test]
    fn test_selected_payment_session() {
        let mut value = minimal_cart();
        value["payment_collection"] = json!({
            "id": "paycol_01",
            "currency_code": "eur",
            "amount": 3000,
            "payment_sessions": [
                { "id": "payses_old", "provider_id": "pp_stripe_stripe", "status": "canceled" },
                { "id": "payses_new", "provider_id": "pp_system_default", "status": "pending",
                  "data": { "client_secret": null } }
            ]
        });
        let cart: Cart = serde_json::from_value(value).unwrap();
        let session = cart.selected_payment_session().unwrap();
        assert_eq!(session.id, "payses_new");
    }

    #[test]
    fn test_v1_deselected_session_is_ignored() {
        let mut value = minimal_cart();
        value["payment_collection"] = json!({
            "id": "paycol_01",
            "payment_sessions": [
                { "id": "payses_1", "provider_id": "manual", "status": "pending", "is_selected": false }
            ]
        });
        let cart: Cart = serde_json::from_value(value).unwrap();
        assert!(cart.selected_payment_session().is_none());
    }

    #[test]
    fn test_unknown_session_status_does_not_fail() {
        let session: PaymentSession = serde_json::from_value(json!({
            "id": "payses_1",
            "provider_id": "pp_x",
            "status": "something_new"
        }))
        .unwrap();
        assert_eq!(session.status, PaymentSessionStatus::Unknown);
    }

    #[test]
    fn test_bad_timestamp_is_a_decode_error() {
        let mut value = minimal_cart();
        value["created_at"] = json!("last tuesday");
        assert!(serde_json::from_value::<Cart>(value).is_err());
    }
}
