//! Step readiness validators.
//!
//! Pure predicates over a cart snapshot, evaluated on demand. They gate
//! forward navigation in the UI only; the server still has the final word
//! on completion.

use medusa_sdk::objects::address::Address;
use medusa_sdk::objects::cart::Cart;

use crate::step::CheckoutStep;

/// Something the cart still lacks before a step can be left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    /// No cart is held at all.
    ActiveCart,
    LineItem,
    Email,
    ShippingAddress,
    ShippingMethod,
    PaymentSession,
}

impl Requirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Requirement::ActiveCart => "active_cart",
            Requirement::LineItem => "line_item",
            Requirement::Email => "email",
            Requirement::ShippingAddress => "shipping_address",
            Requirement::ShippingMethod => "shipping_method",
            Requirement::PaymentSession => "payment_session",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Requirement::ActiveCart => "start a cart",
            Requirement::LineItem => "add at least one item",
            Requirement::Email => "enter an email address",
            Requirement::ShippingAddress => "enter a complete shipping address",
            Requirement::ShippingMethod => "choose a shipping method",
            Requirement::PaymentSession => "choose a payment method",
        }
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn has_email(cart: &Cart) -> bool {
    cart.email
        .as_deref()
        .is_some_and(|email| !email.trim().is_empty())
}

fn has_shipping_address(cart: &Cart) -> bool {
    cart.shipping_address
        .as_ref()
        .is_some_and(Address::is_complete)
}

/// At least one line item and an email.
pub fn can_leave_cart(cart: &Cart) -> bool {
    cart.has_items() && has_email(cart)
}

/// A complete shipping address and at least one shipping method.
pub fn can_leave_shipping(cart: &Cart) -> bool {
    has_shipping_address(cart) && !cart.shipping_methods.is_empty()
}

/// A payment session is selected.
pub fn can_leave_payment(cart: &Cart) -> bool {
    cart.selected_payment_session().is_some()
}

pub fn can_complete(cart: &Cart) -> bool {
    can_leave_cart(cart) && can_leave_shipping(cart) && can_leave_payment(cart)
}

/// Whether `step` can be left forward.
pub fn can_leave(step: CheckoutStep, cart: &Cart) -> bool {
    match step {
        CheckoutStep::Cart => can_leave_cart(cart),
        CheckoutStep::Shipping => can_leave_shipping(cart),
        CheckoutStep::Payment => can_leave_payment(cart),
        CheckoutStep::Confirmation => can_complete(cart),
        CheckoutStep::Complete => false,
    }
}

/// Everything `cart` still lacks to leave `step`; empty when ready.
///
/// `Confirmation` reports the union of the earlier steps. `Complete` has
/// nothing to leave towards and reports nothing.
pub fn missing_for(step: CheckoutStep, cart: Option<&Cart>) -> Vec<Requirement> {
    let Some(cart) = cart else {
        return match step {
            CheckoutStep::Complete => Vec::new(),
            _ => vec![Requirement::ActiveCart],
        };
    };

    let mut missing = Vec::new();
    let include = |s: CheckoutStep| step == s || step == CheckoutStep::Confirmation;

    if include(CheckoutStep::Cart) {
        if !cart.has_items() {
            missing.push(Requirement::LineItem);
        }
        if !has_email(cart) {
            missing.push(Requirement::Email);
        }
    }
    if include(CheckoutStep::Shipping) {
        if !has_shipping_address(cart) {
            missing.push(Requirement::ShippingAddress);
        }
        if cart.shipping_methods.is_empty() {
            missing.push(Requirement::ShippingMethod);
        }
    }
    if include(CheckoutStep::Payment) && !can_leave_payment(cart) {
        missing.push(Requirement::PaymentSession);
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cart(value: serde_json::Value) -> Cart {
        serde_json::from_value(value).unwrap()
    }

    fn ready_cart() -> serde_json::Value {
        json!({
            "id": "cart_01",
            "email": "shopper@example.com",
            "items": [{ "id": "item_01", "quantity": 1, "unit_price": 1000 }],
            "shipping_address": {
                "address_1": "1 Main St", "city": "Porto",
                "country_code": "pt", "postal_code": "4000-001"
            },
            "shipping_methods": [{ "id": "sm_01", "amount": 500 }],
            "payment_collection": {
                "id": "paycol_01",
                "payment_sessions": [{ "id": "payses_01", "provider_id": "pp_system_default", "status": "pending" }]
            }
        })
    }

    #[test]
    fn test_items_without_email_cannot_leave_cart() {
        let mut value = ready_cart();
        value["email"] = json!(null);
        let cart = cart(value);
        assert!(!can_leave_cart(&cart));
        assert_eq!(
            missing_for(CheckoutStep::Cart, Some(&cart)),
            vec![Requirement::Email]
        );
    }

    #[test]
    fn test_blank_email_does_not_count() {
        let mut value = ready_cart();
        value["email"] = json!("  ");
        assert!(!can_leave_cart(&cart(value)));
    }

    #[test]
    fn test_empty_cart_with_email() {
        let mut value = ready_cart();
        value["items"] = json!([]);
        let cart = cart(value);
        assert!(!can_leave_cart(&cart));
        assert!(!can_complete(&cart));
    }

    #[test]
    fn test_address_without_method_cannot_leave_shipping() {
        let mut value = ready_cart();
        value["shipping_methods"] = json!([]);
        let cart = cart(value);
        assert!(!can_leave_shipping(&cart));
        assert_eq!(
            missing_for(CheckoutStep::Shipping, Some(&cart)),
            vec![Requirement::ShippingMethod]
        );
    }

    #[test]
    fn test_partial_address_is_not_set() {
        let mut value = ready_cart();
        value["shipping_address"]["postal_code"] = json!(null);
        assert!(!can_leave_shipping(&cart(value)));
    }

    #[test]
    fn test_payment_requires_session() {
        let mut value = ready_cart();
        value["payment_collection"]["payment_sessions"] = json!([]);
        let cart = cart(value);
        assert!(!can_leave_payment(&cart));
        assert!(!can_leave(CheckoutStep::Payment, &cart));
    }

    #[test]
    fn test_ready_cart_can_complete() {
        let cart = cart(ready_cart());
        assert!(can_complete(&cart));
        assert!(missing_for(CheckoutStep::Confirmation, Some(&cart)).is_empty());
        assert!(!can_leave(CheckoutStep::Complete, &cart));
    }

    #[test]
    fn test_confirmation_reports_union() {
        let cart = cart(json!({ "id": "cart_01" }));
        assert_eq!(
            missing_for(CheckoutStep::Confirmation, Some(&cart)),
            vec![
                Requirement::LineItem,
                Requirement::Email,
                Requirement::ShippingAddress,
                Requirement::ShippingMethod,
                Requirement::PaymentSession,
            ]
        );
        assert_eq!(
            missing_for(CheckoutStep::Payment, None),
            vec![Requirement::ActiveCart]
        );
    }
}
