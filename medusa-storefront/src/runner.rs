//! Drives a [`CheckoutPlan`] through a [`CheckoutSession`].

use medusa_checkout::{CheckoutError, CheckoutSession, CheckoutStep, Requirement};
use medusa_sdk::client::Transport;
use medusa_sdk::objects::cart::Cart;
use medusa_sdk::objects::order::Order;
use medusa_sdk::objects::shipping::ShippingOption;
use thiserror::Error;
use tracing::info;

use crate::plan::CheckoutPlan;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    Checkout(#[from] CheckoutError),

    #[error("cannot leave the {step} step: {}", describe(.missing))]
    NotReady {
        step: CheckoutStep,
        missing: Vec<Requirement>,
    },

    #[error("the store offers no shipping option for this cart")]
    NoShippingOption,

    #[error("shipping option {0} is not offered for this cart")]
    UnknownShippingOption(String),
}

fn describe(missing: &[Requirement]) -> String {
    missing
        .iter()
        .map(Requirement::description)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Where a plan run stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Everything is in place; the order was not placed.
    Ready(Box<Cart>),
    Placed(Box<Order>),
}

/// Walk the plan from `Cart` to `Confirmation`, then place the order if
/// `confirm` is set.
pub async fn run_plan<T: Transport>(
    session: &mut CheckoutSession<T>,
    plan: &CheckoutPlan,
    default_region: Option<&str>,
    confirm: bool,
) -> Result<Outcome, RunError> {
    match &plan.cart_id {
        Some(cart_id) => session.load_cart(cart_id).await?,
        None => {
            let region = plan.region_id.as_deref().or(default_region);
            session.ensure_cart(region).await?
        }
    };

    for item in &plan.items {
        session.add_line_item(&item.variant_id, item.quantity).await?;
    }
    if let Some(email) = &plan.email {
        session.set_email(email).await?;
    }
    for code in &plan.promo_codes {
        session.apply_discount(code).await?;
    }
    advance(session)?;

    session
        .set_shipping_address(plan.shipping_address.clone())
        .await?;
    session
        .set_billing_address(plan.billing_address().clone())
        .await?;
    let options = session.list_shipping_options().await?;
    let option_id = choose_shipping_option(options, plan.shipping_option_id.as_deref())?;
    session
        .add_shipping_method(&option_id, plan.shipping_data.clone())
        .await?;
    advance(session)?;

    session
        .select_payment_session(&plan.payment_provider_id)
        .await?;
    advance(session)?;

    if !confirm {
        let cart = session.cart().cloned().ok_or_else(CheckoutError::no_active_cart)?;
        info!(cart_id = %cart.id, total = cart.totals.total, "Checkout ready; order not placed");
        return Ok(Outcome::Ready(Box::new(cart)));
    }
    let order = session.complete().await?;
    Ok(Outcome::Placed(Box::new(order.clone())))
}

fn advance<T: Transport>(session: &mut CheckoutSession<T>) -> Result<CheckoutStep, RunError> {
    let step = session.step();
    session
        .try_advance()
        .map_err(|missing| RunError::NotReady { step, missing })
}

/// The requested option if offered, otherwise the cheapest flat-priced one,
/// otherwise the first.
fn choose_shipping_option(
    options: &[ShippingOption],
    requested: Option<&str>,
) -> Result<String, RunError> {
    if let Some(requested) = requested {
        return options
            .iter()
            .find(|option| option.id == requested)
            .map(|option| option.id.clone())
            .ok_or_else(|| RunError::UnknownShippingOption(requested.to_owned()));
    }
    options
        .iter()
        .filter(|option| option.amount.is_some())
        .min_by_key(|option| option.amount)
        .or_else(|| options.first())
        .map(|option| option.id.clone())
        .ok_or(RunError::NoShippingOption)
}

#[cfg(test)]
mod tests {
    use medusa_checkout::CheckoutErrorKind;
    use medusa_sdk::client::{MockTransport, StoreClient};
    use medusa_sdk::config::StoreConfig;
    use serde_json::{Value, json};
    use url::Url;

    use super::*;

    const PLAN: &str = r#"
email = "shopper@example.com"
payment_provider_id = "pp_system_default"

[[items]]
variant_id = "variant_01"
quantity = 2

[shipping_address]
address_1 = "1 Main St"
city = "Porto"
country_code = "pt"
postal_code = "4000-001"
"#;

    fn session() -> CheckoutSession<MockTransport> {
        let config = StoreConfig::new(Url::parse("https://store.example.com").unwrap(), "pk_test");
        let client = StoreClient::with_transport(&config, MockTransport::new()).unwrap();
        CheckoutSession::new(client)
    }

    fn mock(session: &CheckoutSession<MockTransport>) -> &MockTransport {
        session.client().transport()
    }

    /// Cart fixture with the parts named in `has` filled in.
    fn cart(has: &[&str]) -> Value {
        let mut cart = json!({ "id": "cart_01", "currency_code": "eur", "region_id": "reg_01", "items": [] });
        if has.contains(&"item") {
            cart["items"] = json!([{ "id": "item_01", "variant_id": "variant_01", "quantity": 2, "unit_price": 1500 }]);
            cart["total"] = json!(3000);
        }
        if has.contains(&"email") {
            cart["email"] = json!("shopper@example.com");
        }
        if has.contains(&"address") {
            let address = json!({
                "address_1": "1 Main St", "city": "Porto",
                "country_code": "pt", "postal_code": "4000-001"
            });
            cart["shipping_address"] = address.clone();
            cart["billing_address"] = address;
        }
        if has.contains(&"method") {
            cart["shipping_methods"] = json!([{ "id": "sm_01", "shipping_option_id": "so_std", "amount": 500 }]);
            cart["total"] = json!(3500);
        }
        if has.contains(&"payment") {
            cart["payment_collection"] = json!({
                "id": "paycol_01",
                "payment_sessions": [{ "id": "payses_01", "provider_id": "pp_system_default", "status": "pending" }]
            });
        }
        json!({ "cart": cart })
    }

    fn script_until_confirmation(mock: &MockTransport) {
        mock.push_json(200, cart(&[]));
        mock.push_json(200, cart(&["item"]));
        mock.push_json(200, cart(&["item", "email"]));
        mock.push_json(200, cart(&["item", "email", "address"]));
        mock.push_json(200, cart(&["item", "email", "address"]));
        mock.push_json(
            200,
            json!({ "shipping_options": [
                { "id": "so_exp", "name": "Express", "amount": 1500 },
                { "id": "so_std", "name": "Standard", "amount": 500 },
                { "id": "so_calc", "name": "Carrier", "price_type": "calculated" }
            ] }),
        );
        mock.push_json(200, cart(&["item", "email", "address", "method"]));
        mock.push_json(200, json!({ "payment_collection": { "id": "paycol_01" } }));
        mock.push_json(200, json!({ "payment_collection": { "id": "paycol_01" } }));
        mock.push_json(200, cart(&["item", "email", "address", "method", "payment"]));
    }

    #[tokio::test]
    async fn test_plan_without_confirm_stops_at_confirmation() {
        let mut session = session();
        script_until_confirmation(mock(&session));
        let plan: CheckoutPlan = PLAN.parse().unwrap();

        let outcome = run_plan(&mut session, &plan, Some("reg_01"), false)
            .await
            .unwrap();
        let Outcome::Ready(cart) = outcome else {
            panic!("expected a ready cart");
        };
        assert_eq!(cart.totals.total, 3500);
        assert_eq!(session.step(), CheckoutStep::Confirmation);

        let requests = mock(&session).requests();
        assert_eq!(requests.len(), 10);
        assert_eq!(requests[0].json_body(), Some(json!({ "region_id": "reg_01" })));
        assert_eq!(
            requests[6].json_body(),
            Some(json!({ "option_id": "so_std" }))
        );
        assert!(
            requests
                .iter()
                .all(|request| !request.path_and_query().ends_with("/complete"))
        );
    }

    #[tokio::test]
    async fn test_confirmed_plan_places_order() {
        let mut session = session();
        script_until_confirmation(mock(&session));
        mock(&session).push_json(
            200,
            json!({ "type": "order", "order": { "id": "order_01", "display_id": 7, "currency_code": "eur", "total": 3500 } }),
        );
        let plan: CheckoutPlan = PLAN.parse().unwrap();

        let outcome = run_plan(&mut session, &plan, Some("reg_01"), true)
            .await
            .unwrap();
        let Outcome::Placed(order) = outcome else {
            panic!("expected an order");
        };
        assert_eq!(order.label(), "#7");
        assert_eq!(session.step(), CheckoutStep::Complete);
        assert_eq!(mock(&session).pending(), 0);
    }

    #[tokio::test]
    async fn test_plan_shipping_data_reaches_the_store() {
        let mut session = session();
        script_until_confirmation(mock(&session));
        let plan: CheckoutPlan = format!("{PLAN}\n[shipping_data]\npickup_point_id = \"pp_porto_3\"\n")
            .parse()
            .unwrap();

        run_plan(&mut session, &plan, Some("reg_01"), false)
            .await
            .unwrap();
        assert_eq!(
            mock(&session).requests()[6].json_body(),
            Some(json!({ "option_id": "so_std", "data": { "pickup_point_id": "pp_porto_3" } }))
        );
    }

    #[tokio::test]
    async fn test_missing_email_stops_at_cart() {
        let mut session = session();
        mock(&session).push_json(200, cart(&[]));
        mock(&session).push_json(200, cart(&["item"]));
        let plan: CheckoutPlan = PLAN.replace("email = \"shopper@example.com\"\n", "").parse().unwrap();

        let err = run_plan(&mut session, &plan, None, true).await.unwrap_err();
        match err {
            RunError::NotReady { step, missing } => {
                assert_eq!(step, CheckoutStep::Cart);
                assert_eq!(missing, vec![Requirement::Email]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(mock(&session).requests().len(), 2);
    }

    #[tokio::test]
    async fn test_server_failure_is_reported() {
        let mut session = session();
        mock(&session).push_json(200, cart(&[]));
        mock(&session).push_json(
            404,
            json!({ "type": "not_found", "message": "Variant variant_01 not found" }),
        );
        let plan: CheckoutPlan = PLAN.parse().unwrap();

        let err = run_plan(&mut session, &plan, None, false).await.unwrap_err();
        match err {
            RunError::Checkout(e) => {
                assert_eq!(e.kind, CheckoutErrorKind::ServerError);
                assert_eq!(e.to_string(), "Variant variant_01 not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_choose_shipping_option() {
        let options: Vec<ShippingOption> = serde_json::from_value(json!([
            { "id": "so_calc", "name": "Carrier", "price_type": "calculated" },
            { "id": "so_exp", "name": "Express", "amount": 1500 },
            { "id": "so_std", "name": "Standard", "amount": 500 }
        ]))
        .unwrap();
        assert_eq!(choose_shipping_option(&options, None).unwrap(), "so_std");
        assert_eq!(
            choose_shipping_option(&options, Some("so_exp")).unwrap(),
            "so_exp"
        );
        assert!(matches!(
            choose_shipping_option(&options, Some("so_nope")),
            Err(RunError::UnknownShippingOption(_))
        ));
        assert!(matches!(
            choose_shipping_option(&[], None),
            Err(RunError::NoShippingOption)
        ));
        assert_eq!(
            choose_shipping_option(&options[..1], None).unwrap(),
            "so_calc"
        );
    }
}
