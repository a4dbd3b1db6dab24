//! Plain-text rendering of store resources for the terminal.

use std::fmt::Write as _;

use medusa_sdk::objects::cart::Cart;
use medusa_sdk::objects::order::Order;
use medusa_sdk::objects::product::Product;
use medusa_sdk::objects::region::Region;
use medusa_sdk::objects::shipping::ShippingOption;

/// Minor units as `EUR 15.00`. Always two decimals.
pub fn format_amount(amount: i64, currency_code: &str) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!(
        "{} {sign}{}.{:02}",
        currency_code.to_uppercase(),
        abs / 100,
        abs % 100
    )
}

pub fn cart_summary(cart: &Cart) -> String {
    let currency = cart.currency_code.as_str();
    let mut out = String::new();
    let _ = writeln!(out, "Cart {} ({} items)", cart.id, cart.item_count());
    for item in &cart.items {
        let title = if item.title.is_empty() {
            &item.id
        } else {
            &item.title
        };
        let _ = writeln!(
            out,
            "  {:>3} x {:<32} {}",
            item.quantity,
            title,
            format_amount(item.total(), currency)
        );
    }
    let totals = &cart.totals;
    let _ = writeln!(out, "  subtotal  {}", format_amount(totals.subtotal, currency));
    if totals.discount_total != 0 {
        let _ = writeln!(out, "  discount -{}", format_amount(totals.discount_total, currency));
    }
    let _ = writeln!(out, "  shipping  {}", format_amount(totals.shipping_total, currency));
    let _ = writeln!(out, "  tax       {}", format_amount(totals.tax_total, currency));
    let _ = write!(out, "  total     {}", format_amount(totals.total, currency));
    out
}

pub fn order_summary(order: &Order) -> String {
    format!(
        "Order {} placed: {} ({} items)",
        order.label(),
        format_amount(order.totals.total, &order.currency_code),
        order.items.len()
    )
}

pub fn region_line(region: &Region) -> String {
    let countries: Vec<&str> = region
        .countries
        .iter()
        .map(|country| country.iso_2.as_str())
        .collect();
    format!(
        "{:<28} {:<24} {} [{}]",
        region.id,
        region.name,
        region.currency_code.to_uppercase(),
        countries.join(",")
    )
}

pub fn product_line(product: &Product, currency_code: Option<&str>) -> String {
    let price = match (product.from_price(), currency_code) {
        (Some(amount), Some(currency)) => format!("from {}", format_amount(amount, currency)),
        (Some(amount), None) => format!("from {amount}"),
        (None, _) => "-".to_owned(),
    };
    format!("{:<28} {:<40} {price}", product.id, product.title)
}

pub fn shipping_option_line(option: &ShippingOption, currency_code: &str) -> String {
    let price = match option.amount {
        Some(amount) => format_amount(amount, currency_code),
        None => "calculated".to_owned(),
    };
    format!("{:<28} {:<24} {price}", option.id, option.name)
}
