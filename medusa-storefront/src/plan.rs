//! Scripted checkout plans.
//!
//! A plan is a TOML file describing one shopper's way through checkout:
//! what goes in the cart, where it ships, and how it is paid for.
//!
//! ```toml
//! region_id = "reg_01"
//! email = "shopper@example.com"
//! payment_provider_id = "pp_system_default"
//!
//! [[items]]
//! variant_id = "variant_01"
//! quantity = 2
//!
//! [shipping_address]
//! address_1 = "1 Main St"
//! city = "Porto"
//! country_code = "pt"
//! postal_code = "4000-001"
//! ```

use std::path::Path;

use medusa_sdk::objects::address::AddressInput;
use medusa_sdk::objects::dynamic::Metadata;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read plan file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse plan file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("invalid plan: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckoutPlan {
    /// Resume this cart instead of creating a new one.
    #[serde(default)]
    pub cart_id: Option<String>,
    /// Region for a new cart; the configured default when absent.
    #[serde(default)]
    pub region_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub items: Vec<PlanItem>,
    #[serde(default)]
    pub promo_codes: Vec<String>,
    pub shipping_address: AddressInput,
    /// Falls back to the shipping address.
    #[serde(default)]
    pub billing_address: Option<AddressInput>,
    /// The cheapest offered option when absent.
    #[serde(default)]
    pub shipping_option_id: Option<String>,
    /// Sent with the shipping method, e.g. a pickup point id.
    #[serde(default)]
    pub shipping_data: Option<Metadata>,
    pub payment_provider_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlanItem {
    pub variant_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl CheckoutPlan {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PlanError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Address to bill, defaulting to the shipping address.
    pub fn billing_address(&self) -> &AddressInput {
        self.billing_address
            .as_ref()
            .unwrap_or(&self.shipping_address)
    }

    fn validate(&self) -> Result<(), PlanError> {
        if self.cart_id.is_none() && self.items.is_empty() {
            return Err(PlanError::Invalid(
                "a new cart needs at least one item".to_owned(),
            ));
        }
        if let Some(item) = self.items.iter().find(|item| item.quantity == 0) {
            return Err(PlanError::Invalid(format!(
                "quantity for {} must be at least 1",
                item.variant_id
            )));
        }
        if self.items.iter().any(|item| item.variant_id.trim().is_empty()) {
            return Err(PlanError::Invalid("item without variant_id".to_owned()));
        }
        if self.payment_provider_id.trim().is_empty() {
            return Err(PlanError::Invalid("payment_provider_id is empty".to_owned()));
        }
        if self.promo_codes.iter().any(|code| code.trim().is_empty()) {
            return Err(PlanError::Invalid("blank promo code".to_owned()));
        }
        Ok(())
    }
}

impl std::str::FromStr for CheckoutPlan {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let plan: CheckoutPlan = toml::from_str(s)?;
        plan.validate()?;
        Ok(plan)
    }
}
