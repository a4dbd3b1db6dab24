use serde::{Deserialize, Serialize};

/// Steps of the checkout wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Cart review and contact email.
    #[default]
    Cart,
    /// Shipping address and method.
    Shipping,
    /// Payment provider selection.
    Payment,
    /// Order review before submission.
    Confirmation,
    /// The cart has been converted into an order.
    Complete,
}

impl CheckoutStep {
    pub const ALL: [CheckoutStep; 5] = [
        CheckoutStep::Cart,
        CheckoutStep::Shipping,
        CheckoutStep::Payment,
        CheckoutStep::Confirmation,
        CheckoutStep::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Cart => "cart",
            CheckoutStep::Shipping => "shipping",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Confirmation => "confirmation",
            CheckoutStep::Complete => "complete",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CheckoutStep::Cart => "Cart",
            CheckoutStep::Shipping => "Shipping",
            CheckoutStep::Payment => "Payment",
            CheckoutStep::Confirmation => "Review",
            CheckoutStep::Complete => "Complete",
        }
    }

    /// Get the step number (1-indexed).
    pub fn number(&self) -> u8 {
        match self {
            CheckoutStep::Cart => 1,
            CheckoutStep::Shipping => 2,
            CheckoutStep::Payment => 3,
            CheckoutStep::Confirmation => 4,
            CheckoutStep::Complete => 5,
        }
    }

    /// The step `advance` leads to. `Complete` is only entered through a
    /// successful completion, so neither `Confirmation` nor `Complete` has
    /// a navigable successor.
    pub fn next(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Cart => Some(CheckoutStep::Shipping),
            CheckoutStep::Shipping => Some(CheckoutStep::Payment),
            CheckoutStep::Payment => Some(CheckoutStep::Confirmation),
            CheckoutStep::Confirmation | CheckoutStep::Complete => None,
        }
    }

    /// The step `retreat` leads to. Nothing leaves `Complete`.
    pub fn previous(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Cart | CheckoutStep::Complete => None,
            CheckoutStep::Shipping => Some(CheckoutStep::Cart),
            CheckoutStep::Payment => Some(CheckoutStep::Shipping),
            CheckoutStep::Confirmation => Some(CheckoutStep::Payment),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutStep::Complete)
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CheckoutStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckoutStep::ALL
            .into_iter()
            .find(|step| step.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown checkout step: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_linear() {
        for pair in CheckoutStep::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].number() + 1, pair[1].number());
        }
        assert_eq!(CheckoutStep::Payment.next(), Some(CheckoutStep::Confirmation));
        assert_eq!(CheckoutStep::Confirmation.next(), None);
        assert_eq!(CheckoutStep::Cart.previous(), None);
        assert_eq!(CheckoutStep::Complete.previous(), None);
    }

    #[test]
    fn test_parse_round_trip() {
        for step in CheckoutStep::ALL {
            assert_eq!(step.as_str().parse::<CheckoutStep>(), Ok(step));
        }
        assert!("review".parse::<CheckoutStep>().is_err());
        assert_eq!(CheckoutStep::Confirmation.display_name(), "Review");
    }
}
