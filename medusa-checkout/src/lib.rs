//! Checkout wizard for a Medusa storefront.
//!
//! [`CheckoutSession`] walks `Cart → Shipping → Payment → Confirmation →
//! Complete`, holding the one authoritative cart snapshot the server last
//! returned. [`readiness`] tells the UI which steps can be left.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod error;
pub mod readiness;
pub mod session;
pub mod shared;
pub mod step;

pub use error::{CheckoutError, CheckoutErrorKind};
pub use readiness::Requirement;
pub use session::CheckoutSession;
pub use shared::SharedCheckout;
pub use step::CheckoutStep;
