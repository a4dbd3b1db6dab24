//! Typed Medusa Store API v2 models and, behind the `client` feature, an
//! HTTP client for headless storefronts.
//!
//! Wire types decode tolerantly: computed totals default to zero, scalar
//! fields pass through the [`objects::coerce`] table, timestamps accept
//! every layout in [`objects::datetime::LAYOUTS`], and open-ended objects
//! are carried as [`objects::dynamic::Dynamic`].

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod objects;
