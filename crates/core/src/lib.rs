//! Rocketshoes Core - Shared cart and catalog types.
//!
//! This crate provides the domain types used by the cart store:
//! - product identity and pricing
//! - catalog and stock records returned by the product service
//! - the cart and its line items
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. Every cart transformation returns a new value rather
//! than mutating in place, so callers can compute a candidate cart and
//! decide separately whether to commit it.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, catalog records and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
