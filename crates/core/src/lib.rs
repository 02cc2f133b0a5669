//! Pocket Bazaar Core - Shared types library.
//!
//! This crate provides the domain types used across all Pocket Bazaar components:
//! - `storefront` - Client-side commerce engine (cart, session, orders, catalog)
//! - `cli` - Terminal front-end over the storefront engine
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no clocks,
//! no HTTP clients. Timestamps are always passed in by the caller, which keeps
//! every function here deterministic.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, statuses, and the
//!   cart/order/session records
//! - [`pricing`] - Subtotal, shipping, tax, and total for a set of line items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use pricing::PriceBreakdown;
pub use types::*;
