//! Core types for Pocket Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod session;
pub mod status;

pub use cart::{Cart, LineItem};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{Order, OrderHistory};
pub use price::Price;
pub use product::{Product, Rating};
pub use session::Session;
pub use status::*;
