//! Core types for Group Order.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use email::{Email, EmailError, same_address};
pub use id::*;
pub use price::{format_price, parse_amount, resolve_unit_price};
pub use status::*;
