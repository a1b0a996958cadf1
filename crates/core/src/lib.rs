//! Group Order Core - Shared types and shared-cart logic.
//!
//! This crate provides the types and pure functions used by every Group Order
//! component:
//! - `server` - HTTP service for badges, order cancellation and email
//! - `cli` - Command-line tools for migrations and cart inspection
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no async. Every function here operates on caller-supplied snapshots
//! and never mutates them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails and statuses
//! - [`cart`] - Line items, viewer attribution and badge aggregation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{
    Assignee, Badge, BadgeUpdate, DEFAULT_BADGE_NAME, EXTRA_ASSIGNEE_ID, Identity, LineItem,
    belongs_to, build_badge, filter_for_viewer,
};
pub use types::*;
