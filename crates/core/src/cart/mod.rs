//! Shared-cart logic.
//!
//! Everything here is a pure derivation over an in-memory snapshot of cart
//! rows already fetched from the backend:
//!
//! - [`line_item`] - Line items, assignees and the viewer's identity
//! - [`attribution`] - Which items belong to which viewer
//! - [`badge`] - Badge aggregation and partial badge updates

pub mod attribution;
pub mod badge;
mod coerce;
pub mod line_item;

pub use attribution::{belongs_to, filter_for_viewer};
pub use badge::{Badge, BadgeUpdate, DEFAULT_BADGE_NAME, build_badge};
pub use line_item::{Assignee, EXTRA_ASSIGNEE_ID, Identity, LineItem};
