//! Services used by the route handlers.
//!
//! # Services
//!
//! - `badge_bus` - Typed broadcast of cart badge updates
//! - `email` - Email delivery via SMTP

pub mod badge_bus;
pub mod email;

pub use badge_bus::{BADGE_TOPIC, BadgeBus, BadgeListener};
pub use email::{DeliveryReceipt, EmailError, EmailService};
