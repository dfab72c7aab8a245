//! Business logic services for storefront.
//!
//! # Services
//!
//! - `otp` - One-time code issuance and verification
//! - `identity` - User directory, registration, login and bearer tokens
//! - `cart` - Session-scoped carts over the catalog
//! - `orders` - Order lifecycle, mirroring and dashboard stats
//! - `catalog` - Read-only plant catalog and listing query
//! - `notifier` / `email` - Outbound notifications (SMTP or log-only)

pub mod cart;
pub mod catalog;
pub mod email;
pub mod identity;
pub mod notifier;
pub mod orders;
pub mod otp;
