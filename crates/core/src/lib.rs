//! Greenhouse Core - Shared types library.
//!
//! This crate provides the domain types used across the Greenhouse workspace:
//! - `storefront` - Plant shop REST backend (catalog, cart, orders, auth)
//! - `cli` - Command-line tools for the order mirror database
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Database encode/decode impls live behind the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
