//! Greenhouse Storefront library.
//!
//! REST backend for the Greenhouse plant shop: catalog, session carts,
//! OTP-verified accounts and the order lifecycle. The binary in `main.rs`
//! wires configuration to [`routes::app`]; tests build the same router over
//! in-memory collaborators.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
