//! HTTP middleware and request extractors for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS
//! 5. Timeout
//!
//! Extractors: [`RequireUser`] / [`RequireAdmin`] for bearer tokens and
//! [`CartSession`] for the cart key.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{RequireAdmin, RequireUser};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use session::{CartSession, SESSION_HEADER};
