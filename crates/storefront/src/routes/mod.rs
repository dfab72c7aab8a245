//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                   - Health check
//!
//! # Catalog
//! GET    /plants                   - Filtered, sorted, paginated listing
//! GET    /plants/categories        - Categories with plant counts
//! GET    /plants/{id}              - Plant detail
//!
//! # Cart (keyed by x-session-id)
//! GET    /cart                     - Cart view
//! POST   /cart                     - Add item
//! PUT    /cart                     - Set quantity (0 removes)
//! DELETE /cart                     - Clear cart
//! DELETE /cart/{plant_id}          - Remove line
//! GET    /cart/count               - Item count badge
//!
//! # Auth
//! POST   /auth/register            - Begin registration, sends OTP
//! POST   /auth/verify-otp          - Complete registration or OTP login
//! POST   /auth/resend-otp          - Re-issue an OTP
//! POST   /auth/login               - Password login
//! POST   /auth/logout              - Acknowledge logout
//! GET    /auth/me                  - Token introspection
//! GET    /auth/users               - User list (admin)
//! PATCH  /auth/users/{id}          - Activate/deactivate (admin)
//!
//! # Orders
//! POST   /orders/create-pending    - Start an online-payment order
//! POST   /orders/confirm-payment   - Finalize a pending order
//! POST   /orders                   - Legacy one-step create
//! GET    /orders                   - Order list (admin)
//! GET    /orders/stats/dashboard   - Dashboard aggregates (admin)
//! GET    /orders/{id}              - Order tracking
//! PATCH  /orders/{id}              - Status update (admin)
//!
//! # Contact
//! POST   /contact                  - Contact form
//! ```

pub mod auth;
pub mod cart;
pub mod contact;
pub mod orders;
pub mod plants;

use std::time::Duration;

use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    extract::{FromRequest, FromRequestParts},
    http::{HeaderValue, Request, StatusCode},
    middleware,
    routing::{delete, get, patch, post},
};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Upper bound on a whole request, including its side effects.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON body extractor whose rejection is an [`AppError`].
///
/// Malformed bodies answer with the usual `{"success": false, ...}` shape
/// instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query-string extractor whose rejection is an [`AppError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Path extractor whose rejection is an [`AppError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Create the catalog routes router.
pub fn plant_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(plants::index))
        .route("/categories", get(plants::categories))
        .route("/{id}", get(plants::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(cart::show)
                .post(cart::add)
                .put(cart::update)
                .delete(cart::clear),
        )
        .route("/count", get(cart::count))
        .route("/{plant_id}", delete(cart::remove))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/verify-otp", post(auth::verify_otp))
        .route("/resend-otp", post(auth::resend_otp))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/users", get(auth::list_users))
        .route("/users/{id}", patch(auth::set_active))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create_legacy))
        .route("/create-pending", post(orders::create_pending))
        .route("/confirm-payment", post(orders::confirm_payment))
        .route("/stats/dashboard", get(orders::dashboard))
        .route("/{id}", get(orders::show).patch(orders::update_status))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/plants", plant_routes())
        .nest("/cart", cart_routes())
        .nest("/auth", auth_routes())
        .nest("/orders", order_routes())
        .route("/contact", post(contact::submit))
}

/// The complete application: routes, state and middleware stack.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config().cors_allowed_origin.as_deref());

    Router::new()
        .merge(routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|_: BoxError| async {
                    StatusCode::REQUEST_TIMEOUT
                }))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
        )
        .layer(cors)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let Some(origin) = allowed_origin else {
        return CorsLayer::permissive();
    };

    match HeaderValue::from_str(origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!(origin, "Ignoring unparseable CORS_ALLOWED_ORIGIN");
            CorsLayer::new()
        }
    }
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
