//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Delegates to the customer/card service
//! 3. Returns HTTP response (JSON or text, status code)

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::{repository::Store, services::card_customer_service::CardCustomerService};

/// Customer and card endpoints
pub mod customers;
/// Service liveness endpoint
pub mod health;

/// State shared with every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: CardCustomerService,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            service: CardCustomerService::new(Arc::clone(&store)),
            store,
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/customer/new", post(customers::add_customer))
        .route(
            "/api/customer/{id}",
            get(customers::get_customer).delete(customers::delete_customer),
        )
        .route("/api/customer/{id}/newcard", post(customers::issue_card))
        .route(
            "/api/customer/{id}/cards",
            delete(customers::delete_customer_cards),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
