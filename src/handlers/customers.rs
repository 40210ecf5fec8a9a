//! Customer and card HTTP handlers.
//!
//! This module implements the customer-related API endpoints:
//! - GET /api/customer/{id} - Customer with all of their cards
//! - POST /api/customer/new - Create new customer
//! - POST /api/customer/{id}/newcard - Issue a card to an existing customer
//! - DELETE /api/customer/{id} - Delete a customer and their cards
//! - DELETE /api/customer/{id}/cards - Delete specific cards of a customer
//!
//! Bodies and path ids that fail to parse are turned into `AppError` instead of
//! axum's default rejections, so they share the generic error response.

use super::AppState;
use crate::{
    error::AppError,
    models::{
        card::CardDetails,
        customer::{CustomerCardsResponse, CustomerRequest},
    },
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

pub const CARD_ISSUED_RESPONSE: &str = "Card issued successfully";
pub const CUSTOMER_DELETED_RESPONSE: &str = "Customer deleted successfully";
pub const CARDS_DELETED_RESPONSE: &str = "Cards deleted successfully";

/// Get a customer with their cards.
///
/// # Response
///
/// - **Success (200 OK)**: customer attributes and card list
/// - **Error (404)**: Customer not found
pub async fn get_customer(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<CustomerCardsResponse>, AppError> {
    let Path(customer_id) = path?;

    let details = state.service.get_customer_details(customer_id).await?;

    Ok(Json(details))
}

/// Create a new customer.
///
/// # Request Body
///
/// ```json
/// { "id": 1, "name": "A", "email": "a@x.com", "dob": "1990-01-01" }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: the stored id as a bare JSON number
/// - **Error (500)**: id already taken or storage failure
pub async fn add_customer(
    State(state): State<AppState>,
    body: Result<Json<CustomerRequest>, JsonRejection>,
) -> Result<Json<i32>, AppError> {
    let Json(request) = body?;

    let id = state.service.add_customer(request).await?;

    Ok(Json(id))
}

/// Issue a new card to an existing customer.
///
/// # Request Body
///
/// ```json
/// { "cardId": 10, "cardNumber": "4111111111111111", "expiryDate": "2030-01-31" }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: confirmation text
/// - **Error (404)**: Customer not found
pub async fn issue_card(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<CardDetails>, JsonRejection>,
) -> Result<&'static str, AppError> {
    let Path(customer_id) = path?;
    let Json(details) = body?;

    state
        .service
        .issue_card_to_existing_customer(customer_id, details)
        .await?;

    Ok(CARD_ISSUED_RESPONSE)
}

/// Delete a customer along with all of their cards.
pub async fn delete_customer(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<&'static str, AppError> {
    let Path(customer_id) = path?;

    state.service.delete_customer(customer_id).await?;

    Ok(CUSTOMER_DELETED_RESPONSE)
}

/// Delete the listed cards of a customer.
///
/// # Request Body
///
/// JSON array of card ids, processed in order: `[10, 11]`
///
/// # Response
///
/// - **Success (200 OK)**: confirmation text
/// - **Error (404)**: customer or card not found, or a card owned by someone else.
///   No card is deleted in that case.
pub async fn delete_customer_cards(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<Vec<i32>>, JsonRejection>,
) -> Result<&'static str, AppError> {
    let Path(customer_id) = path?;
    let Json(card_ids) = body?;

    state
        .service
        .delete_cards_of_existing_customer(customer_id, &card_ids)
        .await?;

    Ok(CARDS_DELETED_RESPONSE)
}
