//! Customer data models and API request/response types.
//!
//! This module defines:
//! - `Customer`: Database entity representing a customer
//! - `CustomerRequest`: Request body for creating customers
//! - `CustomerCardsResponse`: A customer together with every card they hold

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::card::CardDetails;

/// Represents a customer record from the database.
///
/// # Database Table
///
/// Maps to the `customers` table. The id is supplied by the caller on creation,
/// never generated by the database.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Customer {
    /// Caller-supplied identifier
    pub id: i32,

    pub name: String,

    pub email: String,

    pub date_of_birth: NaiveDate,
}

/// Request body for creating a new customer.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": 1,
///   "name": "Ada Lovelace",
///   "email": "ada@example.com",
///   "dob": "1815-12-10"
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomerRequest {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub dob: NaiveDate,
}

impl From<CustomerRequest> for Customer {
    fn from(request: CustomerRequest) -> Self {
        Self {
            id: request.id,
            name: request.name,
            email: request.email,
            date_of_birth: request.dob,
        }
    }
}

/// Response body for `GET /api/customer/{id}`.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": 1,
///   "name": "Ada Lovelace",
///   "email": "ada@example.com",
///   "dob": "1815-12-10",
///   "cards": [
///     { "cardId": 10, "cardNumber": "4111111111111111", "expiryDate": "2030-01-31" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerCardsResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub dob: NaiveDate,
    pub cards: Vec<CardDetails>,
}

impl CustomerCardsResponse {
    /// Combine a stored customer with the summaries of the cards they own.
    pub fn new(customer: Customer, cards: Vec<CardDetails>) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            email: customer.email,
            dob: customer.date_of_birth,
            cards,
        }
    }
}
