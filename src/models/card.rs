//! Payment card data models.
//!
//! This module defines:
//! - `Card`: Database entity, always linked to its owning customer
//! - `CardDetails`: The card as clients send and receive it

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Represents a card record from the database.
///
/// # Database Table
///
/// Maps to the `cards` table. `customer_id` is a required foreign key to
/// `customers.id`; a card can never outlive its owner.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Card {
    /// Caller-supplied identifier
    pub id: i32,

    pub card_number: String,

    pub expiry_date: NaiveDate,

    /// Owning customer
    pub customer_id: i32,
}

impl Card {
    /// Build the record for a card issued to `customer_id`.
    pub fn issue(details: CardDetails, customer_id: i32) -> Self {
        Self {
            id: details.card_id,
            card_number: details.card_number,
            expiry_date: details.expiry_date,
            customer_id,
        }
    }
}

/// Card as seen by API clients.
///
/// Used both as the request body of `POST /api/customer/{id}/newcard` and as
/// the card summaries listed under a customer.
///
/// # JSON Example
///
/// ```json
/// {
///   "cardId": 10,
///   "cardNumber": "4111111111111111",
///   "expiryDate": "2030-01-31"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub card_id: i32,
    pub card_number: String,
    pub expiry_date: NaiveDate,
}

/// Drops the owner reference, which is implied by the enclosing customer.
impl From<Card> for CardDetails {
    fn from(card: Card) -> Self {
        Self {
            card_id: card.id,
            card_number: card.card_number,
            expiry_date: card.expiry_date,
        }
    }
}
