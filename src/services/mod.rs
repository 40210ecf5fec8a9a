//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They own unit-of-work boundaries and relationship checks.

pub mod card_customer_service;
