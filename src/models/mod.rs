//! Data models representing database entities.
//!
//! This module contains the stored records and the JSON shapes exchanged with clients.

/// Customer record and customer-facing payloads
pub mod customer;
/// Payment card record and card payloads
pub mod card;
