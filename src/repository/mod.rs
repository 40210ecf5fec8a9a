//! Persistence boundary for customers and cards.
//!
//! The service only talks to storage through these traits. Every operation
//! opens a [`UnitOfWork`] from a [`Store`], works through the two repository
//! traits, and commits at the end. Dropping a unit of work without committing
//! discards its changes, which is how failed operations roll back.
//!
//! Two stores exist:
//! - [`postgres::PgStore`]: one sqlx transaction per unit of work
//! - [`memory::MemoryStore`]: in-process tables, used when no database is configured and in tests

use async_trait::async_trait;

use crate::models::{card::Card, customer::Customer};

pub mod memory;
pub mod postgres;

/// Failure inside the storage layer.
///
/// None of these are meaningful to API clients; they surface as a generic
/// server error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),
}

/// Key-based access to customer records.
#[async_trait]
pub trait CustomerRepository: Send {
    async fn find_customer(&mut self, id: i32) -> Result<Option<Customer>, StoreError>;

    /// Insert a new customer. An existing id is a [`StoreError::DuplicateKey`], never an overwrite.
    async fn insert_customer(&mut self, customer: &Customer) -> Result<(), StoreError>;

    async fn delete_customer(&mut self, id: i32) -> Result<(), StoreError>;
}

/// Key-based access to card records, plus the owner index.
#[async_trait]
pub trait CardRepository: Send {
    async fn find_card(&mut self, id: i32) -> Result<Option<Card>, StoreError>;

    /// Every card whose owner is `customer_id`, ordered by card id.
    async fn find_cards_by_customer(&mut self, customer_id: i32) -> Result<Vec<Card>, StoreError>;

    async fn insert_card(&mut self, card: &Card) -> Result<(), StoreError>;

    async fn delete_card(&mut self, id: i32) -> Result<(), StoreError>;
}

/// One atomic batch of repository calls.
#[async_trait]
pub trait UnitOfWork: CustomerRepository + CardRepository {
    /// Make every change of this unit visible at once.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Entry point to a storage backend.
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;

    /// Verify the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;
}
