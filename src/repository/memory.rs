//! In-memory store for development and testing.
//!
//! Records live in two ordered maps behind an async mutex. A unit of work holds
//! the lock for its whole lifetime. Reads go straight to the shared tables; the
//! first write takes a private copy, which commit swaps in and drop throws away.
//! Read-only units never copy, but a writing unit pays O(store size) once.
//! Units of work are serialized, which is stronger isolation than the
//! PostgreSQL store gives.
//!
//! Primary keys and the card owner reference are enforced the same way the
//! relational schema enforces them.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{CardRepository, CustomerRepository, Store, StoreError, UnitOfWork};
use crate::models::{card::Card, customer::Customer};

#[derive(Debug, Clone, Default)]
struct Tables {
    customers: BTreeMap<i32, Customer>,
    cards: BTreeMap<i32, Card>,
}

/// Non-persistent store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        Ok(Box::new(MemoryUnitOfWork {
            guard,
            working: None,
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    /// Private copy, present once the unit has written anything.
    working: Option<Tables>,
}

impl MemoryUnitOfWork {
    fn tables(&self) -> &Tables {
        self.working.as_ref().unwrap_or(&*self.guard)
    }

    fn tables_mut(&mut self) -> &mut Tables {
        let shared = &self.guard;
        self.working.get_or_insert_with(|| Tables::clone(shared))
    }
}

#[async_trait]
impl CustomerRepository for MemoryUnitOfWork {
    async fn find_customer(&mut self, id: i32) -> Result<Option<Customer>, StoreError> {
        Ok(self.tables().customers.get(&id).cloned())
    }

    async fn insert_customer(&mut self, customer: &Customer) -> Result<(), StoreError> {
        if self.tables().customers.contains_key(&customer.id) {
            return Err(StoreError::DuplicateKey(format!(
                "customer {} already exists",
                customer.id
            )));
        }
        self.tables_mut()
            .customers
            .insert(customer.id, customer.clone());
        Ok(())
    }

    async fn delete_customer(&mut self, id: i32) -> Result<(), StoreError> {
        if self.tables().cards.values().any(|card| card.customer_id == id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "customer {id} still owns cards"
            )));
        }
        self.tables_mut().customers.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl CardRepository for MemoryUnitOfWork {
    async fn find_card(&mut self, id: i32) -> Result<Option<Card>, StoreError> {
        Ok(self.tables().cards.get(&id).cloned())
    }

    async fn find_cards_by_customer(&mut self, customer_id: i32) -> Result<Vec<Card>, StoreError> {
        Ok(self
            .tables()
            .cards
            .values()
            .filter(|card| card.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn insert_card(&mut self, card: &Card) -> Result<(), StoreError> {
        if self.tables().cards.contains_key(&card.id) {
            return Err(StoreError::DuplicateKey(format!(
                "card {} already exists",
                card.id
            )));
        }
        if !self.tables().customers.contains_key(&card.customer_id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "customer {} does not exist",
                card.customer_id
            )));
        }
        self.tables_mut().cards.insert(card.id, card.clone());
        Ok(())
    }

    async fn delete_card(&mut self, id: i32) -> Result<(), StoreError> {
        self.tables_mut().cards.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        if let Some(working) = working {
            *guard = working;
        }
        Ok(())
    }
}
