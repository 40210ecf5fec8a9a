//! PostgreSQL store.
//!
//! Each unit of work wraps a single database transaction. The transaction is
//! rolled back by sqlx when the unit of work is dropped without a commit.
//!
//! The tests below need a running PostgreSQL server; run them with
//! `DATABASE_URL` set and `cargo test -- --ignored`.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use super::{CardRepository, CustomerRepository, Store, StoreError, UnitOfWork};
use crate::{
    db::DbPool,
    models::{card::Card, customer::Customer},
};

/// Store backed by the `customers` and `cards` tables.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CustomerRepository for PgUnitOfWork {
    async fn find_customer(&mut self, id: i32) -> Result<Option<Customer>, StoreError> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, email, date_of_birth FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(customer)
    }

    async fn insert_customer(&mut self, customer: &Customer) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, email, date_of_birth)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(customer.date_of_birth)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn delete_customer(&mut self, id: i32) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl CardRepository for PgUnitOfWork {
    async fn find_card(&mut self, id: i32) -> Result<Option<Card>, StoreError> {
        let card = sqlx::query_as::<_, Card>(
            "SELECT id, card_number, expiry_date, customer_id FROM cards WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(card)
    }

    async fn find_cards_by_customer(&mut self, customer_id: i32) -> Result<Vec<Card>, StoreError> {
        // Served by idx_cards_customer_id
        let cards = sqlx::query_as::<_, Card>(
            r#"
            SELECT id, card_number, expiry_date, customer_id
            FROM cards
            WHERE customer_id = $1
            ORDER BY id
            "#,
        )
        .bind(customer_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(cards)
    }

    async fn insert_card(&mut self, card: &Card) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO cards (id, card_number, expiry_date, customer_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(card.id)
        .bind(&card.card_number)
        .bind(card.expiry_date)
        .bind(card.customer_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn delete_card(&mut self, id: i32) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}
