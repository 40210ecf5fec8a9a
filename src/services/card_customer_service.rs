//! Customer/card service - Core business logic for customers and their cards.
//!
//! This service handles:
//! - Existence checks for customers and cards
//! - Card ownership verification
//! - Ordering of deletes (cards before their owner)
//!
//! # Atomicity Guarantees
//!
//! Every operation runs inside one unit of work and commits only when it
//! succeeds. An early `?` return drops the unit of work, which rolls back
//! everything the operation already did.

use std::sync::Arc;

use tracing::instrument;

use crate::{
    error::AppError,
    models::{
        card::{Card, CardDetails},
        customer::{Customer, CustomerCardsResponse, CustomerRequest},
    },
    repository::Store,
};

/// Service over customers and the cards they hold.
///
/// Constructed once at startup and shared by every handler.
#[derive(Clone)]
pub struct CardCustomerService {
    store: Arc<dyn Store>,
}

impl CardCustomerService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Get a customer along with every card they own.
    ///
    /// # Errors
    ///
    /// - `CustomerNotFound`: no customer with this id
    #[instrument(skip(self))]
    pub async fn get_customer_details(
        &self,
        customer_id: i32,
    ) -> Result<CustomerCardsResponse, AppError> {
        let mut uow = self.store.begin().await?;

        let customer = uow
            .find_customer(customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        let cards = uow
            .find_cards_by_customer(customer_id)
            .await?
            .into_iter()
            .map(CardDetails::from)
            .collect();

        uow.commit().await?;

        Ok(CustomerCardsResponse::new(customer, cards))
    }

    /// Store a new customer under the caller-supplied id.
    ///
    /// # Returns
    ///
    /// The id the customer was stored under
    ///
    /// # Errors
    ///
    /// - `Store`: the id is already taken, or the store failed
    #[instrument(skip(self, request), fields(customer_id = request.id))]
    pub async fn add_customer(&self, request: CustomerRequest) -> Result<i32, AppError> {
        let customer = Customer::from(request);

        let mut uow = self.store.begin().await?;
        uow.insert_customer(&customer).await?;
        uow.commit().await?;

        tracing::info!("Customer created");
        Ok(customer.id)
    }

    /// Issue a new card to an existing customer.
    ///
    /// # Errors
    ///
    /// - `CustomerNotFound`: no customer with this id; no card is created
    /// - `Store`: the card id is already taken, or the store failed
    #[instrument(skip(self, details), fields(card_id = details.card_id))]
    pub async fn issue_card_to_existing_customer(
        &self,
        customer_id: i32,
        details: CardDetails,
    ) -> Result<(), AppError> {
        let mut uow = self.store.begin().await?;

        let customer = uow
            .find_customer(customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        let card = Card::issue(details, customer.id);
        uow.insert_card(&card).await?;
        uow.commit().await?;

        tracing::info!("Card issued");
        Ok(())
    }

    /// Delete a customer and every card they own.
    ///
    /// # Process
    ///
    /// 1. Look up the customer
    /// 2. Delete each owned card
    /// 3. Delete the customer record
    ///
    /// Cards always go first so no card ever references a missing customer.
    ///
    /// # Errors
    ///
    /// - `CustomerNotFound`: no customer with this id
    #[instrument(skip(self))]
    pub async fn delete_customer(&self, customer_id: i32) -> Result<(), AppError> {
        let mut uow = self.store.begin().await?;

        let customer = uow
            .find_customer(customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        let cards = uow.find_cards_by_customer(customer.id).await?;
        for card in &cards {
            uow.delete_card(card.id).await?;
        }
        uow.delete_customer(customer.id).await?;

        uow.commit().await?;

        tracing::info!(cards_removed = cards.len(), "Customer deleted");
        Ok(())
    }

    /// Delete specific cards of a customer, in the order given.
    ///
    /// The batch is all-or-nothing: the first unknown card or card owned by
    /// someone else aborts the call and restores every card already deleted
    /// in it. A repeated id fails on its second occurrence since the card is
    /// already gone by then.
    ///
    /// # Errors
    ///
    /// - `CustomerNotFound`: no customer with this id
    /// - `CardNotFound`: one of the ids has no card
    /// - `OwnershipMismatch`: one of the cards belongs to another customer
    #[instrument(skip(self))]
    pub async fn delete_cards_of_existing_customer(
        &self,
        customer_id: i32,
        card_ids: &[i32],
    ) -> Result<(), AppError> {
        let mut uow = self.store.begin().await?;

        let customer = uow
            .find_customer(customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        for &card_id in card_ids {
            let card = uow
                .find_card(card_id)
                .await?
                .ok_or(AppError::CardNotFound)?;

            if card.customer_id != customer.id {
                tracing::warn!(
                    card_id,
                    owner_id = card.customer_id,
                    "Card belongs to a different customer"
                );
                return Err(AppError::OwnershipMismatch);
            }

            uow.delete_card(card.id).await?;
        }

        uow.commit().await?;

        tracing::info!(cards_removed = card_ids.len(), "Cards deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{StoreError, memory::MemoryStore};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service() -> CardCustomerService {
        CardCustomerService::new(Arc::new(MemoryStore::new()))
    }

    fn customer(id: i32, name: &str) -> CustomerRequest {
        CustomerRequest {
            id,
            name: name.to_string(),
            email: format!("{}@x.com", name.to_lowercase()),
            dob: date(1990, 1, 1),
        }
    }

    fn card(id: i32) -> CardDetails {
        CardDetails {
            card_id: id,
            card_number: format!("5500{id:012}"),
            expiry_date: date(2030, 6, 30),
        }
    }

    fn card_ids(details: &CustomerCardsResponse) -> Vec<i32> {
        details.cards.iter().map(|c| c.card_id).collect()
    }

    #[tokio::test]
    async fn add_then_get_returns_attributes_and_no_cards() {
        let service = service();

        let id = service.add_customer(customer(1, "A")).await.unwrap();
        assert_eq!(id, 1);

        let details = service.get_customer_details(1).await.unwrap();
        assert_eq!(
            details,
            CustomerCardsResponse {
                id: 1,
                name: "A".to_string(),
                email: "a@x.com".to_string(),
                dob: date(1990, 1, 1),
                cards: vec![],
            }
        );
    }

    #[tokio::test]
    async fn issued_card_is_listed_exactly_once() {
        let service = service();
        service.add_customer(customer(1, "A")).await.unwrap();

        service
            .issue_card_to_existing_customer(1, card(10))
            .await
            .unwrap();

        let details = service.get_customer_details(1).await.unwrap();
        assert_eq!(details.cards, vec![card(10)]);
    }

    #[tokio::test]
    async fn get_lists_only_the_customers_own_cards() {
        let service = service();
        service.add_customer(customer(1, "A")).await.unwrap();
        service.add_customer(customer(2, "B")).await.unwrap();
        for id in [10, 11, 12] {
            service
                .issue_card_to_existing_customer(1, card(id))
                .await
                .unwrap();
        }
        service
            .issue_card_to_existing_customer(2, card(20))
            .await
            .unwrap();

        let mut ids = card_ids(&service.get_customer_details(1).await.unwrap());
        ids.sort_unstable();
        assert_eq!(ids, vec![10, 11, 12]);
        assert_eq!(
            card_ids(&service.get_customer_details(2).await.unwrap()),
            vec![20]
        );
    }

    #[tokio::test]
    async fn unknown_customer_is_not_found_everywhere() {
        let service = service();

        assert!(matches!(
            service.get_customer_details(9).await,
            Err(AppError::CustomerNotFound)
        ));
        assert!(matches!(
            service.issue_card_to_existing_customer(9, card(10)).await,
            Err(AppError::CustomerNotFound)
        ));
        assert!(matches!(
            service.delete_customer(9).await,
            Err(AppError::CustomerNotFound)
        ));
        assert!(matches!(
            service.delete_cards_of_existing_customer(9, &[10]).await,
            Err(AppError::CustomerNotFound)
        ));
    }

    #[tokio::test]
    async fn issue_to_unknown_customer_creates_no_card() {
        let service = service();
        let _ = service.issue_card_to_existing_customer(9, card(10)).await;

        // Card 10 is free to be issued to a real customer afterwards
        service.add_customer(customer(1, "A")).await.unwrap();
        service
            .issue_card_to_existing_customer(1, card(10))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_customer_removes_customer_and_cards() {
        let service = service();
        service.add_customer(customer(1, "A")).await.unwrap();
        service
            .issue_card_to_existing_customer(1, card(10))
            .await
            .unwrap();
        service
            .issue_card_to_existing_customer(1, card(11))
            .await
            .unwrap();

        service.delete_customer(1).await.unwrap();

        assert!(matches!(
            service.get_customer_details(1).await,
            Err(AppError::CustomerNotFound)
        ));

        // Re-create the customer: the old cards must be gone
        service.add_customer(customer(1, "A")).await.unwrap();
        assert!(service.get_customer_details(1).await.unwrap().cards.is_empty());
        assert!(matches!(
            service.delete_cards_of_existing_customer(1, &[10]).await,
            Err(AppError::CardNotFound)
        ));
    }

    #[tokio::test]
    async fn delete_single_card_then_list_is_empty() {
        let service = service();
        service.add_customer(customer(1, "A")).await.unwrap();
        service
            .issue_card_to_existing_customer(1, card(10))
            .await
            .unwrap();
        assert_eq!(
            card_ids(&service.get_customer_details(1).await.unwrap()),
            vec![10]
        );

        service
            .delete_cards_of_existing_customer(1, &[10])
            .await
            .unwrap();

        assert!(service.get_customer_details(1).await.unwrap().cards.is_empty());
    }

    #[tokio::test]
    async fn foreign_card_is_rejected_and_kept() {
        let service = service();
        service.add_customer(customer(1, "A")).await.unwrap();
        service.add_customer(customer(2, "B")).await.unwrap();
        service
            .issue_card_to_existing_customer(1, card(20))
            .await
            .unwrap();

        let result = service.delete_cards_of_existing_customer(2, &[20]).await;
        assert!(matches!(result, Err(AppError::OwnershipMismatch)));

        let details = service.get_customer_details(1).await.unwrap();
        assert_eq!(details.cards, vec![card(20)]);
    }

    #[tokio::test]
    async fn failed_batch_restores_earlier_deletions() {
        let service = service();
        service.add_customer(customer(1, "A")).await.unwrap();
        service.add_customer(customer(2, "B")).await.unwrap();
        service
            .issue_card_to_existing_customer(1, card(10))
            .await
            .unwrap();
        service
            .issue_card_to_existing_customer(1, card(11))
            .await
            .unwrap();
        service
            .issue_card_to_existing_customer(2, card(20))
            .await
            .unwrap();

        let mismatch = service
            .delete_cards_of_existing_customer(1, &[10, 20, 11])
            .await;
        assert!(matches!(mismatch, Err(AppError::OwnershipMismatch)));

        let missing = service
            .delete_cards_of_existing_customer(1, &[10, 99])
            .await;
        assert!(matches!(missing, Err(AppError::CardNotFound)));

        assert_eq!(
            card_ids(&service.get_customer_details(1).await.unwrap()),
            vec![10, 11]
        );
    }

    #[tokio::test]
    async fn repeated_card_id_fails_the_batch() {
        let service = service();
        service.add_customer(customer(1, "A")).await.unwrap();
        service
            .issue_card_to_existing_customer(1, card(10))
            .await
            .unwrap();

        let result = service
            .delete_cards_of_existing_customer(1, &[10, 10])
            .await;
        assert!(matches!(result, Err(AppError::CardNotFound)));
        assert_eq!(
            card_ids(&service.get_customer_details(1).await.unwrap()),
            vec![10]
        );
    }

    #[tokio::test]
    async fn empty_batch_succeeds_without_changes() {
        let service = service();
        service.add_customer(customer(1, "A")).await.unwrap();
        service
            .issue_card_to_existing_customer(1, card(10))
            .await
            .unwrap();

        service
            .delete_cards_of_existing_customer(1, &[])
            .await
            .unwrap();

        assert_eq!(
            card_ids(&service.get_customer_details(1).await.unwrap()),
            vec![10]
        );
    }

    #[tokio::test]
    async fn duplicate_ids_are_storage_failures() {
        let service = service();
        service.add_customer(customer(1, "A")).await.unwrap();
        service.add_customer(customer(2, "B")).await.unwrap();
        service
            .issue_card_to_existing_customer(1, card(10))
            .await
            .unwrap();

        let dup_customer = service.add_customer(customer(1, "Other")).await;
        assert!(matches!(
            dup_customer,
            Err(AppError::Store(StoreError::DuplicateKey(_)))
        ));

        let dup_card = service.issue_card_to_existing_customer(2, card(10)).await;
        assert!(matches!(
            dup_card,
            Err(AppError::Store(StoreError::DuplicateKey(_)))
        ));

        // Neither the stored customer nor the card owner changed
        let details = service.get_customer_details(1).await.unwrap();
        assert_eq!(details.name, "A");
        assert_eq!(card_ids(&details), vec![10]);
    }

    #[tokio::test]
    async fn concurrent_operations_all_complete() {
        let service = service();

        let tasks: Vec<_> = (1..=50)
            .map(|id| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .add_customer(customer(id, &format!("C{id}")))
                        .await
                        .unwrap();
                    service
                        .issue_card_to_existing_customer(id, card(id * 100))
                        .await
                        .unwrap();
                    service.delete_customer(id).await.unwrap();
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        for id in 1..=50 {
            assert!(matches!(
                service.get_customer_details(id).await,
                Err(AppError::CustomerNotFound)
            ));
        }
    }
}
