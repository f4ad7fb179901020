//! Sweet Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{MSG_NOTHING_TO_UPDATE, SweetError, SweetResult};
use crate::models::{CreateSweet, ListQuery, Sweet, SweetListResponse, UpdateSweet};
use crate::repository::SweetRepository;

/// Catalog and stock operations on top of a [`SweetRepository`]
pub struct SweetService<R: SweetRepository> {
    repository: Arc<R>,
}

impl<R: SweetRepository> SweetService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new sweet; names are unique ignoring case
    #[instrument(skip(self, input), fields(sweet_name = %input.name))]
    pub async fn create_sweet(&self, input: CreateSweet) -> SweetResult<Sweet> {
        input
            .validate()
            .map_err(|e| SweetError::Validation(e.to_string()))?;

        let sweet = Sweet::new(input);
        if self.repository.find_by_name(&sweet.name).await?.is_some() {
            return Err(SweetError::DuplicateName(sweet.name));
        }

        self.repository.create(sweet).await
    }

    #[instrument(skip(self))]
    pub async fn get_sweet(&self, id: Uuid) -> SweetResult<Sweet> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(SweetError::NotFound(id))
    }

    /// Filtered, sorted page of sweets plus the total match count
    #[instrument(skip(self))]
    pub async fn list_sweets(&self, query: ListQuery) -> SweetResult<SweetListResponse> {
        query
            .validate()
            .map_err(|e| SweetError::Validation(e.to_string()))?;

        let sweets = self.repository.list(&query).await?;
        let total = self.repository.count(&query).await?;

        Ok(SweetListResponse::new(sweets, total, &query))
    }

    #[instrument(skip(self))]
    pub async fn categories(&self) -> SweetResult<Vec<String>> {
        self.repository.categories().await
    }

    #[instrument(skip(self, input))]
    pub async fn update_sweet(&self, id: Uuid, input: UpdateSweet) -> SweetResult<Sweet> {
        input
            .validate()
            .map_err(|e| SweetError::Validation(e.to_string()))?;
        if input.is_empty() {
            return Err(SweetError::Validation(MSG_NOTHING_TO_UPDATE.to_string()));
        }
        let input = input.normalized();

        if let Some(ref new_name) = input.name {
            if let Some(other) = self.repository.find_by_name(new_name).await? {
                if other.id != id {
                    return Err(SweetError::DuplicateName(new_name.clone()));
                }
            }
        }

        self.repository
            .update(id, input)
            .await?
            .ok_or(SweetError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_sweet(&self, id: Uuid) -> SweetResult<()> {
        if !self.repository.delete(id).await? {
            return Err(SweetError::NotFound(id));
        }
        Ok(())
    }

    /// Take `quantity` units out of stock.
    ///
    /// The decrement is a single conditional update; when it matches nothing
    /// the sweet is re-read to tell a missing sweet from insufficient stock.
    #[instrument(skip(self))]
    pub async fn purchase(&self, id: Uuid, quantity: i64) -> SweetResult<Sweet> {
        if quantity < 1 {
            return Err(SweetError::Validation("Invalid quantity".to_string()));
        }

        if let Some(sweet) = self.repository.decrement_stock(id, quantity).await? {
            return Ok(sweet);
        }

        match self.repository.get_by_id(id).await? {
            None => Err(SweetError::NotFound(id)),
            Some(sweet) => {
                tracing::info!(sweet_id = %id, available = sweet.quantity, requested = quantity, "Purchase rejected");
                Err(SweetError::InsufficientStock {
                    available: sweet.quantity,
                    requested: quantity,
                })
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn restock(&self, id: Uuid, quantity: i64) -> SweetResult<Sweet> {
        if quantity < 1 {
            return Err(SweetError::Validation("Invalid quantity".to_string()));
        }

        self.repository
            .increment_stock(id, quantity)
            .await?
            .ok_or(SweetError::NotFound(id))
    }
}

impl<R: SweetRepository> Clone for SweetService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
