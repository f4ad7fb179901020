use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{SweetError, SweetResult};
use crate::models::{ListQuery, SortField, SortOrder, Sweet, UpdateSweet};

/// Repository trait for Sweet persistence
///
/// Name lookups and uniqueness are case-insensitive. Stock adjustments must be
/// atomic: `decrement_stock` only applies when enough stock is available.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SweetRepository: Send + Sync {
    /// Insert a new sweet. Fails with `DuplicateName` if the name is taken.
    async fn create(&self, sweet: Sweet) -> SweetResult<Sweet>;

    async fn get_by_id(&self, id: Uuid) -> SweetResult<Option<Sweet>>;

    /// Find a sweet by name, ignoring case
    async fn find_by_name(&self, name: &str) -> SweetResult<Option<Sweet>>;

    /// One page of sweets matching the query's filters, in the query's order
    async fn list(&self, query: &ListQuery) -> SweetResult<Vec<Sweet>>;

    /// Number of sweets matching the query's filters, ignoring pagination
    async fn count(&self, query: &ListQuery) -> SweetResult<u64>;

    /// Apply a partial update. Returns `None` when the sweet does not exist.
    async fn update(&self, id: Uuid, input: UpdateSweet) -> SweetResult<Option<Sweet>>;

    async fn delete(&self, id: Uuid) -> SweetResult<bool>;

    /// Subtract `quantity` if at least that much is in stock.
    ///
    /// Returns `None` when the sweet is missing or stock is insufficient.
    async fn decrement_stock(&self, id: Uuid, quantity: i64) -> SweetResult<Option<Sweet>>;

    /// Add `quantity` to the stock. Returns `None` when the sweet is missing.
    async fn increment_stock(&self, id: Uuid, quantity: i64) -> SweetResult<Option<Sweet>>;

    /// Distinct categories, sorted
    async fn categories(&self) -> SweetResult<Vec<String>>;
}

/// In-memory repository for tests and local runs without MongoDB
#[derive(Clone, Default)]
pub struct InMemorySweetRepository {
    sweets: Arc<RwLock<HashMap<Uuid, Sweet>>>,
}

impl InMemorySweetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(sweet: &Sweet, query: &ListQuery) -> bool {
        if let Some(name) = query.name_filter() {
            if !sweet.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = query.category_filter() {
            if !sweet.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        true
    }

    fn compare(a: &Sweet, b: &Sweet, field: SortField) -> Ordering {
        let primary = match field {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Price => a.price.total_cmp(&b.price),
            SortField::Quantity => a.quantity.cmp(&b.quantity),
            SortField::Category => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    fn name_taken(sweets: &HashMap<Uuid, Sweet>, name: &str, except: Option<Uuid>) -> bool {
        let name = name.to_lowercase();
        sweets
            .values()
            .any(|s| Some(s.id) != except && s.name.to_lowercase() == name)
    }
}

#[async_trait]
impl SweetRepository for InMemorySweetRepository {
    async fn create(&self, sweet: Sweet) -> SweetResult<Sweet> {
        let mut sweets = self.sweets.write().await;

        if Self::name_taken(&sweets, &sweet.name, None) {
            return Err(SweetError::DuplicateName(sweet.name));
        }

        sweets.insert(sweet.id, sweet.clone());
        tracing::info!(sweet_id = %sweet.id, "Created sweet");
        Ok(sweet)
    }

    async fn get_by_id(&self, id: Uuid) -> SweetResult<Option<Sweet>> {
        Ok(self.sweets.read().await.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> SweetResult<Option<Sweet>> {
        let name = name.to_lowercase();
        let sweets = self.sweets.read().await;
        Ok(sweets.values().find(|s| s.name.to_lowercase() == name).cloned())
    }

    async fn list(&self, query: &ListQuery) -> SweetResult<Vec<Sweet>> {
        let sweets = self.sweets.read().await;

        let mut result: Vec<Sweet> = sweets
            .values()
            .filter(|s| Self::matches(s, query))
            .cloned()
            .collect();

        let order = query.effective_order();
        result.sort_by(|a, b| {
            let ord = Self::compare(a, b, query.sort_by);
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        Ok(result
            .into_iter()
            .skip(usize::try_from(query.skip()).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn count(&self, query: &ListQuery) -> SweetResult<u64> {
        let sweets = self.sweets.read().await;
        Ok(sweets.values().filter(|s| Self::matches(s, query)).count() as u64)
    }

    async fn update(&self, id: Uuid, input: UpdateSweet) -> SweetResult<Option<Sweet>> {
        let mut sweets = self.sweets.write().await;

        if let Some(name) = &input.name {
            if Self::name_taken(&sweets, name, Some(id)) {
                return Err(SweetError::DuplicateName(name.clone()));
            }
        }

        Ok(sweets.get_mut(&id).map(|sweet| {
            sweet.apply_update(input);
            sweet.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> SweetResult<bool> {
        Ok(self.sweets.write().await.remove(&id).is_some())
    }

    async fn decrement_stock(&self, id: Uuid, quantity: i64) -> SweetResult<Option<Sweet>> {
        let mut sweets = self.sweets.write().await;
        Ok(sweets
            .get_mut(&id)
            .filter(|s| s.quantity >= quantity)
            .map(|sweet| {
                sweet.quantity -= quantity;
                sweet.updated_at = Utc::now();
                sweet.clone()
            }))
    }

    async fn increment_stock(&self, id: Uuid, quantity: i64) -> SweetResult<Option<Sweet>> {
        let mut sweets = self.sweets.write().await;
        Ok(sweets.get_mut(&id).map(|sweet| {
            sweet.quantity = sweet.quantity.saturating_add(quantity);
            sweet.updated_at = Utc::now();
            sweet.clone()
        }))
    }

    async fn categories(&self) -> SweetResult<Vec<String>> {
        let sweets = self.sweets.read().await;
        let mut categories: Vec<String> = sweets.values().map(|s| s.category.clone()).collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }
}
