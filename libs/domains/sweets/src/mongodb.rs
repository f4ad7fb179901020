//! MongoDB implementation of SweetRepository

use async_trait::async_trait;
use database::mongodb::{from_bson_datetime, to_bson_datetime, uuid_to_bson};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{self, doc, Bson, Document},
    options::{Collation, CollationStrength, FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{SweetError, SweetResult};
use crate::models::{ListQuery, Sweet, UpdateSweet};
use crate::repository::SweetRepository;

pub const SWEETS_COLLECTION: &str = "sweets";

/// Stored shape of a sweet. Timestamps are native BSON dates so sorting on
/// `created_at` is chronological.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SweetDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    category: String,
    price: f64,
    quantity: i64,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl From<&Sweet> for SweetDocument {
    fn from(sweet: &Sweet) -> Self {
        Self {
            id: sweet.id,
            name: sweet.name.clone(),
            category: sweet.category.clone(),
            price: sweet.price,
            quantity: sweet.quantity,
            created_at: to_bson_datetime(sweet.created_at),
            updated_at: to_bson_datetime(sweet.updated_at),
        }
    }
}

impl From<SweetDocument> for Sweet {
    fn from(doc: SweetDocument) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            category: doc.category,
            price: doc.price,
            quantity: doc.quantity,
            created_at: from_bson_datetime(doc.created_at),
            updated_at: from_bson_datetime(doc.updated_at),
        }
    }
}

/// MongoDB implementation of the SweetRepository
#[derive(Clone)]
pub struct MongoSweetRepository {
    collection: Collection<SweetDocument>,
}

/// Case-insensitive comparison for names and sorting.
fn case_insensitive() -> Collation {
    Collation::builder()
        .locale("en")
        .strength(CollationStrength::Secondary)
        .build()
}

fn id_filter(id: Uuid) -> Document {
    doc! { "_id": uuid_to_bson(id) }
}

fn now_bson() -> bson::DateTime {
    bson::DateTime::now()
}

impl MongoSweetRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, SWEETS_COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<SweetDocument>(collection_name);
        Self { collection }
    }

    /// Create the unique name index and the list query indexes
    pub async fn init_indexes(&self) -> SweetResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .collation(case_insensitive())
                        .name("idx_name_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "category": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "price": 1 })
                .options(IndexOptions::builder().name("idx_price".to_string()).build())
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Sweet indexes created successfully");
        Ok(())
    }

    /// Build a MongoDB filter document from the list query
    fn build_filter(query: &ListQuery) -> Document {
        let mut doc = doc! {};

        if let Some(name) = query.name_filter() {
            doc.insert(
                "name",
                doc! { "$regex": regex::escape(name), "$options": "i" },
            );
        }

        if let Some(category) = query.category_filter() {
            doc.insert(
                "category",
                doc! { "$regex": format!("^{}$", regex::escape(category)), "$options": "i" },
            );
        }

        doc
    }

    /// Sort document with `_id` as a tiebreaker so pages are stable
    fn build_sort(query: &ListQuery) -> Document {
        let direction = query.effective_order().direction();
        let mut sort = Document::new();
        sort.insert(query.sort_by.document_field(), direction);
        sort.insert("_id", direction);
        sort
    }

    fn build_update(input: &UpdateSweet) -> Document {
        let mut set = doc! { "updated_at": now_bson() };

        if let Some(name) = &input.name {
            set.insert("name", name.as_str());
        }
        if let Some(category) = &input.category {
            set.insert("category", category.as_str());
        }
        if let Some(price) = input.price {
            set.insert("price", price);
        }
        if let Some(quantity) = input.quantity {
            set.insert("quantity", quantity);
        }

        doc! { "$set": set }
    }

    fn return_after() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build()
    }

    fn map_write_error(err: mongodb::error::Error, name: &str) -> SweetError {
        if database::mongodb::is_duplicate_key(&err) {
            SweetError::DuplicateName(name.to_string())
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl SweetRepository for MongoSweetRepository {
    #[instrument(skip(self, sweet), fields(sweet_name = %sweet.name))]
    async fn create(&self, sweet: Sweet) -> SweetResult<Sweet> {
        let document = SweetDocument::from(&sweet);
        self.collection
            .insert_one(&document)
            .await
            .map_err(|e| Self::map_write_error(e, &sweet.name))?;

        tracing::info!(sweet_id = %sweet.id, "Sweet created successfully");
        Ok(document.into())
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> SweetResult<Option<Sweet>> {
        let sweet = self.collection.find_one(id_filter(id)).await?;
        Ok(sweet.map(Sweet::from))
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> SweetResult<Option<Sweet>> {
        let sweet = self
            .collection
            .find_one(doc! { "name": name })
            .collation(case_insensitive())
            .await?;
        Ok(sweet.map(Sweet::from))
    }

    #[instrument(skip(self))]
    async fn list(&self, query: &ListQuery) -> SweetResult<Vec<Sweet>> {
        let options = mongodb::options::FindOptions::builder()
            .sort(Self::build_sort(query))
            .skip(query.skip())
            .limit(i64::try_from(query.limit).unwrap_or(i64::MAX))
            .collation(case_insensitive())
            .build();

        let cursor = self
            .collection
            .find(Self::build_filter(query))
            .with_options(options)
            .await?;
        let documents: Vec<SweetDocument> = cursor.try_collect().await?;

        Ok(documents.into_iter().map(Sweet::from).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self, query: &ListQuery) -> SweetResult<u64> {
        let count = self
            .collection
            .count_documents(Self::build_filter(query))
            .await?;
        Ok(count)
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: UpdateSweet) -> SweetResult<Option<Sweet>> {
        let update = Self::build_update(&input);

        let updated = self
            .collection
            .find_one_and_update(id_filter(id), update)
            .with_options(Self::return_after())
            .await
            .map_err(|e| Self::map_write_error(e, input.name.as_deref().unwrap_or_default()))?;

        if updated.is_some() {
            tracing::info!(sweet_id = %id, "Sweet updated successfully");
        }
        Ok(updated.map(Sweet::from))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> SweetResult<bool> {
        let result = self.collection.delete_one(id_filter(id)).await?;

        if result.deleted_count > 0 {
            tracing::info!(sweet_id = %id, "Sweet deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn decrement_stock(&self, id: Uuid, quantity: i64) -> SweetResult<Option<Sweet>> {
        let mut filter = id_filter(id);
        filter.insert("quantity", doc! { "$gte": quantity });

        let update = doc! {
            "$inc": { "quantity": -quantity },
            "$set": { "updated_at": now_bson() }
        };

        let sweet = self
            .collection
            .find_one_and_update(filter, update)
            .with_options(Self::return_after())
            .await?;

        if let Some(ref s) = sweet {
            tracing::info!(sweet_id = %id, quantity_change = -quantity, remaining = s.quantity, "Stock decremented");
        }
        Ok(sweet.map(Sweet::from))
    }

    #[instrument(skip(self))]
    async fn increment_stock(&self, id: Uuid, quantity: i64) -> SweetResult<Option<Sweet>> {
        let update = doc! {
            "$inc": { "quantity": quantity },
            "$set": { "updated_at": now_bson() }
        };

        let sweet = self
            .collection
            .find_one_and_update(id_filter(id), update)
            .with_options(Self::return_after())
            .await?;

        if let Some(ref s) = sweet {
            tracing::info!(sweet_id = %id, quantity_change = quantity, remaining = s.quantity, "Stock incremented");
        }
        Ok(sweet.map(Sweet::from))
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> SweetResult<Vec<String>> {
        let values = self.collection.distinct("category", doc! {}).await?;

        let mut categories: Vec<String> = values
            .into_iter()
            .filter_map(|v| match v {
                Bson::String(s) => Some(s),
                _ => None,
            })
            .collect();
        categories.sort();
        Ok(categories)
    }
}
