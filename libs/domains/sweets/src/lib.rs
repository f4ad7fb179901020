//! Sweets Domain
//!
//! Catalog of sweets with purchase and restock stock adjustments, backed by MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← public / customer / admin routers
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Business rules (duplicate names, stock checks)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB and in-memory implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, list query
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_sweets::{handlers, MongoSweetRepository, SweetService};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("sweetshop");
//!
//! let repository = MongoSweetRepository::new(&db);
//! repository.init_indexes().await?;
//! let service = SweetService::new(repository);
//!
//! // Guards are applied by the caller with `route_layer`.
//! let public = handlers::public_router(service.clone());
//! let admin = handlers::admin_router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{SweetError, SweetResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateSweet, DeleteSweetResponse, ListQuery, PurchaseRequest, PurchaseResponse,
    RestockRequest, SortField, SortOrder, Sweet, SweetListResponse, UpdateSweet,
};
pub use self::mongodb::MongoSweetRepository;
pub use repository::{InMemorySweetRepository, SweetRepository};
pub use service::SweetService;
