//! Integration tests for the Sweets domain against a live MongoDB
//!
//! Ignored by default. Run with a reachable server:
//!
//! ```sh
//! MONGODB_URL=mongodb://localhost:27017 cargo test -p domain_sweets -- --ignored
//! ```
//!
//! Each test works in its own collection, dropped when the test ends.

use domain_sweets::*;
use ::mongodb::Database;
use uuid::Uuid;

const TEST_DATABASE: &str = "sweets_integration_test";

struct TestCollection {
    db: Database,
    name: String,
}

impl TestCollection {
    async fn new(prefix: &str) -> Self {
        let url = std::env::var("MONGODB_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = database::mongodb::connect(&url).await.unwrap();
        Self {
            db: client.database(TEST_DATABASE),
            name: format!("{}_{}", prefix, Uuid::new_v4().simple()),
        }
    }

    async fn repository(&self) -> MongoSweetRepository {
        let repo = MongoSweetRepository::with_collection(&self.db, &self.name);
        repo.init_indexes().await.unwrap();
        repo
    }

    async fn cleanup(self) {
        self.db.collection::<::mongodb::bson::Document>(&self.name).drop().await.unwrap();
    }
}

fn sweet(name: &str, category: &str, price: f64, quantity: i64) -> Sweet {
    Sweet::new(CreateSweet {
        name: name.to_string(),
        category: category.to_string(),
        price,
        quantity,
    })
}

#[tokio::test]
#[ignore]
async fn test_create_and_get_sweet() {
    let coll = TestCollection::new("create_get").await;
    let repo = coll.repository().await;

    let created = repo.create(sweet("Kaju Katli", "Nut-Based", 50.0, 10)).await.unwrap();
    let found = repo.get_by_id(created.id).await.unwrap().expect("sweet should exist");

    assert_eq!(found, created);
    assert!(repo.get_by_id(Uuid::now_v7()).await.unwrap().is_none());

    coll.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn test_update_and_delete_by_id() {
    let coll = TestCollection::new("update_delete").await;
    let repo = coll.repository().await;

    let created = repo.create(sweet("Barfi", "Milk-Based", 60.0, 8)).await.unwrap();
    let updated = repo
        .update(
            created.id,
            UpdateSweet {
                price: Some(65.0),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("update should match");
    assert_eq!(updated.price, 65.0);
    assert!(updated.updated_at >= created.updated_at);

    assert!(repo.delete(created.id).await.unwrap());
    assert!(!repo.delete(created.id).await.unwrap());

    coll.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn test_conditional_decrement() {
    let coll = TestCollection::new("decrement").await;
    let repo = coll.repository().await;

    let created = repo.create(sweet("Ladoo", "Nut-Based", 40.0, 5)).await.unwrap();

    let after = repo.decrement_stock(created.id, 3).await.unwrap().unwrap();
    assert_eq!(after.quantity, 2);

    assert!(repo.decrement_stock(created.id, 3).await.unwrap().is_none());
    let unchanged = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(unchanged.quantity, 2);

    let restocked = repo.increment_stock(created.id, 10).await.unwrap().unwrap();
    assert_eq!(restocked.quantity, 12);

    coll.cleanup().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_concurrent_purchases_never_oversell() {
    let coll = TestCollection::new("concurrent").await;
    let service = SweetService::new(coll.repository().await);

    let created = service
        .create_sweet(CreateSweet {
            name: "Jalebi".to_string(),
            category: "Fried".to_string(),
            price: 20.0,
            quantity: 3,
        })
        .await
        .unwrap();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.purchase(created.id, 1).await })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(SweetError::InsufficientStock { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(succeeded, 3);
    assert_eq!(service.get_sweet(created.id).await.unwrap().quantity, 0);

    coll.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn test_name_is_unique_ignoring_case() {
    let coll = TestCollection::new("unique_name").await;
    let repo = coll.repository().await;

    repo.create(sweet("Gulab Jamun", "Milk-Based", 30.0, 15)).await.unwrap();

    let result = repo.create(sweet("GULAB JAMUN", "Milk-Based", 31.0, 1)).await;
    assert!(
        matches!(result, Err(SweetError::DuplicateName(_))),
        "Expected DuplicateName error, got {:?}",
        result
    );
    assert!(repo.find_by_name("gulab jamun").await.unwrap().is_some());

    coll.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn test_list_sorts_by_creation_time() {
    let coll = TestCollection::new("list_sort").await;
    let repo = coll.repository().await;

    for name in ["First", "Second", "Third"] {
        repo.create(sweet(name, "Assorted", 10.0, 1)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let newest_first = repo.list(&ListQuery::default()).await.unwrap();
    let names: Vec<_> = newest_first.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Third", "Second", "First"]);
    assert_eq!(repo.count(&ListQuery::default()).await.unwrap(), 3);
    assert_eq!(repo.categories().await.unwrap(), vec!["Assorted"]);

    coll.cleanup().await;
}
