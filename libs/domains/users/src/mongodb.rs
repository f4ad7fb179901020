//! MongoDB implementations of the user and OTP repositories

use async_trait::async_trait;
use database::mongodb::{from_bson_datetime, to_bson_datetime, uuid_to_bson};
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, Document, doc},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{OtpVerification, Role, User};
use crate::repository::{OtpRepository, UserRepository};

pub const USERS_COLLECTION: &str = "users";
pub const OTP_COLLECTION: &str = "otp_verifications";

/// Stored shape of a user, with native BSON timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    firstname: String,
    #[serde(default)]
    lastname: Option<String>,
    email: String,
    password_hash: String,
    #[serde(default)]
    role: Role,
    #[serde(default)]
    verified: bool,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            verified: user.verified,
            created_at: to_bson_datetime(user.created_at),
            updated_at: to_bson_datetime(user.updated_at),
        }
    }
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        Self {
            id: doc.id,
            firstname: doc.firstname,
            lastname: doc.lastname,
            email: doc.email,
            password_hash: doc.password_hash,
            role: doc.role,
            verified: doc.verified,
            created_at: from_bson_datetime(doc.created_at),
            updated_at: from_bson_datetime(doc.updated_at),
        }
    }
}

fn id_filter(id: Uuid) -> Document {
    doc! { "_id": uuid_to_bson(id) }
}

/// MongoDB implementation of the UserRepository
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, USERS_COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<UserDocument>(collection_name),
        }
    }

    /// Create the unique email index
    pub async fn init_indexes(&self) -> UserResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("idx_email_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(index).await?;
        tracing::info!("User indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: User) -> UserResult<User> {
        let document = UserDocument::from(&user);
        match self.collection.insert_one(&document).await {
            Ok(_) => {
                tracing::info!(user_id = %user.id, "User created successfully");
                Ok(document.into())
            }
            Err(e) if database::mongodb::is_duplicate_key(&e) => {
                Err(UserError::DuplicateEmail(user.email))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let user = self.collection.find_one(id_filter(id)).await?;
        Ok(user.map(User::from))
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let user = self.collection.find_one(doc! { "email": email }).await?;
        Ok(user.map(User::from))
    }

    #[instrument(skip(self))]
    async fn set_verified(&self, id: Uuid) -> UserResult<Option<User>> {
        let update = doc! { "$set": { "verified": true, "updated_at": bson::DateTime::now() } };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let user = self
            .collection
            .find_one_and_update(id_filter(id), update)
            .with_options(options)
            .await?;

        if user.is_some() {
            tracing::info!(user_id = %id, "User verified");
        }
        Ok(user.map(User::from))
    }
}

/// Stored shape of an OTP record. Timestamps are native BSON dates so the
/// TTL index can expire them.
#[derive(Debug, Serialize, Deserialize)]
struct OtpDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    user_id: Uuid,
    code_hash: String,
    created_at: bson::DateTime,
    expires_at: bson::DateTime,
}

impl From<OtpDocument> for OtpVerification {
    fn from(doc: OtpDocument) -> Self {
        Self {
            id: doc.id,
            user_id: doc.user_id,
            code_hash: doc.code_hash,
            created_at: from_bson_datetime(doc.created_at),
            expires_at: from_bson_datetime(doc.expires_at),
        }
    }
}

/// MongoDB implementation of the OtpRepository
#[derive(Clone)]
pub struct MongoOtpRepository {
    collection: Collection<OtpDocument>,
}

impl MongoOtpRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, OTP_COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<OtpDocument>(collection_name),
        }
    }

    /// One record per user, removed by the server once `expires_at` passes
    pub async fn init_indexes(&self) -> UserResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "user_id": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_user_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "expires_at": 1 })
                .options(
                    IndexOptions::builder()
                        .expire_after(Duration::from_secs(0))
                        .name("idx_expires_at_ttl".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("OTP indexes created successfully");
        Ok(())
    }

    fn upsert_update(otp: &OtpVerification) -> Document {
        doc! {
            "$set": {
                "code_hash": otp.code_hash.as_str(),
                "created_at": to_bson_datetime(otp.created_at),
                "expires_at": to_bson_datetime(otp.expires_at),
            },
            "$setOnInsert": { "_id": uuid_to_bson(otp.id) },
        }
    }
}

#[async_trait]
impl OtpRepository for MongoOtpRepository {
    #[instrument(skip(self, otp), fields(user_id = %otp.user_id))]
    async fn upsert_for_user(&self, otp: OtpVerification) -> UserResult<()> {
        self.collection
            .update_one(doc! { "user_id": uuid_to_bson(otp.user_id) }, Self::upsert_update(&otp))
            .upsert(true)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Uuid) -> UserResult<Option<OtpVerification>> {
        let found = self
            .collection
            .find_one(doc! { "user_id": uuid_to_bson(user_id) })
            .await?;
        Ok(found.map(OtpVerification::from))
    }

    #[instrument(skip(self))]
    async fn delete_by_user(&self, user_id: Uuid) -> UserResult<()> {
        self.collection
            .delete_many(doc! { "user_id": uuid_to_bson(user_id) })
            .await?;
        Ok(())
    }
}
