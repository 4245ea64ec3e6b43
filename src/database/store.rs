use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::models::{Record, RecordFilter, RecordPatch, TopicProgress, User};
use crate::utils::ApiError;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<User>, ApiError>;

    /// Fails with `Conflict` when the email or username is already taken.
    async fn insert_user(&self, user: &User) -> Result<(), ApiError>;
}

/// Record persistence. Every method is scoped to an owner: lookups by id
/// that belong to someone else behave exactly like missing ids.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_records(&self, filter: &RecordFilter) -> Result<Vec<Record>, ApiError>;

    async fn insert_record(&self, record: Record) -> Result<Record, ApiError>;

    async fn find_record(&self, owner_id: &str, id: &ObjectId) -> Result<Option<Record>, ApiError>;

    /// Applies the patch and returns the updated record, or `None` if no owned record has this id.
    async fn update_record(
        &self,
        owner_id: &str,
        id: &ObjectId,
        patch: &RecordPatch,
    ) -> Result<Option<Record>, ApiError>;

    /// Returns whether an owned record was deleted.
    async fn delete_record(&self, owner_id: &str, id: &ObjectId) -> Result<bool, ApiError>;

    async fn topic_progress(&self, owner_id: &str) -> Result<Vec<TopicProgress>, ApiError>;

    async fn ping(&self) -> Result<(), ApiError>;
}
