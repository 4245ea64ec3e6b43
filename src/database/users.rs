use async_trait::async_trait;
use mongodb::bson::doc;

use super::{MongoDB, UserStore, USERS};
use crate::models::User;
use crate::utils::ApiError;

#[async_trait]
impl UserStore for MongoDB {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = self
            .collection::<User>(USERS)
            .find_one(doc! { "email": email })
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let user = self
            .collection::<User>(USERS)
            .find_one(doc! { "username": username })
            .await?;
        Ok(user)
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        let user = self
            .collection::<User>(USERS)
            .find_one(doc! { "user_id": user_id })
            .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: &User) -> Result<(), ApiError> {
        self.collection::<User>(USERS).insert_one(user).await?;
        Ok(())
    }
}
