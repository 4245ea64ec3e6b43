use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Account document in the `users` collection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub user_id: String,  // PRIMARY IDENTIFIER - token subject and record owner
    pub username: String,
    pub email: String,
    pub password: String, // bcrypt hash, never the plaintext
    pub created_at: Option<BsonDateTime>,
}

impl User {
    pub fn new(username: &str, email: &str, password_hash: String) -> Self {
        User {
            _id: None,
            user_id: ObjectId::new().to_hex(),
            username: username.to_string(),
            email: email.to_string(),
            password: password_hash,
            created_at: Some(BsonDateTime::now()),
        }
    }
}

/// Identity summary returned by `GET /api/questions/user`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            username: user.username,
            email: user.email,
        }
    }
}
