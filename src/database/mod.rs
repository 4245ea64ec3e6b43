use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use std::time::Duration;

mod records;
mod store;
mod users;

#[cfg(test)]
pub mod memory;

pub use store::*;

pub const USERS: &str = "users";
pub const QUESTIONS: &str = "questions";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn connect(uri: &str, database: &str) -> mongodb::error::Result<Self> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(Duration::from_secs(300));
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));
        client_options.app_name = Some("practice-tracker".to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(database);

        // Test connection
        db.run_command(doc! { "ping": 1 }).await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Unique identity indexes back the signup conflict checks; the owner
    /// indexes serve the per-user scans behind every record query.
    async fn ensure_indexes(&self) -> mongodb::error::Result<()> {
        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<mongodb::bson::Document>(USERS);
        for field in ["user_id", "email", "username"] {
            let index = IndexModel::builder()
                .keys(doc! { field: 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build();
            users.create_index(index).await?;
            log::info!("   ✅ Index ready: users({}) unique", field);
        }

        let questions = self.collection::<mongodb::bson::Document>(QUESTIONS);
        let owner_index = IndexModel::builder().keys(doc! { "user": 1 }).build();
        questions.create_index(owner_index).await?;
        log::info!("   ✅ Index ready: questions(user)");

        let topic_index = IndexModel::builder()
            .keys(doc! { "user": 1, "topics": 1 })
            .build();
        questions.create_index(topic_index).await?;
        log::info!("   ✅ Index ready: questions(user, topics)");

        log::info!("✅ Database indexes ready");
        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub async fn ping(&self) -> mongodb::error::Result<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let db = MongoDB::connect(&uri, "practice_tracker_test").await;
        assert!(db.is_ok());
        assert!(db.unwrap().ping().await.is_ok());
    }
}
