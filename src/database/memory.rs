use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{RecordStore, UserStore};
use crate::models::{Record, RecordFilter, RecordPatch, TopicProgress, User};
use crate::utils::ApiError;

/// In-process version of the progress pipeline, sorted by topic name.
fn tally<'a, I>(records: I) -> Vec<TopicProgress>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut by_topic: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for record in records {
        for topic in &record.topics {
            let entry = by_topic.entry(topic.as_str()).or_default();
            entry.0 += 1;
            if record.needs_revision {
                entry.1 += 1;
            }
        }
    }

    by_topic
        .into_iter()
        .map(|(topic, (total, revision))| TopicProgress {
            topic: topic.to_string(),
            total_questions: total,
            needs_revision_count: revision,
        })
        .collect()
}

/// Process-local store with the same owner scoping and uniqueness rules as MongoDB.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    records: Mutex<Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn raw_record(&self, id: &ObjectId) -> Option<Record> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id.as_ref() == Some(id))
            .cloned()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username || u.user_id == user.user_id)
        {
            return Err(ApiError::Conflict("Account already exists".to_string()));
        }
        let mut stored = user.clone();
        stored._id = Some(ObjectId::new());
        users.push(stored);
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_records(&self, filter: &RecordFilter) -> Result<Vec<Record>, ApiError> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().filter(|r| filter.matches(r)).cloned().collect())
    }

    async fn insert_record(&self, mut record: Record) -> Result<Record, ApiError> {
        record.id = Some(ObjectId::new());
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn find_record(&self, owner_id: &str, id: &ObjectId) -> Result<Option<Record>, ApiError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .find(|r| r.id.as_ref() == Some(id) && r.owner_id == owner_id)
            .cloned())
    }

    async fn update_record(
        &self,
        owner_id: &str,
        id: &ObjectId,
        patch: &RecordPatch,
    ) -> Result<Option<Record>, ApiError> {
        let mut records = self.records.lock().unwrap();
        let Some(record) = records
            .iter_mut()
            .find(|r| r.id.as_ref() == Some(id) && r.owner_id == owner_id)
        else {
            return Ok(None);
        };
        patch.apply(record);
        Ok(Some(record.clone()))
    }

    async fn delete_record(&self, owner_id: &str, id: &ObjectId) -> Result<bool, ApiError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !(r.id.as_ref() == Some(id) && r.owner_id == owner_id));
        Ok(records.len() < before)
    }

    async fn topic_progress(&self, owner_id: &str) -> Result<Vec<TopicProgress>, ApiError> {
        let records = self.records.lock().unwrap();
        Ok(tally(records.iter().filter(|r| r.owner_id == owner_id)))
    }

    async fn ping(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;

    fn record(topics: &[&str], needs_revision: bool) -> Record {
        Record {
            id: None,
            owner_id: "owner-1".into(),
            platform: Platform::Leetcode,
            url: "https://leetcode.com/problems/x".into(),
            difficulty: "medium".into(),
            rating: None,
            notes: String::new(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            needs_revision,
            time_spent: None,
        }
    }

    #[test]
    fn tally_counts_each_topic_of_a_record() {
        let records = vec![record(&["Arrays", "DP"], true), record(&["Arrays"], false)];
        let progress = tally(&records);

        assert_eq!(
            progress,
            vec![
                TopicProgress {
                    topic: "Arrays".into(),
                    total_questions: 2,
                    needs_revision_count: 1,
                },
                TopicProgress {
                    topic: "DP".into(),
                    total_questions: 1,
                    needs_revision_count: 1,
                },
            ]
        );
        assert!(tally(&Vec::<Record>::new()).is_empty());
    }
}
