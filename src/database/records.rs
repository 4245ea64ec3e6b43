use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use mongodb::options::ReturnDocument;

use super::{MongoDB, RecordStore, QUESTIONS};
use crate::models::{Record, RecordFilter, RecordPatch, TopicProgress};
use crate::utils::ApiError;

fn owned(owner_id: &str, id: &ObjectId) -> Document {
    doc! { "_id": id, "user": owner_id }
}

/// `$unwind` fans each record out once per topic before grouping.
pub(crate) fn progress_pipeline(owner_id: &str) -> Vec<Document> {
    vec![
        doc! { "$match": { "user": owner_id } },
        doc! { "$unwind": "$topics" },
        doc! {
            "$group": {
                "_id": "$topics",
                "totalQuestions": { "$sum": 1 },
                "needsRevisionCount": {
                    "$sum": { "$cond": [{ "$eq": ["$needsRevision", true] }, 1, 0] }
                }
            }
        },
        doc! {
            "$project": {
                "_id": 0,
                "topic": "$_id",
                "totalQuestions": 1,
                "needsRevisionCount": 1
            }
        },
        doc! { "$sort": { "topic": 1 } },
    ]
}

#[async_trait]
impl RecordStore for MongoDB {
    async fn find_records(&self, filter: &RecordFilter) -> Result<Vec<Record>, ApiError> {
        let cursor = self
            .collection::<Record>(QUESTIONS)
            .find(filter.to_document())
            .await?;
        Ok(cursor.try_collect::<Vec<Record>>().await?)
    }

    async fn insert_record(&self, mut record: Record) -> Result<Record, ApiError> {
        let result = self
            .collection::<Record>(QUESTIONS)
            .insert_one(&record)
            .await?;
        record.id = result.inserted_id.as_object_id();
        Ok(record)
    }

    async fn find_record(&self, owner_id: &str, id: &ObjectId) -> Result<Option<Record>, ApiError> {
        let record = self
            .collection::<Record>(QUESTIONS)
            .find_one(owned(owner_id, id))
            .await?;
        Ok(record)
    }

    async fn update_record(
        &self,
        owner_id: &str,
        id: &ObjectId,
        patch: &RecordPatch,
    ) -> Result<Option<Record>, ApiError> {
        if patch.is_empty() {
            return self.find_record(owner_id, id).await;
        }

        let changes = patch.to_set_document()?;
        let update = doc! { "$set": changes };
        let record = self
            .collection::<Record>(QUESTIONS)
            .find_one_and_update(owned(owner_id, id), update)
            .return_document(ReturnDocument::After)
            .await?;
        Ok(record)
    }

    async fn delete_record(&self, owner_id: &str, id: &ObjectId) -> Result<bool, ApiError> {
        let result = self
            .collection::<Record>(QUESTIONS)
            .delete_one(owned(owner_id, id))
            .await?;
        Ok(result.deleted_count == 1)
    }

    async fn topic_progress(&self, owner_id: &str) -> Result<Vec<TopicProgress>, ApiError> {
        let cursor = self
            .collection::<Record>(QUESTIONS)
            .aggregate(progress_pipeline(owner_id))
            .await?;
        let rows: Vec<Document> = cursor.try_collect().await?;

        rows.into_iter()
            .map(|row| bson::from_document::<TopicProgress>(row).map_err(ApiError::internal))
            .collect()
    }

    async fn ping(&self) -> Result<(), ApiError> {
        MongoDB::ping(self).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_pipeline_is_owner_scoped() {
        let pipeline = progress_pipeline("owner-1");
        let first = pipeline[0].get_document("$match").unwrap();
        assert_eq!(first.get_str("user").unwrap(), "owner-1");
        assert_eq!(pipeline[1].get_str("$unwind").unwrap(), "$topics");
    }

    #[test]
    fn aggregated_rows_decode_into_progress() {
        let row = doc! { "topic": "Graphs", "totalQuestions": 4, "needsRevisionCount": 1 };
        let progress: TopicProgress = bson::from_document(row).unwrap();
        assert_eq!(progress.topic, "Graphs");
        assert_eq!(progress.total_questions, 4);
        assert_eq!(progress.needs_revision_count, 1);
    }
}
