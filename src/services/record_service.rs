// ==================== PRACTICE RECORD QUERIES ====================
// Every operation takes the authenticated owner's id and scopes all reads
// and writes to it. Ids owned by someone else are reported as not found.

use mongodb::bson::oid::ObjectId;

use crate::{
    database::{RecordStore, UserStore},
    models::{
        Criterion, Difficulty, NewRecord, Record, RecordFilter, RecordPatch, TimeBucket,
        TopicProgress, UserProfile, RATING_REQUIRED,
    },
    utils::ApiError,
};

const RECORD_NOT_FOUND: &str = "Question not found";

fn parse_record_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::not_found(RECORD_NOT_FOUND))
}

async fn find(
    store: &dyn RecordStore,
    owner_id: &str,
    criterion: Criterion,
) -> Result<Vec<Record>, ApiError> {
    store
        .find_records(&RecordFilter::owned_by(owner_id).with(criterion))
        .await
}

pub async fn list_all(store: &dyn RecordStore, owner_id: &str) -> Result<Vec<Record>, ApiError> {
    find(store, owner_id, Criterion::All).await
}

pub async fn profile(users: &dyn UserStore, owner_id: &str) -> Result<UserProfile, ApiError> {
    users
        .find_by_user_id(owner_id)
        .await?
        .map(UserProfile::from)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

pub async fn create(
    store: &dyn RecordStore,
    owner_id: &str,
    payload: NewRecord,
) -> Result<Record, ApiError> {
    payload.validate()?;
    store.insert_record(payload.into_record(owner_id)).await
}

/// Partial update. A patch that switches to codeforces without a rating is
/// only accepted when the stored record already has one.
pub async fn update(
    store: &dyn RecordStore,
    owner_id: &str,
    id: &str,
    patch: RecordPatch,
) -> Result<Record, ApiError> {
    let patch = patch.normalized();
    patch.validate()?;
    let id = parse_record_id(id)?;

    if patch.needs_stored_rating() {
        let current = store
            .find_record(owner_id, &id)
            .await?
            .ok_or_else(|| ApiError::not_found(RECORD_NOT_FOUND))?;
        if current.rating.is_none() {
            return Err(ApiError::validation(RATING_REQUIRED));
        }
    }

    store
        .update_record(owner_id, &id, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found(RECORD_NOT_FOUND))
}

pub async fn delete(store: &dyn RecordStore, owner_id: &str, id: &str) -> Result<(), ApiError> {
    let id = parse_record_id(id)?;
    if store.delete_record(owner_id, &id).await? {
        Ok(())
    } else {
        Err(ApiError::not_found(RECORD_NOT_FOUND))
    }
}

/// Notes search. A missing query matches every record.
pub async fn search(
    store: &dyn RecordStore,
    owner_id: &str,
    query: Option<&str>,
) -> Result<Vec<Record>, ApiError> {
    let needle = query.unwrap_or_default().to_string();
    find(store, owner_id, Criterion::NotesContain(needle)).await
}

pub async fn by_topic(
    store: &dyn RecordStore,
    owner_id: &str,
    topic: Option<&str>,
) -> Result<Vec<Record>, ApiError> {
    let topic = topic
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("Topic is required"))?;
    find(store, owner_id, Criterion::Topic(topic.to_string())).await
}

/// Only records stored with `rating: 0` qualify, which is what the
/// submission form writes for unrated platforms.
pub async fn by_difficulty(
    store: &dyn RecordStore,
    owner_id: &str,
    difficulty: Option<&str>,
) -> Result<Vec<Record>, ApiError> {
    let difficulty: Difficulty = difficulty.unwrap_or_default().parse()?;
    find(store, owner_id, Criterion::Difficulty(difficulty)).await
}

pub async fn by_rating(
    store: &dyn RecordStore,
    owner_id: &str,
    min_rating: Option<&str>,
) -> Result<Vec<Record>, ApiError> {
    let min_rating = min_rating
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .ok_or_else(|| ApiError::validation("Invalid or missing rating"))?;

    let records = find(store, owner_id, Criterion::MinRating(min_rating)).await?;
    if records.is_empty() {
        return Err(ApiError::not_found("No questions found with the given rating"));
    }
    Ok(records)
}

/// Records that took `max_time` or longer.
pub async fn by_time_spent(
    store: &dyn RecordStore,
    owner_id: &str,
    max_time: Option<&str>,
) -> Result<Vec<Record>, ApiError> {
    let max_time = max_time
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("Time is required as a query parameter."))?;
    let bucket: TimeBucket = max_time.parse()?;
    find(store, owner_id, Criterion::TimeAtLeast(bucket)).await
}

pub async fn progress_by_topic(
    store: &dyn RecordStore,
    owner_id: &str,
) -> Result<Vec<TopicProgress>, ApiError> {
    store.topic_progress(owner_id).await
}
