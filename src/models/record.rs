use mongodb::bson::{self, oid::ObjectId, Document};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::ApiError;

/// Judge the problem was solved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Leetcode,
    Codeforces,
    Gfg,
    Codingninjas,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Leetcode => "leetcode",
            Platform::Codeforces => "codeforces",
            Platform::Gfg => "gfg",
            Platform::Codingninjas => "codingninjas",
        }
    }

    /// Codeforces problems are graded by numeric rating instead of easy/medium/hard.
    pub fn is_rated(&self) -> bool {
        matches!(self, Platform::Codeforces)
    }
}

/// Difficulty labels accepted by the difficulty filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ApiError::validation("Invalid or missing difficulty")),
        }
    }
}

/// Time spent on a problem, in 5 minute buckets. Variant order is the bucket order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
pub enum TimeBucket {
    #[serde(rename = "5min")]
    Min5,
    #[serde(rename = "10min")]
    Min10,
    #[serde(rename = "15min")]
    Min15,
    #[serde(rename = "20min")]
    Min20,
    #[serde(rename = "25min")]
    Min25,
    #[serde(rename = "30min")]
    Min30,
    #[serde(rename = "35min")]
    Min35,
    #[serde(rename = "40min")]
    Min40,
    #[serde(rename = "45min")]
    Min45,
    #[serde(rename = "50min")]
    Min50,
    #[serde(rename = "55min")]
    Min55,
    #[serde(rename = "60min")]
    Min60,
}

impl TimeBucket {
    pub const ALL: [TimeBucket; 12] = [
        TimeBucket::Min5,
        TimeBucket::Min10,
        TimeBucket::Min15,
        TimeBucket::Min20,
        TimeBucket::Min25,
        TimeBucket::Min30,
        TimeBucket::Min35,
        TimeBucket::Min40,
        TimeBucket::Min45,
        TimeBucket::Min50,
        TimeBucket::Min55,
        TimeBucket::Min60,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBucket::Min5 => "5min",
            TimeBucket::Min10 => "10min",
            TimeBucket::Min15 => "15min",
            TimeBucket::Min20 => "20min",
            TimeBucket::Min25 => "25min",
            TimeBucket::Min30 => "30min",
            TimeBucket::Min35 => "35min",
            TimeBucket::Min40 => "40min",
            TimeBucket::Min45 => "45min",
            TimeBucket::Min50 => "50min",
            TimeBucket::Min55 => "55min",
            TimeBucket::Min60 => "60min",
        }
    }

    /// This bucket and every longer one.
    pub fn at_least(&self) -> &'static [TimeBucket] {
        static ORDER: [TimeBucket; 12] = TimeBucket::ALL;
        &ORDER[*self as usize..]
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeBucket {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeBucket::ALL
            .iter()
            .copied()
            .find(|bucket| bucket.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = TimeBucket::ALL.iter().map(TimeBucket::as_str).collect();
                ApiError::validation(format!(
                    "Invalid time value. Must be one of: {}",
                    valid.join(", ")
                ))
            })
    }
}

/// The submission form sends `""` when no bucket was picked.
fn blank_bucket_as_none<'de, D>(deserializer: D) -> Result<Option<TimeBucket>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e: ApiError| de::Error::custom(e.to_string())),
    }
}

pub const RATING_REQUIRED: &str = "Rating is required for codeforces problems";

/// Practice record as stored in the `questions` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(rename = "user")]
    pub owner_id: String,

    pub platform: Platform,
    pub url: String,
    pub difficulty: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,

    #[serde(default)]
    pub notes: String,

    pub topics: Vec<String>,

    #[serde(default)]
    pub needs_revision: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<TimeBucket>,
}

/// Body of `POST /api/questions`. Owner and id are never read from the payload.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    pub platform: Platform,
    pub url: String,
    pub difficulty: String,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub notes: String,
    pub topics: Vec<String>,
    #[serde(default)]
    pub needs_revision: bool,
    #[serde(default, deserialize_with = "blank_bucket_as_none")]
    pub time_spent: Option<TimeBucket>,
}

impl NewRecord {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_text("url", &self.url)?;
        require_text("difficulty", &self.difficulty)?;
        validate_topics(&self.topics)?;
        if self.platform.is_rated() && self.rating.is_none() {
            return Err(ApiError::validation(RATING_REQUIRED));
        }
        Ok(())
    }

    pub fn into_record(self, owner_id: &str) -> Record {
        Record {
            id: None,
            owner_id: owner_id.to_string(),
            platform: self.platform,
            url: self.url.trim().to_string(),
            difficulty: self.difficulty.trim().to_string(),
            rating: self.rating,
            notes: self.notes,
            topics: trim_topics(self.topics),
            needs_revision: self.needs_revision,
            time_spent: self.time_spent,
        }
    }
}

/// Body of `PATCH /api/questions/{id}`: only the supplied fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_revision: Option<bool>,
    #[serde(
        default,
        deserialize_with = "blank_bucket_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_spent: Option<TimeBucket>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.platform.is_none()
            && self.url.is_none()
            && self.difficulty.is_none()
            && self.rating.is_none()
            && self.notes.is_none()
            && self.topics.is_none()
            && self.needs_revision.is_none()
            && self.time_spent.is_none()
    }

    /// Trims url, difficulty and topic tags the same way `NewRecord::into_record` does.
    pub fn normalized(mut self) -> Self {
        self.url = self.url.map(|url| url.trim().to_string());
        self.difficulty = self.difficulty.map(|d| d.trim().to_string());
        self.topics = self.topics.map(trim_topics);
        self
    }

    /// Switching to a rated platform without sending a rating relies on the stored one.
    pub fn needs_stored_rating(&self) -> bool {
        self.platform.is_some_and(|p| p.is_rated()) && self.rating.is_none()
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(url) = &self.url {
            require_text("url", url)?;
        }
        if let Some(difficulty) = &self.difficulty {
            require_text("difficulty", difficulty)?;
        }
        if let Some(topics) = &self.topics {
            validate_topics(topics)?;
        }
        Ok(())
    }

    /// `$set` body for the fields present in the patch.
    pub fn to_set_document(&self) -> Result<Document, ApiError> {
        bson::to_document(self).map_err(ApiError::internal)
    }

    #[cfg(test)]
    pub fn apply(&self, record: &mut Record) {
        if let Some(platform) = self.platform {
            record.platform = platform;
        }
        if let Some(url) = &self.url {
            record.url = url.clone();
        }
        if let Some(difficulty) = &self.difficulty {
            record.difficulty = difficulty.clone();
        }
        if let Some(rating) = self.rating {
            record.rating = Some(rating);
        }
        if let Some(notes) = &self.notes {
            record.notes = notes.clone();
        }
        if let Some(topics) = &self.topics {
            record.topics = topics.clone();
        }
        if let Some(needs_revision) = self.needs_revision {
            record.needs_revision = needs_revision;
        }
        if let Some(time_spent) = self.time_spent {
            record.time_spent = Some(time_spent);
        }
    }
}

/// Record as returned over HTTP.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub owner_id: String,
    pub platform: Platform,
    pub url: String,
    pub difficulty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    pub notes: String,
    pub topics: Vec<String>,
    pub needs_revision: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<TimeBucket>,
}

impl From<Record> for RecordResponse {
    fn from(record: Record) -> Self {
        RecordResponse {
            id: record.id.map(|id| id.to_hex()).unwrap_or_default(),
            owner_id: record.owner_id,
            platform: record.platform,
            url: record.url,
            difficulty: record.difficulty,
            rating: record.rating,
            notes: record.notes,
            topics: record.topics,
            needs_revision: record.needs_revision,
            time_spent: record.time_spent,
        }
    }
}

fn trim_topics(topics: Vec<String>) -> Vec<String> {
    topics.into_iter().map(|t| t.trim().to_string()).collect()
}

fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn validate_topics(topics: &[String]) -> Result<(), ApiError> {
    if topics.is_empty() {
        return Err(ApiError::validation("At least one topic is required"));
    }
    if topics.iter().any(|t| t.trim().is_empty()) {
        return Err(ApiError::validation("Topics cannot be blank"));
    }
    Ok(())
}
