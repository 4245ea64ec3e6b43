use mongodb::bson::{doc, Document};

use super::{Difficulty, Platform, TimeBucket};

/// What a record query selects on, besides the owner.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    All,
    /// Topic list contains this exact tag.
    Topic(String),
    /// Matching difficulty with a zero rating.
    Difficulty(Difficulty),
    /// Codeforces records rated at or above the threshold.
    MinRating(f64),
    /// Time spent in this bucket or any longer one.
    TimeAtLeast(TimeBucket),
    /// Case-insensitive substring of the notes.
    NotesContain(String),
}

/// Owner-scoped record query. There is no constructor without an owner.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFilter {
    owner_id: String,
    criterion: Criterion,
}

impl RecordFilter {
    pub fn owned_by(owner_id: &str) -> Self {
        RecordFilter {
            owner_id: owner_id.to_string(),
            criterion: Criterion::All,
        }
    }

    pub fn with(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// MongoDB filter document for this query.
    pub fn to_document(&self) -> Document {
        let mut filter = doc! { "user": &self.owner_id };
        match &self.criterion {
            Criterion::All => {}
            Criterion::Topic(topic) => {
                filter.insert("topics", doc! { "$in": [topic] });
            }
            Criterion::Difficulty(difficulty) => {
                filter.insert("difficulty", difficulty.as_str());
                filter.insert("rating", 0);
            }
            Criterion::MinRating(min) => {
                filter.insert("platform", Platform::Codeforces.as_str());
                filter.insert("rating", doc! { "$gte": *min });
            }
            Criterion::TimeAtLeast(bucket) => {
                let range: Vec<&str> = bucket.at_least().iter().map(TimeBucket::as_str).collect();
                filter.insert("timeSpent", doc! { "$in": range });
            }
            Criterion::NotesContain(needle) => {
                filter.insert(
                    "notes",
                    doc! { "$regex": regex::escape(needle), "$options": "i" },
                );
            }
        }
        filter
    }

    /// Same predicate as `to_document`, evaluated in process.
    #[cfg(test)]
    pub fn matches(&self, record: &super::Record) -> bool {
        if record.owner_id != self.owner_id {
            return false;
        }
        match &self.criterion {
            Criterion::All => true,
            Criterion::Topic(topic) => record.topics.iter().any(|t| t == topic),
            Criterion::Difficulty(difficulty) => {
                record.difficulty == difficulty.as_str() && record.rating == Some(0)
            }
            Criterion::MinRating(min) => {
                record.platform == Platform::Codeforces
                    && record.rating.map_or(false, |rating| rating as f64 >= *min)
            }
            Criterion::TimeAtLeast(bucket) => record.time_spent.map_or(false, |spent| spent >= *bucket),
            Criterion::NotesContain(needle) => record
                .notes
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }
}
