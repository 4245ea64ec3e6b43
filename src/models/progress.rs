use serde::{Deserialize, Serialize};

/// Per-topic counts. A record with N topics counts once under each of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgress {
    pub topic: String,
    pub total_questions: u64,
    pub needs_revision_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(TopicProgress {
            topic: "Graphs".into(),
            total_questions: 3,
            needs_revision_count: 0,
        })
        .unwrap();
        assert_eq!(json["totalQuestions"], 3);
        assert_eq!(json["needsRevisionCount"], 0);
    }
}
