use serde::{Deserialize, Serialize};
use validator::Validate;

/// Confidence bucket declared by the model for one candidate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    High,
    Medium,
    Low,
}

impl MatchTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// One answered question inside a finalize request. `question_id` must be
/// copied verbatim from the role snapshot's question lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeAnswer {
    pub question_id: i32,
    pub answer: String,
    #[serde(default)]
    pub found_in_documents: bool,
}

/// One ranked candidate as declared by the model in `finalizeCandidates`.
///
/// Score fields are bounded 1-100; a candidate violating the bounds is
/// counted as failed without touching the store.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateFinalizeInput {
    pub employee_id: String,
    #[validate(range(min = 1, max = 100))]
    pub overall_rating: i32,
    #[validate(range(min = 1, max = 100))]
    pub impact_score: i32,
    #[validate(range(min = 1, max = 100))]
    pub communication_score: i32,
    #[validate(range(min = 1, max = 100))]
    pub skill_recency_score: i32,
    #[validate(range(min = 0))]
    pub total_experience_years: i32,
    #[validate(range(min = 0))]
    pub relevant_experience_years: i32,
    pub status: MatchTier,
    pub ai_summary: String,
    #[serde(default)]
    pub evaluation_answers: Vec<FinalizeAnswer>,
    #[serde(default)]
    pub role_answers: Vec<FinalizeAnswer>,
}

/// Arguments of the `finalizeCandidates` tool call.
///
/// Items are kept as raw JSON so one malformed candidate fails alone
/// instead of aborting the whole batch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeArgs {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(default)]
    pub role_id: Option<i64>,
}

/// Terminal payload of a finalize run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeOutcome {
    pub success: bool,
    pub data_count: u32,
    pub failed_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FinalizeOutcome {
    pub fn completed(data_count: u32, failed_count: u32) -> Self {
        Self {
            success: true,
            data_count,
            failed_count,
            error: None,
        }
    }

    pub fn setup_failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data_count: 0,
            failed_count: 0,
            error: Some(message.into()),
        }
    }
}
