use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::dto::match_dto::{CandidateFinalizeInput, MatchTier};

/// A ranked candidate as persisted by finalization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub id: Uuid,
    pub role_id: i64,
    pub employee_id: String,
    pub overall_rating: i32,
    pub impact_score: i32,
    pub communication_score: i32,
    pub skill_recency_score: i32,
    pub total_experience_years: i32,
    pub relevant_experience_years: i32,
    pub tier: String,
    pub ai_summary: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Child row answering one evaluation or role question.
///
/// `question_id` is the authoritative id from the role snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CandidateAnswer {
    pub id: i32,
    pub candidate_id: Uuid,
    pub question_id: i32,
    pub answer: String,
    pub found_in_documents: bool,
}

/// Parent row awaiting insertion. The store assigns the id on insert;
/// child rows cannot be created before it exists.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMatchCandidate {
    pub role_id: i64,
    pub employee_id: String,
    pub overall_rating: i32,
    pub impact_score: i32,
    pub communication_score: i32,
    pub skill_recency_score: i32,
    pub total_experience_years: i32,
    pub relevant_experience_years: i32,
    pub tier: MatchTier,
    pub ai_summary: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCandidateAnswer {
    pub question_id: i32,
    pub answer: String,
    pub found_in_documents: bool,
}

impl NewMatchCandidate {
    pub fn from_input(role_id: i64, input: &CandidateFinalizeInput) -> Self {
        Self {
            role_id,
            employee_id: input.employee_id.clone(),
            overall_rating: input.overall_rating,
            impact_score: input.impact_score,
            communication_score: input.communication_score,
            skill_recency_score: input.skill_recency_score,
            total_experience_years: input.total_experience_years,
            relevant_experience_years: input.relevant_experience_years,
            tier: input.status,
            ai_summary: input.ai_summary.clone(),
        }
    }
}
