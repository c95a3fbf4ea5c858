use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::match_candidate::{
    CandidateAnswer, MatchCandidate, NewCandidateAnswer, NewMatchCandidate,
};

#[derive(Clone)]
pub struct CandidateService {
    pool: PgPool,
}

impl CandidateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the parent candidate row and return its generated id. Child
    /// answer rows cannot exist before this succeeds.
    pub async fn create_match_candidate(&self, candidate: &NewMatchCandidate) -> Result<Uuid> {
        let row = sqlx::query(
            r#"
            INSERT INTO match_candidates
                (role_id, employee_id, overall_rating, impact_score, communication_score,
                 skill_recency_score, total_experience_years, relevant_experience_years,
                 tier, ai_summary)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(candidate.role_id)
        .bind(&candidate.employee_id)
        .bind(candidate.overall_rating)
        .bind(candidate.impact_score)
        .bind(candidate.communication_score)
        .bind(candidate.skill_recency_score)
        .bind(candidate.total_experience_years)
        .bind(candidate.relevant_experience_years)
        .bind(candidate.tier.as_str())
        .bind(&candidate.ai_summary)
        .fetch_one(&self.pool)
        .await?;
        let id: Uuid = row.try_get("id")?;
        Ok(id)
    }

    pub async fn insert_evaluation_answers(
        &self,
        candidate_id: Uuid,
        answers: &[NewCandidateAnswer],
    ) -> Result<()> {
        self.bulk_insert_answers("candidate_evaluation_answers", candidate_id, answers)
            .await
    }

    pub async fn insert_role_answers(
        &self,
        candidate_id: Uuid,
        answers: &[NewCandidateAnswer],
    ) -> Result<()> {
        self.bulk_insert_answers("candidate_role_answers", candidate_id, answers)
            .await
    }

    async fn bulk_insert_answers(
        &self,
        table: &str,
        candidate_id: Uuid,
        answers: &[NewCandidateAnswer],
    ) -> Result<()> {
        if answers.is_empty() {
            return Ok(());
        }

        let question_ids: Vec<i32> = answers.iter().map(|a| a.question_id).collect();
        let texts: Vec<String> = answers.iter().map(|a| a.answer.clone()).collect();
        let found: Vec<bool> = answers.iter().map(|a| a.found_in_documents).collect();

        let sql = format!(
            r#"
            INSERT INTO {table} (candidate_id, question_id, answer, found_in_documents)
            SELECT $1, question_id, answer, found_in_documents
            FROM UNNEST($2::int4[], $3::text[], $4::bool[])
                AS t(question_id, answer, found_in_documents)
            "#
        );
        sqlx::query(&sql)
            .bind(candidate_id)
            .bind(&question_ids)
            .bind(&texts)
            .bind(&found)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Read-back of what finalization wrote for one role, newest first.
    pub async fn list_for_role(&self, role_id: i64) -> Result<Vec<MatchCandidateDetails>> {
        let candidates: Vec<MatchCandidate> = sqlx::query_as(
            r#"
            SELECT id, role_id, employee_id, overall_rating, impact_score, communication_score,
                   skill_recency_score, total_experience_years, relevant_experience_years,
                   tier, ai_summary, created_at
            FROM match_candidates
            WHERE role_id = $1
            ORDER BY created_at DESC, overall_rating DESC
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        let mut details = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let evaluation_answers: Vec<CandidateAnswer> = sqlx::query_as(
                r#"
                SELECT id, candidate_id, question_id, answer, found_in_documents
                FROM candidate_evaluation_answers
                WHERE candidate_id = $1
                ORDER BY id
                "#,
            )
            .bind(candidate.id)
            .fetch_all(&self.pool)
            .await?;

            let role_answers: Vec<CandidateAnswer> = sqlx::query_as(
                r#"
                SELECT id, candidate_id, question_id, answer, found_in_documents
                FROM candidate_role_answers
                WHERE candidate_id = $1
                ORDER BY id
                "#,
            )
            .bind(candidate.id)
            .fetch_all(&self.pool)
            .await?;

            details.push(MatchCandidateDetails {
                candidate,
                evaluation_answers,
                role_answers,
            });
        }
        Ok(details)
    }
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidateDetails {
    #[serde(flatten)]
    pub candidate: MatchCandidate,
    pub evaluation_answers: Vec<CandidateAnswer>,
    pub role_answers: Vec<CandidateAnswer>,
}
