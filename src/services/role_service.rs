use anyhow::Result;
use sqlx::PgPool;

use crate::models::role::{RoleInformation, RoleQuestion, RoleRow};

#[derive(Clone)]
pub struct RoleService {
    pool: PgPool,
}

impl RoleService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve the full role snapshot, including both authoritative question
    /// lists in their stored order.
    pub async fn get_role_information(&self, role_id: i64) -> Result<Option<RoleInformation>> {
        let row: Option<RoleRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, ai_description, experience_years, department, skills
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };

        let evaluation_questions: Vec<RoleQuestion> = sqlx::query_as(
            r#"
            SELECT id, question
            FROM role_evaluation_questions
            WHERE role_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        let role_questions: Vec<RoleQuestion> = sqlx::query_as(
            r#"
            SELECT id, question
            FROM role_questions
            WHERE role_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(RoleInformation::from_parts(
            row,
            evaluation_questions,
            role_questions,
        )))
    }
}
