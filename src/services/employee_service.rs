use std::collections::HashMap;

use anyhow::Result;
use sqlx::PgPool;

use crate::models::employee::{EmployeeBundle, EmployeeDocument, PeerFeedback};

#[derive(Clone)]
pub struct EmployeeService {
    pool: PgPool,
}

impl EmployeeService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Skill tags per employee id, optionally filtered by department.
    pub async fn skill_tags(
        &self,
        department: Option<String>,
    ) -> Result<HashMap<String, Vec<String>>> {
        let rows: Vec<(String, String)> = match department {
            Some(dep) => {
                sqlx::query_as(
                    r#"
                    SELECT t.employee_id, t.tag
                    FROM employee_skill_tags t
                    JOIN employees e ON e.id = t.employee_id
                    WHERE e.department = $1
                    ORDER BY t.employee_id, t.id
                    "#,
                )
                .bind(dep)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT employee_id, tag
                    FROM employee_skill_tags
                    ORDER BY employee_id, id
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut tags: HashMap<String, Vec<String>> = HashMap::new();
        for (employee_id, tag) in rows {
            tags.entry(employee_id).or_default().push(tag);
        }
        Ok(tags)
    }

    /// Full profile bundles for the given employee ids. Ids with no matching
    /// employee row are simply absent from the result.
    pub async fn employee_bundles(
        &self,
        employee_ids: Vec<String>,
    ) -> Result<HashMap<String, EmployeeBundle>> {
        if employee_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let base: Vec<(String, String, String, String)> = sqlx::query_as(
            r#"
            SELECT id, name, role, rank
            FROM employees
            WHERE id = ANY($1)
            "#,
        )
        .bind(&employee_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut bundles: HashMap<String, EmployeeBundle> = base
            .into_iter()
            .map(|(id, name, role, rank)| {
                (
                    id,
                    EmployeeBundle {
                        name,
                        role,
                        rank,
                        ..Default::default()
                    },
                )
            })
            .collect();

        let skills: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT employee_id, tag
            FROM employee_skill_tags
            WHERE employee_id = ANY($1)
            ORDER BY employee_id, id
            "#,
        )
        .bind(&employee_ids)
        .fetch_all(&self.pool)
        .await?;
        for (employee_id, tag) in skills {
            if let Some(bundle) = bundles.get_mut(&employee_id) {
                bundle.skills.push(tag);
            }
        }

        let documents: Vec<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT employee_id, filename, extracted_text
            FROM employee_documents
            WHERE employee_id = ANY($1)
            ORDER BY employee_id, id
            "#,
        )
        .bind(&employee_ids)
        .fetch_all(&self.pool)
        .await?;
        for (employee_id, filename, extracted_text) in documents {
            if let Some(bundle) = bundles.get_mut(&employee_id) {
                bundle.documents.push(EmployeeDocument {
                    filename,
                    extracted_text,
                });
            }
        }

        let self_assessments: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT employee_id, content
            FROM employee_self_assessments
            WHERE employee_id = ANY($1)
            ORDER BY employee_id, id
            "#,
        )
        .bind(&employee_ids)
        .fetch_all(&self.pool)
        .await?;
        for (employee_id, content) in self_assessments {
            if let Some(bundle) = bundles.get_mut(&employee_id) {
                bundle.self_assessments.push(content);
            }
        }

        let peer_feedback: Vec<(String, i32, String, String)> = sqlx::query_as(
            r#"
            SELECT employee_id, rating, comment, reviewer
            FROM employee_peer_feedback
            WHERE employee_id = ANY($1)
            ORDER BY employee_id, id
            "#,
        )
        .bind(&employee_ids)
        .fetch_all(&self.pool)
        .await?;
        for (employee_id, rating, comment, reviewer) in peer_feedback {
            if let Some(bundle) = bundles.get_mut(&employee_id) {
                bundle.peer_feedback.push(PeerFeedback {
                    rating,
                    comment,
                    reviewer,
                });
            }
        }

        let manager_evaluations: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT employee_id, content
            FROM employee_manager_evaluations
            WHERE employee_id = ANY($1)
            ORDER BY employee_id, id
            "#,
        )
        .bind(&employee_ids)
        .fetch_all(&self.pool)
        .await?;
        for (employee_id, content) in manager_evaluations {
            if let Some(bundle) = bundles.get_mut(&employee_id) {
                bundle.manager_evaluations.push(content);
            }
        }

        Ok(bundles)
    }
}
