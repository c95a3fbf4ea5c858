use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::matching::store::MatchStore;
use crate::models::employee::EmployeeBundle;
use crate::models::match_candidate::{NewCandidateAnswer, NewMatchCandidate};

use super::candidate_service::CandidateService;
use super::employee_service::EmployeeService;

/// Postgres-backed implementation of the orchestrator's store seam,
/// delegating to the per-entity services.
#[derive(Clone)]
pub struct PgMatchStore {
    employees: EmployeeService,
    candidates: CandidateService,
}

impl PgMatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            employees: EmployeeService::new(pool.clone()),
            candidates: CandidateService::new(pool),
        }
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn skill_tags(
        &self,
        department: Option<String>,
    ) -> anyhow::Result<HashMap<String, Vec<String>>> {
        self.employees.skill_tags(department).await
    }

    async fn employee_bundles(
        &self,
        employee_ids: Vec<String>,
    ) -> anyhow::Result<HashMap<String, EmployeeBundle>> {
        self.employees.employee_bundles(employee_ids).await
    }

    async fn create_candidate(&self, candidate: NewMatchCandidate) -> anyhow::Result<Uuid> {
        self.candidates.create_match_candidate(&candidate).await
    }

    async fn insert_evaluation_answers(
        &self,
        candidate_id: Uuid,
        answers: Vec<NewCandidateAnswer>,
    ) -> anyhow::Result<()> {
        self.candidates
            .insert_evaluation_answers(candidate_id, &answers)
            .await
    }

    async fn insert_role_answers(
        &self,
        candidate_id: Uuid,
        answers: Vec<NewCandidateAnswer>,
    ) -> anyhow::Result<()> {
        self.candidates
            .insert_role_answers(candidate_id, &answers)
            .await
    }
}
