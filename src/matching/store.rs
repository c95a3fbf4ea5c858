use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::employee::EmployeeBundle;
use crate::models::match_candidate::{NewCandidateAnswer, NewMatchCandidate};

/// Collaborator operations on the data store, as consumed by the tool
/// handlers. Parent-before-children ordering on the write side is an
/// invariant: answer rows reference the id returned by `create_candidate`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Skill tags per employee, optionally filtered by department.
    async fn skill_tags(
        &self,
        department: Option<String>,
    ) -> anyhow::Result<HashMap<String, Vec<String>>>;

    /// Full per-employee bundles for the given identifiers.
    async fn employee_bundles(
        &self,
        employee_ids: Vec<String>,
    ) -> anyhow::Result<HashMap<String, EmployeeBundle>>;

    /// Insert the parent candidate row and return its generated id.
    async fn create_candidate(&self, candidate: NewMatchCandidate) -> anyhow::Result<Uuid>;

    async fn insert_evaluation_answers(
        &self,
        candidate_id: Uuid,
        answers: Vec<NewCandidateAnswer>,
    ) -> anyhow::Result<()>;

    async fn insert_role_answers(
        &self,
        candidate_id: Uuid,
        answers: Vec<NewCandidateAnswer>,
    ) -> anyhow::Result<()>;
}
