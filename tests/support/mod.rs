#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use rolematch_backend::matching::conversation::{ConversationMessage, ToolCallRequest};
use rolematch_backend::matching::llm::{
    AssistantTurn, CompletionModel, ToolChoice, ToolDeclaration,
};
use rolematch_backend::matching::store::MatchStore;
use rolematch_backend::models::employee::EmployeeBundle;
use rolematch_backend::models::match_candidate::{NewCandidateAnswer, NewMatchCandidate};
use rolematch_backend::models::role::{RoleInformation, RoleQuestion};

/// Completion model that plays back pre-scripted turns and records every
/// message list it was called with.
pub struct ScriptedModel {
    turns: Mutex<Vec<AssistantTurn>>,
    seen: Mutex<Vec<Vec<ConversationMessage>>>,
}

impl ScriptedModel {
    pub fn new(turns: Vec<AssistantTurn>) -> Arc<Self> {
        Arc::new(Self {
            turns: Mutex::new(turns),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn messages_of_call(&self, index: usize) -> Vec<ConversationMessage> {
        self.seen.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    async fn complete(
        &self,
        messages: &[ConversationMessage],
        _tools: &[ToolDeclaration],
        _tool_choice: ToolChoice,
    ) -> anyhow::Result<AssistantTurn> {
        self.seen.lock().unwrap().push(messages.to_vec());
        let mut turns = self.turns.lock().unwrap();
        if turns.is_empty() {
            anyhow::bail!("scripted model ran out of turns");
        }
        Ok(turns.remove(0))
    }
}

#[derive(Default)]
pub struct StoreState {
    pub skill_tags: HashMap<String, Vec<String>>,
    pub bundles: HashMap<String, EmployeeBundle>,
    pub candidates: Vec<(Uuid, NewMatchCandidate)>,
    pub evaluation_answers: Vec<(Uuid, NewCandidateAnswer)>,
    pub role_answers: Vec<(Uuid, NewCandidateAnswer)>,
    /// Employee ids whose parent insert should fail.
    pub fail_parent_for: HashSet<String>,
    /// When set, every read errors like an unreachable database.
    pub fail_reads: bool,
    pub read_calls: usize,
}

/// In-memory stand-in for the Postgres store, with failure injection.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    pub state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skill_tags(tags: &[(&str, &[&str])]) -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            for (employee_id, employee_tags) in tags {
                state.skill_tags.insert(
                    employee_id.to_string(),
                    employee_tags.iter().map(|t| t.to_string()).collect(),
                );
            }
        }
        store
    }

    pub fn fail_parent_for(&self, employee_id: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_parent_for
            .insert(employee_id.to_string());
    }

    pub fn persisted_employee_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .candidates
            .iter()
            .map(|(_, c)| c.employee_id.clone())
            .collect()
    }

    pub fn candidate_id_for(&self, employee_id: &str) -> Option<Uuid> {
        self.state
            .lock()
            .unwrap()
            .candidates
            .iter()
            .find(|(_, c)| c.employee_id == employee_id)
            .map(|(id, _)| *id)
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn skill_tags(
        &self,
        department: Option<String>,
    ) -> anyhow::Result<HashMap<String, Vec<String>>> {
        let mut state = self.state.lock().unwrap();
        state.read_calls += 1;
        if state.fail_reads {
            anyhow::bail!("store unreachable");
        }
        let _ = department;
        Ok(state.skill_tags.clone())
    }

    async fn employee_bundles(
        &self,
        employee_ids: Vec<String>,
    ) -> anyhow::Result<HashMap<String, EmployeeBundle>> {
        let mut state = self.state.lock().unwrap();
        state.read_calls += 1;
        if state.fail_reads {
            anyhow::bail!("store unreachable");
        }
        Ok(employee_ids
            .into_iter()
            .filter_map(|id| state.bundles.get(&id).cloned().map(|b| (id, b)))
            .collect())
    }

    async fn create_candidate(&self, candidate: NewMatchCandidate) -> anyhow::Result<Uuid> {
        let mut state = self.state.lock().unwrap();
        if state.fail_parent_for.contains(&candidate.employee_id) {
            anyhow::bail!("insert failed for {}", candidate.employee_id);
        }
        let id = Uuid::new_v4();
        state.candidates.push((id, candidate));
        Ok(id)
    }

    async fn insert_evaluation_answers(
        &self,
        candidate_id: Uuid,
        answers: Vec<NewCandidateAnswer>,
    ) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .evaluation_answers
            .extend(answers.into_iter().map(|a| (candidate_id, a)));
        Ok(())
    }

    async fn insert_role_answers(
        &self,
        candidate_id: Uuid,
        answers: Vec<NewCandidateAnswer>,
    ) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .role_answers
            .extend(answers.into_iter().map(|a| (candidate_id, a)));
        Ok(())
    }
}

/// Role snapshot with the authoritative question ids used across the suite.
pub fn sample_role() -> RoleInformation {
    RoleInformation {
        id: 7,
        title: "Backend Engineer".into(),
        description: "Own the billing services.".into(),
        ai_description: Some("Billing platform ownership with on-call duty.".into()),
        experience_years: 4,
        department: Some("Engineering".into()),
        skills: Some(vec!["rust".into(), "postgres".into()]),
        evaluation_questions: vec![
            RoleQuestion {
                id: 45,
                question: "Biggest system owned?".into(),
            },
            RoleQuestion {
                id: 67,
                question: "Production incident handled?".into(),
            },
        ],
        role_questions: vec![
            RoleQuestion {
                id: 123,
                question: "Why this role?".into(),
            },
            RoleQuestion {
                id: 156,
                question: "Team fit?".into(),
            },
        ],
    }
}

pub fn tool_call(id: &str, name: &str, arguments: &str) -> ToolCallRequest {
    ToolCallRequest {
        id: id.into(),
        name: name.into(),
        arguments: arguments.into(),
    }
}

pub fn turn(content: Option<&str>, tool_calls: Vec<ToolCallRequest>) -> AssistantTurn {
    AssistantTurn {
        content: content.map(|c| c.to_string()),
        tool_calls,
    }
}

/// A fully valid finalize candidate answering every sample-role question.
pub fn candidate_json(employee_id: &str) -> serde_json::Value {
    json!({
        "employeeId": employee_id,
        "overallRating": 90,
        "impactScore": 80,
        "communicationScore": 70,
        "skillRecencyScore": 85,
        "totalExperienceYears": 8,
        "relevantExperienceYears": 5,
        "status": "high",
        "aiSummary": "Solid match for the billing work.",
        "evaluationAnswers": [
            {"questionId": 45, "answer": "Owned the billing platform.", "foundInDocuments": true},
            {"questionId": 67, "answer": "Resolved the 2024 checkout outage.", "foundInDocuments": false}
        ],
        "roleAnswers": [
            {"questionId": 123, "answer": "Wants to move into payments.", "foundInDocuments": false},
            {"questionId": 156, "answer": "Has shipped with this team before.", "foundInDocuments": true}
        ]
    })
}
