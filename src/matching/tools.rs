use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use validator::Validate;

use crate::dto::match_dto::{CandidateFinalizeInput, FinalizeArgs, FinalizeAnswer, FinalizeOutcome};
use crate::models::match_candidate::{NewCandidateAnswer, NewMatchCandidate};
use crate::models::role::RoleInformation;
use crate::services::audit_service::AuditService;

use super::conversation::ToolCallRequest;
use super::events::{ProgressEvent, ProgressSink, ToolPhase};
use super::llm::ToolDeclaration;
use super::store::MatchStore;

pub const SKILL_TAGS: &str = "getSkillTags";
pub const EMPLOYEE_INFORMATION: &str = "getEmployeeInformation";
pub const FINALIZE_CANDIDATES: &str = "finalizeCandidates";

/// The closed set of tools the model can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    SkillTags,
    EmployeeInformation,
    FinalizeCandidates,
}

impl ToolName {
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            SKILL_TAGS => Some(Self::SkillTags),
            EMPLOYEE_INFORMATION => Some(Self::EmployeeInformation),
            FINALIZE_CANDIDATES => Some(Self::FinalizeCandidates),
            _ => None,
        }
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            Self::SkillTags => SKILL_TAGS,
            Self::EmployeeInformation => EMPLOYEE_INFORMATION,
            Self::FinalizeCandidates => FINALIZE_CANDIDATES,
        }
    }
}

/// Tool schemas as exposed to the model, in strict mode: every property
/// required, no undeclared properties anywhere.
pub fn tool_declarations() -> Vec<ToolDeclaration> {
    vec![
        ToolDeclaration {
            name: SKILL_TAGS,
            description: "Look up skill tags per employee id, optionally scoped to one department.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "department": {
                        "type": "string",
                        "description": "Department to filter by. Pass an empty string for the whole company."
                    }
                },
                "required": ["department"],
                "additionalProperties": false
            }),
        },
        ToolDeclaration {
            name: EMPLOYEE_INFORMATION,
            description: "Fetch the full profile bundle (role, rank, skills, documents, \
                          self-assessments, peer feedback, manager evaluations) for the given employee ids.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "employeeIds": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Employee ids exactly as returned by getSkillTags."
                    }
                },
                "required": ["employeeIds"],
                "additionalProperties": false
            }),
        },
        ToolDeclaration {
            name: FINALIZE_CANDIDATES,
            description: "Persist the final ranked candidate list and end the search. \
                          Question ids must be copied verbatim from the role snapshot.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "results": {
                        "type": "array",
                        "items": candidate_schema()
                    },
                    "roleId": {
                        "type": "integer",
                        "description": "The role id this search was started for."
                    }
                },
                "required": ["results", "roleId"],
                "additionalProperties": false
            }),
        },
    ]
}

fn candidate_schema() -> JsonValue {
    let answer_schema = json!({
        "type": "object",
        "properties": {
            "questionId": { "type": "integer", "description": "Authoritative question id from the role snapshot." },
            "answer": { "type": "string" },
            "foundInDocuments": { "type": "boolean" }
        },
        "required": ["questionId", "answer", "foundInDocuments"],
        "additionalProperties": false
    });
    json!({
        "type": "object",
        "properties": {
            "employeeId": { "type": "string" },
            "overallRating": { "type": "integer", "minimum": 1, "maximum": 100 },
            "impactScore": { "type": "integer", "minimum": 1, "maximum": 100 },
            "communicationScore": { "type": "integer", "minimum": 1, "maximum": 100 },
            "skillRecencyScore": { "type": "integer", "minimum": 1, "maximum": 100 },
            "totalExperienceYears": { "type": "integer" },
            "relevantExperienceYears": { "type": "integer" },
            "status": { "type": "string", "enum": ["high", "medium", "low"] },
            "aiSummary": { "type": "string" },
            "evaluationAnswers": { "type": "array", "items": answer_schema },
            "roleAnswers": { "type": "array", "items": answer_schema }
        },
        "required": [
            "employeeId", "overallRating", "impactScore", "communicationScore",
            "skillRecencyScore", "totalExperienceYears", "relevantExperienceYears",
            "status", "aiSummary", "evaluationAnswers", "roleAnswers"
        ],
        "additionalProperties": false
    })
}

/// Outcome of one tool execution as seen by the loop controller.
#[derive(Debug)]
pub enum ToolOutcome {
    /// Serialized back into a tool message; the round continues.
    Payload(JsonValue),
    /// Hard exit: finalization ran, nothing else may execute.
    Finalized(FinalizeOutcome),
}

#[derive(Debug, Default, Deserialize)]
struct SkillTagArgs {
    #[serde(default)]
    department: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmployeeInfoArgs {
    #[serde(default)]
    employee_ids: Vec<String>,
}

/// Executes tool calls against the data store. Stateless between calls:
/// handlers see only their declared arguments, never the conversation.
pub struct ToolExecutor {
    role: RoleInformation,
    store: Arc<dyn MatchStore>,
    audit: AuditService,
}

impl ToolExecutor {
    pub fn new(role: RoleInformation, store: Arc<dyn MatchStore>, audit: AuditService) -> Self {
        Self { role, store, audit }
    }

    pub async fn execute(&self, call: &ToolCallRequest, events: &ProgressSink) -> ToolOutcome {
        match ToolName::from_wire(&call.name) {
            Some(ToolName::SkillTags) => {
                ToolOutcome::Payload(self.skill_tags(call.parsed_arguments()).await)
            }
            Some(ToolName::EmployeeInformation) => {
                ToolOutcome::Payload(self.employee_information(call.parsed_arguments()).await)
            }
            Some(ToolName::FinalizeCandidates) => {
                ToolOutcome::Finalized(self.finalize(call.parsed_arguments(), events).await)
            }
            None => {
                tracing::warn!(tool = %call.name, "Unknown tool requested, returning empty result");
                ToolOutcome::Payload(json!({}))
            }
        }
    }

    async fn skill_tags(&self, args: JsonValue) -> JsonValue {
        let args: SkillTagArgs = serde_json::from_value(args).unwrap_or_default();
        let department = args.department.filter(|d| !d.trim().is_empty());
        match self.store.skill_tags(department).await {
            Ok(tags) => json!({ "success": true, "skillTags": tags }),
            Err(e) => {
                tracing::warn!(error = %e, "getSkillTags data access failed");
                json!({ "success": false, "skillTags": {} })
            }
        }
    }

    async fn employee_information(&self, args: JsonValue) -> JsonValue {
        let args: EmployeeInfoArgs = serde_json::from_value(args).unwrap_or_default();
        if args.employee_ids.is_empty() {
            return json!({ "success": true, "employees": {} });
        }
        match self.store.employee_bundles(args.employee_ids).await {
            Ok(bundles) => json!({ "success": true, "employees": bundles }),
            Err(e) => {
                tracing::warn!(error = %e, "getEmployeeInformation data access failed");
                json!({ "success": false, "employees": {} })
            }
        }
    }

    /// The only mutating tool. Candidates are independent units of work: one
    /// failure is counted and logged, the rest of the batch proceeds.
    pub async fn finalize(&self, args: JsonValue, events: &ProgressSink) -> FinalizeOutcome {
        let args: FinalizeArgs = match serde_json::from_value(args) {
            Ok(args) => args,
            Err(e) => {
                tracing::error!(error = %e, "finalizeCandidates arguments did not deserialize");
                return FinalizeOutcome::setup_failure(format!("invalid finalize arguments: {e}"));
            }
        };

        if let Some(declared) = args.role_id {
            if declared != self.role.id {
                tracing::warn!(
                    declared,
                    authoritative = self.role.id,
                    "Model-declared role id differs from the search's role, using the authoritative one"
                );
            }
        }

        let raw_dump = JsonValue::Array(args.results.clone());
        let audit_file = self.audit.record_finalize(self.role.id, &raw_dump).await;

        if args.results.is_empty() {
            return FinalizeOutcome::completed(0, 0);
        }

        let eval_ids: HashSet<i32> = self
            .role
            .evaluation_questions
            .iter()
            .map(|q| q.id)
            .collect();
        let role_ids: HashSet<i32> = self.role.role_questions.iter().map(|q| q.id).collect();

        let total = args.results.len();
        let mut succeeded = 0u32;
        let mut failed = 0u32;
        for (index, raw) in args.results.iter().enumerate() {
            events.emit(ProgressEvent::tool(
                FINALIZE_CANDIDATES,
                ToolPhase::Progress,
                format!("Persisting candidate {}/{}", index + 1, total),
            ));
            match self.persist_candidate(raw, &eval_ids, &role_ids).await {
                Ok(employee_id) => {
                    succeeded += 1;
                    tracing::info!(%employee_id, role_id = self.role.id, "Candidate persisted");
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!(index, error = ?e, "Candidate persistence failed");
                    self.audit
                        .append_failure(
                            audit_file.as_deref(),
                            &format!("candidate {}: {:#}", index + 1, e),
                        )
                        .await;
                }
            }
        }

        FinalizeOutcome::completed(succeeded, failed)
    }

    async fn persist_candidate(
        &self,
        raw: &JsonValue,
        eval_ids: &HashSet<i32>,
        role_ids: &HashSet<i32>,
    ) -> anyhow::Result<String> {
        let input: CandidateFinalizeInput =
            serde_json::from_value(raw.clone()).context("malformed candidate entry")?;
        input.validate().context("candidate failed validation")?;

        let evaluation_answers =
            retain_authoritative(&input.evaluation_answers, eval_ids, "evaluation");
        let role_answers = retain_authoritative(&input.role_answers, role_ids, "role");

        // Parent first: answer rows reference the generated candidate id.
        let candidate_id = self
            .store
            .create_candidate(NewMatchCandidate::from_input(self.role.id, &input))
            .await?;
        if !evaluation_answers.is_empty() {
            self.store
                .insert_evaluation_answers(candidate_id, evaluation_answers)
                .await?;
        }
        if !role_answers.is_empty() {
            self.store
                .insert_role_answers(candidate_id, role_answers)
                .await?;
        }
        Ok(input.employee_id)
    }
}

/// Keep only answers whose question id is in the authoritative set from the
/// role snapshot; the model is not trusted to invent identifiers.
fn retain_authoritative(
    answers: &[FinalizeAnswer],
    allowed: &HashSet<i32>,
    kind: &'static str,
) -> Vec<NewCandidateAnswer> {
    answers
        .iter()
        .filter_map(|a| {
            if allowed.contains(&a.question_id) {
                Some(NewCandidateAnswer {
                    question_id: a.question_id,
                    answer: a.answer.clone(),
                    found_in_documents: a.found_in_documents,
                })
            } else {
                tracing::warn!(
                    question_id = a.question_id,
                    kind,
                    "Dropping answer with non-authoritative question id"
                );
                None
            }
        })
        .collect()
}
