//! Agentic candidate-matching orchestrator.
//!
//! Drives a bounded multi-round conversation against the completion model:
//! each round forces the model to pick at least one tool, executes the calls
//! sequentially in emission order, and appends the results to the
//! conversation. `finalizeCandidates` is a hard exit: it runs at most once
//! per search and nothing executes after it.

pub mod conversation;
pub mod events;
pub mod llm;
pub mod store;
pub mod tools;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio_util::sync::CancellationToken;

use crate::dto::match_dto::FinalizeOutcome;
use crate::error::{Error, Result};
use crate::models::role::RoleInformation;
use crate::services::audit_service::AuditService;

use conversation::{Conversation, ConversationMessage};
use events::{Progress, ProgressEvent, ProgressSink, ToolPhase};
use llm::{CompletionModel, ToolChoice};
use store::MatchStore;
use tools::{ToolExecutor, ToolOutcome};

/// Hard ceiling on model rounds. The only circuit breaker against a model
/// that never converges.
pub const MAX_ROUNDS: u32 = 5;

/// Terminal result of one search.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MatchOutcome {
    /// The model called `finalizeCandidates`; counts come from persistence.
    Finalized(FinalizeOutcome),
    /// The loop ended without finalization; `text` is whatever the model
    /// last produced (possibly empty).
    Degraded { text: String },
}

pub struct MatchOrchestrator {
    model: Arc<dyn CompletionModel>,
    store: Arc<dyn MatchStore>,
    audit: AuditService,
}

impl MatchOrchestrator {
    pub fn new(
        model: Arc<dyn CompletionModel>,
        store: Arc<dyn MatchStore>,
        audit: AuditService,
    ) -> Self {
        Self {
            model,
            store,
            audit,
        }
    }

    /// Run one search to completion.
    ///
    /// Model-call errors propagate to the caller untouched; everything the
    /// loop can degrade over (bad arguments, unknown tools, failed reads) is
    /// absorbed so the conversation keeps moving. The cancellation token is
    /// honored before every model call and every tool execution.
    pub async fn run_match(
        &self,
        role: RoleInformation,
        events: &ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<MatchOutcome> {
        let executor = ToolExecutor::new(role.clone(), self.store.clone(), self.audit.clone());
        let declarations = tools::tool_declarations();
        let mut conversation = Conversation::seeded(system_prompt(), user_prompt(&role)?);

        tracing::info!(role_id = role.id, title = %role.title, "Starting candidate match");

        for round in 1..=MAX_ROUNDS {
            self.ensure_live(cancel)?;
            events.emit(ProgressEvent::status(
                format!("Round {round}: consulting the model"),
                Some(Progress {
                    current: round,
                    total: MAX_ROUNDS,
                    step: "model_call".into(),
                }),
            ));

            let turn = self
                .model
                .complete(conversation.messages(), &declarations, ToolChoice::Required)
                .await?;

            if turn.tool_calls.is_empty() {
                // Last-resort termination: the model answered in prose
                // despite the forced tool choice.
                let text = turn.content.unwrap_or_default();
                tracing::warn!(round, "Model returned no tool calls, ending with text result");
                events.emit(ProgressEvent::status(
                    "Model answered without acting, returning its text",
                    None,
                ));
                return Ok(self.finish(events, MatchOutcome::Degraded { text }));
            }

            conversation.push(ConversationMessage::Assistant {
                content: turn.content.clone(),
                tool_calls: turn.tool_calls.clone(),
            });

            for call in &turn.tool_calls {
                self.ensure_live(cancel)?;
                events.emit(ProgressEvent::tool(
                    call.name.clone(),
                    ToolPhase::Start,
                    format!("Executing {}", call.name),
                ));

                match executor.execute(call, events).await {
                    ToolOutcome::Finalized(outcome) => {
                        events.emit(ProgressEvent::tool(
                            call.name.clone(),
                            ToolPhase::Complete,
                            format!(
                                "{} stored, {} failed",
                                outcome.data_count, outcome.failed_count
                            ),
                        ));
                        // Finalization ends the search: remaining tool calls
                        // in this round are never processed.
                        return Ok(self.finish(events, MatchOutcome::Finalized(outcome)));
                    }
                    ToolOutcome::Payload(payload) => {
                        events.emit(ProgressEvent::tool(
                            call.name.clone(),
                            ToolPhase::Complete,
                            format!("{} finished", call.name),
                        ));
                        conversation.push(ConversationMessage::Tool {
                            tool_call_id: call.id.clone(),
                            content: payload.to_string(),
                        });
                    }
                }
            }
        }

        let text = conversation
            .last_assistant_text()
            .unwrap_or_default()
            .to_string();
        tracing::warn!(
            rounds = MAX_ROUNDS,
            "Round budget exhausted without finalization"
        );
        events.emit(ProgressEvent::status(
            "Round budget exhausted without a final candidate list",
            None,
        ));
        Ok(self.finish(events, MatchOutcome::Degraded { text }))
    }

    fn ensure_live(&self, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            tracing::info!("Match cancelled by the client, stopping the loop");
            return Err(Error::Cancelled("match cancelled by the client".into()));
        }
        Ok(())
    }

    fn finish(&self, events: &ProgressSink, outcome: MatchOutcome) -> MatchOutcome {
        let payload = serde_json::to_value(&outcome).unwrap_or(JsonValue::Null);
        events.emit(ProgressEvent::Result { payload });
        events.emit(ProgressEvent::status(
            "complete",
            Some(Progress {
                current: MAX_ROUNDS,
                total: MAX_ROUNDS,
                step: "complete".into(),
            }),
        ));
        outcome
    }
}

fn system_prompt() -> String {
    r#"You are a senior talent partner matching internal employees to an open role.
Work strictly through the provided tools: discover employees with getSkillTags,
inspect the promising ones with getEmployeeInformation, then submit your ranked
shortlist exactly once with finalizeCandidates.

Rules:
1. Never invent employee ids or question ids. Question ids must be copied
   verbatim from the role snapshot in the first user message.
2. Score every candidate 1-100 on overall fit, impact, communication and skill
   recency, and assign a high/medium/low status.
3. Answer the role's evaluation and role questions per candidate, marking
   whether the answer is grounded in the employee's documents.
4. finalizeCandidates ends the search. Do not call it until your shortlist is
   complete."#
        .to_string()
}

fn user_prompt(role: &RoleInformation) -> Result<String> {
    let payload = serde_json::json!({
        "task": "Find the best internal candidates for this role.",
        "role": role,
    });
    Ok(serde_json::to_string(&payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::role::RoleQuestion;
    use super::conversation::ToolCallRequest;
    use super::llm::AssistantTurn;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct ScriptedModel {
        turns: Mutex<Vec<AssistantTurn>>,
        seen: Mutex<Vec<Vec<ConversationMessage>>>,
    }

    impl ScriptedModel {
        fn new(turns: Vec<AssistantTurn>) -> Self {
            Self {
                turns: Mutex::new(turns),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        fn messages_of_call(&self, index: usize) -> Vec<ConversationMessage> {
            self.seen.lock().unwrap()[index].clone()
        }
    }

    #[async_trait::async_trait]
    impl CompletionModel for ScriptedModel {
        async fn complete(
            &self,
            messages: &[ConversationMessage],
            _tools: &[llm::ToolDeclaration],
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

    fn sample_role() -> RoleInformation {
        RoleInformation {
            id: 7,
            title: "Backend Engineer".into(),
            description: "Own the billing services.".into(),
            ai_description: None,
            experience_years: 4,
            department: None,
            skills: None,
            evaluation_questions: vec![RoleQuestion {
                id: 45,
                question: "Biggest system owned?".into(),
            }],
            role_questions: vec![RoleQuestion {
                id: 123,
                question: "Why this role?".into(),
            }],
        }
    }

    fn read_call(id: &str) -> ToolCallRequest {
        ToolCallRequest {
            id: id.into(),
            name: tools::SKILL_TAGS.into(),
            arguments: "{}".into(),
        }
    }

    fn orchestrator(
        model: Arc<dyn CompletionModel>,
        store: store::MockMatchStore,
        dir: &std::path::Path,
    ) -> MatchOrchestrator {
        MatchOrchestrator::new(model, Arc::new(store), AuditService::new(dir))
    }

    #[tokio::test]
    async fn failed_read_tool_feeds_flagged_payload_back_to_the_model() {
        let tmp = tempfile::tempdir().unwrap();
        let model = Arc::new(ScriptedModel::new(vec![
            AssistantTurn {
                content: None,
                tool_calls: vec![read_call("call_1")],
            },
            AssistantTurn {
                content: Some("giving up".into()),
                tool_calls: vec![],
            },
        ]));
        let mut mock = store::MockMatchStore::new();
        mock.expect_skill_tags()
            .returning(|_| Err(anyhow::anyhow!("store offline")));

        let orchestrator = orchestrator(model.clone(), mock, tmp.path());
        let outcome = orchestrator
            .run_match(
                sample_role(),
                &ProgressSink::silent(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            MatchOutcome::Degraded {
                text: "giving up".into()
            }
        );
        // The second model call must have seen the degraded tool payload.
        let second = model.messages_of_call(1);
        let tool_msg = second
            .iter()
            .find_map(|m| match m {
                ConversationMessage::Tool { content, .. } => Some(content.clone()),
                _ => None,
            })
            .expect("tool message appended");
        let payload: serde_json::Value = serde_json::from_str(&tool_msg).unwrap();
        assert_eq!(payload["success"], false);
        assert_eq!(payload["skillTags"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn pre_cancelled_token_stops_before_any_model_call() {
        let tmp = tempfile::tempdir().unwrap();
        let model = Arc::new(ScriptedModel::new(vec![]));
        let orchestrator = orchestrator(model.clone(), store::MockMatchStore::new(), tmp.path());

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = orchestrator
            .run_match(sample_role(), &ProgressSink::silent(), &cancel)
            .await;

        assert!(matches!(result, Err(Error::Cancelled(_))));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn successful_skill_tags_payload_reaches_the_model() {
        let tmp = tempfile::tempdir().unwrap();
        let model = Arc::new(ScriptedModel::new(vec![
            AssistantTurn {
                content: None,
                tool_calls: vec![read_call("call_1")],
            },
            AssistantTurn {
                content: Some("done looking".into()),
                tool_calls: vec![],
            },
        ]));
        let mut mock = store::MockMatchStore::new();
        mock.expect_skill_tags().returning(|_| {
            let mut tags = HashMap::new();
            tags.insert("emp-001".to_string(), vec!["rust".to_string()]);
            Ok(tags)
        });

        let orchestrator = orchestrator(model.clone(), mock, tmp.path());
        orchestrator
            .run_match(
                sample_role(),
                &ProgressSink::silent(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let second = model.messages_of_call(1);
        let tool_msg = second
            .iter()
            .find_map(|m| match m {
                ConversationMessage::Tool { content, .. } => Some(content.clone()),
                _ => None,
            })
            .unwrap();
        let payload: serde_json::Value = serde_json::from_str(&tool_msg).unwrap();
        assert_eq!(payload["success"], true);
        assert_eq!(payload["skillTags"]["emp-001"][0], "rust");
    }
}
