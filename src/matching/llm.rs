use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::conversation::{ConversationMessage, ToolCallRequest};

/// A callable tool as declared to the model: name, description and a strict
/// JSON Schema for its arguments.
#[derive(Debug, Clone)]
pub struct ToolDeclaration {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: JsonValue,
}

/// Whether the model is forced to pick a tool on this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolChoice {
    Required,
    Auto,
}

impl ToolChoice {
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Auto => "auto",
        }
    }
}

/// One assistant turn as returned by the completion API.
#[derive(Debug, Clone, Default)]
pub struct AssistantTurn {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

/// Seam to the hosted inference service. The production implementation lives
/// in `services::llm_service`; tests script turns by hand.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDeclaration],
        tool_choice: ToolChoice,
    ) -> anyhow::Result<AssistantTurn>;
}
