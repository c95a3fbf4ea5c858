use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A model-declared request to invoke a named tool with JSON arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    /// JSON-encoded argument string, exactly as the model produced it.
    pub arguments: String,
}

impl ToolCallRequest {
    /// Best-effort argument parse. A payload that is not valid JSON degrades
    /// to an empty object; the tool handler's own input validation is the
    /// second line of defense.
    pub fn parsed_arguments(&self) -> JsonValue {
        match serde_json::from_str(&self.arguments) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    tool = %self.name,
                    call_id = %self.id,
                    error = %e,
                    "Unparsable tool arguments, degrading to empty object"
                );
                JsonValue::Object(serde_json::Map::new())
            }
        }
    }
}

/// One role-tagged entry in the conversation log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ConversationMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCallRequest>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

/// Append-only message sequence: the single source of truth fed to every
/// model call. Nothing is mutated or removed once appended.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ConversationMessage>,
}

impl Conversation {
    pub fn seeded(system: String, user: String) -> Self {
        Self {
            messages: vec![
                ConversationMessage::System { content: system },
                ConversationMessage::User { content: user },
            ],
        }
    }

    pub fn push(&mut self, message: ConversationMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// Text of the most recent assistant turn, used as the degraded result
    /// when the round budget runs out.
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|m| match m {
            ConversationMessage::Assistant {
                content: Some(text),
                ..
            } => Some(text.as_str()),
            _ => None,
        })
    }
}
