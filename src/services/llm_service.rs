use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value as JsonValue};

use crate::matching::conversation::{ConversationMessage, ToolCallRequest};
use crate::matching::llm::{AssistantTurn, CompletionModel, ToolChoice, ToolDeclaration};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI-backed implementation of the completion seam.
#[derive(Clone)]
pub struct OpenAiService {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiService {
    pub fn new(api_key: String, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl CompletionModel for OpenAiService {
    async fn complete(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDeclaration],
        tool_choice: ToolChoice,
    ) -> anyhow::Result<AssistantTurn> {
        let payload = json!({
            "model": self.model,
            "messages": messages.iter().map(wire_message).collect::<Vec<_>>(),
            "tools": tools.iter().map(wire_tool).collect::<Vec<_>>(),
            "tool_choice": tool_choice.as_wire(),
        });

        let res = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenAI API Error {}: {}", status, text));
        }

        let body: Resp = res.json().await?;
        let message = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| anyhow::anyhow!("OpenAI response contained no choices"))?;

        Ok(AssistantTurn {
            content: message.content,
            tool_calls: message
                .tool_calls
                .into_iter()
                .map(|tc| ToolCallRequest {
                    id: tc.id,
                    name: tc.function.name,
                    arguments: tc.function.arguments,
                })
                .collect(),
        })
    }
}

fn wire_message(message: &ConversationMessage) -> JsonValue {
    match message {
        ConversationMessage::System { content } => json!({
            "role": "system",
            "content": content,
        }),
        ConversationMessage::User { content } => json!({
            "role": "user",
            "content": content,
        }),
        ConversationMessage::Assistant {
            content,
            tool_calls,
        } => {
            let mut msg = json!({
                "role": "assistant",
                "content": content,
            });
            if !tool_calls.is_empty() {
                msg["tool_calls"] = tool_calls
                    .iter()
                    .map(|tc| {
                        json!({
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.name,
                                "arguments": tc.arguments,
                            }
                        })
                    })
                    .collect();
            }
            msg
        }
        ConversationMessage::Tool {
            tool_call_id,
            content,
        } => json!({
            "role": "tool",
            "tool_call_id": tool_call_id,
            "content": content,
        }),
    }
}

fn wire_tool(tool: &ToolDeclaration) -> JsonValue {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
            "strict": true,
        }
    })
}

#[derive(serde::Deserialize)]
struct Resp {
    choices: Vec<RespChoice>,
}

#[derive(serde::Deserialize)]
struct RespChoice {
    message: RespMessage,
}

#[derive(serde::Deserialize)]
struct RespMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<RespToolCall>,
}

#[derive(serde::Deserialize)]
struct RespToolCall {
    id: String,
    function: RespFunction,
}

#[derive(serde::Deserialize)]
struct RespFunction {
    name: String,
    arguments: String,
}
