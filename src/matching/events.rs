use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio::sync::mpsc;

/// Typed progress events pushed to a connected client during a search.
///
/// Events are emitted in strict chronological order and never reordered or
/// batched. There is no backpressure contract beyond "push now".
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Status {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        progress: Option<Progress>,
    },
    Tool {
        name: String,
        phase: ToolPhase,
        message: String,
    },
    Result {
        payload: JsonValue,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Progress {
    pub current: u32,
    pub total: u32,
    pub step: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolPhase {
    Start,
    Progress,
    Complete,
}

impl ProgressEvent {
    pub fn status(message: impl Into<String>, progress: Option<Progress>) -> Self {
        Self::Status {
            message: message.into(),
            progress,
        }
    }

    pub fn tool(name: impl Into<String>, phase: ToolPhase, message: impl Into<String>) -> Self {
        Self::Tool {
            name: name.into(),
            phase,
            message: message.into(),
        }
    }

    /// SSE event name for this variant.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Tool { .. } => "tool",
            Self::Result { .. } => "result",
            Self::Error { .. } => "error",
        }
    }
}

/// One-directional, append-only event channel with two operating modes:
/// silent (batch searches) and streamed (SSE searches).
#[derive(Clone)]
pub struct ProgressSink {
    tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl ProgressSink {
    /// Batch mode: every emit is dropped.
    pub fn silent() -> Self {
        Self { tx: None }
    }

    /// Streaming mode: emitted events land on the returned receiver in
    /// emission order.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            // The receiver side disconnecting is not the emitter's problem.
            let _ = tx.send(event);
        }
    }
}
