use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request from the model to run a named tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: None,
            name: name.into(),
            arguments,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Structured completion signal attached to a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolEffect {
    Updated,
    Saved { path: PathBuf },
    Failed,
}

/// One unit of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Turn {
    User {
        text: String,
    },
    Assistant {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_requests: Vec<ToolCall>,
    },
    ToolResult {
        tool_name: String,
        #[serde(default)]
        call_id: Option<String>,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        effect: Option<ToolEffect>,
    },
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Turn::User { text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Turn::Assistant {
            text: text.into(),
            tool_requests: Vec::new(),
        }
    }

    pub fn assistant_with_tools(text: impl Into<String>, tool_requests: Vec<ToolCall>) -> Self {
        Turn::Assistant {
            text: text.into(),
            tool_requests,
        }
    }

    pub fn tool_result(
        tool_name: impl Into<String>,
        call_id: Option<String>,
        text: impl Into<String>,
        effect: Option<ToolEffect>,
    ) -> Self {
        Turn::ToolResult {
            tool_name: tool_name.into(),
            call_id,
            text: text.into(),
            effect,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Turn::User { text } | Turn::Assistant { text, .. } | Turn::ToolResult { text, .. } => {
                text
            }
        }
    }

    pub fn tool_requests(&self) -> &[ToolCall] {
        match self {
            Turn::Assistant { tool_requests, .. } => tool_requests,
            Turn::User { .. } | Turn::ToolResult { .. } => &[],
        }
    }
}
