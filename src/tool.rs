use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ChatGraphError, Result};
use crate::message::{ToolCall, ToolEffect, Turn};

/// What a tool hands back to the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub effect: Option<ToolEffect>,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            effect: None,
        }
    }

    pub fn with_effect(mut self, effect: ToolEffect) -> Self {
        self.effect = Some(effect);
        self
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// Optionally return a JSON Schema-like object describing the expected arguments.
    fn parameters(&self) -> Option<Value> {
        None
    }

    async fn call(&self, input: Value) -> Result<ToolOutput>;
}

/// Static description of a tool that can be embedded in prompts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolDescription {
    pub name: String,
    pub description: String,
    pub parameters: Option<Value>,
}

#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    pub fn describe(&self) -> Vec<ToolDescription> {
        let mut descriptions: Vec<ToolDescription> = self
            .tools
            .values()
            .map(|tool| ToolDescription {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect();

        descriptions.sort_by(|a, b| a.name.cmp(&b.name));
        descriptions
    }

    pub async fn call(&self, name: &str, input: Value) -> Result<ToolOutput> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ChatGraphError::ToolNotFound(name.to_string()))?;
        tool.call(input)
            .await
            .map_err(|source| ChatGraphError::ToolInvocation {
                name: name.to_string(),
                source: Box::new(source),
            })
    }

    /// Run a requested call and wrap the outcome as a tool-result turn.
    ///
    /// Failures never escape: they are reported to the model as text.
    pub async fn invoke(&self, call: &ToolCall) -> Turn {
        match self.call(&call.name, call.arguments.clone()).await {
            Ok(output) => {
                tracing::debug!(tool = %call.name, effect = ?output.effect, "tool completed");
                Turn::tool_result(&call.name, call.id.clone(), output.text, output.effect)
            }
            Err(err) => {
                tracing::warn!(tool = %call.name, error = %err, "tool failed");
                Turn::tool_result(&call.name, call.id.clone(), format!("Error: {err}"), None)
            }
        }
    }
}

/// Pull a required string argument out of a tool's JSON input.
pub(crate) fn string_argument<'a>(input: &'a Value, key: &str, tool: &str) -> Result<&'a str> {
    input.get(key).and_then(Value::as_str).ok_or_else(|| {
        ChatGraphError::Protocol(format!("missing string `{key}` for {tool}"))
    })
}
