//! Language model implementations and abstractions.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::ModelConfig;
use crate::error::{ChatGraphError, Result};
use crate::message::{ToolCall, Turn};
use crate::tool::ToolDescription;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Result of a chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelCompletion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl ModelCompletion {
    pub fn into_turn(self) -> Turn {
        Turn::assistant_with_tools(self.content.unwrap_or_default(), self.tool_calls)
    }
}

/// Minimal abstraction around a chat completion provider.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete_chat(
        &self,
        system: Option<&str>,
        turns: &[Turn],
        tools: &[ToolDescription],
    ) -> Result<ModelCompletion>;
}

#[async_trait]
impl<M: LanguageModel + ?Sized> LanguageModel for Arc<M> {
    async fn complete_chat(
        &self,
        system: Option<&str>,
        turns: &[Turn],
        tools: &[ToolDescription],
    ) -> Result<ModelCompletion> {
        (**self).complete_chat(system, turns, tools).await
    }
}

/// Pick a client by `cfg.provider`.
pub fn build_model(cfg: &ModelConfig) -> Result<Arc<dyn LanguageModel>> {
    match cfg.provider.as_str() {
        "openai" | "groq" => Ok(Arc::new(OpenAIClient::from_config(cfg)?)),
        "gemini" => Ok(Arc::new(GeminiClient::from_config(cfg)?)),
        other => Err(ChatGraphError::Config(format!(
            "unknown model provider `{other}` (expected openai, groq or gemini)"
        ))),
    }
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|err| ChatGraphError::Config(format!("http client error: {err}")))
}

fn coalesce_error(status: reqwest::StatusCode, body: &str, provider: &str) -> ChatGraphError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return ChatGraphError::LanguageModel(format!("{provider} rate limit exceeded: {body}"));
    }
    ChatGraphError::LanguageModel(format!("{provider} request failed with {status}: {body}"))
}

fn serialize_tool_arguments(args: &Value) -> String {
    serde_json::to_string(args).unwrap_or_else(|_| args.to_string())
}

fn require_key<'a>(key: &'a Option<String>, provider: &str) -> Result<&'a str> {
    key.as_deref().ok_or_else(|| {
        ChatGraphError::LanguageModel(format!("missing {provider} API key in environment"))
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// OpenAI-compatible chat completions (OpenAI, Groq)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct OpenAIClient {
    http: reqwest::Client,
    provider: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAIClient {
    /// The key is looked up now but only required on the first request.
    pub fn from_config(cfg: &ModelConfig) -> Result<Self> {
        let default_base = match cfg.provider.as_str() {
            "groq" => "https://api.groq.com/openai/v1",
            _ => "https://api.openai.com/v1",
        };
        Ok(Self {
            http: http_client()?,
            provider: cfg.provider.clone(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            api_key: cfg.resolve_api_key(),
            base_url: cfg
                .base_url
                .clone()
                .unwrap_or_else(|| default_base.to_string()),
        })
    }

    fn to_openai_messages(system: Option<&str>, turns: &[Turn]) -> Vec<OpenAiMessage> {
        let mut built = Vec::with_capacity(turns.len() + 1);
        if let Some(system) = system {
            built.push(OpenAiMessage::plain("system", system));
        }
        for turn in turns {
            built.push(match turn {
                Turn::User { text } => OpenAiMessage::plain("user", text),
                Turn::Assistant {
                    text,
                    tool_requests,
                } => {
                    let tool_calls = (!tool_requests.is_empty()).then(|| {
                        tool_requests
                            .iter()
                            .map(|call| OpenAiToolCall {
                                id: call.id.clone(),
                                r#type: "function".to_string(),
                                function: OpenAiFunctionCall {
                                    name: call.name.clone(),
                                    arguments: serialize_tool_arguments(&call.arguments),
                                },
                            })
                            .collect()
                    });
                    OpenAiMessage {
                        role: "assistant".to_string(),
                        content: (!text.is_empty() || tool_calls.is_none())
                            .then(|| text.clone()),
                        tool_call_id: None,
                        tool_calls,
                    }
                }
                Turn::ToolResult {
                    tool_name,
                    call_id,
                    text,
                    ..
                } => OpenAiMessage {
                    role: "tool".to_string(),
                    content: Some(text.clone()),
                    tool_call_id: Some(call_id.clone().unwrap_or_else(|| tool_name.clone())),
                    tool_calls: None,
                },
            });
        }
        built
    }

    fn to_openai_tools(tools: &[ToolDescription]) -> Vec<OpenAiTool> {
        tools
            .iter()
            .map(|tool| OpenAiTool {
                r#type: "function".to_string(),
                function: OpenAiFunction {
                    name: tool.name.clone(),
                    description: Some(tool.description.clone()),
                    parameters: tool.parameters.clone(),
                },
            })
            .collect()
    }

    fn build_payload(&self, system: Option<&str>, turns: &[Turn], tools: &[ToolDescription]) -> Value {
        let mut payload = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": Self::to_openai_messages(system, turns),
        });
        if !tools.is_empty() {
            payload["tools"] = json!(Self::to_openai_tools(tools));
            payload["tool_choice"] = json!("auto");
        }
        payload
    }

    fn parse_response(body: OpenAiResponse) -> Result<ModelCompletion> {
        let first = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatGraphError::LanguageModel("model returned no choices".into()))?;

        let tool_calls = first
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                let arguments = serde_json::from_str(&call.function.arguments)
                    .unwrap_or_else(|_| Value::String(call.function.arguments.clone()));
                ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments,
                }
            })
            .collect();

        Ok(ModelCompletion {
            content: first.message.content,
            tool_calls,
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAIClient {
    async fn complete_chat(
        &self,
        system: Option<&str>,
        turns: &[Turn],
        tools: &[ToolDescription],
    ) -> Result<ModelCompletion> {
        let api_key = require_key(&self.api_key, &self.provider)?;
        let payload = self.build_payload(system, turns, tools);
        tracing::debug!(provider = %self.provider, model = %self.model, turns = turns.len(), "sending chat completion");

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {api_key}"))
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                ChatGraphError::LanguageModel(format!("{} request error: {err}", self.provider))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(coalesce_error(status, &body, &self.provider));
        }

        let body: OpenAiResponse = resp.json().await.map_err(|err| {
            ChatGraphError::LanguageModel(format!("{} response parse error: {err}", self.provider))
        })?;
        Self::parse_response(body)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gemini generateContent
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    model: String,
    temperature: f32,
    api_key: Option<String>,
    endpoint: String,
}

impl GeminiClient {
    pub fn from_config(cfg: &ModelConfig) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            api_key: cfg.resolve_api_key(),
            endpoint: cfg
                .base_url
                .clone()
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string()),
        })
    }

    /// Consecutive tool results are folded into one `user` content, as Gemini
    /// expects one function response per call of the preceding model turn.
    fn to_contents(turns: &[Turn]) -> Vec<GeminiContent> {
        let mut contents: Vec<GeminiContent> = Vec::with_capacity(turns.len());
        for turn in turns {
            match turn {
                Turn::User { text } => contents.push(GeminiContent {
                    role: "user".to_string(),
                    parts: vec![GeminiPart::text(text)],
                }),
                Turn::Assistant {
                    text,
                    tool_requests,
                } => {
                    let mut parts = Vec::new();
                    if !text.is_empty() {
                        parts.push(GeminiPart::text(text));
                    }
                    parts.extend(tool_requests.iter().map(|call| GeminiPart {
                        function_call: Some(GeminiFunctionCall {
                            name: call.name.clone(),
                            args: call.arguments.clone(),
                        }),
                        ..GeminiPart::default()
                    }));
                    if parts.is_empty() {
                        parts.push(GeminiPart::text(""));
                    }
                    contents.push(GeminiContent {
                        role: "model".to_string(),
                        parts,
                    });
                }
                Turn::ToolResult {
                    tool_name, text, ..
                } => {
                    let part = GeminiPart {
                        function_response: Some(GeminiFunctionResponse {
                            name: tool_name.clone(),
                            response: json!({ "content": text }),
                        }),
                        ..GeminiPart::default()
                    };
                    let follows_result = matches!(
                        contents.last(),
                        Some(last) if last.role == "user"
                            && last.parts.iter().all(|p| p.function_response.is_some())
                    );
                    match contents.last_mut() {
                        Some(last) if follows_result => last.parts.push(part),
                        _ => contents.push(GeminiContent {
                            role: "user".to_string(),
                            parts: vec![part],
                        }),
                    }
                }
            }
        }
        contents
    }

    fn build_payload(&self, system: Option<&str>, turns: &[Turn], tools: &[ToolDescription]) -> Value {
        let mut payload = json!({
            "contents": Self::to_contents(turns),
            "generationConfig": { "temperature": self.temperature },
        });
        if let Some(system) = system {
            payload["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }
        if !tools.is_empty() {
            let declarations: Vec<Value> = tools
                .iter()
                .map(|tool| {
                    json!({
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters.clone().unwrap_or_else(|| json!({"type": "object"})),
                    })
                })
                .collect();
            payload["tools"] = json!([{ "functionDeclarations": declarations }]);
        }
        payload
    }

    fn parse_response(body: GeminiResponse) -> ModelCompletion {
        let parts = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts)
            .unwrap_or_default();

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for part in parts {
            if let Some(chunk) = part.text {
                text.push_str(&chunk);
            }
            if let Some(call) = part.function_call {
                tool_calls.push(ToolCall::new(call.name, call.args));
            }
        }

        ModelCompletion {
            content: if text.is_empty() { None } else { Some(text) },
            tool_calls,
        }
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn complete_chat(
        &self,
        system: Option<&str>,
        turns: &[Turn],
        tools: &[ToolDescription],
    ) -> Result<ModelCompletion> {
        let api_key = require_key(&self.api_key, "gemini")?;
        let payload = self.build_payload(system, turns, tools);
        tracing::debug!(model = %self.model, turns = turns.len(), "sending generateContent");

        let resp = self
            .http
            .post(format!(
                "{}/models/{}:generateContent",
                self.endpoint, self.model
            ))
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| ChatGraphError::LanguageModel(format!("Gemini request error: {err}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(coalesce_error(status, &body, "gemini"));
        }

        let parsed: GeminiResponse = resp.json().await.map_err(|err| {
            ChatGraphError::LanguageModel(format!("Gemini response parse error: {err}"))
        })?;
        Ok(Self::parse_response(parsed))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scripted model
// ─────────────────────────────────────────────────────────────────────────────

/// What a [`StubModel`] was asked.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub system: Option<String>,
    pub turns: Vec<Turn>,
    pub tools: Vec<String>,
}

/// A deterministic model used for tests and demos.
///
/// Each scripted response is either plain text or a JSON directive:
/// `{"action":"respond","content":...}`,
/// `{"action":"call_tool","name":...,"arguments":{...}}` or
/// `{"action":"call_tools","content":...,"calls":[{"name":...,"arguments":{...}}]}`.
pub struct StubModel {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StubModel {
    pub fn new(responses: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum StubDirective {
    Respond {
        content: String,
    },
    CallTool {
        name: String,
        #[serde(default)]
        arguments: Value,
    },
    CallTools {
        #[serde(default)]
        content: Option<String>,
        calls: Vec<ToolCall>,
    },
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn complete_chat(
        &self,
        system: Option<&str>,
        turns: &[Turn],
        tools: &[ToolDescription],
    ) -> Result<ModelCompletion> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                system: system.map(str::to_string),
                turns: turns.to_vec(),
                tools: tools.iter().map(|tool| tool.name.clone()).collect(),
            });
        }

        let raw = self
            .responses
            .lock()
            .map_err(|_| ChatGraphError::LanguageModel("stub model poisoned".into()))?
            .pop_front()
            .ok_or_else(|| {
                ChatGraphError::LanguageModel("StubModel ran out of scripted responses".into())
            })?;

        Ok(match serde_json::from_str::<StubDirective>(&raw) {
            Ok(StubDirective::Respond { content }) => ModelCompletion {
                content: Some(content),
                tool_calls: Vec::new(),
            },
            Ok(StubDirective::CallTool { name, arguments }) => ModelCompletion {
                content: None,
                tool_calls: vec![ToolCall::new(name, arguments)],
            },
            Ok(StubDirective::CallTools { content, calls }) => ModelCompletion {
                content,
                tool_calls: calls,
            },
            Err(_) => ModelCompletion {
                content: Some(raw),
                tool_calls: Vec::new(),
            },
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

impl OpenAiMessage {
    fn plain(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
            tool_call_id: None,
            tool_calls: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiToolCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default = "function_type")]
    r#type: String,
    function: OpenAiFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiTool {
    r#type: String,
    function: OpenAiFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunction {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
}

impl GeminiPart {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drafting_turns() -> Vec<Turn> {
        vec![
            Turn::user("write hello"),
            Turn::assistant_with_tools(
                "",
                vec![ToolCall::new("update", json!({"content": "hello"})).with_id("call-1")],
            ),
            Turn::tool_result("update", Some("call-1".into()), "Document updated", None),
        ]
    }

    fn groq_client() -> OpenAIClient {
        let mut cfg = ModelConfig::new("groq", "llama-3.3-70b-versatile", 0.5);
        cfg.api_key = Some("test-key".into());
        OpenAIClient::from_config(&cfg).unwrap()
    }

    #[test]
    fn groq_defaults_to_groq_endpoint() {
        assert_eq!(groq_client().base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn openai_payload_carries_tool_calls_and_results() {
        let tools = vec![ToolDescription {
            name: "update".into(),
            description: "Updates the document".into(),
            parameters: Some(json!({"type": "object"})),
        }];

        let payload = groq_client().build_payload(Some("be brief"), &drafting_turns(), &tools);

        assert_eq!(payload["temperature"], json!(0.5));
        let messages = payload["messages"].as_array().unwrap();
        assert_eq!(messages[0], json!({"role": "system", "content": "be brief"}));
        assert_eq!(messages[2]["content"], Value::Null);
        assert_eq!(messages[2]["tool_calls"][0]["id"], "call-1");
        assert_eq!(
            messages[2]["tool_calls"][0]["function"]["arguments"],
            r#"{"content":"hello"}"#
        );
        assert_eq!(messages[3]["role"], "tool");
        assert_eq!(messages[3]["tool_call_id"], "call-1");
        assert_eq!(payload["tools"][0]["function"]["name"], "update");
        assert_eq!(payload["tool_choice"], "auto");
    }

    #[test]
    fn openai_payload_omits_tools_when_none() {
        let payload = groq_client().build_payload(None, &[Turn::user("hi")], &[]);

        assert!(payload.get("tools").is_none());
        assert!(payload.get("tool_choice").is_none());
        assert_eq!(payload["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn parses_openai_tool_calls() {
        let body: OpenAiResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "save", "arguments": "{\"filename\":\"report\"}"}
                    }]
                }
            }]
        }))
        .unwrap();

        let completion = OpenAIClient::parse_response(body).unwrap();

        assert_eq!(completion.content, None);
        assert_eq!(
            completion.tool_calls,
            vec![ToolCall::new("save", json!({"filename": "report"})).with_id("call_abc")]
        );
    }

    #[test]
    fn empty_choices_is_an_error() {
        let body: OpenAiResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(OpenAIClient::parse_response(body).is_err());
    }

    #[tokio::test]
    async fn missing_key_fails_on_first_call() {
        let cfg = ModelConfig {
            provider: "openai".into(),
            model: "gpt-4o-mini".into(),
            temperature: 0.0,
            api_key: None,
            base_url: Some("http://127.0.0.1:9".into()),
        };
        let client = OpenAIClient {
            api_key: None,
            ..OpenAIClient::from_config(&cfg).unwrap()
        };

        let err = client
            .complete_chat(None, &[Turn::user("hi")], &[])
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "language model error: missing openai API key in environment"
        );
    }

    #[test]
    fn gemini_groups_tool_results_and_maps_roles() {
        let mut turns = drafting_turns();
        turns[1] = Turn::assistant_with_tools(
            "Working on it",
            vec![
                ToolCall::new("update", json!({"content": "hello"})).with_id("call-1"),
                ToolCall::new("save", json!({"filename": "x"})).with_id("call-2"),
            ],
        );
        turns.push(Turn::tool_result("save", Some("call-2".into()), "saved", None));

        let contents = serde_json::to_value(GeminiClient::to_contents(&turns)).unwrap();

        assert_eq!(contents.as_array().unwrap().len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["text"], "Working on it");
        assert_eq!(contents[1]["parts"][2]["functionCall"]["name"], "save");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"].as_array().unwrap().len(), 2);
        assert_eq!(
            contents[2]["parts"][1]["functionResponse"]["response"]["content"],
            "saved"
        );
    }

    #[test]
    fn parses_gemini_text_and_function_calls() {
        let body: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Saving now."},
                        {"functionCall": {"name": "save", "args": {"filename": "notes"}}}
                    ]
                }
            }]
        }))
        .unwrap();

        let completion = GeminiClient::parse_response(body);

        assert_eq!(completion.content.as_deref(), Some("Saving now."));
        assert_eq!(completion.tool_calls[0].name, "save");
        assert_eq!(completion.tool_calls[0].id, None);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = build_model(&ModelConfig::new("parrot", "squawk", 0.0))
            .err()
            .unwrap();
        assert!(matches!(err, ChatGraphError::Config(_)));
    }

    #[tokio::test]
    async fn stub_model_records_requests_and_parses_directives() {
        let model = StubModel::new(vec![
            r#"{"action":"call_tools","content":"two","calls":[{"name":"a"},{"name":"b","arguments":{"x":1}}]}"#.into(),
            "plain text".into(),
        ]);

        let first = model
            .complete_chat(Some("sys"), &[Turn::user("go")], &[])
            .await
            .unwrap();
        let second = model.complete_chat(None, &[], &[]).await.unwrap();

        assert_eq!(first.content.as_deref(), Some("two"));
        assert_eq!(first.tool_calls.len(), 2);
        assert_eq!(second.content.as_deref(), Some("plain text"));
        assert_eq!(model.requests()[0].system.as_deref(), Some("sys"));
        assert!(model.complete_chat(None, &[], &[]).await.is_err());
    }
}
