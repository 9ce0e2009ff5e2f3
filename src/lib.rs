//! Small conversational agent loops on top of a chat-completion backend.
//!
//! The crate provides:
//! - A language model abstraction (`LanguageModel`) with OpenAI-compatible and Gemini clients.
//! - A tool interface (`Tool` and `ToolRegistry`) plus the document drafting toolkit.
//! - `ChatSession`, a plain chat loop with optional history.
//! - `Drafter`, a turn controller that alternates between the model and tools
//!   until the document is saved.

mod agent;
mod chat;
mod config;
mod console;
mod error;
mod llm;
mod memory;
mod message;
mod telemetry;
mod tool;
mod toolkit;
mod transcript;

pub use agent::{should_continue, Action, Drafter, GREETING};
pub use chat::ChatSession;
pub use config::{AppConfig, ModelConfig, SessionConfig};
pub use console::{Console, ScriptedConsole, StdConsole};
pub use error::{ChatGraphError, Result};
pub use llm::{
    build_model, GeminiClient, LanguageModel, ModelCompletion, OpenAIClient, RecordedRequest,
    StubModel,
};
pub use memory::Conversation;
pub use message::{ToolCall, ToolEffect, Turn};
pub use telemetry::init_tracing;
pub use tool::{Tool, ToolDescription, ToolOutput, ToolRegistry};
pub use toolkit::{drafting_toolkit, ensure_txt_extension, Document};
pub use transcript::{render_transcript, write_transcript};
