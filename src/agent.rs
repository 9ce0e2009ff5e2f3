use std::path::PathBuf;

use uuid::Uuid;

use crate::console::Console;
use crate::error::Result;
use crate::llm::LanguageModel;
use crate::memory::Conversation;
use crate::message::{ToolEffect, Turn};
use crate::tool::ToolRegistry;
use crate::toolkit::{drafting_toolkit, Document};

/// Opening line shown before the user has said anything.
pub const GREETING: &str =
    "Hello, I'm ready to help you update a document. What would you like to create?";

const USER_PROMPT: &str = "\n What would you like to do with the document? ";

/// Whether the drafting loop asks for another user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    End,
}

/// Scan newest to oldest for a tool result reporting a finished save.
///
/// A result counts when it is tagged `Saved` or when its text mentions both
/// "saved" and "document", case-insensitively, whatever its tag.
pub fn should_continue(turns: &[Turn]) -> Action {
    for turn in turns.iter().rev() {
        match turn {
            Turn::ToolResult { text, effect, .. } => {
                if matches!(effect, Some(ToolEffect::Saved { .. })) {
                    return Action::End;
                }
                let lowered = text.to_lowercase();
                if lowered.contains("saved") && lowered.contains("document") {
                    return Action::End;
                }
            }
            Turn::User { .. } | Turn::Assistant { .. } => {}
        }
    }
    Action::Continue
}

/// Turn controller for the document drafting loop (agent ⇄ tools → end).
pub struct Drafter<M: LanguageModel> {
    model: M,
    document: Document,
    tools: ToolRegistry,
    conversation: Conversation,
}

impl<M: LanguageModel> Drafter<M> {
    pub fn new(model: M) -> Self {
        let document = Document::new();
        Self {
            model,
            tools: drafting_toolkit(document.clone(), None),
            document,
            conversation: Conversation::new(),
        }
    }

    /// Resolve `save` filenames under `dir` instead of the working directory.
    pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.tools = drafting_toolkit(self.document.clone(), dir);
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Drive the loop until the document is saved or the input closes.
    pub async fn run(&mut self, console: &mut dyn Console) -> Result<&Conversation> {
        console
            .write_line("\n ==== Welcome to the Document Drafter AI Assistant!====\n")
            .await?;
        tracing::info!("drafting session started");

        while self.step(console).await? == Action::Continue {}

        tracing::info!(turns = self.conversation.len(), "drafting session ended");
        console
            .write_line("\n ==== Document Drafting Session Ended. ==== \n")
            .await?;
        Ok(&self.conversation)
    }

    /// One cycle: get a user turn, ask the model, run any requested tools.
    pub async fn step(&mut self, console: &mut dyn Console) -> Result<Action> {
        if self.conversation.is_empty() {
            console.write_line(&format!("\nAI: {GREETING}")).await?;
            self.conversation.push(Turn::assistant(GREETING))?;
            return Ok(Action::Continue);
        }

        let Some(input) = console.read_line(USER_PROMPT).await? else {
            tracing::info!("input closed, ending drafting session");
            return Ok(Action::End);
        };
        console.write_line(&format!("\nUser: {input}")).await?;

        let system = self.build_system_message(&self.document.content().await);
        let user = Turn::user(input);
        let mut request: Vec<Turn> = self.conversation.turns().to_vec();
        request.push(user.clone());

        tracing::debug!(turns = request.len(), "calling model");
        let mut completion = self
            .model
            .complete_chat(Some(&system), &request, &self.tools.describe())
            .await?;
        for call in completion.tool_calls.iter_mut() {
            if call.id.is_none() {
                call.id = Some(format!("call-{}", Uuid::new_v4()));
            }
        }
        let assistant = completion.into_turn();
        let calls = assistant.tool_requests().to_vec();

        console.write_line(&format!("\nAI: {}", assistant.text())).await?;
        if !calls.is_empty() {
            let names: Vec<&str> = calls.iter().map(|call| call.name.as_str()).collect();
            console
                .write_line(&format!("USING TOOLS: [{}]", names.join(", ")))
                .await?;
        }

        self.conversation.push(user)?;
        self.conversation.push(assistant)?;

        for call in &calls {
            let result = self.tools.invoke(call).await;
            console
                .write_line(&format!("\n[Tool Result: {}]", result.text()))
                .await?;
            self.conversation.push(result)?;
        }

        Ok(should_continue(self.conversation.turns()))
    }

    fn build_system_message(&self, document: &str) -> String {
        let mut prompt = String::from(
            "You are a document drafting AI assistant. Use the provided tools to update and save the document as per user instructions.\n\
             - If the user wants to update or modify content, use the 'update' tool with the complete updated content.\n\
             - If the user wants to save and finish, use the 'save' tool.\n\
             - Make sure to always show the current content of the document when updating.\n\n",
        );
        prompt.push_str("The current document content is:\n");
        prompt.push_str(document);
        prompt
    }
}
