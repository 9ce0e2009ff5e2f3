use crate::console::Console;
use crate::error::Result;
use crate::llm::LanguageModel;
use crate::memory::Conversation;
use crate::message::Turn;

const PROMPT: &str = "Enter your message: ";

/// Plain request/response chat (entry → process → end), optionally keeping history.
pub struct ChatSession<M: LanguageModel> {
    model: M,
    conversation: Conversation,
    retain_history: bool,
}

impl<M: LanguageModel> ChatSession<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            conversation: Conversation::new(),
            retain_history: false,
        }
    }

    pub fn with_history(mut self, retain_history: bool) -> Self {
        self.retain_history = retain_history;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Send one user message and return the model's reply.
    pub async fn exchange(&mut self, input: impl Into<String>) -> Result<String> {
        let user = Turn::user(input);
        if !self.retain_history {
            let completion = self.model.complete_chat(None, &[user], &[]).await?;
            return Ok(completion.content.unwrap_or_default());
        }

        let mut request: Vec<Turn> = self.conversation.turns().to_vec();
        request.push(user.clone());
        tracing::debug!(turns = request.len(), "calling model with history");
        let completion = self.model.complete_chat(None, &request, &[]).await?;
        let reply = completion.content.unwrap_or_default();

        self.conversation.push(user)?;
        self.conversation.push(Turn::assistant(reply.clone()))?;
        Ok(reply)
    }

    /// Read lines until `exit` (any case) or closed input, printing each reply.
    pub async fn run(&mut self, console: &mut dyn Console) -> Result<()> {
        tracing::info!(history = self.retain_history, "chat session started");
        while let Some(input) = console.read_line(PROMPT).await? {
            if input.trim().eq_ignore_ascii_case("exit") {
                break;
            }
            let reply = self.exchange(input).await?;
            console.write_line(&format!("\nAI: {reply}")).await?;
        }
        tracing::info!(turns = self.conversation.len(), "chat session ended");
        Ok(())
    }
}
