use crate::error::{ChatGraphError, Result};
use crate::message::Turn;

/// Append-only transcript owned by a single session.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a conversation from existing turns, checking the tool-result ordering.
    pub fn with_turns(turns: Vec<Turn>) -> Result<Self> {
        let mut conversation = Self::new();
        for turn in turns {
            conversation.push(turn)?;
        }
        Ok(conversation)
    }

    /// Append a turn. A tool result must answer a request made by an earlier assistant turn.
    pub fn push(&mut self, turn: Turn) -> Result<()> {
        if let Turn::ToolResult {
            tool_name, call_id, ..
        } = &turn
        {
            if !self.has_matching_request(tool_name, call_id.as_deref()) {
                return Err(ChatGraphError::Protocol(format!(
                    "tool result for `{tool_name}` has no preceding request"
                )));
            }
        }
        self.turns.push(turn);
        Ok(())
    }

    fn has_matching_request(&self, tool_name: &str, call_id: Option<&str>) -> bool {
        self.turns
            .iter()
            .flat_map(|turn| turn.tool_requests())
            .any(|call| {
                call.name == tool_name
                    && (call_id.is_none() || call.id.as_deref() == call_id)
            })
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ToolCall;
    use serde_json::json;

    #[test]
    fn rejects_tool_result_without_request() {
        let mut conversation = Conversation::new();
        conversation.push(Turn::user("hi")).unwrap();

        let err = conversation
            .push(Turn::tool_result("save", Some("c1".into()), "done", None))
            .unwrap_err();

        assert!(matches!(err, ChatGraphError::Protocol(_)));
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn accepts_result_after_matching_request() {
        let call = ToolCall::new("update", json!({"content": "x"})).with_id("c1");
        let conversation = Conversation::with_turns(vec![
            Turn::user("write x"),
            Turn::assistant_with_tools("", vec![call]),
            Turn::tool_result("update", Some("c1".into()), "ok", None),
        ])
        .unwrap();

        assert_eq!(conversation.len(), 3);
    }

    #[test]
    fn call_id_must_match_when_present() {
        let call = ToolCall::new("update", json!({})).with_id("c1");
        let result = Conversation::with_turns(vec![
            Turn::assistant_with_tools("", vec![call]),
            Turn::tool_result("update", Some("c2".into()), "ok", None),
        ]);

        assert!(result.is_err());
    }
}
