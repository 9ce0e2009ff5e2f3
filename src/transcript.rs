use std::path::Path;

use crate::error::Result;
use crate::message::Turn;

const HEADER: &str = "Your Conversation Log:\n";
const TRAILER: &str = "End of Discussion";

/// Render user and assistant turns as a plain-text log. Tool results are left out.
pub fn render_transcript(turns: &[Turn]) -> String {
    let mut out = String::from(HEADER);
    for turn in turns {
        match turn {
            Turn::User { text } => {
                out.push_str("You: ");
                out.push_str(text);
                out.push('\n');
            }
            Turn::Assistant { text, .. } => {
                out.push_str("AI: ");
                out.push_str(text);
                out.push_str("\n\n");
            }
            Turn::ToolResult { .. } => {}
        }
    }
    out.push_str(TRAILER);
    out
}

pub async fn write_transcript(path: impl AsRef<Path>, turns: &[Turn]) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, render_transcript(turns)).await?;
    tracing::info!(path = %path.display(), turns = turns.len(), "transcript written");
    Ok(())
}
