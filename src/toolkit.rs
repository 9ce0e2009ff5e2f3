//! Drafting toolkit: `update` and `save` over a session-scoped document.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tokio::{fs, io::AsyncWriteExt};

use crate::error::Result;
use crate::message::ToolEffect;
use crate::tool::{string_argument, Tool, ToolOutput, ToolRegistry};

/// The text being drafted. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct Document {
    content: Arc<RwLock<String>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn content(&self) -> String {
        self.content.read().await.clone()
    }

    pub async fn replace(&self, content: impl Into<String>) {
        *self.content.write().await = content.into();
    }
}

/// Register `update` and `save` against one document.
pub fn drafting_toolkit(document: Document, output_dir: Option<PathBuf>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(UpdateTool {
        document: document.clone(),
    });
    registry.register(SaveTool {
        document,
        output_dir,
    });
    registry
}

/// Append `.txt` unless the name already ends with it.
pub fn ensure_txt_extension(filename: &str) -> String {
    if filename.ends_with(".txt") {
        filename.to_string()
    } else {
        format!("{filename}.txt")
    }
}

struct UpdateTool {
    document: Document,
}

#[async_trait]
impl Tool for UpdateTool {
    fn name(&self) -> &str {
        "update"
    }

    fn description(&self) -> &str {
        "Updates the document with the provided content."
    }

    fn parameters(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "content": {"type": "string", "description": "The complete updated document text."}
            },
            "required": ["content"]
        }))
    }

    async fn call(&self, input: Value) -> Result<ToolOutput> {
        let content = string_argument(&input, "content", "update")?;
        self.document.replace(content).await;
        Ok(ToolOutput::text(format!(
            "Document updated successfully! The current content is:\n{content}."
        ))
        .with_effect(ToolEffect::Updated))
    }
}

struct SaveTool {
    document: Document,
    output_dir: Option<PathBuf>,
}

impl SaveTool {
    fn resolve(&self, filename: &str) -> PathBuf {
        let filename = ensure_txt_extension(filename);
        match &self.output_dir {
            Some(dir) => dir.join(filename),
            None => PathBuf::from(filename),
        }
    }

    async fn write(path: &Path, content: &str) -> std::io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await
    }
}

#[async_trait]
impl Tool for SaveTool {
    fn name(&self) -> &str {
        "save"
    }

    fn description(&self) -> &str {
        "Saves the current document content to a text file and finishes the drafting process. \
         A .txt extension is added when the filename lacks one."
    }

    fn parameters(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "filename": {"type": "string", "description": "Name of the file to save the document to."}
            },
            "required": ["filename"]
        }))
    }

    async fn call(&self, input: Value) -> Result<ToolOutput> {
        let filename = string_argument(&input, "filename", "save")?;
        let path = self.resolve(filename);
        let content = self.document.content().await;

        match Self::write(&path, &content).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), bytes = content.len(), "document saved");
                Ok(ToolOutput::text(format!(
                    "Document saved successfully as {}.",
                    path.display()
                ))
                .with_effect(ToolEffect::Saved { path }))
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "document save failed");
                Ok(ToolOutput::text(format!(
                    "An error occurred while saving the document: {err}"
                ))
                .with_effect(ToolEffect::Failed))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn suffixes_txt_once() {
        assert_eq!(ensure_txt_extension("notes"), "notes.txt");
        assert_eq!(ensure_txt_extension("notes.txt"), "notes.txt");
        assert_eq!(ensure_txt_extension("notes.md"), "notes.md.txt");
    }

    #[tokio::test]
    async fn update_then_save_writes_exact_bytes() {
        let dir = tempdir().unwrap();
        let document = Document::new();
        let tools = drafting_toolkit(document.clone(), Some(dir.path().to_path_buf()));

        let updated = tools.call("update", json!({"content": "Hello"})).await.unwrap();
        assert_eq!(updated.effect, Some(ToolEffect::Updated));
        assert_eq!(
            updated.text,
            "Document updated successfully! The current content is:\nHello."
        );

        let saved = tools.call("save", json!({"filename": "x"})).await.unwrap();
        let path = dir.path().join("x.txt");
        assert_eq!(saved.effect, Some(ToolEffect::Saved { path: path.clone() }));
        assert_eq!(
            saved.text,
            format!("Document saved successfully as {}.", path.display())
        );
        assert_eq!(std::fs::read(&path).unwrap(), b"Hello");
    }

    #[tokio::test]
    async fn save_without_update_writes_empty_file() {
        let dir = tempdir().unwrap();
        let tools = drafting_toolkit(Document::new(), Some(dir.path().to_path_buf()));

        tools.call("save", json!({"filename": "empty.txt"})).await.unwrap();

        assert_eq!(std::fs::read(dir.path().join("empty.txt")).unwrap(), b"");
    }

    #[tokio::test]
    async fn save_overwrites_previous_content() {
        let dir = tempdir().unwrap();
        let document = Document::new();
        let tools = drafting_toolkit(document.clone(), Some(dir.path().to_path_buf()));
        std::fs::write(dir.path().join("draft.txt"), "a much longer old draft").unwrap();

        document.replace("new").await;
        tools.call("save", json!({"filename": "draft"})).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("draft.txt")).unwrap(),
            "new"
        );
    }

    #[tokio::test]
    async fn failed_write_reports_reason_without_raising() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let tools = drafting_toolkit(Document::new(), Some(missing.clone()));
        let expected = std::fs::write(missing.join("x.txt"), "").unwrap_err();

        let output = tools.call("save", json!({"filename": "x"})).await.unwrap();

        assert_eq!(output.effect, Some(ToolEffect::Failed));
        assert_eq!(
            output.text,
            format!("An error occurred while saving the document: {expected}")
        );
    }

    #[tokio::test]
    async fn update_requires_content() {
        let tools = drafting_toolkit(Document::new(), None);

        let err = tools.call("update", json!({"text": "oops"})).await.unwrap_err();

        assert!(err.to_string().contains("missing string `content` for update"));
    }

    #[tokio::test]
    async fn sessions_do_not_share_documents() {
        let first = Document::new();
        let second = Document::new();
        let tools = drafting_toolkit(first.clone(), None);

        tools.call("update", json!({"content": "mine"})).await.unwrap();

        assert_eq!(first.content().await, "mine");
        assert_eq!(second.content().await, "");
    }
}
