use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin, Stdout};

use crate::error::Result;

/// Line-oriented user input and display.
#[async_trait]
pub trait Console: Send {
    /// Show `prompt` and wait for one line. `None` means the input is closed.
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    async fn write_line(&mut self, line: &str) -> Result<()>;
}

/// Console over the process's stdin and stdout.
pub struct StdConsole {
    input: BufReader<Stdin>,
    output: Stdout,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            input: BufReader::new(tokio::io::stdin()),
            output: tokio::io::stdout(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for StdConsole {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.output.write_all(prompt.as_bytes()).await?;
        self.output.flush().await?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.output.write_all(line.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }
}

/// Replays fixed input lines and records everything shown.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    prompts: Vec<String>,
    output: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn remaining_inputs(&self) -> usize {
        self.inputs.len()
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.inputs.pop_front())
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.output.push(line.to_string());
        Ok(())
    }
}
