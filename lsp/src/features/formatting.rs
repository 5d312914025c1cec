use std::process::Stdio;

use anyhow::{Context, Result, bail};
use tokio::{io::AsyncWriteExt, process::Command};
use tower_lsp::lsp_types::{Position, Range, TextEdit};

/// Formats a whole build file.
#[tower_lsp::async_trait]
pub trait Formatter: Send + Sync {
    async fn format(&self, text: &str) -> Result<String>;
}

/// Pipes the text through an external program, `muon fmt -` by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalFormatter {
    pub command: String,
    pub args: Vec<String>,
}

impl Default for ExternalFormatter {
    fn default() -> Self {
        Self {
            command: "muon".to_string(),
            args: vec!["fmt".to_string(), "-".to_string()],
        }
    }
}

#[tower_lsp::async_trait]
impl Formatter for ExternalFormatter {
    async fn format(&self, text: &str) -> Result<String> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start formatter '{}'", self.command))?;

        if let Some(mut stdin) = child.stdin.take() {
            let input = text.as_bytes().to_vec();
            // feed stdin while stdout is being drained
            tokio::spawn(async move {
                let _ = stdin.write_all(&input).await;
            });
        }
        let output = child
            .wait_with_output()
            .await
            .with_context(|| format!("Formatter '{}' failed", self.command))?;
        if !output.status.success() {
            bail!(
                "Formatter '{}' exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        String::from_utf8(output.stdout).context("Formatter output is not UTF-8")
    }
}

/// Position just past the last character of `text`.
fn end_position(text: &str) -> Position {
    let line = text.matches('\n').count() as u32;
    let last = text.rsplit('\n').next().unwrap_or("");
    let column = last.chars().map(|c| c.len_utf16() as u32).sum();
    Position::new(line, column)
}

/// One edit replacing the whole document, or none when nothing changes.
pub async fn format_document(formatter: &dyn Formatter, text: &str) -> Result<Option<Vec<TextEdit>>> {
    let formatted = formatter.format(text).await?;
    if formatted == text {
        return Ok(None);
    }
    Ok(Some(vec![TextEdit {
        range: Range::new(Position::new(0, 0), end_position(text)),
        new_text: formatted,
    }]))
}
