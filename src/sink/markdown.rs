//! Markdown note sink: appends one table row per paper to the library's
//! note file.

use async_trait::async_trait;
use chrono::Local;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::annotation::Annotation;
use crate::app::SinkTarget;
use crate::resolve::BibliographicRecord;

use super::{Sink, SinkError};

const HEADER: &str =
    "| Added | Title | Link | Relevance | Application | Tags |\n|---|---|---|---|---|---|\n";

/// Appends structured entries to the per-library `quick_notes.md`. Pure
/// append: prior content is never rewritten or deduplicated.
#[derive(Debug, Default)]
pub struct MarkdownSink;

impl MarkdownSink {
    /// Creates a new `MarkdownSink`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Sink for MarkdownSink {
    fn name(&self) -> &'static str {
        "markdown"
    }

    #[tracing::instrument(skip_all, fields(sink = "markdown", path = %target.notes_path.display()))]
    async fn apply(
        &self,
        record: &BibliographicRecord,
        annotation: &Annotation,
        target: &SinkTarget,
    ) -> Result<(), SinkError> {
        let path = &target.notes_path;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SinkError::write_failed(parent, &e.to_string()))?;
        }

        let is_new = !path.exists();
        let mut entry = String::new();
        if is_new {
            entry.push_str(HEADER);
        }
        entry.push_str(&format_row(record, annotation));

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| SinkError::write_failed(path, &e.to_string()))?;
        file.write_all(entry.as_bytes())
            .await
            .map_err(|e| SinkError::write_failed(path, &e.to_string()))?;

        debug!(created = is_new, "Note row appended");
        Ok(())
    }
}

fn format_row(record: &BibliographicRecord, annotation: &Annotation) -> String {
    let added = Local::now().format("%Y-%m-%d %H:%M");
    format!(
        "| {} | {} | {} | {} | {} | {} |\n",
        added,
        escape_cell(&record.title),
        escape_cell(&record.link),
        escape_cell(&annotation.relevance),
        escape_cell(&annotation.application),
        escape_cell(&annotation.tags.join(", ")),
    )
}

/// Escapes characters that would break the table row.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}
