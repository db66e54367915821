//! Slide sink: appends one slide to the library deck via the external
//! slide-appender helper.
//!
//! The helper owns all placeholder geometry. Its contract: create the
//! deck from the theme template when absent, append one slide with the
//! title in the title placeholder and link/relevance/application lines in
//! the body, save atomically, never touch existing slides.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::annotation::Annotation;
use crate::app::SinkTarget;
use crate::resolve::BibliographicRecord;

use super::{run_tool, Sink, SinkError};

/// Appends slides through a `make_paper_slide`-style helper program.
#[derive(Debug, Clone)]
pub struct SlideSink {
    program: String,
}

impl SlideSink {
    /// Creates a sink invoking `program` as the slide helper.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(
        &self,
        record: &BibliographicRecord,
        annotation: &Annotation,
        target: &SinkTarget,
    ) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--title")
            .arg(&record.title)
            .arg("--link")
            .arg(&record.link)
            .arg("--reason")
            .arg(&annotation.relevance)
            .arg("--usage")
            .arg(&annotation.application)
            .arg("--rel-label")
            .arg(&target.relevance_label)
            .arg("--app-label")
            .arg(&target.application_label)
            .arg("--deck")
            .arg(&target.deck_path)
            .arg("--layout")
            .arg(target.layout.to_string());

        if let Some(theme) = &target.theme {
            cmd.arg("--theme").arg(theme);
        }
        cmd
    }
}

#[async_trait]
impl Sink for SlideSink {
    fn name(&self) -> &'static str {
        "slide"
    }

    #[tracing::instrument(skip_all, fields(sink = "slide", deck = %target.deck_path.display()))]
    async fn apply(
        &self,
        record: &BibliographicRecord,
        annotation: &Annotation,
        target: &SinkTarget,
    ) -> Result<(), SinkError> {
        if let Some(parent) = target.deck_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SinkError::write_failed(parent, &e.to_string()))?;
        }

        let mut cmd = self.command(record, annotation, target);
        run_tool(&self.program, &mut cmd).await?;
        debug!("Slide appended to deck");
        Ok(())
    }
}
