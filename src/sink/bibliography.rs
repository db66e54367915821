//! Bibliography sink: registers the record with the external reference
//! manager.
//!
//! Invocation shape: `<bin> -l <library> add --batch [--from bibtex
//! <cache-file>] [--set title <title>] <pdf…>`. Duplicate detection is
//! the external tool's responsibility.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::annotation::Annotation;
use crate::app::SinkTarget;
use crate::resolve::BibliographicRecord;

use super::{run_tool, Sink, SinkError};

/// Registers records (and attached PDFs) into the named library via a
/// `papis`-style CLI.
#[derive(Debug, Clone)]
pub struct BibliographySink {
    program: String,
}

impl BibliographySink {
    /// Creates a sink invoking `program` as the bibliography manager.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, record: &BibliographicRecord, target: &SinkTarget) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-l").arg(&target.library).arg("add").arg("--batch");

        // A cached BibTeX file carries the full metadata; without one the
        // external tool gets at least the resolved title.
        if let Some(bibtex_path) = &record.bibtex_path {
            cmd.arg("--from").arg("bibtex").arg(bibtex_path);
        } else {
            cmd.arg("--set").arg("title").arg(&record.title);
        }

        for pdf in &record.attachments {
            cmd.arg(pdf);
        }
        cmd
    }
}

#[async_trait]
impl Sink for BibliographySink {
    fn name(&self) -> &'static str {
        "bibliography"
    }

    #[tracing::instrument(skip_all, fields(sink = "bibliography", library = %target.library))]
    async fn apply(
        &self,
        record: &BibliographicRecord,
        _annotation: &Annotation,
        target: &SinkTarget,
    ) -> Result<(), SinkError> {
        let mut cmd = self.command(record, target);
        run_tool(&self.program, &mut cmd).await?;
        debug!("Record registered with bibliography manager");
        Ok(())
    }
}
