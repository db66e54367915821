//! Output sinks: the three independent writers a run fans out to.
//!
//! Each sink is a capability behind the [`Sink`] trait so the
//! orchestrator's fan-out is testable with fakes:
//!
//! - [`MarkdownSink`] - appends one structured row to the library note file
//! - [`BibliographySink`] - registers the record via the external
//!   bibliography manager
//! - [`SlideSink`] - appends one slide via the external slide helper
//!
//! Sinks touch disjoint files and are order-independent; a failure in one
//! never prevents the others from being attempted.

mod bibliography;
mod error;
mod markdown;
mod slide;

pub use bibliography::BibliographySink;
pub use error::SinkError;
pub use markdown::MarkdownSink;
pub use slide::SlideSink;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::annotation::Annotation;
use crate::app::SinkTarget;
use crate::resolve::BibliographicRecord;

/// Trait that all sinks implement.
///
/// # Object Safety
///
/// Uses `async_trait` to support dynamic dispatch via `Box<dyn Sink>` in
/// the orchestrator's fan-out loop.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Returns the sink's name (e.g., "markdown", "bibliography", "slide").
    fn name(&self) -> &'static str;

    /// Applies the record to this sink's target.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] on failure; the orchestrator records it and
    /// still attempts the remaining sinks.
    async fn apply(
        &self,
        record: &BibliographicRecord,
        annotation: &Annotation,
        target: &SinkTarget,
    ) -> Result<(), SinkError>;
}

/// Runs an external tool to completion, mapping spawn failures and
/// unsuccessful exits into [`SinkError`].
pub(crate) async fn run_tool(tool: &str, command: &mut Command) -> Result<(), SinkError> {
    debug!(tool, command = ?command.as_std(), "Invoking external tool");

    let output = command.output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SinkError::tool_unavailable(tool, "program not found on PATH")
        } else {
            SinkError::tool_unavailable(tool, &e.to_string())
        }
    })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(SinkError::tool_failed(
            tool,
            &output.status.to_string(),
            &output.stderr,
        ))
    }
}
