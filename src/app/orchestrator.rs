//! Run orchestration: classify once, resolve once, fan out to sinks.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::annotation::Annotation;
use crate::classify::classify;
use crate::resolve::{BibliographicRecord, FallbackChain};
use crate::sink::{Sink, SinkError};

use super::error::RunError;
use super::targets::SinkTarget;
use super::validation::validate_attachments;

/// Result of applying one sink.
#[derive(Debug)]
pub struct SinkOutcome {
    /// The sink's name
    pub sink: &'static str,
    /// Success, or the recorded failure
    pub result: Result<(), SinkError>,
}

/// Aggregate result of a run: the resolved record plus every sink's
/// outcome. Sink failures are recorded here, never raised.
#[derive(Debug)]
pub struct RunReport {
    /// The resolved record the sinks were fed
    pub record: BibliographicRecord,
    /// Per-sink outcomes, in invocation order
    pub outcomes: Vec<SinkOutcome>,
}

impl RunReport {
    /// True when any enabled sink failed.
    #[must_use]
    pub fn any_failed(&self) -> bool {
        self.outcomes.iter().any(|o| o.result.is_err())
    }

    /// Number of failed sinks.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

/// Drives one invocation: pre-flight checks, resolution, sequential
/// fan-out with failure isolation.
pub struct Orchestrator {
    chain: FallbackChain,
    sinks: Vec<Box<dyn Sink>>,
}

impl Orchestrator {
    /// Creates an orchestrator over a resolution chain. Sinks are
    /// registered separately so disabled sinks are simply never added.
    #[must_use]
    pub fn new(chain: FallbackChain) -> Self {
        Self {
            chain,
            sinks: Vec::new(),
        }
    }

    /// Registers a sink. Registration order is invocation order.
    pub fn register_sink(&mut self, sink: Box<dyn Sink>) {
        debug!(name = sink.name(), "Registering sink");
        self.sinks.push(sink);
    }

    /// Returns the number of registered sinks.
    #[must_use]
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Runs the full pipeline for one identifier.
    ///
    /// Pre-flight errors (bad identifier, missing attachment, unresolved
    /// title) abort with no partial writes. After resolution, each sink
    /// runs regardless of earlier sink failures; the report carries every
    /// outcome and nothing is rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] only for pre-flight failures.
    #[tracing::instrument(skip_all, fields(identifier = %raw, library = %target.library))]
    pub async fn run(
        &self,
        raw: &str,
        annotation: &Annotation,
        attachments: &[PathBuf],
        target: &SinkTarget,
    ) -> Result<RunReport, RunError> {
        validate_attachments(attachments)?;

        let id = classify(raw)?;
        info!(identifier = %id, "Identifier classified");

        let mut record = self.chain.resolve(&id, annotation).await?;
        record.attachments = attachments.to_vec();
        info!(title = %record.title, "Metadata resolved");

        let mut outcomes = Vec::with_capacity(self.sinks.len());
        for sink in &self.sinks {
            let result = sink.apply(&record, annotation, target).await;
            match &result {
                Ok(()) => info!(sink = sink.name(), "Sink applied"),
                Err(err) => warn!(
                    sink = sink.name(),
                    error = %err,
                    "Sink failed; continuing with remaining sinks"
                ),
            }
            outcomes.push(SinkOutcome {
                sink: sink.name(),
                result,
            });
        }

        Ok(RunReport { record, outcomes })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::app::SinkTarget;
    use crate::config::Config;
    use crate::resolve::{
        FallbackChain, MetadataSource, PartialRecord, ResolveContext, ResolveError,
    };
    use crate::classify::Identifier;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StaticSource(PartialRecord);

    #[async_trait]
    impl MetadataSource for StaticSource {
        fn name(&self) -> &'static str {
            "static"
        }
        fn can_handle(&self, _id: &Identifier) -> bool {
            true
        }
        async fn lookup(
            &self,
            _id: &Identifier,
            _ctx: &ResolveContext,
        ) -> Result<PartialRecord, ResolveError> {
            Ok(self.0.clone())
        }
    }

    struct ScriptedSink {
        name: &'static str,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Sink for ScriptedSink {
        fn name(&self) -> &'static str {
            self.name
        }
        async fn apply(
            &self,
            _record: &BibliographicRecord,
            _annotation: &Annotation,
            _target: &SinkTarget,
        ) -> Result<(), SinkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(SinkError::tool_unavailable(self.name, "scripted failure"))
            } else {
                Ok(())
            }
        }
    }

    fn sink(name: &'static str, fail: bool) -> (ScriptedSink, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            ScriptedSink {
                name,
                fail,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    fn titled_chain() -> FallbackChain {
        let mut chain = FallbackChain::new();
        chain.register(Box::new(StaticSource(PartialRecord {
            title: Some("A Paper".to_string()),
            ..PartialRecord::default()
        })));
        chain
    }

    fn target() -> SinkTarget {
        SinkTarget::for_library(&Config::default(), "bio", None, None, None)
    }

    #[tokio::test]
    async fn test_run_all_sinks_succeed() {
        let mut orchestrator = Orchestrator::new(titled_chain());
        let (a, _) = sink("markdown", false);
        let (b, _) = sink("bibliography", false);
        orchestrator.register_sink(Box::new(a));
        orchestrator.register_sink(Box::new(b));

        let report = orchestrator
            .run("10.1234/test", &Annotation::default(), &[], &target())
            .await
            .unwrap();
        assert!(!report.any_failed());
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.record.title, "A Paper");
    }

    #[tokio::test]
    async fn test_run_failed_sink_does_not_stop_others() {
        let mut orchestrator = Orchestrator::new(titled_chain());
        let (md, md_calls) = sink("markdown", false);
        let (bib, bib_calls) = sink("bibliography", true);
        let (slide, slide_calls) = sink("slide", false);
        orchestrator.register_sink(Box::new(md));
        orchestrator.register_sink(Box::new(bib));
        orchestrator.register_sink(Box::new(slide));

        let report = orchestrator
            .run("10.1234/test", &Annotation::default(), &[], &target())
            .await
            .unwrap();

        assert!(report.any_failed());
        assert_eq!(report.failed_count(), 1);
        assert_eq!(md_calls.load(Ordering::SeqCst), 1);
        assert_eq!(bib_calls.load(Ordering::SeqCst), 1);
        assert_eq!(slide_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_missing_attachment_aborts_before_sinks() {
        let mut orchestrator = Orchestrator::new(titled_chain());
        let (md, md_calls) = sink("markdown", false);
        orchestrator.register_sink(Box::new(md));

        let err = orchestrator
            .run(
                "10.1234/test",
                &Annotation::default(),
                &[PathBuf::from("/definitely/missing.pdf")],
                &target(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::MissingAttachment { .. }));
        assert_eq!(md_calls.load(Ordering::SeqCst), 0, "no sink may run");
    }

    #[tokio::test]
    async fn test_run_invalid_identifier_aborts_before_sinks() {
        let mut orchestrator = Orchestrator::new(titled_chain());
        let (md, md_calls) = sink("markdown", false);
        orchestrator.register_sink(Box::new(md));

        let err = orchestrator
            .run("???", &Annotation::default(), &[], &target())
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Classify(_)));
        assert_eq!(md_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_unresolved_title_aborts_before_sinks() {
        let mut orchestrator = Orchestrator::new(FallbackChain::new());
        let (md, md_calls) = sink("markdown", false);
        orchestrator.register_sink(Box::new(md));

        let err = orchestrator
            .run("10.1234/test", &Annotation::default(), &[], &target())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RunError::Resolve(ResolveError::UnresolvedTitle { .. })
        ));
        assert_eq!(md_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_attaches_validated_pdfs_to_record() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("paper.pdf");
        std::fs::write(&pdf, b"%PDF-").unwrap();

        let orchestrator = Orchestrator::new(titled_chain());
        let report = orchestrator
            .run(
                "10.1234/test",
                &Annotation::default(),
                &[pdf.clone()],
                &target(),
            )
            .await
            .unwrap();
        assert_eq!(report.record.attachments, vec![pdf]);
    }
}
