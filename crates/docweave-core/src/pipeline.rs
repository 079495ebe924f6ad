//! End-to-end documentation run
//!
//! parse -> collect -> generate -> rewrite -> print. The parsed tree is held
//! as a green node while generation is in flight; red nodes are rebuilt
//! from it afterwards so nothing tied to a single thread lives across an
//! await point.

use std::sync::Arc;

use rowan::GreenNode;
use serde::Serialize;

use crate::collector::{DocRequest, collect_requests};
use crate::config::GenerationConfig;
use crate::coordinator::{Coordinator, CoordinatorOptions, ProgressHook, TargetFailure};
use crate::cst::{CsSyntaxNode, parse_csharp};
use crate::generation::DocGenerator;
use crate::result::Result;
use crate::rewriter::{RewriteOptions, TreeRewriter};

/// What one run produced
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub original: String,
    pub output: String,
    /// Every undocumented declaration found, in document order
    pub targets: Vec<DocRequest>,
    /// Declarations that received generated documentation
    pub documented: usize,
    /// Failed declarations that received a fallback comment instead; these
    /// are also listed in `failures`
    pub placeholders: usize,
    pub failures: Vec<TargetFailure>,
    pub timed_out: bool,
}

impl PipelineReport {
    fn unchanged(source: &str) -> Self {
        Self {
            original: source.to_string(),
            output: source.to_string(),
            targets: Vec::new(),
            documented: 0,
            placeholders: 0,
            failures: Vec::new(),
            timed_out: false,
        }
    }

    pub fn changed(&self) -> bool {
        self.output != self.original
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            targets: self.targets.len(),
            documented: self.documented,
            placeholders: self.placeholders,
            failed: self.failures.len(),
            timed_out: self.timed_out,
        }
    }
}

/// Counts for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub targets: usize,
    pub documented: usize,
    pub placeholders: usize,
    pub failed: usize,
    pub timed_out: bool,
}

/// Parse `source` and collect its undocumented declarations
///
/// Any parse error is fatal: documentation is never spliced into a tree the
/// parser did not fully understand.
pub fn prepare(source: &str) -> Result<(GreenNode, Vec<DocRequest>)> {
    let parsed = parse_csharp(source);
    if let Some(error) = parsed.errors().first() {
        tracing::error!(
            line = error.line,
            column = error.column,
            errors = parsed.errors().len(),
            "Input does not parse"
        );
        return Err(error.clone().into());
    }

    let requests = collect_requests(&parsed.syntax());
    let (green, _) = parsed.into_parts();
    Ok((green, requests))
}

/// Undocumented declarations of `source`, without generating anything
pub fn list_targets(source: &str) -> Result<Vec<DocRequest>> {
    prepare(source).map(|(_, requests)| requests)
}

/// Drives a documentation run against one generator
pub struct DocPipeline {
    generator: Arc<dyn DocGenerator>,
    coordinator_options: CoordinatorOptions,
    rewrite_options: RewriteOptions,
    progress: Option<ProgressHook>,
}

impl DocPipeline {
    pub fn new(generator: Arc<dyn DocGenerator>) -> Self {
        Self {
            generator,
            coordinator_options: CoordinatorOptions::default(),
            rewrite_options: RewriteOptions::default(),
            progress: None,
        }
    }

    pub fn from_config(generator: Arc<dyn DocGenerator>, config: &GenerationConfig) -> Self {
        Self::new(generator)
            .with_coordinator_options(config.coordinator_options())
            .with_rewrite_options(config.rewrite_options())
    }

    pub fn with_coordinator_options(mut self, options: CoordinatorOptions) -> Self {
        self.coordinator_options = options;
        self
    }

    pub fn with_rewrite_options(mut self, options: RewriteOptions) -> Self {
        self.rewrite_options = options;
        self
    }

    pub fn with_progress(mut self, hook: ProgressHook) -> Self {
        self.progress = Some(hook);
        self
    }

    /// Document every undocumented declaration in `source`
    ///
    /// Generation failures are isolated per declaration and reported in the
    /// result. Parse errors and rewrite inconsistencies are returned as
    /// errors.
    pub async fn document_source(&self, source: &str) -> Result<PipelineReport> {
        let (green, targets) = prepare(source)?;

        if targets.is_empty() {
            tracing::info!("No undocumented declarations found");
            return Ok(PipelineReport::unchanged(source));
        }
        tracing::info!(count = targets.len(), "Found undocumented declarations");

        let mut coordinator =
            Coordinator::new(Arc::clone(&self.generator), self.coordinator_options.clone());
        if let Some(progress) = &self.progress {
            coordinator = coordinator.with_progress(Arc::clone(progress));
        }
        let outcome = coordinator.run(targets.clone()).await;

        let root = CsSyntaxNode::new_root(green);
        let rewritten =
            TreeRewriter::new(&outcome.map, self.rewrite_options.clone()).rewrite(&root)?;

        // Every map entry was applied, so the map splits cleanly into
        // generated and fallback comments
        let documented = outcome.generated();
        let placeholders = rewritten.applied.saturating_sub(documented);

        Ok(PipelineReport {
            original: source.to_string(),
            output: rewritten.text(),
            targets,
            documented,
            placeholders,
            failures: outcome.failures,
            timed_out: outcome.timed_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocweaveError;
    use crate::generation::StaticGenerator;

    #[tokio::test]
    async fn test_document_source_scenario() {
        let pipeline = DocPipeline::new(Arc::new(StaticGenerator::new("<summary>stub</summary>")));
        let report = pipeline
            .document_source("class Foo {\n    void Bar() {}\n}")
            .await
            .unwrap();

        assert_eq!(
            report.output,
            "/// <summary>stub</summary>\nclass Foo {\n    /// <summary>stub</summary>\n    void Bar() {}\n}"
        );
        assert_eq!(report.documented, 2);
        assert!(report.changed());
        assert_eq!(
            report.summary(),
            RunSummary {
                targets: 2,
                documented: 2,
                placeholders: 0,
                failed: 0,
                timed_out: false
            }
        );
    }

    #[tokio::test]
    async fn test_parse_error_is_fatal() {
        let pipeline = DocPipeline::new(Arc::new(StaticGenerator::new("x")));
        let err = pipeline.document_source("class Foo {").await.unwrap_err();
        assert!(matches!(err, DocweaveError::ParseFailure { .. }));
    }

    #[test]
    fn test_list_targets() {
        let targets = list_targets("namespace N;\nclass A { void M() {} }\n").unwrap();
        let names: Vec<_> = targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["N.A", "N.A.M()"]);
    }
}
