//! docweave core
//!
//! Engine for adding XML documentation comments to C# sources. A document is
//! parsed into a lossless syntax tree, undocumented type and method
//! declarations are collected, documentation text is generated for them
//! concurrently through a [`DocGenerator`], and the text is spliced into the
//! tree as `///` trivia before the tree is printed back out.

pub mod collector;
pub mod config;
pub mod coordinator;
pub mod cst; // Concrete Syntax Tree (lossless, Rowan-based)
pub mod error;
pub mod generation;
pub mod pipeline;
pub mod result;
pub mod rewriter;
pub mod semantic;

// Re-export commonly used types
pub use collector::{DeclKind, DocId, DocRequest, DocTarget, TargetCollector, collect_requests};
pub use config::{ConfigLoader, DocweaveConfig, GenerationConfig, ServiceConfig};
pub use coordinator::{
    Coordinator, CoordinatorOptions, CoordinatorOutcome, FailurePolicy, GeneratedDoc,
    ProgressHook, RewriteMap, TargetFailure,
};
pub use error::{DocweaveError, ErrorKind};
pub use generation::{DocGenerator, GenerationError, StaticGenerator};
pub use pipeline::{DocPipeline, PipelineReport, RunSummary, list_targets, prepare};
pub use result::{Result, ResultExt};
pub use rewriter::{RewriteOptions, RewriteResult, TreeRewriter, TriviaPlacement};
pub use semantic::{SemanticModel, SymbolError, UNKNOWN_SYMBOL};

/// Initialize the tracing subscriber for logging
///
/// `RUST_LOG` takes precedence; otherwise events from the docweave crates at
/// `level` and above are written to stderr. Calling this more than once is
/// harmless.
pub fn init_tracing(level: tracing::Level) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("docweave={level}")));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
