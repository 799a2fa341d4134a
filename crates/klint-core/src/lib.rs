//! klint core
//!
//! Foundation for the klint Kotlin linter: a lossless rowan CST and the
//! fixture parser that produces it, an index-based [`tree::SyntaxTree`] that
//! rules walk, `.editorconfig` driven configuration, and diagnostics.

pub mod config;
pub mod cst; // Concrete Syntax Tree (lossless, Rowan-based)
pub mod diagnostics;
pub mod error;
pub mod result;
pub mod tree;

// Re-export commonly used types
pub use config::EditorConfig;
pub use cst::{KotlinLanguage, KtSyntaxKind, KtSyntaxNode, ParseError, parse_kotlin};
pub use diagnostics::{Diagnostic, Location, Severity, SourceMap};
pub use error::{ErrorKind, KlintError};
pub use result::{Result, ResultExt};
pub use tree::{NodeId, SyntaxTree};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("klint=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
