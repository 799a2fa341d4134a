//! Diagnostics produced by lint rules

mod types;

pub use types::{Diagnostic, Location, Severity, SourceMap};
