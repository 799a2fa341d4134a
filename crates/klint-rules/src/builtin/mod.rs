//! Built-in lint rules

pub mod indent;

pub use indent::IndentationRule;

use crate::engine::Rule;

/// Every built-in rule, in execution order
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(IndentationRule)]
}
