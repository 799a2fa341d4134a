//! Configuration for klint rules
//!
//! Rules read their settings from `.editorconfig` style properties. Locating
//! and merging `.editorconfig` files is left to the caller; this module only
//! interprets the resolved property map:
//!
//! ```ini
//! [*.{kt,kts}]
//! indent_size = 4
//! continuation_indent_size = 8
//! ```
//!
//! The same settings can be deserialized from TOML or JSON through serde.

mod editorconfig;

pub use editorconfig::{CONTINUATION_INDENT_SIZE, EditorConfig, INDENT_SIZE};
