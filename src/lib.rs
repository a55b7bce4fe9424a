//! Sidecut: environment-aware code elimination for sided TypeScript modules.
//!
//! Given a target side ("client" or "server"), the engine strips
//! declarations, loader-chain segments and array elements tagged as
//! belonging to the other side, whether the tag sits inline or on a
//! declaration reachable only by crawling import chains, then sweeps the
//! imports that died with them. The host build tool decides which files are
//! candidates; the engine makes every decision by static structural
//! inspection of the syntax tree.

/// AST parsing, printing and traversal helpers.
pub mod ast;

/// Caller-supplied engine configuration.
pub mod config;

/// Recognized identifier names and fixed defaults.
pub mod constants;

/// The elimination engine and its two processing modes.
pub mod engine;

/// Error types.
pub mod error;

/// Static side classification of descriptor fields.
pub mod fields;

/// Decorator-based side metadata extraction.
pub mod metadata;

/// Package root discovery and path utilities.
pub mod paths;

/// Cross-module identifier-origin crawler.
pub mod resolver;

/// Side and side-tag types.
pub mod side;

/// Dead import sweeping.
pub mod sweep;

/// Module version resolution.
pub mod version;

// Re-export commonly used types
pub use config::{Dialect, EngineConfig};
pub use engine::Engine;
pub use error::{SidecutError, SidecutResult};
pub use side::{Side, SideTag};
