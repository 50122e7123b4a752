//! ecma_core: Core utilities shared by the ECMAScript parser crates.
//!
//! Provides source positions, locations, the offset-to-line map used when
//! reporting errors, and the hash collections used throughout the pipeline.

pub mod collections;
pub mod text;

// Re-export commonly used types
pub use text::{LineMap, Position, SourceLocation, TextPos};
