//! Hash collections used throughout the parser.

pub use rustc_hash::FxHashSet;
