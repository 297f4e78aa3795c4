//! Visual filters.
//!
//! - [`registry`] - the fixed, named catalog (`None`, `Vintage`, `Grayscale`,
//!   `High Contrast`)
//! - [`directive`] - parsing of the CSS-style directive strings
//! - [`pipeline`] - the compiled colour transform the renderer applies per
//!   sample
//!
//! The catalog is not configurable at runtime.

pub mod directive;
pub mod pipeline;
pub mod registry;

use thiserror::Error;

pub use directive::{FilterChain, FilterOp};
pub use pipeline::ColorPipeline;
pub use registry::{catalog, find_by_directive, identity, select, FilterSpec};

/// Errors from filter lookup and directive parsing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    /// No registered filter has this name.
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    /// The directive string could not be interpreted.
    #[error("Invalid filter directive '{directive}': {reason}")]
    InvalidDirective { directive: String, reason: String },
}
