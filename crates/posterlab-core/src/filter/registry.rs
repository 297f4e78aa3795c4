//! The fixed filter catalog.

use serde::Serialize;

use super::directive::FilterChain;
use super::FilterError;

/// A named filter and its rendering directive.
///
/// The directive is opaque to the registry; the renderer interprets it via
/// [`FilterSpec::chain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    pub name: &'static str,
    pub directive: &'static str,
}

impl FilterSpec {
    pub fn is_identity(&self) -> bool {
        self.directive == IDENTITY.directive
    }

    /// Parse the directive for rendering.
    pub fn chain(&self) -> Result<FilterChain, FilterError> {
        FilterChain::parse(self.directive)
    }
}

impl Default for FilterSpec {
    fn default() -> Self {
        IDENTITY
    }
}

const IDENTITY: FilterSpec = FilterSpec {
    name: "None",
    directive: "none",
};

/// Display order matches the filter bar.
static CATALOG: [FilterSpec; 4] = [
    IDENTITY,
    FilterSpec {
        name: "Vintage",
        directive: "sepia(0.6) contrast(1.1) brightness(0.9) saturate(1.2)",
    },
    FilterSpec {
        name: "Grayscale",
        directive: "grayscale(1)",
    },
    FilterSpec {
        name: "High Contrast",
        directive: "contrast(1.5)",
    },
];

/// All registered filters in display order.
pub fn catalog() -> &'static [FilterSpec] {
    &CATALOG
}

/// The identity filter.
pub fn identity() -> FilterSpec {
    IDENTITY
}

/// Look up a filter by its exact name.
///
/// # Errors
///
/// Returns `FilterError::UnknownFilter` if no filter has that name.
pub fn select(name: &str) -> Result<FilterSpec, FilterError> {
    CATALOG
        .iter()
        .find(|spec| spec.name == name)
        .copied()
        .ok_or_else(|| FilterError::UnknownFilter(name.to_string()))
}

/// Look up a filter by its directive string.
pub fn find_by_directive(directive: &str) -> Option<FilterSpec> {
    CATALOG.iter().find(|spec| spec.directive == directive).copied()
}
