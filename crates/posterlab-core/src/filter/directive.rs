//! Parsing of filter directives.
//!
//! A directive is a whitespace-separated list of CSS filter functions, e.g.
//! `sepia(0.6) contrast(1.1)`, or the keyword `none`. Arguments are plain
//! numbers or percentages (`50%` == `0.5`); an empty argument means `1`.

use std::fmt;

use super::FilterError;

/// One filter function with its amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    /// Multiply every channel. 1 = unchanged.
    Brightness(f32),
    /// Scale channels around mid-gray. 1 = unchanged.
    Contrast(f32),
    /// Scale chroma. 0 = gray, 1 = unchanged.
    Saturate(f32),
    /// Blend toward the sepia matrix. Clamped to 0..=1.
    Sepia(f32),
    /// Blend toward luminance. Clamped to 0..=1.
    Grayscale(f32),
}

impl FilterOp {
    fn name(&self) -> &'static str {
        match self {
            FilterOp::Brightness(_) => "brightness",
            FilterOp::Contrast(_) => "contrast",
            FilterOp::Saturate(_) => "saturate",
            FilterOp::Sepia(_) => "sepia",
            FilterOp::Grayscale(_) => "grayscale",
        }
    }

    fn amount(&self) -> f32 {
        match *self {
            FilterOp::Brightness(v)
            | FilterOp::Contrast(v)
            | FilterOp::Saturate(v)
            | FilterOp::Sepia(v)
            | FilterOp::Grayscale(v) => v,
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.amount())
    }
}

/// Ordered filter functions, applied left to right.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterChain {
    pub ops: Vec<FilterOp>,
}

impl FilterChain {
    /// Parse a directive string.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidDirective` for unknown functions, missing
    /// parentheses, or negative/non-numeric amounts.
    pub fn parse(directive: &str) -> Result<Self, FilterError> {
        let trimmed = directive.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            return Ok(Self::default());
        }

        let invalid = |reason: &str| FilterError::InvalidDirective {
            directive: directive.to_string(),
            reason: reason.to_string(),
        };

        let mut ops = Vec::new();
        let mut rest = trimmed;
        while !rest.is_empty() {
            let open = rest.find('(').ok_or_else(|| invalid("expected '('"))?;
            let close = rest.find(')').ok_or_else(|| invalid("expected ')'"))?;
            if close < open {
                return Err(invalid("unbalanced parentheses"));
            }

            let name = rest[..open].trim();
            let amount = parse_amount(&rest[open + 1..close]).ok_or_else(|| invalid("bad amount"))?;
            let op = match name.to_ascii_lowercase().as_str() {
                "brightness" => FilterOp::Brightness(amount),
                "contrast" => FilterOp::Contrast(amount),
                "saturate" => FilterOp::Saturate(amount),
                "sepia" => FilterOp::Sepia(amount),
                "grayscale" => FilterOp::Grayscale(amount),
                _ => return Err(invalid(&format!("unknown function '{}'", name))),
            };
            ops.push(op);
            rest = rest[close + 1..].trim_start();
        }

        Ok(Self { ops })
    }

    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return f.write_str("none");
        }
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

fn parse_amount(raw: &str) -> Option<f32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(1.0);
    }
    let value = match raw.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f32>().ok()? / 100.0,
        None => raw.parse::<f32>().ok()?,
    };
    (value.is_finite() && value >= 0.0).then_some(value)
}
