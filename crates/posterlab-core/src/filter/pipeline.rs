//! Colour pipeline compiled from a [`FilterChain`].
//!
//! Each filter function becomes either a 3x3 colour matrix or a per-channel
//! linear transfer, using the coefficients from the CSS Filter Effects
//! definitions. Channels are processed as `f32` in 0.0..=1.0 and clamped
//! after every step. Alpha is never touched.
//!
//! The pipeline is applied per sample by the renderer while drawing, so the
//! effect composes with the draw instead of running as a separate pass.

use super::directive::{FilterChain, FilterOp};

/// A compiled colour step.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ColorStep {
    /// `out = m * [r, g, b]`
    Matrix([[f32; 3]; 3]),
    /// `out = c * slope + intercept` for every channel
    Linear { slope: f32, intercept: f32 },
}

/// Compiled, reusable colour transform.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorPipeline {
    steps: Vec<ColorStep>,
}

impl ColorPipeline {
    pub fn compile(chain: &FilterChain) -> Self {
        let steps = chain.ops.iter().map(|op| compile_op(*op)).collect();
        Self { steps }
    }

    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    /// Transform one RGBA sample.
    #[inline]
    pub fn apply(&self, rgba: [u8; 4]) -> [u8; 4] {
        if self.steps.is_empty() {
            return rgba;
        }

        let mut c = [
            rgba[0] as f32 / 255.0,
            rgba[1] as f32 / 255.0,
            rgba[2] as f32 / 255.0,
        ];
        for step in &self.steps {
            c = match *step {
                ColorStep::Matrix(m) => [
                    m[0][0] * c[0] + m[0][1] * c[1] + m[0][2] * c[2],
                    m[1][0] * c[0] + m[1][1] * c[1] + m[1][2] * c[2],
                    m[2][0] * c[0] + m[2][1] * c[1] + m[2][2] * c[2],
                ],
                ColorStep::Linear { slope, intercept } => [
                    c[0] * slope + intercept,
                    c[1] * slope + intercept,
                    c[2] * slope + intercept,
                ],
            };
            for v in &mut c {
                *v = v.clamp(0.0, 1.0);
            }
        }

        [to_u8(c[0]), to_u8(c[1]), to_u8(c[2]), rgba[3]]
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v * 255.0).round() as u8
}

fn compile_op(op: FilterOp) -> ColorStep {
    match op {
        FilterOp::Brightness(b) => ColorStep::Linear {
            slope: b,
            intercept: 0.0,
        },
        FilterOp::Contrast(c) => ColorStep::Linear {
            slope: c,
            intercept: 0.5 - 0.5 * c,
        },
        FilterOp::Saturate(s) => ColorStep::Matrix(saturate_matrix(s)),
        FilterOp::Sepia(a) => ColorStep::Matrix(sepia_matrix(a.clamp(0.0, 1.0))),
        FilterOp::Grayscale(a) => ColorStep::Matrix(grayscale_matrix(a.clamp(0.0, 1.0))),
    }
}

fn saturate_matrix(s: f32) -> [[f32; 3]; 3] {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn sepia_matrix(a: f32) -> [[f32; 3]; 3] {
    let k = 1.0 - a;
    [
        [0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k],
        [0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k],
        [0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k],
    ]
}

fn grayscale_matrix(a: f32) -> [[f32; 3]; 3] {
    let k = 1.0 - a;
    [
        [0.2126 + 0.7874 * k, 0.7152 - 0.7152 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 + 0.2848 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 - 0.7152 * k, 0.0722 + 0.9278 * k],
    ]
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn op_strategy() -> impl Strategy<Value = FilterOp> {
        prop_oneof![
            (0.0f32..=3.0).prop_map(FilterOp::Brightness),
            (0.0f32..=3.0).prop_map(FilterOp::Contrast),
            (0.0f32..=3.0).prop_map(FilterOp::Saturate),
            (0.0f32..=1.0).prop_map(FilterOp::Sepia),
            (0.0f32..=1.0).prop_map(FilterOp::Grayscale),
        ]
    }

    proptest! {
        /// Property: Alpha is never modified by any chain.
        #[test]
        fn prop_alpha_untouched(
            ops in prop::collection::vec(op_strategy(), 0..5),
            rgba in any::<[u8; 4]>(),
        ) {
            let p = ColorPipeline::compile(&FilterChain { ops });
            prop_assert_eq!(p.apply(rgba)[3], rgba[3]);
        }

        /// Property: Full grayscale always yields equal channels.
        #[test]
        fn prop_grayscale_is_neutral(rgba in any::<[u8; 4]>()) {
            let p = ColorPipeline::compile(&FilterChain { ops: vec![FilterOp::Grayscale(1.0)] });
            let [r, g, b, _] = p.apply(rgba);
            prop_assert!((r as i32 - g as i32).abs() <= 1);
            prop_assert!((g as i32 - b as i32).abs() <= 1);
        }
    }
}
