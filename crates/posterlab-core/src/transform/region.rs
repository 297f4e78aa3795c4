//! Region drawing with a filter applied at draw time.
//!
//! This is the raster half of export: copy a native-space rectangle of the
//! source into a fresh surface, running every sample through the colour
//! pipeline as it is written.
//!
//! # Sampling
//!
//! Nearest neighbour at pixel centres. When the surface size equals the
//! region size and the region origin is integral, output pixel `(i, j)` is
//! exactly source pixel `(x + i, y + j)`: a plain region copy. Samples past
//! the source edge clamp to the last row/column.

use crate::decode::Raster;
use crate::filter::ColorPipeline;
use crate::transform::PixelCrop;

/// Draw `region` (native pixels) of `source` into a `width` x `height`
/// surface, applying `pipeline` per sample.
///
/// Callers guarantee non-zero output dimensions and a non-empty source.
pub fn draw_region(
    source: &Raster,
    region: &PixelCrop,
    width: u32,
    height: u32,
    pipeline: &ColorPipeline,
) -> Raster {
    let src_cols = sample_positions(region.x, region.width, width, source.width);
    let src_rows = sample_positions(region.y, region.height, height, source.height);

    let row_bytes = width as usize * Raster::CHANNELS;
    let mut output = vec![0u8; row_bytes * height as usize];

    for (dst_row, &src_y) in output.chunks_exact_mut(row_bytes).zip(src_rows.iter()) {
        for (dst, &src_x) in dst_row.chunks_exact_mut(Raster::CHANNELS).zip(src_cols.iter()) {
            dst.copy_from_slice(&pipeline.apply(source.pixel(src_x, src_y)));
        }
    }

    Raster::new(width, height, output)
}

/// Source index for each of `count` output samples spanning
/// `[origin, origin + extent)`, clamped to `0..limit`.
fn sample_positions(origin: f64, extent: f64, count: u32, limit: u32) -> Vec<u32> {
    let step = extent / count as f64;
    let max = limit.saturating_sub(1) as f64;
    (0..count)
        .map(|i| {
            let centre = origin + (i as f64 + 0.5) * step;
            centre.floor().clamp(0.0, max) as u32
        })
        .collect()
}


// ============================================================================
// Property-Based Tests
// ============================================================================
