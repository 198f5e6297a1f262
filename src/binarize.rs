//! Region-adaptive binarization of RGBA pixel buffers.

use rayon::prelude::*;

use crate::error::{ProbeError, Result};
use crate::models::{BitGrid, PixelBuffer};

/// Edge length of a threshold region in pixels
const REGION_SIZE: usize = 8;

/// Regions whose luminance range is at most this are treated as featureless
const MIN_DYNAMIC_RANGE: u8 = 24;

/// Images with an edge at least this long take the row-parallel luminance path
const PARALLEL_MIN_DIM: usize = 800;

// BT.709 luminance, fixed point: L = (54*R + 183*G + 19*B) >> 8
const COEF_R: u32 = 54;
const COEF_G: u32 = 183;
const COEF_B: u32 = 19;

/// Binarize an RGBA buffer into a bit grid, 1 = dark module candidate
///
/// Thresholds are computed per 8x8 pixel region from the regional mean,
/// with a black-point fallback for low-contrast regions, then smoothed
/// over a 5x5 region window to avoid block-boundary artifacts.
pub fn binarize(pixels: PixelBuffer<'_>) -> Result<BitGrid> {
    let expected = pixels.width * pixels.height * 4;
    if pixels.data.len() != expected {
        return Err(ProbeError::MalformedImage {
            width: pixels.width,
            height: pixels.height,
            expected,
            actual: pixels.data.len(),
        });
    }
    if pixels.width == 0 || pixels.height == 0 {
        return Ok(BitGrid::new(pixels.width, pixels.height));
    }

    let luminance = if pixels.width >= PARALLEL_MIN_DIM || pixels.height >= PARALLEL_MIN_DIM {
        rgba_to_luminance_parallel(pixels.data, pixels.width, pixels.height)
    } else {
        rgba_to_luminance(pixels.data, pixels.width, pixels.height)
    };

    Ok(threshold_regions(&luminance, pixels.width, pixels.height))
}

fn luminance_of(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

fn rgba_to_luminance(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    let pixel_count = width * height;
    let mut lum = vec![0u8; pixel_count];
    for (i, out) in lum.iter_mut().enumerate() {
        let idx = i * 4;
        *out = luminance_of(rgba[idx], rgba[idx + 1], rgba[idx + 2]);
    }
    lum
}

fn rgba_to_luminance_parallel(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut lum = vec![0u8; width * height];
    lum.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let row_start = y * width * 4;
        for (x, out) in row.iter_mut().enumerate() {
            let idx = row_start + x * 4;
            *out = luminance_of(rgba[idx], rgba[idx + 1], rgba[idx + 2]);
        }
    });
    lum
}

/// Per-region black point estimation plus 5x5 smoothed thresholding
fn threshold_regions(luminance: &[u8], width: usize, height: usize) -> BitGrid {
    let regions_x = width.div_ceil(REGION_SIZE);
    let regions_y = height.div_ceil(REGION_SIZE);

    let mut black_points = vec![0.0f32; regions_x * regions_y];
    for ry in 0..regions_y {
        for rx in 0..regions_x {
            let x_end = ((rx + 1) * REGION_SIZE).min(width);
            let y_end = ((ry + 1) * REGION_SIZE).min(height);

            let mut sum = 0u32;
            let mut count = 0u32;
            let mut min = u8::MAX;
            let mut max = u8::MIN;
            for y in ry * REGION_SIZE..y_end {
                for x in rx * REGION_SIZE..x_end {
                    let value = luminance[y * width + x];
                    sum += value as u32;
                    min = min.min(value);
                    max = max.max(value);
                    count += 1;
                }
            }

            let mut black_point = sum as f32 / count as f32;
            if max - min <= MIN_DYNAMIC_RANGE {
                // Featureless region: assume background and estimate the
                // black point at half the noise floor, pulled up to the
                // neighborhood estimate when that is darker than anything
                // seen locally.
                black_point = min as f32 / 2.0;
                if rx > 0 && ry > 0 {
                    let above = black_points[(ry - 1) * regions_x + rx];
                    let left = black_points[ry * regions_x + rx - 1];
                    let above_left = black_points[(ry - 1) * regions_x + rx - 1];
                    let neighbor_avg = (above + 2.0 * left + above_left) / 4.0;
                    if (min as f32) < neighbor_avg {
                        black_point = neighbor_avg;
                    }
                }
            }
            black_points[ry * regions_x + rx] = black_point;
        }
    }

    let mut binary = BitGrid::new(width, height);
    for ry in 0..regions_y {
        for rx in 0..regions_x {
            let cx = window_center(rx, regions_x);
            let cy = window_center(ry, regions_y);
            let mut sum = 0.0f32;
            for wy in -2i64..=2 {
                for wx in -2i64..=2 {
                    let sx = (cx + wx).clamp(0, regions_x as i64 - 1) as usize;
                    let sy = (cy + wy).clamp(0, regions_y as i64 - 1) as usize;
                    sum += black_points[sy * regions_x + sx];
                }
            }
            let threshold = sum / 25.0;

            let x_end = ((rx + 1) * REGION_SIZE).min(width);
            let y_end = ((ry + 1) * REGION_SIZE).min(height);
            for y in ry * REGION_SIZE..y_end {
                for x in rx * REGION_SIZE..x_end {
                    if luminance[y * width + x] as f32 <= threshold {
                        binary.set(x, y, true);
                    }
                }
            }
        }
    }

    binary
}

/// Clamp a 5x5 window center into the region grid; grids narrower than
/// five regions clamp again at the index level
fn window_center(index: usize, count: usize) -> i64 {
    (index as i64).min(count as i64 - 3).max(2)
}
