// SYNOID Hologram Test Pattern
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Synthetic animation: a coloured bar that sweeps across the slices and
// drifts a little each frame. Good enough to check sync and looping on a
// panel without running the image converters.

use anyhow::Result;
use std::path::Path;
use tracing::info;

use super::format::{AnimHeader, AnimWriter};
use crate::engine::{Geometry, Pixel, Slice};

fn bar_colour(slice: usize, slice_count: usize) -> Pixel {
    let phase = (slice * 3 * 256 / slice_count.max(1)) as u32;
    let ramp = (phase % 256) as u8;
    match phase / 256 {
        0 => Pixel::new(255 - ramp, ramp, 0),
        1 => Pixel::new(0, 255 - ramp, ramp),
        _ => Pixel::new(ramp, 0, 255 - ramp),
    }
}

/// Slices of frame `frame` of the test pattern.
pub fn pattern_frame(geometry: &Geometry, frame: u32) -> Vec<Slice> {
    (0..geometry.slice_count)
        .map(|s| {
            let mut slice = Slice::new(geometry.rows, geometry.cols);
            let col = (s + frame as usize) * geometry.cols / geometry.slice_count % geometry.cols;
            let colour = bar_colour(s, geometry.slice_count);
            for y in 0..geometry.rows {
                slice.set(col, y, colour);
            }
            slice
        })
        .collect()
}

pub fn write_test_pattern(
    path: &Path,
    geometry: Geometry,
    frames: u32,
    loop_start: u32,
) -> Result<AnimHeader> {
    let header = AnimHeader::new(frames, loop_start);
    let mut writer = AnimWriter::create(path, geometry, header)?;
    for f in 0..frames {
        writer.write_frame(&pattern_frame(&geometry, f))?;
    }
    writer.finish()?;
    info!(
        "[DEMO] Wrote {:?} ({} frames, loop at {})",
        path, header.frame_count, header.loop_start
    );
    Ok(header)
}
