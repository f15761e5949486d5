// SYNOID Hologram Slice Mapper
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Maps the fixed-point rotation angle onto a ring of slice positions.

use super::rotation::ROTATION_PRECISION;

/// Bits of angle kept when quantising to slice resolution.
const COARSE_BITS: u32 = 10;

/// Quantise a fixed-point angle to a slice position in `[0, slice_count)`.
pub fn coarse_slice(angle: u32, slice_count: usize) -> usize {
    let top = (angle >> (ROTATION_PRECISION - COARSE_BITS)) as u64;
    ((top * slice_count as u64) >> COARSE_BITS) as usize % slice_count
}

/// Forward distance from `prev` to `next` on a ring of `slice_count`.
pub fn wrap_delta(prev: usize, next: usize, slice_count: usize) -> usize {
    if next < prev {
        next + slice_count - prev
    } else {
        next - prev
    }
}

/// Running slice cursor fed by coarse angles and manual nudges.
#[derive(Debug, Clone)]
pub struct SliceMapper {
    slice_count: usize,
    prev: usize,
    cursor: usize,
}

impl SliceMapper {
    pub fn new(slice_count: usize) -> Self {
        Self {
            slice_count: slice_count.max(1),
            prev: 0,
            cursor: 0,
        }
    }

    /// Apply a new coarse angle plus one unit of nudge (-1, 0 or +1)
    /// and return the slice to show.
    pub fn advance_coarse(&mut self, coarse: usize, nudge: i32) -> usize {
        let n = self.slice_count as i64;
        let delta = wrap_delta(self.prev, coarse, self.slice_count) as i64;
        self.prev = coarse;
        let next = self.cursor as i64 + delta + nudge.signum() as i64;
        self.cursor = next.rem_euclid(n) as usize;
        self.cursor
    }

    /// Same as [`advance_coarse`](Self::advance_coarse) from a raw angle.
    pub fn advance(&mut self, angle: u32, nudge: i32) -> usize {
        let coarse = coarse_slice(angle, self.slice_count);
        self.advance_coarse(coarse, nudge)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn slice_count(&self) -> usize {
        self.slice_count
    }
}
