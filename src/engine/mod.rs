// SYNOID Hologram Engine
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Geometry and pixel types shared by the rotation engine, the animation
// store and the display loop.

pub mod rotation;
pub mod slice_mapper;

use serde::{Deserialize, Serialize};

/// Bytes per pixel on disk (r, g, b).
pub const PIXEL_BYTES: usize = 3;

/// A single opaque RGB pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel {
    pub const BLACK: Pixel = Pixel { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn is_black(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }
}

/// Dimensions of one volumetric frame: `slice_count` slices of `rows x cols`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    pub rows: usize,
    pub cols: usize,
    pub slice_count: usize,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            rows: 64,
            cols: 64,
            slice_count: 100,
        }
    }
}

impl Geometry {
    pub fn pixels_per_slice(&self) -> usize {
        self.rows * self.cols
    }

    pub fn slice_bytes(&self) -> usize {
        self.pixels_per_slice() * PIXEL_BYTES
    }

    /// Size of one on-disk frame record.
    pub fn frame_bytes(&self) -> usize {
        self.slice_bytes() * self.slice_count
    }
}

/// One rotational cross-section, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    rows: usize,
    cols: usize,
    pixels: Vec<Pixel>,
}

impl Slice {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            pixels: vec![Pixel::BLACK; rows * cols],
        }
    }

    /// Build a slice from packed `r,g,b` bytes. Trailing bytes beyond
    /// `rows * cols * 3` are ignored; missing bytes stay black.
    pub fn from_rgb_bytes(rows: usize, cols: usize, bytes: &[u8]) -> Self {
        let mut slice = Self::new(rows, cols);
        for (px, chunk) in slice.pixels.iter_mut().zip(bytes.chunks_exact(PIXEL_BYTES)) {
            *px = Pixel::new(chunk[0], chunk[1], chunk[2]);
        }
        slice
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, x: usize, y: usize) -> Pixel {
        self.pixels[y * self.cols + x]
    }

    pub fn set(&mut self, x: usize, y: usize, pixel: Pixel) {
        self.pixels[y * self.cols + x] = pixel;
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Append this slice to `out` in on-disk order.
    pub fn write_rgb_bytes(&self, out: &mut Vec<u8>) {
        out.reserve(self.pixels.len() * PIXEL_BYTES);
        for p in &self.pixels {
            out.extend_from_slice(&[p.r, p.g, p.b]);
        }
    }
}
