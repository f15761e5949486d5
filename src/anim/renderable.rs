// SYNOID Hologram Renderable Frames
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Display-ready form of a frame: one replayable op stream per slice.
// Each record is a run of pixel ops ending in a `Hold` marker; the
// display swaps buffers after every record.

use rayon::prelude::*;

use crate::display::Panel;
use crate::engine::{Geometry, Pixel, PIXEL_BYTES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceOp {
    /// Blank the back buffer.
    Clear,
    Set { x: u8, y: u8, pixel: Pixel },
    /// End of record; show it for at least this many microseconds.
    Hold(u32),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceStream {
    ops: Vec<SliceOp>,
}

impl SliceStream {
    /// Encode one slice of packed r,g,b bytes as a single record.
    /// Black pixels are covered by the leading `Clear`.
    pub fn encode(cols: usize, bytes: &[u8], hold_us: u32) -> Self {
        let mut ops = Vec::with_capacity(bytes.len() / PIXEL_BYTES / 2 + 2);
        ops.push(SliceOp::Clear);
        for (i, px) in bytes.chunks_exact(PIXEL_BYTES).enumerate() {
            let pixel = Pixel::new(px[0], px[1], px[2]);
            if pixel.is_black() {
                continue;
            }
            ops.push(SliceOp::Set {
                x: (i % cols) as u8,
                y: (i / cols) as u8,
                pixel,
            });
        }
        ops.push(SliceOp::Hold(hold_us));
        Self { ops }
    }

    pub fn from_ops(ops: Vec<SliceOp>) -> Self {
        Self { ops }
    }

    pub fn ops(&self) -> &[SliceOp] {
        &self.ops
    }

    pub fn reader(&self) -> SliceReader<'_> {
        SliceReader {
            ops: &self.ops,
            pos: 0,
        }
    }
}

/// Cursor over a [`SliceStream`].
pub struct SliceReader<'a> {
    ops: &'a [SliceOp],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    /// Replay the next record onto the panel's back buffer. Returns the
    /// record's hold time, or `None` once the stream is exhausted.
    pub fn play_next<P: Panel + ?Sized>(&mut self, panel: &mut P) -> Option<u32> {
        let mut touched = false;
        while let Some(op) = self.ops.get(self.pos) {
            self.pos += 1;
            touched = true;
            match *op {
                SliceOp::Clear => panel.clear(),
                SliceOp::Set { x, y, pixel } => panel.set_pixel(x as usize, y as usize, pixel),
                SliceOp::Hold(us) => return Some(us),
            }
        }
        // Trailing ops without a marker still count as a record.
        if touched {
            Some(0)
        } else {
            None
        }
    }

    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.ops.len()
    }
}

/// All slices of one frame, ready to stream.
#[derive(Debug, Clone)]
pub struct RenderableFrame {
    slices: Vec<SliceStream>,
}

impl RenderableFrame {
    /// Encode a raw on-disk frame, fanning slices out over the rayon pool
    /// the caller is installed in.
    pub fn from_raw(geometry: &Geometry, raw: &[u8], hold_us: u32) -> Self {
        let cols = geometry.cols;
        let slices = raw
            .par_chunks(geometry.slice_bytes())
            .take(geometry.slice_count)
            .map(|bytes| SliceStream::encode(cols, bytes, hold_us))
            .collect();
        Self { slices }
    }

    pub fn from_slices(slices: Vec<SliceStream>) -> Self {
        Self { slices }
    }

    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    pub fn slice(&self, index: usize) -> Option<&SliceStream> {
        self.slices.get(index)
    }
}
