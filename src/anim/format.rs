// SYNOID Hologram Animation Format
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// `.anim` layout:
//   [0..9)   magic "HOLOGRAM\0"
//   [9..12)  padding
//   [12..16) frame count, u32 LE
//   [16..20) loop start,  u32 LE
//   then `frame_count` fixed-size frame records of
//   `slice_count * rows * cols` packed r,g,b pixels.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::engine::{Geometry, Slice};

pub const ANIM_EXTENSION: &str = "anim";
pub const MAGIC: &[u8; 9] = b"HOLOGRAM\0";
pub const HEADER_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimHeader {
    pub frame_count: u32,
    pub loop_start: u32,
}

impl AnimHeader {
    /// Header with `loop_start` clamped to `frame_count`.
    pub fn new(frame_count: u32, loop_start: u32) -> Self {
        Self {
            frame_count,
            loop_start: loop_start.min(frame_count),
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            bail!("truncated header ({} of {} bytes)", bytes.len(), HEADER_SIZE);
        }
        if &bytes[..MAGIC.len()] != MAGIC {
            bail!("bad magic tag {:?}", String::from_utf8_lossy(&bytes[..MAGIC.len()]));
        }
        let frame_count = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);
        let loop_start = u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        Ok(Self::new(frame_count, loop_start))
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; HEADER_SIZE];
        let mut filled = 0;
        while filled < HEADER_SIZE {
            let n = reader.read(&mut buf[filled..]).context("read header")?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Self::parse(&buf[..filled])
    }

    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..MAGIC.len()].copy_from_slice(MAGIC);
        out[12..16].copy_from_slice(&self.frame_count.to_le_bytes());
        out[16..20].copy_from_slice(&self.loop_start.to_le_bytes());
        out
    }

    /// First frame shown again once the sequence has run out.
    pub fn restart_frame(&self) -> u32 {
        if self.loop_start >= self.frame_count {
            self.frame_count.saturating_sub(1)
        } else {
            self.loop_start
        }
    }
}

/// Byte offset of frame `index`.
pub fn frame_offset(geometry: &Geometry, index: u32) -> u64 {
    HEADER_SIZE as u64 + index as u64 * geometry.frame_bytes() as u64
}

/// Streams frames into a new `.anim` file. The header is written up front,
/// so the number of frames must be known.
pub struct AnimWriter {
    out: BufWriter<File>,
    geometry: Geometry,
    header: AnimHeader,
    written: u32,
}

impl AnimWriter {
    pub fn create(path: &Path, geometry: Geometry, header: AnimHeader) -> Result<Self> {
        let file = File::create(path).with_context(|| format!("create {:?}", path))?;
        let mut out = BufWriter::new(file);
        out.write_all(&header.encode())?;
        Ok(Self {
            out,
            geometry,
            header,
            written: 0,
        })
    }

    /// Append one frame made of exactly `slice_count` slices.
    pub fn write_frame(&mut self, slices: &[Slice]) -> Result<()> {
        if slices.len() != self.geometry.slice_count {
            bail!(
                "frame has {} slices, expected {}",
                slices.len(),
                self.geometry.slice_count
            );
        }
        let mut buf = Vec::with_capacity(self.geometry.frame_bytes());
        for slice in slices {
            if slice.rows() != self.geometry.rows || slice.cols() != self.geometry.cols {
                bail!(
                    "slice is {}x{}, expected {}x{}",
                    slice.cols(),
                    slice.rows(),
                    self.geometry.cols,
                    self.geometry.rows
                );
            }
            slice.write_rgb_bytes(&mut buf);
        }
        self.write_raw_frame(&buf)
    }

    /// Append one frame given as packed bytes in on-disk order.
    pub fn write_raw_frame(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() != self.geometry.frame_bytes() {
            bail!(
                "frame is {} bytes, expected {}",
                bytes.len(),
                self.geometry.frame_bytes()
            );
        }
        self.out.write_all(bytes)?;
        self.written += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        if self.written != self.header.frame_count {
            bail!(
                "wrote {} frames but header declares {}",
                self.written,
                self.header.frame_count
            );
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let bytes = AnimHeader::new(5, 3).encode();
        assert_eq!(&bytes[..9], b"HOLOGRAM\0");
        assert_eq!(&bytes[9..12], &[0, 0, 0]);
        assert_eq!(&bytes[12..16], &5u32.to_le_bytes());
        assert_eq!(&bytes[16..20], &3u32.to_le_bytes());
        assert_eq!(AnimHeader::parse(&bytes).unwrap(), AnimHeader::new(5, 3));
    }

    #[test]
    fn test_loop_start_clamped() {
        let mut bytes = AnimHeader::new(4, 0).encode();
        bytes[16..20].copy_from_slice(&99u32.to_le_bytes());
        let header = AnimHeader::parse(&bytes).unwrap();
        assert_eq!(header.loop_start, 4);
        assert_eq!(header.restart_frame(), 3);
        assert_eq!(AnimHeader::new(5, 3).restart_frame(), 3);
    }

    #[test]
    fn test_rejects_bad_magic_and_short_header() {
        let mut bytes = AnimHeader::new(1, 0).encode();
        bytes[0] = b'X';
        assert!(AnimHeader::parse(&bytes).is_err());
        assert!(AnimHeader::parse(&bytes[..12]).is_err());

        let mut short: &[u8] = b"HOLO";
        assert!(AnimHeader::read_from(&mut short).is_err());
    }

    #[test]
    fn test_frame_offsets() {
        let g = Geometry {
            rows: 2,
            cols: 2,
            slice_count: 3,
        };
        assert_eq!(frame_offset(&g, 0), 20);
        assert_eq!(frame_offset(&g, 4), 20 + 4 * 36);
    }
}
