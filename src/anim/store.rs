// SYNOID Hologram Animation Store
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Catalog of `.anim` files in one directory. Every animation keeps its
// file handle open for the life of the store; only the active one moves
// its cursor.

use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::format::{frame_offset, AnimHeader, ANIM_EXTENSION, HEADER_SIZE};
use crate::engine::Geometry;

/// One opened animation and its decode cursor.
#[derive(Debug)]
pub struct Animation {
    name: String,
    path: PathBuf,
    file: File,
    geometry: Geometry,
    header: AnimHeader,
    frame: u32,
    header_end: u64,
    loop_offset: u64,
}

impl Animation {
    /// Open and validate `path`, leaving the cursor on the first frame.
    pub fn open(path: &Path, geometry: Geometry) -> Result<Self> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .with_context(|| format!("no file stem in {:?}", path))?;
        let mut file = File::open(path).with_context(|| format!("open {:?}", path))?;
        let len = file.metadata()?.len();

        let header = AnimHeader::read_from(&mut file).with_context(|| format!("{:?}", path))?;
        if header.frame_count == 0 {
            bail!("{:?} declares no frames", path);
        }
        let expected = frame_offset(&geometry, header.frame_count);
        if len < expected {
            bail!(
                "{:?} is truncated: {} bytes, {} frames need {}",
                path,
                len,
                header.frame_count,
                expected
            );
        }

        let header_end = HEADER_SIZE as u64;
        let loop_offset = frame_offset(&geometry, header.restart_frame());
        file.seek(SeekFrom::Start(header_end))?;

        Ok(Self {
            name,
            path: path.to_path_buf(),
            file,
            geometry,
            header,
            frame: 0,
            header_end,
            loop_offset,
        })
    }

    /// File stem the animation is cataloged under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame_count(&self) -> u32 {
        self.header.frame_count
    }

    pub fn loop_start(&self) -> u32 {
        self.header.loop_start
    }

    /// Frame index the next read will return.
    pub fn cursor(&self) -> u32 {
        self.frame
    }

    /// Byte offset the cursor should sit at.
    pub fn expected_offset(&self) -> u64 {
        frame_offset(&self.geometry, self.frame)
    }

    /// Actual position of the file handle.
    pub fn stream_offset(&mut self) -> Result<u64> {
        Ok(self.file.stream_position()?)
    }

    /// Move the cursor back to the first frame.
    pub fn rewind(&mut self) -> Result<()> {
        self.frame = 0;
        self.file
            .seek(SeekFrom::Start(self.header_end))
            .with_context(|| format!("seek {:?} to first frame", self.path))?;
        Ok(())
    }

    /// Read the frame under the cursor into `buf` and advance, wrapping to
    /// the loop-start frame at the end. Returns the index that was read.
    ///
    /// A short read means the file shrank after it was opened; the cursor
    /// is left where it was and the error is returned.
    pub fn read_frame(&mut self, buf: &mut Vec<u8>) -> Result<u32> {
        let index = self.frame;
        buf.resize(self.geometry.frame_bytes(), 0);
        if let Err(e) = self.file.read_exact(buf) {
            let offset = self.expected_offset();
            if let Err(seek_err) = self.file.seek(SeekFrom::Start(offset)) {
                warn!(
                    "[STORE] Cannot return {:?} to frame {} after failed read: {}",
                    self.path, index, seek_err
                );
            }
            if e.kind() == ErrorKind::UnexpectedEof {
                bail!("short read in {:?} at frame {} (offset {})", self.path, index, offset);
            }
            return Err(e).with_context(|| format!("read {:?} frame {}", self.path, index));
        }

        self.frame += 1;
        if self.frame >= self.header.frame_count {
            self.frame = self.header.restart_frame();
            self.file
                .seek(SeekFrom::Start(self.loop_offset))
                .with_context(|| format!("seek {:?} to loop start", self.path))?;
        }
        Ok(index)
    }
}

/// Name-keyed catalog of animations found in one directory.
pub struct AnimationStore {
    dir: PathBuf,
    geometry: Geometry,
    anims: BTreeMap<String, Animation>,
}

impl AnimationStore {
    /// Scan `dir` once. Fails if the directory itself cannot be read;
    /// malformed files are skipped.
    pub fn open(dir: &Path, geometry: Geometry) -> Result<Self> {
        if !dir.is_dir() {
            bail!("animation directory {:?} does not exist", dir);
        }
        let mut store = Self {
            dir: dir.to_path_buf(),
            geometry,
            anims: BTreeMap::new(),
        };
        store.rescan()?;
        Ok(store)
    }

    /// Pick up animations added since the last scan. Names already in the
    /// catalog are left untouched, cursor included. Returns how many were added.
    pub fn rescan(&mut self) -> Result<usize> {
        let mut added = 0;
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) if e.depth() == 0 => {
                    return Err(e).with_context(|| format!("read directory {:?}", self.dir));
                }
                Err(e) => {
                    warn!("[STORE] Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(ANIM_EXTENSION)
            {
                continue;
            }
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            if self.anims.contains_key(&stem) {
                continue;
            }
            match Animation::open(path, self.geometry) {
                Ok(anim) => {
                    debug!(
                        "[STORE] Loaded '{}' ({} frames, loop at {})",
                        stem,
                        anim.frame_count(),
                        anim.loop_start()
                    );
                    self.anims.insert(stem, anim);
                    added += 1;
                }
                Err(e) => warn!("[STORE] Skipping malformed animation {:?}: {:#}", path, e),
            }
        }
        if added > 0 {
            info!("[STORE] Catalog now holds {} animations (+{})", self.anims.len(), added);
        }
        Ok(added)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn len(&self) -> usize {
        self.anims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anims.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.anims.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.anims.keys().cloned().collect()
    }

    /// Animations in name order.
    pub fn list(&self) -> impl Iterator<Item = (&str, &Animation)> {
        self.anims.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, name: &str) -> Option<&Animation> {
        self.anims.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Animation> {
        self.anims.get_mut(name)
    }

    /// Look `name` up, rescanning once if it is unknown.
    pub fn resolve(&mut self, name: &str) -> Result<bool> {
        if self.anims.contains_key(name) {
            return Ok(true);
        }
        self.rescan()?;
        Ok(self.anims.contains_key(name))
    }

    /// Drop every handle. Returns how many were closed.
    pub fn close(&mut self) -> usize {
        let n = self.anims.len();
        self.anims.clear();
        n
    }
}
