// SYNOID Hologram Tests — Animation Playback
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use hologram_core::anim::format::{AnimHeader, AnimWriter, HEADER_SIZE, MAGIC};
use hologram_core::anim::{Animation, AnimationStore};
use hologram_core::engine::Geometry;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

static DIR_SEQ: AtomicUsize = AtomicUsize::new(0);

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "hologram-{}-{}-{}",
        tag,
        std::process::id(),
        DIR_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn tiny() -> Geometry {
    Geometry {
        rows: 2,
        cols: 2,
        slice_count: 4,
    }
}

/// Frame `i` is filled with byte `i + 1` so reads can be identified.
fn write_anim(path: &Path, geometry: Geometry, frames: u32, loop_start: u32) {
    let mut w = AnimWriter::create(path, geometry, AnimHeader::new(frames, loop_start)).unwrap();
    for i in 0..frames {
        w.write_raw_frame(&vec![i as u8 + 1; geometry.frame_bytes()]).unwrap();
    }
    w.finish().unwrap();
}

fn raw_header(frames: u32, loop_start: u32) -> Vec<u8> {
    let mut h = vec![0u8; HEADER_SIZE];
    h[..MAGIC.len()].copy_from_slice(MAGIC);
    h[12..16].copy_from_slice(&frames.to_le_bytes());
    h[16..20].copy_from_slice(&loop_start.to_le_bytes());
    h
}

#[test]
fn test_loop_order_and_offsets() {
    let dir = temp_dir("loop");
    let path = dir.join("wave.anim");
    write_anim(&path, tiny(), 5, 3);

    let mut anim = Animation::open(&path, tiny()).unwrap();
    let mut buf = Vec::new();
    let mut order = Vec::new();
    for _ in 0..7 {
        let index = anim.read_frame(&mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == index as u8 + 1), "frame {} has wrong bytes", index);
        assert_eq!(anim.stream_offset().unwrap(), anim.expected_offset());
        order.push(index);
    }
    assert_eq!(order, vec![0, 1, 2, 3, 4, 3, 4]);

    // Many wraps later the handle is still on a frame boundary.
    for _ in 0..1000 {
        anim.read_frame(&mut buf).unwrap();
    }
    assert_eq!(anim.stream_offset().unwrap(), anim.expected_offset());

    anim.rewind().unwrap();
    assert_eq!(anim.cursor(), 0);
    assert_eq!(anim.read_frame(&mut buf).unwrap(), 0);
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_loop_start_past_end_repeats_last_frame() {
    let dir = temp_dir("pastend");
    let path = dir.join("hold.anim");
    let g = tiny();
    let mut bytes = raw_header(3, 9);
    for i in 0..3u8 {
        bytes.extend(vec![i + 1; g.frame_bytes()]);
    }
    fs::write(&path, bytes).unwrap();

    let mut anim = Animation::open(&path, g).unwrap();
    let mut buf = Vec::new();
    let order: Vec<u32> = (0..5).map(|_| anim.read_frame(&mut buf).unwrap()).collect();
    assert_eq!(order, vec![0, 1, 2, 2, 2]);
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_single_frame_animation() {
    let dir = temp_dir("single");
    let path = dir.join("still.anim");
    write_anim(&path, tiny(), 1, 0);

    let mut anim = Animation::open(&path, tiny()).unwrap();
    let mut buf = Vec::new();
    for _ in 0..4 {
        assert_eq!(anim.read_frame(&mut buf).unwrap(), 0);
    }
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_catalog_skips_malformed_files() {
    let dir = temp_dir("catalog");
    let g = tiny();
    write_anim(&dir.join("good.anim"), g, 2, 0);

    let mut bad_magic = raw_header(1, 0);
    bad_magic[0] = b'X';
    bad_magic.extend(vec![1u8; g.frame_bytes()]);
    fs::write(dir.join("badmagic.anim"), bad_magic).unwrap();

    fs::write(dir.join("short.anim"), &MAGIC[..]).unwrap();
    fs::write(dir.join("empty.anim"), raw_header(0, 0)).unwrap();

    let mut truncated = raw_header(3, 0);
    truncated.extend(vec![1u8; g.frame_bytes() * 2]);
    fs::write(dir.join("truncated.anim"), truncated).unwrap();

    write_anim(&dir.join("ignored.bin"), g, 1, 0);

    let store = AnimationStore::open(&dir, g).unwrap();
    assert_eq!(store.names(), vec!["good".to_string()]);
    assert_eq!(store.get("good").unwrap().frame_count(), 2);
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_missing_directory_fails() {
    let dir = temp_dir("missing").join("nope");
    assert!(AnimationStore::open(&dir, tiny()).is_err());
}

#[test]
fn test_rescan_keeps_existing_cursors() {
    let dir = temp_dir("rescan");
    let g = tiny();
    write_anim(&dir.join("a.anim"), g, 4, 0);

    let mut store = AnimationStore::open(&dir, g).unwrap();
    let mut buf = Vec::new();
    store.get_mut("a").unwrap().read_frame(&mut buf).unwrap();

    assert_eq!(store.rescan().unwrap(), 0);
    assert_eq!(store.get("a").unwrap().cursor(), 1);

    write_anim(&dir.join("b.anim"), g, 2, 1);
    assert_eq!(store.rescan().unwrap(), 1);
    assert_eq!(store.len(), 2);
    assert_eq!(store.get("a").unwrap().cursor(), 1);

    assert!(store.resolve("b").unwrap());
    assert!(!store.resolve("c").unwrap());
    assert_eq!(store.close(), 2);
    assert!(store.is_empty());
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_file_shrinking_after_open_is_a_read_error() {
    let dir = temp_dir("shrink");
    let path = dir.join("gone.anim");
    let g = tiny();
    write_anim(&path, g, 3, 0);

    let mut anim = Animation::open(&path, g).unwrap();
    let mut buf = Vec::new();
    assert_eq!(anim.read_frame(&mut buf).unwrap(), 0);

    let file = OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len((HEADER_SIZE + g.frame_bytes() + 1) as u64).unwrap();
    drop(file);

    let err = anim.read_frame(&mut buf).unwrap_err();
    assert!(format!("{:#}", err).contains("short read"));
    assert_eq!(anim.cursor(), 1);

    anim.rewind().unwrap();
    assert_eq!(anim.read_frame(&mut buf).unwrap(), 0);
    fs::remove_dir_all(&dir).ok();
}
