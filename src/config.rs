// SYNOID Hologram Configuration
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Defaults, then an optional JSON file, then HOLOGRAM_* environment
// variables. CLI flags are applied on top by the binary.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::display::SpinConfig;
use crate::engine::rotation::RotationConfig;
use crate::engine::Geometry;
use crate::pipeline::{DisplayConfig, ProducerConfig};

pub const ENV_CONFIG: &str = "HOLOGRAM_CONFIG";
pub const ENV_ANIM_DIR: &str = "HOLOGRAM_ANIM_DIR";
pub const ENV_BIND: &str = "HOLOGRAM_BIND";
pub const ENV_START: &str = "HOLOGRAM_START";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HologramConfig {
    pub anim_dir: PathBuf,
    pub start_animation: String,
    pub bind_addr: String,
    pub geometry: Geometry,
    /// Ring size of the ready queue; one slot always stays empty.
    pub queue_slots: usize,
    pub frame_interval_ms: u64,
    pub nudge_step: i32,
    pub rotation: RotationConfig,
    pub gpio_poll_us: u64,
    pub vsync_multiple: u32,
    pub hold_us: u32,
    pub command_poll_ms: u64,
    pub heartbeat_secs: u64,
    pub producer_backoff_us: u64,
    /// Zero picks a count from the number of cores.
    pub decode_threads: usize,
    pub spin: SpinConfig,
}

impl Default for HologramConfig {
    fn default() -> Self {
        Self {
            anim_dir: PathBuf::from("anims"),
            start_animation: "idle".to_string(),
            bind_addr: "0.0.0.0:5555".to_string(),
            geometry: Geometry::default(),
            queue_slots: 31,
            frame_interval_ms: 100,
            nudge_step: 1,
            rotation: RotationConfig::default(),
            gpio_poll_us: 0,
            vsync_multiple: 1,
            hold_us: 0,
            command_poll_ms: 250,
            heartbeat_secs: 30,
            producer_backoff_us: 500,
            decode_threads: 0,
            spin: SpinConfig::default(),
        }
    }
}

impl HologramConfig {
    /// Defaults overlaid with `path` (or `$HOLOGRAM_CONFIG`) and the
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var(ENV_CONFIG).ok().map(PathBuf::from);
        let mut cfg = match path.map(Path::to_path_buf).or(from_env) {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let txt = fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        serde_json::from_str(&txt).with_context(|| format!("parse config {:?}", path))
    }

    pub fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var(ENV_ANIM_DIR) {
            if !dir.trim().is_empty() {
                self.anim_dir = PathBuf::from(dir);
            }
        }
        if let Ok(addr) = std::env::var(ENV_BIND) {
            if !addr.trim().is_empty() {
                self.bind_addr = addr;
            }
        }
        if let Ok(start) = std::env::var(ENV_START) {
            if !start.trim().is_empty() {
                self.start_animation = start;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let g = &self.geometry;
        if g.rows == 0 || g.cols == 0 || g.slice_count == 0 {
            bail!("geometry must be non-zero, got {}x{}x{}", g.cols, g.rows, g.slice_count);
        }
        if g.rows > 256 || g.cols > 256 {
            bail!("panel larger than 256x256 is not supported");
        }
        if self.queue_slots < 2 {
            bail!("queue_slots must be at least 2, got {}", self.queue_slots);
        }
        if self.frame_interval_ms == 0 {
            bail!("frame_interval_ms must be positive");
        }
        if self.rotation.sync_bit > 31 {
            bail!("sync_bit {} is outside the 32-bit input word", self.rotation.sync_bit);
        }
        if self.rotation.debounce_ticks == 0 || self.rotation.min_period == 0 {
            bail!("debounce_ticks and min_period must be positive");
        }
        if self.command_poll_ms == 0 {
            bail!("command_poll_ms must be positive");
        }
        Ok(())
    }

    pub fn decode_thread_count(&self) -> usize {
        if self.decode_threads > 0 {
            self.decode_threads
        } else {
            // Leave room for the display loop and the control thread.
            num_cpus::get().saturating_sub(2).max(1)
        }
    }

    pub fn display(&self) -> DisplayConfig {
        DisplayConfig {
            frame_interval: Duration::from_millis(self.frame_interval_ms),
            vsync_multiple: self.vsync_multiple.max(1),
            poll_interval: Duration::from_micros(self.gpio_poll_us),
        }
    }

    pub fn producer(&self) -> ProducerConfig {
        ProducerConfig {
            backoff: Duration::from_micros(self.producer_backoff_us),
            hold_us: self.hold_us,
            decode_threads: self.decode_thread_count(),
        }
    }

    pub fn command_poll(&self) -> Duration {
        Duration::from_millis(self.command_poll_ms)
    }

    pub fn heartbeat(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs.max(1))
    }
}
