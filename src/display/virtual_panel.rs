// SYNOID Hologram Virtual Panel
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// In-memory double-buffered panel with a simulated spinning disk on the
// sync line. Lets the viewer and the tests run without LED hardware.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::Panel;
use crate::engine::Pixel;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpinConfig {
    /// Simulated disk speed. Zero leaves the sync line low.
    pub rpm: f64,
    /// Random timing noise applied when sampling the sync line.
    pub jitter_us: u32,
    /// Refresh rate used to pace `swap_on_vsync`. Zero swaps immediately.
    pub refresh_hz: u32,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            rpm: 720.0,
            jitter_us: 0,
            refresh_hz: 0,
        }
    }
}

pub struct VirtualPanel {
    width: usize,
    height: usize,
    back: Vec<Pixel>,
    front: Vec<Pixel>,
    swaps: u64,
    spin: SpinConfig,
    sync_bit: u8,
    started: Instant,
}

impl VirtualPanel {
    /// A still panel: sync line low, swaps immediate.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_spin(
            width,
            height,
            SpinConfig {
                rpm: 0.0,
                ..SpinConfig::default()
            },
            0,
        )
    }

    pub fn with_spin(width: usize, height: usize, spin: SpinConfig, sync_bit: u8) -> Self {
        Self {
            width,
            height,
            back: vec![Pixel::BLACK; width * height],
            front: vec![Pixel::BLACK; width * height],
            swaps: 0,
            spin,
            sync_bit,
            started: Instant::now(),
        }
    }

    pub fn back_pixel(&self, x: usize, y: usize) -> Pixel {
        self.back[y * self.width + x]
    }

    pub fn front_pixel(&self, x: usize, y: usize) -> Pixel {
        self.front[y * self.width + x]
    }

    pub fn swap_count(&self) -> u64 {
        self.swaps
    }

    /// Sync level at `t_us`: high for the first half of each revolution.
    fn sync_level_at(&self, t_us: u64) -> bool {
        if self.spin.rpm <= 0.0 {
            return false;
        }
        let half_turn_us = (30_000_000.0 / self.spin.rpm).max(1.0) as u64;
        (t_us / half_turn_us) % 2 == 0
    }
}

impl Panel for VirtualPanel {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn set_pixel(&mut self, x: usize, y: usize, pixel: Pixel) {
        if x < self.width && y < self.height {
            self.back[y * self.width + x] = pixel;
        }
    }

    fn clear(&mut self) {
        self.back.fill(Pixel::BLACK);
    }

    fn swap_on_vsync(&mut self, multiple: u32) {
        std::mem::swap(&mut self.front, &mut self.back);
        self.swaps += 1;
        if self.spin.refresh_hz > 0 {
            let frame = Duration::from_secs_f64(multiple.max(1) as f64 / self.spin.refresh_hz as f64);
            std::thread::sleep(frame);
        }
    }

    fn read_inputs(&mut self) -> u32 {
        let mut t = self.started.elapsed().as_micros() as u64;
        if self.spin.jitter_us > 0 {
            let j = self.spin.jitter_us as i64;
            let noise = rand::thread_rng().gen_range(-j..=j);
            t = (t as i64 + noise).max(0) as u64;
        }
        if self.sync_level_at(t) {
            1 << self.sync_bit
        } else {
            0
        }
    }

    fn micros(&self) -> u32 {
        self.started.elapsed().as_micros() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_presents_back_buffer() {
        let mut panel = VirtualPanel::new(4, 4);
        panel.set_pixel(3, 2, Pixel::new(1, 2, 3));
        panel.set_pixel(10, 10, Pixel::new(9, 9, 9));
        assert!(panel.front_pixel(3, 2).is_black());
        panel.swap_on_vsync(1);
        assert_eq!(panel.front_pixel(3, 2), Pixel::new(1, 2, 3));
        assert_eq!(panel.swap_count(), 1);
    }

    #[test]
    fn test_sync_toggles_each_half_turn() {
        let panel = VirtualPanel::with_spin(
            1,
            1,
            SpinConfig {
                rpm: 600.0,
                ..SpinConfig::default()
            },
            2,
        );
        // 600 rpm -> 100 ms per turn, 50 ms per half.
        assert!(panel.sync_level_at(0));
        assert!(panel.sync_level_at(49_999));
        assert!(!panel.sync_level_at(50_000));
        assert!(panel.sync_level_at(100_000));
    }

    #[test]
    fn test_still_panel_reads_low() {
        let mut panel = VirtualPanel::new(1, 1);
        assert_eq!(panel.read_inputs(), 0);
    }
}
