// SYNOID Hologram Rotation Estimator
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Turns sync-line edges into a continuously advancing angular position.
// Angles are fixed-point: one full turn is `1 << ROTATION_PRECISION`.

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const ROTATION_PRECISION: u32 = 30;
pub const ROTATION_FULL: u32 = 1 << ROTATION_PRECISION;
pub const ROTATION_MASK: u32 = ROTATION_FULL - 1;

/// Number of measured periods kept for the median filter.
pub const ROTATION_HISTORY: usize = 8;

/// Tuning for the sync-edge estimator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RotationConfig {
    /// Bit of the GPIO input word carrying the sync line.
    pub sync_bit: u8,
    /// Measure on falling edges (`true`) or rising edges (`false`).
    pub falling_edge: bool,
    /// Edges closer than this many ticks to the previous one are retriggers.
    pub debounce_ticks: u32,
    /// Period assumed before any edge has been measured.
    pub default_period: u32,
    /// Lower clamp applied to the filtered period before dividing.
    pub min_period: u32,
    /// Calibration offset of the zero point, in degrees.
    pub zero_degrees: u32,
    /// Slow zero-point drift, in angle units per tick. Zero disables it.
    pub drift: i32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            sync_bit: 2,
            falling_edge: true,
            debounce_ticks: 10_000,
            default_period: 1 << 26,
            min_period: 1_000,
            zero_degrees: 286,
            drift: 0,
        }
    }
}

impl RotationConfig {
    pub fn zero_bias(&self) -> u32 {
        ((ROTATION_FULL / 360) as u64 * self.zero_degrees as u64) as u32 & ROTATION_MASK
    }
}

/// Median of the history window: sort a copy and average the middle pair.
pub fn median_period(history: &[u32; ROTATION_HISTORY]) -> u32 {
    let mut sorted = *history;
    sorted.sort_unstable();
    let mid = ROTATION_HISTORY / 2;
    ((sorted[mid - 1] as u64 + sorted[mid] as u64) / 2) as u32
}

pub struct RotationEstimator {
    config: RotationConfig,
    angle: u32,
    zero: u32,
    delta: u32,
    period: u32,
    history: [u32; ROTATION_HISTORY],
    history_pos: usize,
    sync_level: bool,
    last_edge: u32,
    last_tick: Option<u32>,
    edges: u64,
}

impl RotationEstimator {
    pub fn new(config: RotationConfig) -> Self {
        let period = config.default_period.max(config.min_period).max(1);
        Self {
            zero: config.zero_bias(),
            angle: 0,
            delta: ROTATION_FULL / period,
            period,
            history: [period; ROTATION_HISTORY],
            history_pos: 0,
            // Idle level is the opposite of the measured edge.
            sync_level: config.falling_edge,
            last_edge: 0,
            last_tick: None,
            edges: 0,
            config,
        }
    }

    /// Extract the sync level from a raw GPIO input word.
    pub fn sync_level_of(&self, inputs: u32) -> bool {
        (inputs >> self.config.sync_bit) & 1 == 1
    }

    /// Advance the estimate to `now` (a wrapping tick counter) given the
    /// current sync level, returning the calibrated angle.
    pub fn update(&mut self, now: u32, level: bool) -> u32 {
        let since_edge = now.wrapping_sub(self.last_edge);

        if level != self.sync_level {
            self.sync_level = level;
            let active = if self.config.falling_edge { !level } else { level };
            if active {
                self.last_edge = now;
                if since_edge > self.config.debounce_ticks {
                    self.record_period(since_edge);
                }
            }
        }

        let dtick = match self.last_tick {
            Some(prev) => now.wrapping_sub(prev),
            None => 0,
        };
        self.last_tick = Some(now);

        self.angle = self.angle.wrapping_add(dtick.wrapping_mul(self.delta)) & ROTATION_MASK;
        self.zero = self
            .zero
            .wrapping_add(ROTATION_FULL)
            .wrapping_add(dtick.wrapping_mul(self.config.drift as u32))
            & ROTATION_MASK;

        self.angle()
    }

    fn record_period(&mut self, elapsed: u32) {
        self.history_pos = (self.history_pos + 1) % ROTATION_HISTORY;
        self.history[self.history_pos] = elapsed;
        self.period = median_period(&self.history).max(self.config.min_period).max(1);
        self.delta = ROTATION_FULL / self.period;
        self.edges += 1;
        debug!(
            "[ROTATION] edge #{} elapsed={} period={} delta={}",
            self.edges, elapsed, self.period, self.delta
        );
    }

    /// Calibrated angle without advancing time.
    pub fn angle(&self) -> u32 {
        self.angle.wrapping_add(self.zero) & ROTATION_MASK
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn delta(&self) -> u32 {
        self.delta
    }

    pub fn edges(&self) -> u64 {
        self.edges
    }

    pub fn history(&self) -> &[u32; ROTATION_HISTORY] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;

    fn no_bias() -> RotationConfig {
        RotationConfig {
            zero_degrees: 0,
            ..RotationConfig::default()
        }
    }

    /// Drive one falling edge at `t`.
    fn pulse(est: &mut RotationEstimator, t: u32) {
        est.update(t.wrapping_sub(100), true);
        est.update(t, false);
    }

    #[test]
    fn test_median_is_middle_pair_average() {
        let h = [9, 1, 8, 2, 7, 3, 6, 4];
        // sorted: 1 2 3 4 6 7 8 9 -> (4 + 6) / 2
        assert_eq!(median_period(&h), 5);
    }

    #[test]
    fn test_median_ignores_insertion_order() {
        let base = [40_000, 41_000, 39_500, 400_000, 40_200, 12_000, 40_100, 39_900];
        let expected = median_period(&base);
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let mut shuffled = base;
            shuffled.shuffle(&mut rng);
            assert_eq!(median_period(&shuffled), expected);
        }
        assert_eq!(expected, (40_000 + 40_100) / 2);
    }

    #[test]
    fn test_median_does_not_overflow() {
        let h = [u32::MAX; ROTATION_HISTORY];
        assert_eq!(median_period(&h), u32::MAX);
    }

    #[test]
    fn test_starts_at_zero_bias_with_default_period() {
        let cfg = RotationConfig::default();
        let bias = cfg.zero_bias();
        let mut est = RotationEstimator::new(cfg.clone());
        assert_eq!(est.update(5_000, true), bias);
        assert_eq!(est.period(), cfg.default_period);
        assert_eq!(est.delta(), ROTATION_FULL / cfg.default_period);
    }

    #[test]
    fn test_locks_onto_steady_period() {
        let mut est = RotationEstimator::new(no_bias());
        let period = 50_000u32;
        let mut t = 1_000u32;
        for _ in 0..ROTATION_HISTORY + 1 {
            t += period;
            pulse(&mut est, t);
        }
        assert_eq!(est.period(), period);
        assert_eq!(est.delta(), ROTATION_FULL / period);

        // A quarter period later the angle advanced by a quarter turn.
        let before = est.update(t, true);
        let after = est.update(t + period / 4, true);
        let advanced = after.wrapping_sub(before) & ROTATION_MASK;
        let quarter = ROTATION_FULL / 4;
        assert!(advanced.abs_diff(quarter) < ROTATION_FULL / 1000);
    }

    #[test]
    fn test_debounce_rejects_retrigger() {
        let mut est = RotationEstimator::new(no_bias());
        let mut t = 0u32;
        for _ in 0..ROTATION_HISTORY {
            t += 50_000;
            pulse(&mut est, t);
        }
        let edges = est.edges();
        // Spurious edge 5000 ticks later is below the 10000 floor.
        pulse(&mut est, t + 5_000);
        assert_eq!(est.edges(), edges);
        assert_eq!(est.period(), 50_000);
    }

    #[test]
    fn test_single_outlier_is_filtered() {
        let mut est = RotationEstimator::new(no_bias());
        let mut t = 0u32;
        for _ in 0..ROTATION_HISTORY {
            t += 60_000;
            pulse(&mut est, t);
        }
        t += 600_000;
        pulse(&mut est, t);
        assert_eq!(est.period(), 60_000);
    }

    #[test]
    fn test_period_clamped_before_divide() {
        let cfg = RotationConfig {
            debounce_ticks: 0,
            min_period: 2_000,
            default_period: 0,
            ..no_bias()
        };
        let mut est = RotationEstimator::new(cfg);
        assert_eq!(est.period(), 2_000);
        for i in 1..20u32 {
            pulse(&mut est, i * 150);
        }
        assert!(est.period() >= 2_000);
        assert_eq!(est.delta(), ROTATION_FULL / est.period());
    }

    #[test]
    fn test_tick_counter_wraparound() {
        let mut est = RotationEstimator::new(no_bias());
        let period = 40_000u32;
        let mut t = u32::MAX - 3 * period;
        for _ in 0..ROTATION_HISTORY + 2 {
            t = t.wrapping_add(period);
            pulse(&mut est, t);
        }
        assert_eq!(est.period(), period);
    }

    #[test]
    fn test_rising_edge_polarity() {
        let cfg = RotationConfig {
            falling_edge: false,
            ..no_bias()
        };
        let mut est = RotationEstimator::new(cfg);
        let mut t = 0u32;
        for _ in 0..ROTATION_HISTORY {
            t += 30_000;
            est.update(t - 100, false);
            est.update(t, true);
        }
        assert_eq!(est.period(), 30_000);
    }

    #[test]
    fn test_sync_bit_extraction() {
        let est = RotationEstimator::new(RotationConfig::default());
        assert!(est.sync_level_of(0b100));
        assert!(!est.sync_level_of(0b011));
    }

    #[test]
    fn test_drift_moves_zero_point() {
        let cfg = RotationConfig {
            drift: 3,
            ..no_bias()
        };
        let mut est = RotationEstimator::new(cfg);
        est.update(0, true);
        let a0 = est.angle();
        let a1 = est.update(1_000, true);
        let expected = (a0 as u64 + 1_000 * est.delta() as u64 + 3_000) as u32 & ROTATION_MASK;
        assert_eq!(a1, expected);
    }
}
