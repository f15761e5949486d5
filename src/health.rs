// SYNOID Hologram Health Check & Watchdog
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Pipeline counters bumped from the real-time threads and a heartbeat
// task that periodically summarises them.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::state::ControlState;

/// Counters shared by producer, consumer and command handler.
#[derive(Default)]
pub struct PipelineStats {
    pub frames_produced: AtomicU64,
    pub frames_shown: AtomicU64,
    pub stale_discarded: AtomicU64,
    pub queue_full_backoffs: AtomicU64,
    pub empty_pulls: AtomicU64,
    pub slices_rendered: AtomicU64,
    pub decode_failures: AtomicU64,
    pub switches: AtomicU64,
    pub commands: AtomicU64,
    pub period_ticks: AtomicU32,
}

impl PipelineStats {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_produced: self.frames_produced.load(Ordering::Relaxed),
            frames_shown: self.frames_shown.load(Ordering::Relaxed),
            stale_discarded: self.stale_discarded.load(Ordering::Relaxed),
            queue_full_backoffs: self.queue_full_backoffs.load(Ordering::Relaxed),
            empty_pulls: self.empty_pulls.load(Ordering::Relaxed),
            slices_rendered: self.slices_rendered.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            switches: self.switches.load(Ordering::Relaxed),
            commands: self.commands.load(Ordering::Relaxed),
            period_ticks: self.period_ticks.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub frames_produced: u64,
    pub frames_shown: u64,
    pub stale_discarded: u64,
    pub queue_full_backoffs: u64,
    pub empty_pulls: u64,
    pub slices_rendered: u64,
    pub decode_failures: u64,
    pub switches: u64,
    pub commands: u64,
    pub period_ticks: u32,
}

impl StatsSnapshot {
    /// Rotation speed implied by the filtered period (ticks are microseconds).
    pub fn rpm(&self) -> f64 {
        if self.period_ticks == 0 {
            0.0
        } else {
            60_000_000.0 / self.period_ticks as f64
        }
    }
}

pub struct HealthMonitor {
    start_time: Instant,
    is_running: Arc<AtomicBool>,
    heartbeat_count: Arc<AtomicU64>,
    check_interval: Duration,
    stats: Arc<PipelineStats>,
}

impl HealthMonitor {
    pub fn new(check_interval: Duration, stats: Arc<PipelineStats>) -> Self {
        Self {
            start_time: Instant::now(),
            is_running: Arc::new(AtomicBool::new(false)),
            heartbeat_count: Arc::new(AtomicU64::new(0)),
            check_interval,
            stats,
        }
    }

    /// Seconds since the monitor was created.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn heartbeat_count(&self) -> u64 {
        self.heartbeat_count.load(Ordering::Relaxed)
    }

    /// Spawn the heartbeat on the current tokio runtime. It exits when
    /// either `stop` is called or the control state stops running.
    pub fn start(&self, control: Arc<ControlState>) {
        let is_running = self.is_running.clone();
        let heartbeat_count = self.heartbeat_count.clone();
        let stats = self.stats.clone();
        let interval = self.check_interval;
        is_running.store(true, Ordering::Relaxed);

        tokio::spawn(async move {
            info!("[HEALTH] Watchdog started (interval: {:?})", interval);
            let mut prev = stats.snapshot();
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;

            while is_running.load(Ordering::Relaxed) && control.is_running() {
                ticker.tick().await;
                let count = heartbeat_count.fetch_add(1, Ordering::Relaxed) + 1;
                let now = stats.snapshot();

                let shown = now.frames_shown - prev.frames_shown;
                let produced = now.frames_produced - prev.frames_produced;
                if produced == 0 && now.frames_produced > 0 {
                    warn!("[HEALTH] Producer stalled (heartbeat #{})", count);
                }
                if now.decode_failures > prev.decode_failures {
                    warn!(
                        "[HEALTH] {} decode failures since last heartbeat",
                        now.decode_failures - prev.decode_failures
                    );
                }
                info!(
                    "[HEALTH] ♥ #{} | produced +{} | shown +{} | slices +{} | {:.0} rpm",
                    count,
                    produced,
                    shown,
                    now.slices_rendered - prev.slices_rendered,
                    now.rpm()
                );
                prev = now;
            }
            info!("[HEALTH] Watchdog stopped.");
        });
    }

    pub fn stop(&self) {
        self.is_running.store(false, Ordering::Relaxed);
    }

    pub fn status_report(&self) -> String {
        let uptime = self.uptime_secs();
        let s = self.stats.snapshot();
        format!(
            "Hologram Health Report\n  Uptime: {}h {}m {}s\n  Heartbeats: {}\n  Frames produced/shown: {}/{}\n  Stale frames discarded: {}\n  Slices rendered: {}\n  Decode failures: {}\n  Switches: {}\n  Commands: {}",
            uptime / 3600,
            (uptime % 3600) / 60,
            uptime % 60,
            self.heartbeat_count(),
            s.frames_produced,
            s.frames_shown,
            s.stale_discarded,
            s.slices_rendered,
            s.decode_failures,
            s.switches,
            s.commands,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpm_from_period() {
        let snap = StatsSnapshot {
            period_ticks: 100_000,
            ..StatsSnapshot::default()
        };
        assert!((snap.rpm() - 600.0).abs() < 1e-9);
        assert_eq!(StatsSnapshot::default().rpm(), 0.0);
    }

    #[test]
    fn test_report_reflects_counters() {
        let stats = Arc::new(PipelineStats::default());
        PipelineStats::bump(&stats.frames_produced);
        PipelineStats::bump(&stats.frames_produced);
        PipelineStats::bump(&stats.switches);
        let monitor = HealthMonitor::new(Duration::from_secs(30), stats);
        let report = monitor.status_report();
        assert!(report.contains("Frames produced/shown: 2/0"));
        assert!(report.contains("Switches: 1"));
    }
}
