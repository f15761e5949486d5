// SYNOID Hologram Display Loop
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// The real-time consumer. Every iteration samples the sync line, works out
// which slice faces the viewer and streams it to the panel. Frames are
// pulled from the ready queue on a fixed wall-clock cadence; when none is
// ready the previous frame keeps spinning.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::producer::FramePacket;
use super::ready_queue::Consumer;
use crate::display::Panel;
use crate::engine::rotation::RotationEstimator;
use crate::engine::slice_mapper::SliceMapper;
use crate::health::PipelineStats;
use crate::state::ControlState;

#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Cadence at which the next frame is pulled from the queue.
    pub frame_interval: Duration,
    /// Passed through to `Panel::swap_on_vsync`.
    pub vsync_multiple: u32,
    /// Minimum time between GPIO reads. Zero reads on every iteration.
    pub poll_interval: Duration,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(100),
            vsync_multiple: 1,
            poll_interval: Duration::ZERO,
        }
    }
}

pub struct DisplayLoop<P: Panel> {
    panel: P,
    estimator: RotationEstimator,
    mapper: SliceMapper,
    queue: Consumer<FramePacket>,
    control: Arc<ControlState>,
    stats: Arc<PipelineStats>,
    config: DisplayConfig,
    current: Option<FramePacket>,
    last_pull: Option<Instant>,
    last_poll: Option<Instant>,
    sync_level: bool,
}

impl<P: Panel> DisplayLoop<P> {
    pub fn new(
        panel: P,
        estimator: RotationEstimator,
        slice_count: usize,
        queue: Consumer<FramePacket>,
        control: Arc<ControlState>,
        stats: Arc<PipelineStats>,
        config: DisplayConfig,
    ) -> Self {
        Self {
            panel,
            estimator,
            mapper: SliceMapper::new(slice_count),
            queue,
            control,
            stats,
            config,
            current: None,
            last_pull: None,
            last_poll: None,
            sync_level: false,
        }
    }

    /// Run until the interrupt flag drops, then give the panel back.
    pub fn run(mut self) -> P {
        info!("[DISPLAY] Display begin");
        while self.control.is_running() {
            self.iterate();
        }
        let dropped = self.queue.drain();
        info!("[DISPLAY] Display end ({} queued frames dropped)", dropped);
        self.panel
    }

    /// One pass of the loop. Returns the slice index that was shown.
    pub fn iterate(&mut self) -> usize {
        let now = Instant::now();
        let poll_due = self
            .last_poll
            .map_or(true, |t| now.duration_since(t) >= self.config.poll_interval);
        if poll_due {
            let inputs = self.panel.read_inputs();
            self.sync_level = self.estimator.sync_level_of(inputs);
            self.last_poll = Some(now);
        }

        let angle = self.estimator.update(self.panel.micros(), self.sync_level);
        self.stats
            .period_ticks
            .store(self.estimator.period(), Ordering::Relaxed);
        let index = self.mapper.advance(angle, self.control.take_nudge_unit());

        let forced = self.control.take_frame_advance();
        let pull_due = self
            .last_pull
            .map_or(true, |t| now.duration_since(t) >= self.config.frame_interval);
        if pull_due || forced {
            self.last_pull = Some(now);
            self.pull_frame();
        }

        self.render_slice(index);
        index
    }

    fn pull_frame(&mut self) {
        let (packet, discarded) = self.queue.pop_counting();
        if discarded > 0 {
            self.stats
                .stale_discarded
                .fetch_add(discarded as u64, Ordering::Relaxed);
        }
        match packet {
            Some(p) => {
                debug!("[DISPLAY] Showing '{}' frame {}", p.animation, p.index);
                self.current = Some(p);
                PipelineStats::bump(&self.stats.frames_shown);
            }
            None => PipelineStats::bump(&self.stats.empty_pulls),
        }
    }

    fn render_slice(&mut self, index: usize) {
        let Some(stream) = self.current.as_ref().and_then(|p| p.frame.slice(index)) else {
            thread::yield_now();
            return;
        };
        let mut reader = stream.reader();
        while self.control.is_running() {
            let Some(hold_us) = reader.play_next(&mut self.panel) else {
                break;
            };
            self.panel.swap_on_vsync(self.config.vsync_multiple);
            if hold_us > 0 {
                thread::sleep(Duration::from_micros(hold_us as u64));
            }
        }
        reader.rewind();
        PipelineStats::bump(&self.stats.slices_rendered);
    }

    pub fn current(&self) -> Option<&FramePacket> {
        self.current.as_ref()
    }

    pub fn cursor(&self) -> usize {
        self.mapper.cursor()
    }

    pub fn estimator(&self) -> &RotationEstimator {
        &self.estimator
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }
}
