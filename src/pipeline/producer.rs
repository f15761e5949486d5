// SYNOID Hologram Frame Producer
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Background worker that keeps the ready queue topped up with decoded
// frames of the active animation and handles animation switches.

use anyhow::{bail, Context, Result};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::ready_queue::Producer;
use crate::anim::{AnimationStore, RenderableFrame};
use crate::health::PipelineStats;
use crate::state::{ControlState, SwitchReceiver};

/// A decoded frame tagged with where it came from.
#[derive(Debug, Clone)]
pub struct FramePacket {
    pub animation: Arc<str>,
    pub index: u32,
    pub frame: RenderableFrame,
}

#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Sleep between retries while the queue is full or after a failure.
    pub backoff: Duration,
    /// Hold time written into every slice record.
    pub hold_us: u32,
    /// Threads used to encode the slices of one frame.
    pub decode_threads: usize,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            backoff: Duration::from_micros(500),
            hold_us: 0,
            decode_threads: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProduceOutcome {
    Produced { index: u32 },
    QueueFull,
    DecodeFailed,
}

pub struct FrameProducer {
    store: AnimationStore,
    active: Arc<str>,
    queue: Producer<FramePacket>,
    switches: SwitchReceiver,
    control: Arc<ControlState>,
    stats: Arc<PipelineStats>,
    pool: rayon::ThreadPool,
    config: ProducerConfig,
    buf: Vec<u8>,
}

impl FrameProducer {
    /// Start on `start`, or on the first animation by name if `start` is
    /// not in the catalog.
    pub fn new(
        mut store: AnimationStore,
        start: &str,
        queue: Producer<FramePacket>,
        switches: SwitchReceiver,
        control: Arc<ControlState>,
        stats: Arc<PipelineStats>,
        config: ProducerConfig,
    ) -> Result<Self> {
        let active: Arc<str> = if store.contains(start) {
            Arc::from(start)
        } else {
            let Some(first) = store.names().into_iter().next() else {
                bail!("no animations found in {:?}", store.dir());
            };
            warn!("[PRODUCER] Start animation '{}' not found, using '{}'", start, first);
            Arc::from(first.as_str())
        };
        if let Some(anim) = store.get_mut(&active) {
            anim.rewind()?;
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.decode_threads.max(1))
            .thread_name(|i| format!("hologram-decode-{}", i))
            .build()
            .context("build decode pool")?;

        Ok(Self {
            store,
            active,
            queue,
            switches,
            control,
            stats,
            pool,
            config,
            buf: Vec::new(),
        })
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn store(&self) -> &AnimationStore {
        &self.store
    }

    /// Produce until shutdown, then hand the store back for closing.
    pub fn run(mut self) -> AnimationStore {
        info!("[PRODUCER] Started on '{}'", self.active);
        while self.control.is_running() {
            match self.poll_once() {
                ProduceOutcome::Produced { .. } => {}
                ProduceOutcome::QueueFull | ProduceOutcome::DecodeFailed => {
                    if self.config.backoff.is_zero() {
                        thread::yield_now();
                    } else {
                        thread::sleep(self.config.backoff);
                    }
                }
            }
        }
        info!("[PRODUCER] Stopped.");
        self.store
    }

    /// One producer iteration: honour a pending switch, then decode and
    /// push one frame unless the queue is full.
    pub fn poll_once(&mut self) -> ProduceOutcome {
        self.apply_pending_switch();

        if self.queue.is_full() {
            PipelineStats::bump(&self.stats.queue_full_backoffs);
            return ProduceOutcome::QueueFull;
        }

        let geometry = self.store.geometry();
        let Some(anim) = self.store.get_mut(&self.active) else {
            PipelineStats::bump(&self.stats.decode_failures);
            return ProduceOutcome::DecodeFailed;
        };
        let index = match anim.read_frame(&mut self.buf) {
            Ok(i) => i,
            Err(e) => {
                PipelineStats::bump(&self.stats.decode_failures);
                warn!("[PRODUCER] Decode failed, rewinding '{}': {:#}", self.active, e);
                if let Err(e) = anim.rewind() {
                    warn!("[PRODUCER] Rewind failed: {:#}", e);
                }
                return ProduceOutcome::DecodeFailed;
            }
        };

        let hold_us = self.config.hold_us;
        let raw = &self.buf;
        let frame = self
            .pool
            .install(|| RenderableFrame::from_raw(&geometry, raw, hold_us));

        let packet = FramePacket {
            animation: self.active.clone(),
            index,
            frame,
        };
        if self.queue.push(packet).is_err() {
            // Only this thread fills the queue, so the check above holds.
            debug!("[PRODUCER] Queue filled up unexpectedly, frame {} dropped", index);
            return ProduceOutcome::QueueFull;
        }
        PipelineStats::bump(&self.stats.frames_produced);
        ProduceOutcome::Produced { index }
    }

    /// Drain the switch channel; only the newest request counts.
    fn apply_pending_switch(&mut self) {
        let mut latest = None;
        while let Ok(name) = self.switches.try_recv() {
            latest = Some(name);
        }
        if let Some(name) = latest {
            self.switch_to(&name);
        }
    }

    /// Make `name` active from its first frame and flush queued frames.
    /// Unknown names are ignored after one catalog refresh.
    pub fn switch_to(&mut self, name: &str) -> bool {
        match self.store.resolve(name) {
            Ok(true) => {}
            Ok(false) => {
                warn!("[PRODUCER] Unknown animation '{}', staying on '{}'", name, self.active);
                return false;
            }
            Err(e) => {
                warn!("[PRODUCER] Catalog refresh failed: {:#}", e);
                return false;
            }
        }
        let Some(anim) = self.store.get_mut(name) else {
            return false;
        };
        if let Err(e) = anim.rewind() {
            warn!("[PRODUCER] Cannot rewind '{}': {:#}", name, e);
            return false;
        }

        self.active = Arc::from(name);
        self.queue.clear();
        PipelineStats::bump(&self.stats.switches);
        info!("[PRODUCER] Switched to '{}'", name);
        true
    }
}
