// SYNOID Hologram Viewer — Orchestrator
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Owns every component for one display: loads the catalog, binds the
// command endpoint, spawns the producer and control threads, runs the
// display loop on the calling thread and tears everything down in order.

use anyhow::{anyhow, bail, Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{info, warn};

use crate::anim::AnimationStore;
use crate::config::HologramConfig;
use crate::control::signals::install_signal_handler;
use crate::control::CommandServer;
use crate::display::Panel;
use crate::engine::rotation::RotationEstimator;
use crate::health::{HealthMonitor, PipelineStats};
use crate::pipeline::{ready_queue_with_slots, Consumer, DisplayLoop, FramePacket, FrameProducer};
use crate::state::{switch_channel, ControlState};

pub struct Viewer {
    config: HologramConfig,
    control: Arc<ControlState>,
    stats: Arc<PipelineStats>,
    health: HealthMonitor,
    queue: Consumer<FramePacket>,
    command_addr: SocketAddr,
    producer: JoinHandle<AnimationStore>,
    control_thread: JoinHandle<Result<()>>,
}

impl Viewer {
    /// Load animations and start the background threads. Fails if the
    /// animation directory is missing or empty, or the endpoint cannot bind.
    pub fn start(config: HologramConfig, handle_signals: bool) -> Result<Self> {
        config.validate()?;

        let started = Instant::now();
        info!("[VIEWER] Loading animations from {:?}...", config.anim_dir);
        let store = AnimationStore::open(&config.anim_dir, config.geometry)?;
        if store.is_empty() {
            bail!("No .anim files found in {:?}", config.anim_dir);
        }
        info!(
            "[VIEWER] Loading {} .anim files took {:.3}s",
            store.len(),
            started.elapsed().as_secs_f64()
        );

        let control = Arc::new(ControlState::new(config.nudge_step));
        let stats = Arc::new(PipelineStats::default());
        let (switch_tx, switch_rx) = switch_channel();
        let (queue_tx, queue_rx) = ready_queue_with_slots(config.queue_slots);

        let producer = FrameProducer::new(
            store,
            &config.start_animation,
            queue_tx,
            switch_rx,
            control.clone(),
            stats.clone(),
            config.producer(),
        )?;

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("build control runtime")?;
        let health = HealthMonitor::new(config.heartbeat(), stats.clone());
        let server = rt.block_on(async {
            if handle_signals {
                install_signal_handler(control.clone());
            }
            health.start(control.clone());
            CommandServer::bind(
                &config.bind_addr,
                control.clone(),
                switch_tx,
                stats.clone(),
                config.command_poll(),
            )
            .await
        })?;
        let command_addr = server.local_addr()?;

        let control_thread = thread::Builder::new()
            .name("hologram-control".into())
            .spawn(move || rt.block_on(server.serve()))
            .context("spawn control thread")?;
        let producer = thread::Builder::new()
            .name("hologram-producer".into())
            .spawn(move || producer.run())
            .context("spawn producer thread")?;

        Ok(Self {
            config,
            control,
            stats,
            health,
            queue: queue_rx,
            command_addr,
            producer,
            control_thread,
        })
    }

    pub fn command_addr(&self) -> SocketAddr {
        self.command_addr
    }

    pub fn control(&self) -> Arc<ControlState> {
        self.control.clone()
    }

    pub fn stats(&self) -> Arc<PipelineStats> {
        self.stats.clone()
    }

    /// Run the display loop on this thread until shutdown, then join the
    /// background threads and close every animation.
    pub fn display<P: Panel>(self, panel: P) -> Result<P> {
        let Viewer {
            config,
            control,
            stats,
            health,
            queue,
            producer,
            control_thread,
            ..
        } = self;

        let display = DisplayLoop::new(
            panel,
            RotationEstimator::new(config.rotation.clone()),
            config.geometry.slice_count,
            queue,
            control.clone(),
            stats,
            config.display(),
        );
        let panel = display.run();

        control.request_shutdown();
        let mut store = producer
            .join()
            .map_err(|_| anyhow!("producer thread panicked"))?;
        let closed = store.close();
        info!("[VIEWER] Closed {} animations", closed);

        match control_thread.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("[VIEWER] Command server failed: {:#}", e),
            Err(_) => warn!("[VIEWER] Control thread panicked"),
        }
        health.stop();
        info!("{}", health.status_report());
        Ok(panel)
    }
}
