// SYNOID Hologram Main Entry Point
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use hologram_core::anim::demo::write_test_pattern;
use hologram_core::anim::AnimationStore;
use hologram_core::control::send_command;
use hologram_core::display::VirtualPanel;
use hologram_core::{HologramConfig, Viewer};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "hologram-core")]
#[command(about = "SYNOID Rotational Hologram Viewer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the viewer on the virtual spinning panel
    Run {
        /// JSON config file (falls back to $HOLOGRAM_CONFIG)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding .anim files
        #[arg(short, long)]
        anim_dir: Option<PathBuf>,

        /// Command endpoint, e.g. 0.0.0.0:5555
        #[arg(short, long)]
        bind: Option<String>,

        /// Slices moved per nudge command
        #[arg(short = 'r', long)]
        nudge_step: Option<i32>,

        /// Animation to start on
        #[arg(short, long)]
        start: Option<String>,

        /// Simulated rotor speed
        #[arg(long)]
        rpm: Option<f64>,
    },

    /// Send one command to a running viewer
    Send {
        #[arg(short, long, default_value = "127.0.0.1:5555")]
        addr: String,

        /// ".l", ".r", ".n" or an animation name
        message: String,

        /// Connect/reply timeout in seconds
        #[arg(long, default_value = "5")]
        timeout: u64,
    },

    /// List the animations a viewer would load
    List {
        #[arg(short, long)]
        anim_dir: Option<PathBuf>,
    },

    /// Write a synthetic test pattern animation
    Demo {
        #[arg(short, long, default_value = "anims/idle.anim")]
        output: PathBuf,

        #[arg(short, long, default_value = "20")]
        frames: u32,

        #[arg(short, long, default_value = "0")]
        loop_start: u32,
    },
}

fn main() -> Result<()> {
    dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    // Global panic handler: log panics instead of crashing silently
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("🚨 [HOLOGRAM PANIC] at {}: {}", location, message);
    }));

    let args = Cli::parse();

    match args.command {
        Commands::Run {
            config,
            anim_dir,
            bind,
            nudge_step,
            start,
            rpm,
        } => {
            let mut cfg = HologramConfig::load(config.as_deref())?;
            if let Some(dir) = anim_dir {
                cfg.anim_dir = dir;
            }
            if let Some(addr) = bind {
                cfg.bind_addr = addr;
            }
            if let Some(step) = nudge_step {
                cfg.nudge_step = step;
            }
            if let Some(name) = start {
                cfg.start_animation = name;
            }
            if let Some(rpm) = rpm {
                cfg.spin.rpm = rpm;
            }

            info!("--- SYNOID HOLOGRAM VIEWER v{} ---", env!("CARGO_PKG_VERSION"));
            let panel = VirtualPanel::with_spin(
                cfg.geometry.cols,
                cfg.geometry.rows,
                cfg.spin.clone(),
                cfg.rotation.sync_bit,
            );
            let viewer = match Viewer::start(cfg, true) {
                Ok(v) => v,
                Err(e) => {
                    error!("❌ Viewer failed to start: {:#}", e);
                    return Err(e);
                }
            };
            info!("📡 Commands on {}", viewer.command_addr());
            let panel = viewer.display(panel)?;
            info!("✅ Display stopped after {} swaps", panel.swap_count());
        }

        Commands::Send {
            addr,
            message,
            timeout,
        } => {
            let rt = tokio::runtime::Runtime::new().context("build runtime")?;
            let reply = rt.block_on(send_command(&addr, &message, Duration::from_secs(timeout)))?;
            println!("{}", reply);
        }

        Commands::List { anim_dir } => {
            let mut cfg = HologramConfig::load(None)?;
            if let Some(dir) = anim_dir {
                cfg.anim_dir = dir;
            }
            let store = AnimationStore::open(&cfg.anim_dir, cfg.geometry)?;
            if store.is_empty() {
                println!("No .anim files in {:?}", cfg.anim_dir);
            }
            for (name, anim) in store.list() {
                println!(
                    "{:<24} {:>5} frames  loop@{}",
                    name,
                    anim.frame_count(),
                    anim.loop_start()
                );
            }
        }

        Commands::Demo {
            output,
            frames,
            loop_start,
        } => {
            let cfg = HologramConfig::load(None)?;
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("create {:?}", parent))?;
                }
            }
            write_test_pattern(&output, cfg.geometry, frames.max(1), loop_start)?;
        }
    }

    Ok(())
}
