// SYNOID Hologram Core Library
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Rotation-synchronised LED hologram viewer: a spinning panel is lit with
// the slice of the current volumetric frame that matches its angle.

pub mod anim;
pub mod config;
pub mod control;
pub mod display;
pub mod engine;
pub mod health;
pub mod pipeline;
pub mod state;
pub mod viewer;

pub use config::HologramConfig;
pub use viewer::Viewer;
