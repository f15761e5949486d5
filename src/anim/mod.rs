// SYNOID Hologram Animation Modules
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod demo;
pub mod format;
pub mod renderable;
pub mod store;

pub use format::{AnimHeader, AnimWriter};
pub use renderable::{RenderableFrame, SliceStream};
pub use store::{Animation, AnimationStore};
