// SYNOID Hologram Remote Control
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod client;
pub mod command;
pub mod server;
pub mod signals;

pub use client::{send_command, CommandClient};
pub use command::{Command, ACK, MAX_REQUEST};
pub use server::CommandServer;
