// SYNOID Hologram Command Grammar
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// `.l` / `.r` nudge the rotation offset, `.n` forces the next frame,
// anything else not starting with `.` names an animation to switch to.

use tracing::{info, warn};

use crate::state::{ControlState, SwitchSender};

/// Fixed acknowledgement sent for every request.
pub const ACK: &[u8; 2] = b"OK";

/// Longest request line accepted, newline excluded.
pub const MAX_REQUEST: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    NudgeLeft,
    NudgeRight,
    NextFrame,
    Switch(String),
    /// A `.` directive nobody understands.
    UnknownDirective(String),
    Empty,
}

impl Command {
    pub fn parse(raw: &str) -> Self {
        let msg = raw.trim_matches(|c: char| c.is_whitespace() || c == '\0');
        if msg.is_empty() {
            return Command::Empty;
        }
        if msg.starts_with('.') {
            return match msg {
                ".l" => Command::NudgeLeft,
                ".r" => Command::NudgeRight,
                ".n" => Command::NextFrame,
                other => Command::UnknownDirective(other.to_string()),
            };
        }
        Command::Switch(msg.to_string())
    }

    /// Apply to the shared state. Never blocks.
    pub fn apply(self, control: &ControlState, switches: &SwitchSender) {
        match self {
            Command::NudgeLeft => control.nudge_left(),
            Command::NudgeRight => control.nudge_right(),
            Command::NextFrame => control.request_frame_advance(),
            Command::Switch(name) => {
                info!("[COMMAND] Switch requested: '{}'", name);
                if switches.send(name).is_err() {
                    warn!("[COMMAND] Producer is gone, switch dropped");
                }
            }
            Command::UnknownDirective(d) => warn!("[COMMAND] Ignoring unknown directive '{}'", d),
            Command::Empty => {}
        }
    }
}
