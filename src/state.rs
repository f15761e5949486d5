// SYNOID Hologram Control State
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Flags shared between the display loop, the producer and the command
// handler. Animation names do not live here: they travel by value over a
// switch channel so no thread ever reads a buffer another one owns.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

pub struct ControlState {
    running: AtomicBool,
    nudge: AtomicI32,
    frame_advance: AtomicBool,
    nudge_step: i32,
}

impl ControlState {
    pub fn new(nudge_step: i32) -> Self {
        Self {
            running: AtomicBool::new(true),
            nudge: AtomicI32::new(0),
            frame_advance: AtomicBool::new(false),
            nudge_step,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Universal stop condition. Safe to call from a signal task.
    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn nudge_step(&self) -> i32 {
        self.nudge_step
    }

    pub fn nudge_left(&self) {
        self.nudge.fetch_sub(self.nudge_step, Ordering::Relaxed);
    }

    pub fn nudge_right(&self) {
        self.nudge.fetch_add(self.nudge_step, Ordering::Relaxed);
    }

    pub fn pending_nudge(&self) -> i32 {
        self.nudge.load(Ordering::Relaxed)
    }

    /// Consume one unit of the nudge accumulator, moving it toward zero.
    /// Returns the direction consumed (-1, 0 or +1).
    pub fn take_nudge_unit(&self) -> i32 {
        match self
            .nudge
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                if n == 0 {
                    None
                } else {
                    Some(n - n.signum())
                }
            }) {
            Ok(prev) => prev.signum(),
            Err(_) => 0,
        }
    }

    pub fn request_frame_advance(&self) {
        self.frame_advance.store(true, Ordering::Release);
    }

    pub fn take_frame_advance(&self) -> bool {
        self.frame_advance.swap(false, Ordering::AcqRel)
    }
}

/// Sending half of the animation-switch hand-off.
pub type SwitchSender = Sender<String>;
/// Receiving half, owned by the producer.
pub type SwitchReceiver = Receiver<String>;

pub fn switch_channel() -> (SwitchSender, SwitchReceiver) {
    mpsc::channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nudge_drains_one_unit_at_a_time() {
        let state = ControlState::new(2);
        state.nudge_right();
        assert_eq!(state.pending_nudge(), 2);
        assert_eq!(state.take_nudge_unit(), 1);
        assert_eq!(state.take_nudge_unit(), 1);
        assert_eq!(state.take_nudge_unit(), 0);

        state.nudge_left();
        state.nudge_left();
        assert_eq!(state.pending_nudge(), -4);
        assert_eq!(state.take_nudge_unit(), -1);
        assert_eq!(state.pending_nudge(), -3);
    }

    #[test]
    fn test_frame_advance_is_one_shot() {
        let state = ControlState::new(1);
        assert!(!state.take_frame_advance());
        state.request_frame_advance();
        assert!(state.take_frame_advance());
        assert!(!state.take_frame_advance());
    }

    #[test]
    fn test_shutdown_flag() {
        let state = ControlState::new(1);
        assert!(state.is_running());
        state.request_shutdown();
        assert!(!state.is_running());
    }
}
