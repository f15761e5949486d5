// SYNOID Hologram Frame Pipeline
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Producer thread -> ready queue -> real-time display loop.

pub mod consumer;
pub mod producer;
pub mod ready_queue;

pub use consumer::{DisplayConfig, DisplayLoop};
pub use producer::{FramePacket, FrameProducer, ProduceOutcome, ProducerConfig};
pub use ready_queue::{ready_queue, ready_queue_with_slots, Consumer, Producer};
