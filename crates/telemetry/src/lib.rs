//! Telemetry Subscription
//!
//! Decoded messages published by the driving stack and a subscription store
//! that keeps the latest value of every topic together with its freshness.

mod error;
pub mod messages;
mod source;
mod sub_master;

pub use error::TelemetryError;
pub use messages::{Message, Topic};
pub use source::{decode_line, forward_ndjson, ChannelSource, TelemetrySource};
pub use sub_master::{Slot, SubMaster};

/// UI update frequency (Hz) when offroad; also the unit of frame-based timeouts
pub const UI_FREQ: u64 = 20;
