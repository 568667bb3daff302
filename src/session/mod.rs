//! Session module - guided workout execution
//!
//! - `engine`: the phase state machine, snapshotting and history finalize
//! - `timer`: one-second countdowns and pluggable tick sources

pub mod engine;
pub mod timer;

pub use engine::{Blocked, Phase, SessionEngine, SessionEvent, resolve_target};
pub use timer::{Countdown, ManualTicks, TickSource, WallTicks};
