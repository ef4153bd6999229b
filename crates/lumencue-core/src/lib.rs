//! Lumencue Core - Cue Scheduling and Lighting Instruments
//!
//! This crate contains everything that does not touch a socket:
//! - Fixed-point HSV/RGB color engine
//! - Cue parsing and the deadline-ordered action queue
//! - Instrument abstraction and the three built-in instruments
//! - The single-threaded dispatch loop
//! - Configuration and logging settings
//!
//! Network output goes through the [`DatagramSink`] and [`PixelSink`] traits,
//! implemented in `lumencue-control`.

#![warn(missing_docs)]

pub mod clock;
pub mod codec;
pub mod color;
pub mod config;
pub mod cue;
pub mod engine;
pub mod error;
pub mod instrument;
pub mod logging;
pub mod scheduler;
pub mod sink;

// --- Re-exports grouped by category ---

// Color
pub use color::{hsv_to_rgb, rgb_to_hsv, Rgb, HUEDEGREE, HUE_CIRCLE, HUE_UNDEFINED};

// Scheduling
pub use clock::{seconds_to_nanos, Clock, ManualClock, SystemClock};
pub use cue::Action;
pub use engine::{PollOutcome, ShowEngine};
pub use scheduler::ActionQueue;

// Instruments
pub use codec::WallLightCommand;
pub use instrument::{
    Bank, Instrument, InstrumentRegistry, Passthrough, PixelAnimator, Voice, VoicePhase,
    WallLight, PASSTHROUGH_KEY, PIXEL_ANIMATOR_KEY, WALL_LIGHT_KEY,
};
pub use sink::{DatagramSink, NullPixelSink, PixelSink};

// Configuration & Logging
pub use config::{
    EngineConfig, LumencueConfig, PassthroughConfig, PixelConfig, TransportConfig,
    WallLightConfig,
};
pub use logging::LogConfig;

// Errors
pub use error::{EngineError, Result};
