//! Instrument abstraction
//!
//! An instrument is a lighting backend registered once at startup under a
//! fixed string key. The dispatch loop calls [`Instrument::play`] when a cue
//! for that key becomes due and [`Instrument::tick`] on every instrument on
//! every loop iteration.
//!
//! ## Registered keys
//!
//! - `danLights` - [`WallLight`], 9-byte UDP commands to the wall-light controller
//! - `fadeCandy` - [`PixelAnimator`], additive multi-voice LED strip animation
//! - `puredata` - [`Passthrough`], greeting datagram on startup, otherwise inert

pub mod passthrough;
pub mod pixel_animator;
pub mod wall_light;

pub use passthrough::Passthrough;
pub use pixel_animator::{PixelAnimator, Voice, VoicePhase};
pub use wall_light::{Bank, WallLight};

use std::collections::HashMap;

use crate::error::{EngineError, Result};

/// Registry key of the wall-light controller
pub const WALL_LIGHT_KEY: &str = "danLights";
/// Registry key of the addressable-LED animator
pub const PIXEL_ANIMATOR_KEY: &str = "fadeCandy";
/// Registry key of the pass-through sink
pub const PASSTHROUGH_KEY: &str = "puredata";

/// A lighting backend
pub trait Instrument: Send {
    /// Human readable name
    fn title(&self) -> &str;

    /// One-time setup, called right after registration
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Start a cue at `now` lasting `duration_ns`
    ///
    /// `params` are the instrument-specific fields of the cue.
    fn play(&mut self, now: i64, duration_ns: i64, params: &[String]) -> Result<()>;

    /// Advance time-dependent state to `now`
    fn tick(&mut self, _now: i64) -> Result<()> {
        Ok(())
    }
}

/// Instruments keyed by name, iterated in registration order
#[derive(Default)]
pub struct InstrumentRegistry {
    entries: Vec<(String, Box<dyn Instrument>)>,
    index: HashMap<String, usize>,
}

impl InstrumentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register and initialize an instrument under `key`
    ///
    /// A failed initialization is reported but the instrument stays registered,
    /// so later cues can still reach it. Registering the same key twice is a
    /// configuration error.
    pub fn register(&mut self, key: &str, mut instrument: Box<dyn Instrument>) -> Result<()> {
        if self.index.contains_key(key) {
            return Err(EngineError::Config(format!(
                "instrument key registered twice: {}",
                key
            )));
        }

        if let Err(e) = instrument.initialize() {
            tracing::warn!("Instrument {} failed to initialize: {}", key, e);
        }
        tracing::info!("Registered instrument {} ({})", key, instrument.title());

        self.index.insert(key.to_string(), self.entries.len());
        self.entries.push((key.to_string(), instrument));
        Ok(())
    }

    /// Look up an instrument by key
    pub fn get_mut(&mut self, key: &str) -> Result<&mut (dyn Instrument + 'static)> {
        match self.index.get(key) {
            Some(&i) => Ok(self.entries[i].1.as_mut()),
            None => Err(EngineError::UnknownInstrument(key.to_string())),
        }
    }

    /// Tick every instrument in registration order
    ///
    /// A failing instrument does not prevent the others from ticking; each
    /// failure is logged.
    pub fn tick_all(&mut self, now: i64) {
        for (key, instrument) in &mut self.entries {
            if let Err(e) = instrument.tick(now) {
                tracing::warn!("Instrument {} tick failed: {}", key, e);
            }
        }
    }

    /// Registered keys in registration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of registered instruments
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
