//! Error types for the show engine
use thiserror::Error;

/// Engine errors
///
/// None of these are fatal to the dispatch loop: a malformed cue or an unknown
/// instrument rejects a single cue, a failed transmission drops a single packet.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Non-numeric, out-of-range or missing field in an inbound cue
    #[error("Malformed cue: {0}")]
    MalformedCue(String),

    /// Dispatch targeted a key no instrument is registered under
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    /// Sending to a device or pixel sink failed
    #[error("Transmission failure: {0}")]
    Transmission(String),

    /// Invalid configuration value or file
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Whether this error only affects a single cue
    pub fn is_cue_error(&self) -> bool {
        matches!(
            self,
            EngineError::MalformedCue(_) | EngineError::UnknownInstrument(_)
        )
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
