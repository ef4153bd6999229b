//! Error types for the I/O adapters
use lumencue_core::EngineError;
use thiserror::Error;

/// Adapter errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Address that does not parse or resolve
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Cue transport failure
    #[error("Transport error: {0}")]
    TransportError(String),
}

impl From<ControlError> for EngineError {
    fn from(e: ControlError) -> Self {
        EngineError::Transmission(e.to_string())
    }
}

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, ControlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_transmission() {
        let err: EngineError = ControlError::InvalidAddress("lights".to_string()).into();
        match err {
            EngineError::Transmission(msg) => assert!(msg.contains("lights")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
