//! Pass-through sink
//!
//! Announces itself to the downstream patch once at startup. Cues addressed
//! to it are accepted and ignored.

use std::net::SocketAddr;

use crate::error::Result;
use crate::instrument::Instrument;
use crate::sink::DatagramSink;

/// Datagram sent on initialization
pub const GREETING: &[u8] = b"Hello world.\n";

/// Pass-through instrument
pub struct Passthrough {
    title: String,
    sink: Box<dyn DatagramSink>,
    target: SocketAddr,
}

impl Passthrough {
    /// Create a pass-through announcing itself to `target`
    pub fn new(sink: Box<dyn DatagramSink>, target: SocketAddr) -> Self {
        Self {
            title: "Pure Data".to_string(),
            sink,
            target,
        }
    }
}

impl Instrument for Passthrough {
    fn title(&self) -> &str {
        &self.title
    }

    fn initialize(&mut self) -> Result<()> {
        tracing::info!("Greeting pass-through target {}", self.target);
        self.sink.send_to(GREETING, self.target)
    }

    fn play(&mut self, _now: i64, _duration_ns: i64, params: &[String]) -> Result<()> {
        tracing::trace!("Pass-through cue ignored: {:?}", params);
        Ok(())
    }
}
