//! Output seams between instruments and the network
//!
//! Instruments never touch sockets directly. They hand bytes or frames to one
//! of these sinks; concrete UDP and Open Pixel Control implementations live in
//! `lumencue-control`.

use std::net::SocketAddr;

use crate::color::Rgb;
use crate::error::Result;

/// Fire-and-forget "send bytes to address" capability
pub trait DatagramSink: Send {
    /// Send one datagram to `target`
    ///
    /// Failures are returned as [`crate::EngineError::Transmission`]; callers
    /// report them and never retry.
    fn send_to(&mut self, payload: &[u8], target: SocketAddr) -> Result<()>;
}

/// Consumer of composited pixel frames
pub trait PixelSink: Send {
    /// Accept one full frame of the strip
    fn write_frame(&mut self, frame: &[Rgb]) -> Result<()>;
}

/// Pixel sink that discards every frame
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPixelSink;

impl PixelSink for NullPixelSink {
    fn write_frame(&mut self, _frame: &[Rgb]) -> Result<()> {
        Ok(())
    }
}
