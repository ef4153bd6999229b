//! Lumencue Control - Network Adapters
//!
//! This crate connects the show engine to the outside world:
//! - **UDP**: datagram output for the wall-light controller and the pass-through patch
//! - **OPC**: Open Pixel Control frames for the LED strip
//! - **Websocket**: inbound cue transport (axum)
//!
//! ## Feature Flags
//!
//! - `websocket`: Enable the cue transport (requires `axum`, `futures`), on by default
//!
//! ## Modules
//!
//! - [`udp`] - UDP datagram sender
//! - [`opc`] - Open Pixel Control client
//! - `transport` - Websocket cue server (requires `websocket` feature)
//! - [`error`] - Error types

#![allow(missing_docs)]

/// Error types
pub mod error;
/// Open Pixel Control client
pub mod opc;
/// UDP datagram output
pub mod udp;

#[cfg(feature = "websocket")]
/// Websocket cue transport
pub mod transport;

// Re-exports
pub use error::{ControlError, Result};
pub use opc::{OpcClient, OpcConnection};
pub use udp::UdpSender;

#[cfg(feature = "websocket")]
pub use transport::CueServer;
