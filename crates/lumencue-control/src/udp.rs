//! UDP datagram output
//!
//! One unconnected socket serves every destination; each send names its
//! target, so the wall-light controller and the pass-through patch can share
//! a sender type.

use std::net::{SocketAddr, UdpSocket};

use lumencue_core::DatagramSink;

use crate::{error::ControlError, Result};

/// Fire-and-forget UDP sender
pub struct UdpSender {
    socket: UdpSocket,
    packets_sent: u64,
}

impl UdpSender {
    /// Bind an ephemeral local port
    pub fn new() -> Result<Self> {
        Self::bind("0.0.0.0:0")
    }

    /// Bind a specific local address
    pub fn bind(local: &str) -> Result<Self> {
        let addr: SocketAddr = local.parse().map_err(|e| {
            ControlError::InvalidAddress(format!("Invalid local UDP address {}: {}", local, e))
        })?;
        let socket = UdpSocket::bind(addr)?;
        socket.set_broadcast(true)?;

        tracing::info!("UDP sender bound to {}", socket.local_addr()?);

        Ok(Self {
            socket,
            packets_sent: 0,
        })
    }

    /// Send one datagram
    pub fn send(&mut self, payload: &[u8], target: SocketAddr) -> Result<()> {
        let sent = self.socket.send_to(payload, target)?;
        if sent != payload.len() {
            return Err(ControlError::TransportError(format!(
                "short UDP send to {}: {} of {} bytes",
                target,
                sent,
                payload.len()
            )));
        }
        self.packets_sent += 1;
        tracing::trace!("Sent {} byte datagram to {}", sent, target);
        Ok(())
    }

    /// Number of datagrams sent so far
    pub fn packets_sent(&self) -> u64 {
        self.packets_sent
    }

    /// Local address of the socket
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

impl DatagramSink for UdpSender {
    fn send_to(&mut self, payload: &[u8], target: SocketAddr) -> lumencue_core::Result<()> {
        Ok(self.send(payload, target)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_sender_creation() {
        let sender = UdpSender::new();
        assert!(sender.is_ok());
    }

    #[test]
    fn test_invalid_local_address() {
        assert!(matches!(
            UdpSender::bind("invalid:address"),
            Err(ControlError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_datagram_arrives() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let target = receiver.local_addr().unwrap();

        let mut sender = UdpSender::bind("127.0.0.1:0").unwrap();
        let command = [4u8, 200, 201, 14, 10, 254, 254, 0, 0];
        DatagramSink::send_to(&mut sender, &command, target).unwrap();

        let mut buf = [0u8; 64];
        let (len, from) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], &command);
        assert_eq!(from, sender.local_addr().unwrap());
        assert_eq!(sender.packets_sent(), 1);
    }
}
