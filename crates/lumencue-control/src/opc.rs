//! Open Pixel Control client
//!
//! OPC frames travel over a plain TCP stream:
//!
//! ```text
//! [channel][command=0][length_hi][length_lo][r g b r g b ...]
//! ```
//!
//! [`OpcClient`] never touches the socket itself: frames are handed to a
//! writer thread over a one-slot channel where a newer frame replaces one the
//! writer has not picked up yet. The writer owns an [`OpcConnection`], which
//! connects on the first frame, drops the connection on any write error and
//! waits out an exponential back-off before reconnecting. Frames arriving
//! faster than the refresh rate are skipped; the next frame supersedes them.

use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use lumencue_core::{PixelSink, Rgb};

use crate::{error::ControlError, Result};

/// Set-pixel-colors command
pub const OPC_SET_PIXELS: u8 = 0;

/// OPC header length
pub const OPC_HEADER_LEN: usize = 4;

const CONNECT_TIMEOUT: Duration = Duration::from_millis(50);
const WRITE_TIMEOUT: Duration = Duration::from_millis(50);
const INITIAL_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(5);
const WRITER_POLL: Duration = Duration::from_millis(100);

/// Build a set-pixel-colors message
pub fn encode_frame(channel: u8, frame: &[Rgb]) -> Result<Vec<u8>> {
    let len = u16::try_from(frame.len() * 3).map_err(|_| {
        ControlError::TransportError(format!("{} pixels exceed an OPC frame", frame.len()))
    })?;

    let mut packet = Vec::with_capacity(OPC_HEADER_LEN + usize::from(len));
    packet.push(channel);
    packet.push(OPC_SET_PIXELS);
    packet.extend_from_slice(&len.to_be_bytes());
    for pixel in frame {
        packet.extend_from_slice(&pixel.to_array());
    }
    Ok(packet)
}

/// Blocking connection to a fadecandy server
pub struct OpcConnection {
    target: SocketAddr,
    channel: u8,
    stream: Option<TcpStream>,
    last_send: Option<Instant>,
    min_interval: Duration,
    retry_at: Option<Instant>,
    backoff: Duration,
    frames_sent: u64,
}

impl OpcConnection {
    /// Create a connection to `target`; nothing is opened until the first frame
    pub fn new(target: SocketAddr, channel: u8) -> Self {
        Self {
            target,
            channel,
            stream: None,
            last_send: None,
            min_interval: Duration::ZERO,
            retry_at: None,
            backoff: INITIAL_BACKOFF,
            frames_sent: 0,
        }
    }

    /// Minimum time between frames; zero sends every frame
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Whether a connection is currently open
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Number of frames written so far
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Send a frame unless throttled or backing off
    ///
    /// Returns `Ok(false)` when the frame was skipped.
    pub fn send_frame(&mut self, frame: &[Rgb]) -> Result<bool> {
        let now = Instant::now();
        if let Some(last) = self.last_send {
            if now.duration_since(last) < self.min_interval {
                return Ok(false);
            }
        }
        if let Some(retry_at) = self.retry_at {
            if now < retry_at {
                return Ok(false);
            }
        }

        let packet = encode_frame(self.channel, frame)?;

        if self.stream.is_none() {
            match self.connect() {
                Ok(stream) => {
                    tracing::info!("Connected to OPC server {}", self.target);
                    self.stream = Some(stream);
                    self.retry_at = None;
                    self.backoff = INITIAL_BACKOFF;
                }
                Err(e) => {
                    self.schedule_retry(now);
                    return Err(e);
                }
            }
        }

        if let Some(stream) = self.stream.as_mut() {
            if let Err(e) = stream.write_all(&packet) {
                self.stream = None;
                self.schedule_retry(now);
                return Err(e.into());
            }
        }

        self.last_send = Some(now);
        self.frames_sent += 1;
        tracing::trace!("Sent OPC frame of {} pixels", frame.len());
        Ok(true)
    }

    fn connect(&self) -> Result<TcpStream> {
        let stream = TcpStream::connect_timeout(&self.target, CONNECT_TIMEOUT)?;
        stream.set_nodelay(true)?;
        stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
        Ok(stream)
    }

    fn schedule_retry(&mut self, now: Instant) {
        tracing::debug!(
            "OPC server {} unavailable, retrying in {:?}",
            self.target,
            self.backoff
        );
        self.retry_at = Some(now + self.backoff);
        self.backoff = (self.backoff * 2).min(MAX_BACKOFF);
    }
}

/// Non-blocking pixel sink backed by a writer thread
pub struct OpcClient {
    frames_tx: Sender<Vec<Rgb>>,
    stale_rx: Receiver<Vec<Rgb>>,
    running: Arc<AtomicBool>,
    writer: Option<JoinHandle<()>>,
    replaced_frames: u64,
}

impl OpcClient {
    /// Start the writer thread for `connection`
    pub fn spawn(mut connection: OpcConnection) -> Result<Self> {
        let (frames_tx, frames_rx) = bounded::<Vec<Rgb>>(1);
        let stale_rx = frames_rx.clone();
        let running = Arc::new(AtomicBool::new(true));

        tracing::info!(
            "OPC client for channel {} -> {}",
            connection.channel,
            connection.target
        );

        let writer = {
            let running = running.clone();
            thread::Builder::new()
                .name("opc-writer".to_string())
                .spawn(move || {
                    tracing::debug!("OPC writer started");
                    while running.load(Ordering::Relaxed) {
                        match frames_rx.recv_timeout(WRITER_POLL) {
                            Ok(frame) => {
                                if let Err(e) = connection.send_frame(&frame) {
                                    tracing::warn!("OPC frame not sent: {}", e);
                                }
                            }
                            Err(RecvTimeoutError::Timeout) => {}
                            Err(RecvTimeoutError::Disconnected) => break,
                        }
                    }
                    tracing::debug!(
                        "OPC writer stopped after {} frames",
                        connection.frames_sent()
                    );
                })?
        };

        Ok(Self {
            frames_tx,
            stale_rx,
            running,
            writer: Some(writer),
            replaced_frames: 0,
        })
    }

    /// Queue a frame for the writer, replacing any frame still waiting
    pub fn submit(&mut self, frame: &[Rgb]) -> Result<()> {
        let mut pending = frame.to_vec();
        loop {
            match self.frames_tx.try_send(pending) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(frame)) => {
                    if self.stale_rx.try_recv().is_ok() {
                        self.replaced_frames += 1;
                    }
                    pending = frame;
                }
                Err(TrySendError::Disconnected(_)) => {
                    return Err(ControlError::TransportError(
                        "OPC writer has stopped".to_string(),
                    ))
                }
            }
        }
    }

    /// Frames superseded before the writer picked them up
    pub fn replaced_frames(&self) -> u64 {
        self.replaced_frames
    }

    /// Stop the writer thread
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(writer) = self.writer.take() {
            if writer.join().is_err() {
                tracing::error!("OPC writer panicked");
            }
        }
    }
}

impl Drop for OpcClient {
    fn drop(&mut self) {
        self.stop();
    }
}

impl PixelSink for OpcClient {
    fn write_frame(&mut self, frame: &[Rgb]) -> lumencue_core::Result<()> {
        Ok(self.submit(frame)?)
    }
}
