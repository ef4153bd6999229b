#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use lumencue_core::{DatagramSink, EngineError, PixelSink, Result, Rgb};

pub type Sent = Arc<Mutex<Vec<(Vec<u8>, SocketAddr)>>>;
pub type Frames = Arc<Mutex<Vec<Vec<Rgb>>>>;

/// Datagram sink that records every send
#[derive(Default, Clone)]
pub struct RecordingDatagrams {
    pub sent: Sent,
    pub fail: bool,
}

impl DatagramSink for RecordingDatagrams {
    fn send_to(&mut self, payload: &[u8], target: SocketAddr) -> Result<()> {
        if self.fail {
            return Err(EngineError::Transmission("host unreachable".to_string()));
        }
        self.sent.lock().unwrap().push((payload.to_vec(), target));
        Ok(())
    }
}

/// Pixel sink that records every frame
#[derive(Default, Clone)]
pub struct RecordingPixels {
    pub frames: Frames,
}

impl PixelSink for RecordingPixels {
    fn write_frame(&mut self, frame: &[Rgb]) -> Result<()> {
        self.frames.lock().unwrap().push(frame.to_vec());
        Ok(())
    }
}

pub fn addr(s: &str) -> SocketAddr {
    s.parse().unwrap()
}
