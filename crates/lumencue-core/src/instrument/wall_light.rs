//! Wall-light controller
//!
//! Cue params: `[bank, unitOffset, hueStart, saturation, hueStop]`.
//!
//! Every cue sets the addressed unit to `(hueStart, saturation, 254)`
//! immediately. When the cue lasts at least a tenth of a second, a second
//! command asks the controller to fade to `(hueStop, saturation, 0)` over the
//! cue duration.

use std::net::SocketAddr;

use crate::codec::WallLightCommand;
use crate::cue::param;
use crate::error::{EngineError, Result};
use crate::instrument::Instrument;
use crate::sink::DatagramSink;

/// Brightness every cue starts at
const START_BRIGHTNESS: u8 = 254;

/// Nanoseconds per fade step (one tenth of a second)
const FADE_STEP_NS: i64 = 100_000_000;

/// Named group of wall-light units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    /// Lobby wall washes
    LobbyWall,
    /// Lobby lanterns
    LobbyLanterns,
    /// White fixtures in the bay
    BayWhite,
    /// Color fixtures in the bay
    BayColor,
}

impl Bank {
    /// Resolve a bank name; unknown names fall back to [`Bank::BayWhite`]
    pub fn from_name(name: &str) -> Self {
        match name {
            "lobbywall" => Bank::LobbyWall,
            "lobbylanterns" => Bank::LobbyLanterns,
            "baycolor" => Bank::BayColor,
            "baywhite" => Bank::BayWhite,
            other => {
                tracing::debug!("Unknown wall-light bank {:?}, using baywhite", other);
                Bank::BayWhite
            }
        }
    }

    /// Controller zone address
    pub fn zone(self) -> u8 {
        match self {
            Bank::LobbyWall | Bank::LobbyLanterns => 101,
            Bank::BayWhite => 200,
            Bank::BayColor => 201,
        }
    }

    /// Unit address the cue's unit offset counts from
    pub fn offset_base(self) -> u16 {
        match self {
            Bank::LobbyWall => 100,
            Bank::LobbyLanterns => 106,
            Bank::BayWhite | Bank::BayColor => 200,
        }
    }

    /// Unit address for a cue's unit offset; offset 0 addresses the whole zone
    pub fn unit(self, unit_offset: u8) -> Result<u8> {
        if unit_offset == 0 {
            return Ok(0);
        }
        let unit = self.offset_base() + u16::from(unit_offset);
        u8::try_from(unit).map_err(|_| {
            EngineError::MalformedCue(format!(
                "unit offset {} out of range for zone {}",
                unit_offset,
                self.zone()
            ))
        })
    }
}

/// Wall-light controller instrument
pub struct WallLight {
    title: String,
    sink: Box<dyn DatagramSink>,
    target: SocketAddr,
}

impl WallLight {
    /// Create a controller sending to `target`
    pub fn new(sink: Box<dyn DatagramSink>, target: SocketAddr) -> Self {
        Self {
            title: "Dan Lights".to_string(),
            sink,
            target,
        }
    }

    /// Commands produced by a cue, without sending them
    pub fn commands(duration_ns: i64, params: &[String]) -> Result<Vec<WallLightCommand>> {
        let bank = Bank::from_name(&param::<String>(params, 0, "bank")?);
        let unit = bank.unit(param(params, 1, "unit offset")?)?;
        let hue_start: u8 = param(params, 2, "start hue")?;
        let saturation: u8 = param(params, 3, "saturation")?;
        let hue_stop: u8 = param(params, 4, "stop hue")?;

        let fade = (duration_ns / FADE_STEP_NS).clamp(0, i64::from(u16::MAX)) as u16;

        let mut commands = vec![WallLightCommand {
            zone: bank.zone(),
            unit,
            hue: hue_start,
            saturation,
            value: START_BRIGHTNESS,
            fade: 0,
        }];
        if fade > 0 {
            commands.push(WallLightCommand {
                zone: bank.zone(),
                unit,
                hue: hue_stop,
                saturation,
                value: 0,
                fade,
            });
        }
        Ok(commands)
    }
}

impl Instrument for WallLight {
    fn title(&self) -> &str {
        &self.title
    }

    fn play(&mut self, _now: i64, duration_ns: i64, params: &[String]) -> Result<()> {
        for command in Self::commands(duration_ns, params)? {
            let packet = command.encode();
            tracing::debug!("Wall light -> {}: {:?}", self.target, packet);
            self.sink.send_to(&packet, self.target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::fakes::RecordingDatagrams;

    fn params(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    fn target() -> SocketAddr {
        "127.0.0.1:9000".parse().unwrap()
    }

    #[test]
    fn test_bank_table() {
        assert_eq!((Bank::LobbyWall.zone(), Bank::LobbyWall.offset_base()), (101, 100));
        assert_eq!(
            (Bank::LobbyLanterns.zone(), Bank::LobbyLanterns.offset_base()),
            (101, 106)
        );
        assert_eq!((Bank::BayWhite.zone(), Bank::BayWhite.offset_base()), (200, 200));
        assert_eq!((Bank::BayColor.zone(), Bank::BayColor.offset_base()), (201, 200));
        assert_eq!(Bank::from_name("attic"), Bank::BayWhite);
    }

    #[test]
    fn test_unit_addressing() {
        assert_eq!(Bank::LobbyLanterns.unit(0).unwrap(), 0);
        assert_eq!(Bank::LobbyLanterns.unit(3).unwrap(), 109);
        assert_eq!(Bank::BayColor.unit(55).unwrap(), 255);
        assert!(Bank::BayColor.unit(56).is_err());
    }

    #[test]
    fn test_play_sends_set_and_fade() {
        let recorder = RecordingDatagrams::default();
        let sent = recorder.sent.clone();
        let mut light = WallLight::new(Box::new(recorder), target());

        light
            .play(0, 1_000_000_000, &params(&["baywhite", "1", "10", "255", "20"]))
            .unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, vec![4, 200, 201, 14, 10, 254, 254, 0, 0]);
        assert_eq!(sent[1].0, vec![4, 200, 201, 14, 20, 254, 0, 0, 10]);
        assert_eq!(sent[0].1, target());
    }

    #[test]
    fn test_short_cue_has_no_fade() {
        let commands =
            WallLight::commands(99_999_999, &params(&["lobbywall", "0", "1", "2", "3"])).unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].zone, 101);
        assert_eq!(commands[0].unit, 0);
    }

    #[test]
    fn test_long_fade_uses_high_byte() {
        // 30 seconds = 300 tenths = 0x012C
        let commands =
            WallLight::commands(30_000_000_000, &params(&["baycolor", "2", "1", "2", "3"])).unwrap();
        let bytes = commands[1].encode();
        assert_eq!((bytes[7], bytes[8]), (0x01, 0x2C));
    }

    #[test]
    fn test_malformed_params() {
        let recorder = RecordingDatagrams::default();
        let sent = recorder.sent.clone();
        let mut light = WallLight::new(Box::new(recorder), target());

        let err = light
            .play(0, 1_000_000_000, &params(&["baywhite", "1", "ten", "255", "20"]))
            .unwrap_err();
        assert!(matches!(err, EngineError::MalformedCue(_)));

        let err = light
            .play(0, 1_000_000_000, &params(&["baywhite", "1"]))
            .unwrap_err();
        assert!(matches!(err, EngineError::MalformedCue(_)));

        assert!(sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_send_failure_is_reported() {
        let recorder = RecordingDatagrams {
            fail: true,
            ..Default::default()
        };
        let mut light = WallLight::new(Box::new(recorder), target());
        let err = light
            .play(0, 0, &params(&["baywhite", "1", "10", "20", "30"]))
            .unwrap_err();
        assert!(matches!(err, EngineError::Transmission(_)));
    }
}
