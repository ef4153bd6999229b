//! Additive multi-voice LED strip animator
//!
//! Cue params: `[voiceId, startHue, saturation, stopHue, skip, direction]`.
//!
//! Each voice lights every `skip`-th pixel starting at its phase offset and
//! fades from `startHue` at black to `stopHue` at full brightness over the cue
//! duration. Voices are composited additively every tick, each channel
//! saturating at 255, and the resulting frame is handed to a [`PixelSink`].
//!
//! Replaying a voice id advances its phase offset by one in its direction, so
//! repeated notes on the same voice walk along the strip.

use std::collections::{BTreeMap, HashMap};

use crate::color::Rgb;
use crate::cue::param;
use crate::error::{EngineError, Result};
use crate::instrument::Instrument;
use crate::sink::PixelSink;

/// Default strip length in pixels
pub const DEFAULT_STRIP_LENGTH: usize = 60;

/// Stride and offset of a voice, persisting across notes on that voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoicePhase {
    /// Pixel stride, at least 1
    pub skip: usize,
    /// Walk direction; positive walks forward, anything else backward
    pub direction: i64,
    /// First pixel lit by the voice
    pub current_offset: usize,
}

impl VoicePhase {
    fn new(skip: usize, direction: i64) -> Self {
        Self {
            skip,
            direction,
            current_offset: 0,
        }
    }

    /// Take a new stride and direction and step the offset once
    fn advance(&mut self, skip: usize, direction: i64) {
        self.skip = skip;
        self.direction = direction;
        if direction > 0 {
            self.current_offset += 1;
            if self.current_offset >= self.skip {
                self.current_offset = 0;
            }
        } else {
            if self.current_offset == 0 {
                self.current_offset = self.skip - 1;
            }
            self.current_offset = self.current_offset.saturating_sub(1);
        }
    }
}

/// One sounding note
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    /// Instant the note started (ns)
    pub start_time: i64,
    /// Instant the note ends (ns)
    pub stop_time: i64,
    /// Hue at the start of the note
    pub start_hue: u8,
    /// Hue at the end of the note
    pub stop_hue: u8,
    /// Saturation for the whole note
    pub saturation: u8,
    /// Phase the note was started with
    pub phase: VoicePhase,
}

impl Voice {
    /// Color of the voice at `now`
    ///
    /// Brightness ramps linearly from 0 to 255 across the note while the hue
    /// moves from `start_hue` towards `stop_hue` in wrapping 8-bit steps.
    pub fn color_at(&self, now: i64) -> Rgb {
        let elapsed = now.saturating_sub(self.start_time) as f64;
        let percent = elapsed / self.stop_time.saturating_sub(self.start_time) as f64;

        let hue = if self.start_hue == self.stop_hue {
            self.start_hue
        } else {
            let span = self.stop_hue.wrapping_sub(self.start_hue);
            ((span as f64 * percent) as u8).wrapping_add(self.start_hue)
        };
        let value = (percent * 255.0) as u8;

        // The 8-bit hue goes to the color engine unscaled
        Rgb::from_hsv(i64::from(hue), i64::from(self.saturation), i64::from(value))
    }

    /// Whether the note has ended by `now`
    pub fn is_expired(&self, now: i64) -> bool {
        self.stop_time < now
    }
}

/// Addressable-LED animator instrument
pub struct PixelAnimator {
    title: String,
    sink: Box<dyn PixelSink>,
    phases: HashMap<i64, VoicePhase>,
    voices: BTreeMap<i64, Voice>,
    frame: Vec<Rgb>,
}

impl PixelAnimator {
    /// Create an animator for a strip of `strip_length` pixels
    pub fn new(sink: Box<dyn PixelSink>, strip_length: usize) -> Self {
        Self {
            title: "Fade Candy".to_string(),
            sink,
            phases: HashMap::new(),
            voices: BTreeMap::new(),
            frame: vec![Rgb::BLACK; strip_length],
        }
    }

    /// Most recently composited frame
    pub fn frame(&self) -> &[Rgb] {
        &self.frame
    }

    /// Number of voices still sounding
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Live voice for `id`, if any
    pub fn voice(&self, id: i64) -> Option<&Voice> {
        self.voices.get(&id)
    }

    /// Phase state for `id`, which outlives the voice itself
    pub fn phase(&self, id: i64) -> Option<VoicePhase> {
        self.phases.get(&id).copied()
    }

    fn composite(&mut self, now: i64) {
        self.frame.fill(Rgb::BLACK);
        let len = self.frame.len();
        for voice in self.voices.values() {
            let color = voice.color_at(now);
            for i in (voice.phase.current_offset..len).step_by(voice.phase.skip) {
                self.frame[i] = self.frame[i].saturating_add(color);
            }
        }
    }
}

impl Instrument for PixelAnimator {
    fn title(&self) -> &str {
        &self.title
    }

    fn play(&mut self, now: i64, duration_ns: i64, params: &[String]) -> Result<()> {
        let id: i64 = param(params, 0, "voice id")?;
        let start_hue: u8 = param(params, 1, "start hue")?;
        let saturation: u8 = param(params, 2, "saturation")?;
        let stop_hue: u8 = param(params, 3, "stop hue")?;
        let skip: usize = param(params, 4, "skip")?;
        let direction: i64 = param(params, 5, "direction")?;

        if skip == 0 {
            return Err(EngineError::MalformedCue(format!(
                "voice {} has a skip of 0",
                id
            )));
        }

        let phase = *self
            .phases
            .entry(id)
            .and_modify(|p| p.advance(skip, direction))
            .or_insert_with(|| VoicePhase::new(skip, direction));

        tracing::debug!(
            "Voice {} hue {}->{} sat {} offset {} skip {}",
            id,
            start_hue,
            stop_hue,
            saturation,
            phase.current_offset,
            phase.skip
        );

        self.voices.insert(
            id,
            Voice {
                start_time: now,
                stop_time: now.saturating_add(duration_ns),
                start_hue,
                stop_hue,
                saturation,
                phase,
            },
        );
        Ok(())
    }

    fn tick(&mut self, now: i64) -> Result<()> {
        self.voices.retain(|_, voice| !voice.is_expired(now));
        self.composite(now);
        tracing::trace!("Pixel frame at {} with {} voices", now, self.voices.len());
        self.sink.write_frame(&self.frame)
    }
}
