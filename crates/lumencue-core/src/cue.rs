//! Inbound cue messages
//!
//! A cue is one line of comma-separated fields:
//!
//! ```text
//! <clientNowSeconds>,<startOffsetSeconds>,<durationSeconds>,<instrumentName>,<param...>
//! ```
//!
//! For example `22.6,0.66,2.5,danLights,baywhite,1,64,254,128`. The sender's
//! clock reading and start offset are reconciled against the local clock at
//! receipt time to produce an absolute deadline.

use std::str::FromStr;

use crate::clock::seconds_to_nanos;
use crate::error::{EngineError, Result};

/// Number of leading fields every cue carries
const HEADER_FIELDS: usize = 4;

/// One scheduled cue
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// Absolute dispatch instant in the local clock domain (ns)
    pub deadline: i64,
    /// How long the cue lasts once dispatched (ns)
    pub duration_ns: i64,
    /// Registry key of the target instrument
    pub instrument: String,
    /// Instrument-specific fields following the instrument name
    pub params: Vec<String>,
}

impl Action {
    /// Parse a raw cue observed at `local_now`
    ///
    /// `deadline = (clientNow - local_now) + startOffset`, all in nanoseconds,
    /// assuming negligible transit delay.
    pub fn parse(message: &str, local_now: i64) -> Result<Self> {
        let fields: Vec<&str> = message.trim().split(',').map(str::trim).collect();
        if fields.len() < HEADER_FIELDS {
            return Err(EngineError::MalformedCue(format!(
                "expected at least {} fields, got {}: {:?}",
                HEADER_FIELDS,
                fields.len(),
                message
            )));
        }

        let client_now = parse_nanos(fields[0], "client time")?;
        let start_offset = parse_nanos(fields[1], "start offset")?;
        let duration_ns = parse_nanos(fields[2], "duration")?;

        let instrument = fields[3];
        if instrument.is_empty() {
            return Err(EngineError::MalformedCue(format!(
                "missing instrument name: {:?}",
                message
            )));
        }

        let deadline = client_now
            .checked_sub(local_now)
            .and_then(|clock_skew| clock_skew.checked_add(start_offset))
            .ok_or_else(|| {
                EngineError::MalformedCue(format!("deadline out of range: {:?}", message))
            })?;

        Ok(Self {
            deadline,
            duration_ns,
            instrument: instrument.to_string(),
            params: fields[HEADER_FIELDS..]
                .iter()
                .map(|f| f.to_string())
                .collect(),
        })
    }

    /// Whether the action is due at `now`
    #[inline]
    pub fn is_due(&self, now: i64) -> bool {
        self.deadline <= now
    }
}

/// Parse a decimal seconds field into nanoseconds
fn parse_nanos(field: &str, name: &str) -> Result<i64> {
    let value: f64 = field
        .parse()
        .map_err(|_| EngineError::MalformedCue(format!("invalid {}: {:?}", name, field)))?;
    if !value.is_finite() {
        return Err(EngineError::MalformedCue(format!(
            "non-finite {}: {:?}",
            name, field
        )));
    }
    seconds_to_nanos(value)
        .ok_or_else(|| EngineError::MalformedCue(format!("{} out of range: {:?}", name, field)))
}

/// Parse the instrument parameter at `index`
///
/// Missing and unparsable fields are both reported as [`EngineError::MalformedCue`].
pub fn param<T: FromStr>(params: &[String], index: usize, name: &str) -> Result<T> {
    let raw = params.get(index).ok_or_else(|| {
        EngineError::MalformedCue(format!("missing parameter {} (index {})", name, index))
    })?;
    raw.parse()
        .map_err(|_| EngineError::MalformedCue(format!("invalid {}: {:?}", name, raw)))
}
