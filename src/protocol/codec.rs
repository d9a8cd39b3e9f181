//! Fixed-width ASCII framing for Yeelight Blue commands.
//!
//! Every command is a comma-delimited ASCII string right-padded with `,`
//! to a length fixed per characteristic:
//!
//! | Family | Length | Natural form |
//! |---|---|---|
//! | control | 18 | `r,g,b,brightness` |
//! | delay | 8 | `minutes,{0,1}` |
//! | delay query | 2 | `RT` |
//! | control query | 1 | `S` |
//! | color flow | 20 | `i,r,g,b,brightness,delay` / `CB` / `CE` |
//! | color effect | 2 | `TS` / `TE` / `DF` |

use bytes::Bytes;
use std::fmt;
use std::ops::RangeInclusive;

use crate::error::{Error, Result};
use crate::protocol::command::{EffectMode, FlowControl, QueryToken};

/// Filler byte used to pad payloads.
pub const PAD_BYTE: u8 = b',';

/// Payload length for the control characteristic.
pub const CONTROL_LENGTH: usize = 18;
/// Payload length for the delay characteristic.
pub const DELAY_LENGTH: usize = 8;
/// Payload length for the color flow characteristic.
pub const COLOR_FLOW_LENGTH: usize = 20;
/// Payload length for the color effect characteristic.
pub const COLOR_EFFECT_LENGTH: usize = 2;

/// Valid color channel values.
pub const CHANNEL_RANGE: RangeInclusive<u16> = 0..=255;
/// Valid brightness values (percent).
pub const BRIGHTNESS_RANGE: RangeInclusive<u16> = 0..=100;
/// Valid delay values in minutes (exclusive of a full day).
pub const DELAY_MINUTES_RANGE: RangeInclusive<u16> = 1..=1439;
/// Valid per-step color flow delay in seconds.
pub const FLOW_DELAY_RANGE: RangeInclusive<u16> = 0..=10;

/// A framed, fixed-length ASCII payload ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedPayload {
    bytes: Bytes,
}

impl EncodedPayload {
    /// The raw bytes to write.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty (only for a zero target length).
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume into the underlying buffer.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl AsRef<[u8]> for EncodedPayload {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for EncodedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

/// Right-pad `natural` with commas to exactly `length` bytes.
///
/// An empty `natural`, or one longer than `length`, yields `length` commas:
/// the value is dropped rather than truncated, and no error is raised.
/// The lamp relies on exact framing so this is kept as-is.
pub fn pad_to_length(natural: &str, length: usize) -> EncodedPayload {
    let mut buf = Vec::with_capacity(length);
    if !natural.is_empty() && natural.len() <= length {
        buf.extend_from_slice(natural.as_bytes());
    }
    buf.resize(length, PAD_BYTE);

    EncodedPayload {
        bytes: Bytes::from(buf),
    }
}

fn check(name: &str, value: u16, range: &RangeInclusive<u16>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::out_of_range(
            name,
            value,
            format!("{}..={}", range.start(), range.end()),
        ))
    }
}

fn check_color(red: u16, green: u16, blue: u16, brightness: u16) -> Result<()> {
    check("red", red, &CHANNEL_RANGE)?;
    check("green", green, &CHANNEL_RANGE)?;
    check("blue", blue, &CHANNEL_RANGE)?;
    check("brightness", brightness, &BRIGHTNESS_RANGE)
}

/// Encode a color/brightness command for the control characteristic.
pub fn encode_control(red: u16, green: u16, blue: u16, brightness: u16) -> Result<EncodedPayload> {
    check_color(red, green, blue, brightness)?;

    Ok(pad_to_length(
        &format!("{},{},{},{}", red, green, blue, brightness),
        CONTROL_LENGTH,
    ))
}

/// Encode a delayed power change. `turn_on` selects on (`1`) or off (`0`).
pub fn encode_delay(minutes: u16, turn_on: bool) -> Result<EncodedPayload> {
    check("minutes", minutes, &DELAY_MINUTES_RANGE)?;

    Ok(pad_to_length(
        &format!("{},{}", minutes, u8::from(turn_on)),
        DELAY_LENGTH,
    ))
}

/// Encode a status query token.
pub fn encode_query_token(token: QueryToken) -> EncodedPayload {
    pad_to_length(token.token(), token.length())
}

/// Encode one color flow step.
///
/// `index` is the step's position in the flow (0-based, at most 8).
pub fn encode_flow_step(
    index: u16,
    red: u16,
    green: u16,
    blue: u16,
    brightness: u16,
    delay_seconds: u16,
) -> Result<EncodedPayload> {
    check(
        "index",
        index,
        &(0..=crate::data::flow::MAX_FLOW_STEPS as u16 - 1),
    )?;
    check_color(red, green, blue, brightness)?;
    check("delay_seconds", delay_seconds, &FLOW_DELAY_RANGE)?;

    Ok(pad_to_length(
        &format!(
            "{},{},{},{},{},{}",
            index, red, green, blue, brightness, delay_seconds
        ),
        COLOR_FLOW_LENGTH,
    ))
}

/// Encode a color flow commit/stop token.
pub fn encode_flow_control(control: FlowControl) -> EncodedPayload {
    pad_to_length(control.token(), COLOR_FLOW_LENGTH)
}

/// Encode a color effect token.
pub fn encode_effect_mode(mode: EffectMode) -> EncodedPayload {
    pad_to_length(mode.token(), COLOR_EFFECT_LENGTH)
}
