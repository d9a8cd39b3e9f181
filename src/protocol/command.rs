//! Command types for the Yeelight Blue protocol.
//!
//! Each [`Command`] targets exactly one characteristic and has one payload
//! format; see [`Command::characteristic`] and [`Command::encode`].

use uuid::Uuid;

use crate::ble::uuids::*;
use crate::error::Result;
use crate::protocol::codec::{self, EncodedPayload};

/// Status query tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryToken {
    /// Delay timer status (`RT`), answered on the delay notify characteristic.
    DelayStatus,
    /// Color/brightness status (`S`), answered on the notify characteristic.
    ControlStatus,
}

impl QueryToken {
    /// The ASCII token.
    pub fn token(&self) -> &'static str {
        match self {
            Self::DelayStatus => "RT",
            Self::ControlStatus => "S",
        }
    }

    /// The framed payload length.
    pub fn length(&self) -> usize {
        match self {
            Self::DelayStatus => 2,
            Self::ControlStatus => 1,
        }
    }

    /// Characteristic the query is written to.
    pub fn characteristic(&self) -> Uuid {
        match self {
            Self::DelayStatus => DELAY_QUERY_UUID,
            Self::ControlStatus => QUERY_UUID,
        }
    }

    /// Characteristic the lamp answers on.
    pub fn answer_characteristic(&self) -> Uuid {
        match self {
            Self::DelayStatus => DELAY_NOTIFY_UUID,
            Self::ControlStatus => NOTIFY_UUID,
        }
    }
}

/// Color flow control tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowControl {
    /// Commit the programmed steps and start playback (`CB`).
    Commit,
    /// Stop playback (`CE`).
    Stop,
}

impl FlowControl {
    /// The ASCII token.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Commit => "CB",
            Self::Stop => "CE",
        }
    }
}

/// How the lamp moves between colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectMode {
    /// Fade smoothly to new colors (`TS`).
    #[default]
    Smooth,
    /// Switch colors immediately (`TE`).
    Immediate,
    /// Keep the current color as the power-on default (`DF`).
    UseCurrentColor,
}

impl EffectMode {
    /// The ASCII token.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Smooth => "TS",
            Self::Immediate => "TE",
            Self::UseCurrentColor => "DF",
        }
    }
}

impl std::fmt::Display for EffectMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Smooth => write!(f, "Smooth"),
            Self::Immediate => write!(f, "Immediate"),
            Self::UseCurrentColor => write!(f, "Use Current Color"),
        }
    }
}

/// A single lamp command.
///
/// Numeric fields are carried unchecked and validated by [`Command::encode`],
/// so out-of-range values are reported instead of being unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Set color and brightness. All zeros turns the lamp off.
    PowerColor {
        /// Red channel (0-255).
        red: u16,
        /// Green channel (0-255).
        green: u16,
        /// Blue channel (0-255).
        blue: u16,
        /// Brightness percent (0-100).
        brightness: u16,
    },
    /// Turn on after a delay (1-1439 minutes).
    DelayOn {
        /// Delay in minutes.
        minutes: u16,
    },
    /// Turn off after a delay (1-1439 minutes).
    DelayOff {
        /// Delay in minutes.
        minutes: u16,
    },
    /// Ask for the delay timer status.
    QueryDelay,
    /// Ask for the current color/brightness.
    QueryStatus,
    /// Program one color flow step.
    FlowStep {
        /// Step position (0-8).
        index: u16,
        /// Red channel (0-255).
        red: u16,
        /// Green channel (0-255).
        green: u16,
        /// Blue channel (0-255).
        blue: u16,
        /// Brightness percent (0-100).
        brightness: u16,
        /// Seconds spent on this step (0-10).
        delay_seconds: u16,
    },
    /// Commit the programmed flow and start it.
    FlowCommit,
    /// Stop a running flow.
    FlowStop,
    /// Select the color change effect.
    Effect(EffectMode),
}

impl Command {
    /// The characteristic this command is written to.
    pub fn characteristic(&self) -> Uuid {
        match self {
            Self::PowerColor { .. } => CONTROL_UUID,
            Self::DelayOn { .. } | Self::DelayOff { .. } => DELAY_UUID,
            Self::QueryDelay => QueryToken::DelayStatus.characteristic(),
            Self::QueryStatus => QueryToken::ControlStatus.characteristic(),
            Self::FlowStep { .. } | Self::FlowCommit | Self::FlowStop => COLOR_FLOW_UUID,
            Self::Effect(_) => COLOR_EFFECT_UUID,
        }
    }

    /// The framed payload length for this command's family.
    pub fn payload_length(&self) -> usize {
        match self {
            Self::PowerColor { .. } => codec::CONTROL_LENGTH,
            Self::DelayOn { .. } | Self::DelayOff { .. } => codec::DELAY_LENGTH,
            Self::QueryDelay => QueryToken::DelayStatus.length(),
            Self::QueryStatus => QueryToken::ControlStatus.length(),
            Self::FlowStep { .. } | Self::FlowCommit | Self::FlowStop => {
                codec::COLOR_FLOW_LENGTH
            }
            Self::Effect(_) => codec::COLOR_EFFECT_LENGTH,
        }
    }

    /// The query token, if this command expects a notification in reply.
    pub fn query_token(&self) -> Option<QueryToken> {
        match self {
            Self::QueryDelay => Some(QueryToken::DelayStatus),
            Self::QueryStatus => Some(QueryToken::ControlStatus),
            _ => None,
        }
    }

    /// Whether this command expects a notification in reply.
    pub fn is_query(&self) -> bool {
        self.query_token().is_some()
    }

    /// Validate and frame the command.
    pub fn encode(&self) -> Result<EncodedPayload> {
        match *self {
            Self::PowerColor {
                red,
                green,
                blue,
                brightness,
            } => codec::encode_control(red, green, blue, brightness),
            Self::DelayOn { minutes } => codec::encode_delay(minutes, true),
            Self::DelayOff { minutes } => codec::encode_delay(minutes, false),
            Self::QueryDelay => Ok(codec::encode_query_token(QueryToken::DelayStatus)),
            Self::QueryStatus => Ok(codec::encode_query_token(QueryToken::ControlStatus)),
            Self::FlowStep {
                index,
                red,
                green,
                blue,
                brightness,
                delay_seconds,
            } => codec::encode_flow_step(index, red, green, blue, brightness, delay_seconds),
            Self::FlowCommit => Ok(codec::encode_flow_control(FlowControl::Commit)),
            Self::FlowStop => Ok(codec::encode_flow_control(FlowControl::Stop)),
            Self::Effect(mode) => Ok(codec::encode_effect_mode(mode)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn sample_commands() -> Vec<Command> {
        vec![
            Command::PowerColor {
                red: 12,
                green: 200,
                blue: 7,
                brightness: 64,
            },
            Command::DelayOn { minutes: 30 },
            Command::DelayOff { minutes: 1 },
            Command::QueryDelay,
            Command::QueryStatus,
            Command::FlowStep {
                index: 4,
                red: 0,
                green: 0,
                blue: 255,
                brightness: 20,
                delay_seconds: 10,
            },
            Command::FlowCommit,
            Command::FlowStop,
            Command::Effect(EffectMode::Immediate),
        ]
    }

    #[test]
    fn test_encoded_length_matches_family() {
        for command in sample_commands() {
            let payload = command.encode().unwrap();
            assert_eq!(payload.len(), command.payload_length(), "{:?}", command);
        }
    }

    #[test]
    fn test_characteristic_mapping() {
        assert_eq!(Command::QueryDelay.characteristic(), DELAY_QUERY_UUID);
        assert_eq!(Command::QueryStatus.characteristic(), QUERY_UUID);
        assert_eq!(Command::FlowStop.characteristic(), COLOR_FLOW_UUID);
        assert_eq!(
            Command::Effect(EffectMode::Smooth).characteristic(),
            COLOR_EFFECT_UUID
        );
        assert_eq!(Command::DelayOn { minutes: 5 }.characteristic(), DELAY_UUID);
    }

    #[test]
    fn test_query_commands() {
        assert!(Command::QueryDelay.is_query());
        assert!(Command::QueryStatus.is_query());
        assert!(!Command::FlowCommit.is_query());
        assert_eq!(
            QueryToken::ControlStatus.answer_characteristic(),
            NOTIFY_UUID
        );
    }

    #[test]
    fn test_invalid_command_does_not_encode() {
        let command = Command::DelayOff { minutes: 0 };
        assert!(matches!(command.encode(), Err(Error::OutOfRange { .. })));
    }

    #[test]
    fn test_effect_mode_display() {
        assert_eq!(format!("{}", EffectMode::Smooth), "Smooth");
        assert_eq!(EffectMode::default(), EffectMode::Smooth);
    }
}
