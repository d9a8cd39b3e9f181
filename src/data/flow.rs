//! Color flow data structures.
//!
//! A color flow is up to nine timed color/brightness steps that the lamp
//! plays back on its own once the steps are written and committed.

use crate::data::Color;
use crate::error::{Error, Result};
use crate::protocol::codec::{encode_flow_step, EncodedPayload};
use crate::protocol::Command;

/// Maximum number of steps the lamp can store.
pub const MAX_FLOW_STEPS: usize = 9;

/// Maximum per-step delay in seconds.
pub const MAX_STEP_DELAY_SECONDS: u8 = 10;

/// One step of a color flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowStep {
    /// Step color.
    pub color: Color,
    /// Brightness percent (0-100).
    pub brightness: u8,
    /// Seconds to hold this step (0-10).
    pub delay_seconds: u8,
}

impl FlowStep {
    /// Create a new flow step.
    pub fn new(color: Color, brightness: u8, delay_seconds: u8) -> Self {
        Self {
            color,
            brightness,
            delay_seconds,
        }
    }

    /// The command that programs this step at `index`.
    pub fn to_command(&self, index: usize) -> Command {
        let (red, green, blue) = self.color.channels();
        Command::FlowStep {
            index: u16::try_from(index).unwrap_or(u16::MAX),
            red,
            green,
            blue,
            brightness: self.brightness.into(),
            delay_seconds: self.delay_seconds.into(),
        }
    }

    /// Validate and frame this step at `index`.
    pub fn encode(&self, index: usize) -> Result<EncodedPayload> {
        let (red, green, blue) = self.color.channels();
        encode_flow_step(
            u16::try_from(index).unwrap_or(u16::MAX),
            red,
            green,
            blue,
            self.brightness.into(),
            self.delay_seconds.into(),
        )
    }
}

impl From<(u8, u8, u8, u8, u8)> for FlowStep {
    fn from((red, green, blue, brightness, delay_seconds): (u8, u8, u8, u8, u8)) -> Self {
        Self::new(Color::new(red, green, blue), brightness, delay_seconds)
    }
}

/// Validate every step and frame them in order.
///
/// Nothing is returned unless all steps are valid, so a caller never
/// writes a partial flow.
pub fn encode_flow(steps: &[FlowStep]) -> Result<Vec<EncodedPayload>> {
    if steps.len() > MAX_FLOW_STEPS {
        return Err(Error::out_of_range(
            "steps",
            steps.len(),
            format!("at most {}", MAX_FLOW_STEPS),
        ));
    }

    steps
        .iter()
        .enumerate()
        .map(|(index, step)| step.encode(index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_step_encode() {
        let step = FlowStep::from((250, 0, 0, 50, 3));
        assert_eq!(step.encode(2).unwrap().to_string(), "2,250,0,0,50,3,,,,,,");
    }

    #[test]
    fn test_flow_step_to_command() {
        let step = FlowStep::new(Color::GREEN, 40, 1);
        let command = step.to_command(1);
        assert_eq!(command.encode().unwrap(), step.encode(1).unwrap());
    }

    #[test]
    fn test_encode_flow_preserves_order() {
        let steps: Vec<FlowStep> = (0..MAX_FLOW_STEPS as u8)
            .map(|i| FlowStep::new(Color::new(i, 0, 0), 50, 1))
            .collect();

        let payloads = encode_flow(&steps).unwrap();
        assert_eq!(payloads.len(), MAX_FLOW_STEPS);
        for (i, payload) in payloads.iter().enumerate() {
            assert!(payload.to_string().starts_with(&format!("{},{},", i, i)));
        }
    }

    #[test]
    fn test_encode_flow_too_many_steps() {
        let steps = vec![FlowStep::new(Color::WHITE, 100, 1); MAX_FLOW_STEPS + 1];
        assert!(matches!(
            encode_flow(&steps),
            Err(Error::OutOfRange { ref name, .. }) if name == "steps"
        ));
    }

    #[test]
    fn test_encode_flow_rejects_any_invalid_step() {
        let steps = vec![
            FlowStep::new(Color::RED, 50, 3),
            FlowStep::new(Color::GREEN, 50, MAX_STEP_DELAY_SECONDS + 1),
        ];
        assert!(encode_flow(&steps).is_err());

        let steps = vec![FlowStep::new(Color::BLUE, 101, 3)];
        assert!(encode_flow(&steps).is_err());
    }

    #[test]
    fn test_encode_empty_flow() {
        assert!(encode_flow(&[]).unwrap().is_empty());
    }
}
