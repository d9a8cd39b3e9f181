//! Status notification parsing.
//!
//! The lamp answers queries with comma-separated ASCII, padded with commas
//! the same way requests are. Empty fields are filler and are skipped.

use crate::data::Color;
use crate::error::{Error, Result};

/// Split a notification payload into its non-empty fields.
pub fn split_fields(data: &[u8]) -> Result<Vec<&str>> {
    let text = std::str::from_utf8(data).map_err(|_| Error::InvalidData {
        context: format!("Notification is not ASCII: {:02X?}", data),
    })?;

    Ok(text
        .trim_end_matches('\0')
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect())
}

fn parse_field<T: std::str::FromStr>(fields: &[&str], index: usize, name: &str) -> Result<T> {
    let raw = fields.get(index).ok_or_else(|| Error::InvalidData {
        context: format!("Missing field {} ({})", index, name),
    })?;

    raw.parse().map_err(|_| Error::InvalidData {
        context: format!("Invalid {}: {:?}", name, raw),
    })
}

/// Current color and brightness as reported by the lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlStatus {
    /// Current color.
    pub color: Color,
    /// Brightness percent (0-100).
    pub brightness: u8,
}

impl ControlStatus {
    /// Parse a control status notification (`r,g,b,brightness,...`).
    pub fn parse(data: &[u8]) -> Result<Self> {
        let fields = split_fields(data)?;

        let color = Color::new(
            parse_field(&fields, 0, "red")?,
            parse_field(&fields, 1, "green")?,
            parse_field(&fields, 2, "blue")?,
        );
        let brightness: u8 = parse_field(&fields, 3, "brightness")?;
        if brightness > 100 {
            return Err(Error::InvalidData {
                context: format!("Brightness above 100: {}", brightness),
            });
        }

        Ok(Self { color, brightness })
    }

    /// Whether the lamp is lit.
    pub fn is_on(&self) -> bool {
        self.brightness > 0 && !self.color.is_black()
    }
}

/// Delay timer status as reported by the lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DelayStatus {
    /// Minutes until the pending power change; zero when none is set.
    pub minutes: u16,
    /// Whether the pending change turns the lamp on (`true`) or off.
    pub turn_on: bool,
}

impl DelayStatus {
    /// Parse a delay status notification (`minutes,flag,...`).
    pub fn parse(data: &[u8]) -> Result<Self> {
        let fields = split_fields(data)?;

        let minutes = parse_field(&fields, 0, "minutes")?;
        let turn_on = match fields.get(1).copied().unwrap_or("0") {
            "0" => false,
            "1" => true,
            other => {
                return Err(Error::InvalidData {
                    context: format!("Invalid delay flag: {:?}", other),
                })
            }
        };

        Ok(Self { minutes, turn_on })
    }

    /// Whether a delayed power change is pending.
    pub fn is_pending(&self) -> bool {
        self.minutes > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_fields_skips_padding() {
        let fields = split_fields(b"255,0,10,80,,,,,,,,,").unwrap();
        assert_eq!(fields, vec!["255", "0", "10", "80"]);
        assert!(split_fields(b",,,,").unwrap().is_empty());
    }

    #[test]
    fn test_split_fields_rejects_binary() {
        assert!(split_fields(&[0xFF, 0xFE]).is_err());
    }

    #[test]
    fn test_control_status_parse() {
        let status = ControlStatus::parse(b"255,128,0,75,,,,,,,,,,,").unwrap();
        assert_eq!(status.color, Color::new(255, 128, 0));
        assert_eq!(status.brightness, 75);
        assert!(status.is_on());

        let off = ControlStatus::parse(b"0,0,0,0,,,,,,,,,,,,").unwrap();
        assert!(!off.is_on());
    }

    #[test]
    fn test_control_status_parse_errors() {
        assert!(ControlStatus::parse(b"255,128,,,").is_err());
        assert!(ControlStatus::parse(b"256,0,0,50").is_err());
        assert!(ControlStatus::parse(b"0,0,0,101").is_err());
    }

    #[test]
    fn test_delay_status_parse() {
        let status = DelayStatus::parse(b"15,1,,,,,").unwrap();
        assert_eq!(status.minutes, 15);
        assert!(status.turn_on);
        assert!(status.is_pending());

        let idle = DelayStatus::parse(b"0,,,,,,,").unwrap();
        assert!(!idle.is_pending());
        assert!(!idle.turn_on);
    }

    #[test]
    fn test_delay_status_parse_errors() {
        assert!(DelayStatus::parse(b",,,,").is_err());
        assert!(DelayStatus::parse(b"5,2").is_err());
    }
}
