//! RGB color type.

/// An RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

impl Color {
    /// All channels off.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// Full white.
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Pure red.
    pub const RED: Self = Self::new(255, 0, 0);
    /// Pure green.
    pub const GREEN: Self = Self::new(0, 255, 0);
    /// Pure blue.
    pub const BLUE: Self = Self::new(0, 0, 255);

    /// Create a new color.
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Check if all channels are zero.
    pub fn is_black(&self) -> bool {
        *self == Self::BLACK
    }

    /// Channels widened for the protocol codec.
    pub(crate) fn channels(&self) -> (u16, u16, u16) {
        (self.red.into(), self.green.into(), self.blue.into())
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_display() {
        assert_eq!(Color::new(255, 128, 0).to_string(), "#FF8000");
        assert_eq!(Color::BLACK.to_string(), "#000000");
    }

    #[test]
    fn test_color_from_tuple() {
        assert_eq!(Color::from((0, 0, 255)), Color::BLUE);
        assert!(Color::default().is_black());
        assert!(!Color::WHITE.is_black());
    }
}
