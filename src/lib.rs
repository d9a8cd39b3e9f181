// Allow unusual byte groupings for UUIDs which have standard format
#![allow(clippy::unusual_byte_groupings)]

//! # yeelight-blue-ble
//!
//! A cross-platform Rust client for the Yeelight Blue smart light over
//! Bluetooth Low Energy.
//!
//! The lamp exposes one vendor GATT service (`FFF0`) and speaks a small
//! fixed-width ASCII protocol: every command is a comma-delimited string
//! padded with commas to a length fixed per characteristic. Status queries
//! are answered with notifications that carry no request identifier, so a
//! connection allows a single outstanding query at a time.
//!
//! ## Features
//!
//! - **Color & Brightness**: Set any RGB color at 0-100% brightness
//! - **Delayed Power**: Turn on or off after 1-1439 minutes
//! - **Color Flow**: Program and play back up to nine timed color steps
//! - **Effects**: Smooth or immediate transitions, current color as default
//! - **Status Queries**: Read color and delay status, raw or parsed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use yeelight_blue_ble::{Color, FlowStep, Light, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let light = Light::connect("78:A5:04:77:D0:43").await?;
//!
//!     light.turn_on(100).await?;
//!     light.set_color(Color::new(100, 25, 25), 30).await?;
//!
//!     light
//!         .start_color_flow(&[
//!             FlowStep::new(Color::RED, 50, 3),
//!             FlowStep::new(Color::GREEN, 50, 3),
//!             FlowStep::new(Color::BLUE, 50, 3),
//!         ])
//!         .await?;
//!
//!     if let Some(status) = light.control_status_parsed().await? {
//!         println!("Color {} at {}%", status.color, status.brightness);
//!     }
//!
//!     light.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Platform Notes
//!
//! ### macOS
//! Requires Bluetooth permission. Add `NSBluetoothAlwaysUsageDescription`
//! to your Info.plist for bundled apps.
//!
//! ### Linux
//! Requires BlueZ. User may need to be in the `bluetooth` group.
//!
//! ### Windows
//! Requires Windows 10 or later with Bluetooth LE support.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for data types

// Public modules
pub mod ble;
pub mod config;
pub mod correlator;
pub mod data;
pub mod error;
pub mod light;
pub mod protocol;
pub mod transport;

// Re-exports for convenience
pub use config::LightConfig;
pub use correlator::NotificationCorrelator;
pub use error::{Error, Result};
pub use light::{Light, DEFAULT_DELAY_MINUTES};
pub use transport::Transport;

// Re-export commonly used types from submodules
pub use ble::{BleTransport, ConnectionState, NotificationEvent};
pub use data::{Color, FlowStep, MAX_FLOW_STEPS};
pub use protocol::{Command, ControlStatus, DelayStatus, EffectMode, EncodedPayload, QueryToken};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that key types are exported
        let _ = std::any::TypeId::of::<Light>();
        let _ = std::any::TypeId::of::<Error>();
        let _ = std::any::TypeId::of::<Color>();
        let _ = std::any::TypeId::of::<FlowStep>();
        let _ = std::any::TypeId::of::<NotificationEvent>();
        let _ = std::any::TypeId::of::<NotificationCorrelator>();
        let _ = std::any::TypeId::of::<LightConfig>();
    }

    #[test]
    fn test_command_round_trip_through_reexports() {
        let payload = Command::Effect(EffectMode::Smooth).encode().unwrap();
        assert_eq!(payload.as_bytes(), b"TS");
    }
}
