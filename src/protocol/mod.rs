//! Protocol module for encoding commands and parsing notifications.
//!
//! This module contains the implementations for:
//! - Fixed-width comma-padded command framing
//! - The command set and its characteristic mapping
//! - Status notification parsing

pub mod codec;
pub mod command;
pub mod status;

pub use codec::{
    encode_control, encode_delay, encode_effect_mode, encode_flow_control, encode_flow_step,
    encode_query_token, pad_to_length, EncodedPayload,
};
pub use command::{Command, EffectMode, FlowControl, QueryToken};
pub use status::{ControlStatus, DelayStatus};
