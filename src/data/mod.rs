//! Data structures for light state.
//!
//! This module contains the core value types used to describe colors
//! and color flow animations.

pub mod color;
pub mod flow;

pub use color::Color;
pub use flow::{encode_flow, FlowStep, MAX_FLOW_STEPS, MAX_STEP_DELAY_SECONDS};
