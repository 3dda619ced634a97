//! Board-agnostic core logic for the Pantograph throttle
//!
//! This crate contains all throttle logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (transport, monotonic clock, number entry,
//!   result sink)
//! - The DCC-EX protocol client
//! - The decoder-programming operation sequencer
//! - Loco state and the throttle roster

#![no_std]
#![deny(unsafe_code)]

pub mod client;
pub mod loco;
pub mod program;
pub mod traits;
