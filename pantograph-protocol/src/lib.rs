//! DCC-EX Native Text Protocol
//!
//! This crate defines the line-oriented ASCII protocol spoken between the
//! throttle and a DCC-EX command station over a serial link. The protocol
//! is plain text, one command or reply per line:
//!
//! ```text
//! ┌───┬──────────────────────────────┬───┐
//! │ < │ FIELD [SP FIELD ...]         │ > │
//! └───┴──────────────────────────────┴───┘
//! ```
//!
//! Fields are base-10 integers separated by single spaces. Commands that
//! solicit a reply carry a [`reply::Expectation`] describing the reply
//! shape and which echoed fields must equal the values just sent; the
//! expectation is fully determined by the command, never rewritten at
//! runtime. This crate is pure data - encoding, scanning, and matching.
//! Transport and timing live with the caller.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod reply;

pub use command::{Command, Track, MAX_ADDRESS, MAX_CV, MAX_FUNCTION, MAX_LINE};
pub use reply::{Expectation, FieldRule, ReplyError, MAX_CAPTURES, MAX_REPLY};
