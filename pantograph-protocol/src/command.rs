//! Outbound command encoding
//!
//! A [`Command`] is stateless: constructed fresh per call, encoded once,
//! never persisted. Range validation of parameters is the caller's job;
//! encoding is deterministic for any value the parameter types admit.

use core::fmt::Write;

use heapless::String;

use crate::reply::{Expectation, FieldRule};

/// Maximum encoded command line length, excluding the terminator
pub const MAX_LINE: usize = 32;

/// Highest loco address a DCC-EX station accepts
pub const MAX_ADDRESS: u16 = 10293;

/// Highest configuration variable number
pub const MAX_CV: u16 = 1023;

/// Highest decoder function number (F0-F28)
pub const MAX_FUNCTION: u8 = 28;

/// Legacy callback identifier echoed verbatim in CV replies
pub const CALLBACK_NUM: u16 = 12345;

/// Legacy callback sub-identifier echoed verbatim in CV replies
pub const CALLBACK_SUB: u16 = 32767;

/// Literal body prefix of every CV programming reply
const CV_REPLY_PREFIX: &str = "r12345|32767|";

/// Track circuit a power command applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Track {
    /// Both circuits
    All,
    /// The running track
    Main,
    /// The isolated programming track
    Prog,
}

/// One outbound request to the command station
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Cut power to a track circuit
    PowerOff(Track),
    /// Energize a track circuit
    PowerOn(Track),
    /// Join PROG to MAIN
    PowerJoin,
    /// Emergency stop every loco
    EmergencyStopAll,
    /// Set speed and direction of one loco
    Throttle { address: u16, speed: i8, direction: u8 },
    /// Switch a decoder function on or off
    Function { address: u16, function: u8, on: bool },
    /// Release a loco from this throttle
    Release { address: u16 },
    /// Program a new address into the loco on the PROG track
    WriteAddress { address: u16 },
    /// Read the address of the loco on the PROG track
    ReadAddress,
    /// Write a CV byte on the PROG track
    WriteCvByte { cv: u16, value: u8 },
    /// Read a CV byte on the PROG track
    ReadCvByte { cv: u16 },
    /// Write a single CV bit on the PROG track
    WriteCvBit { cv: u16, bit: u8, value: bool },
}

impl Command {
    /// Encode this command as one protocol line
    pub fn encode(&self) -> String<MAX_LINE> {
        let mut line = String::new();
        // MAX_LINE accommodates the widest field values the parameter
        // types admit, so these writes cannot overflow the buffer.
        let _ = match self {
            Command::PowerOff(Track::All) => line.push_str("<0>"),
            Command::PowerOff(Track::Main) => line.push_str("<0 MAIN>"),
            Command::PowerOff(Track::Prog) => line.push_str("<0 PROG>"),
            Command::PowerOn(Track::All) => line.push_str("<1>"),
            Command::PowerOn(Track::Main) => line.push_str("<1 MAIN>"),
            Command::PowerOn(Track::Prog) => line.push_str("<1 PROG>"),
            Command::PowerJoin => line.push_str("<1 JOIN>"),
            Command::EmergencyStopAll => line.push_str("<!>"),
            Command::Throttle {
                address,
                speed,
                direction,
            } => write!(line, "<t 1 {} {} {}>", address, speed, direction).map_err(|_| ()),
            Command::Function {
                address,
                function,
                on,
            } => write!(line, "<F {} {} {}>", address, function, *on as u8).map_err(|_| ()),
            Command::Release { address } => write!(line, "<- {}>", address).map_err(|_| ()),
            Command::WriteAddress { address } => write!(line, "<W {}>", address).map_err(|_| ()),
            Command::ReadAddress => line.push_str("<R>"),
            Command::WriteCvByte { cv, value } => {
                write!(line, "<W {} {} {} {}>", cv, value, CALLBACK_NUM, CALLBACK_SUB)
                    .map_err(|_| ())
            }
            Command::ReadCvByte { cv } => {
                write!(line, "<R {} {} {}>", cv, CALLBACK_NUM, CALLBACK_SUB).map_err(|_| ())
            }
            Command::WriteCvBit { cv, bit, value } => write!(
                line,
                "<B {} {} {} {} {}>",
                cv, bit, *value as u8, CALLBACK_NUM, CALLBACK_SUB
            )
            .map_err(|_| ()),
        };
        line
    }

    /// The reply this command solicits, or `None` for fire-and-forget
    ///
    /// Field comparisons truncate the echoed value to the width of the
    /// field that was sent, so an 8-bit field sent as -1 is matched by an
    /// unsigned echo of 255.
    pub fn expectation(&self) -> Option<Expectation> {
        match self {
            Command::Throttle {
                speed, direction, ..
            } => Some(Expectation::new(
                "T 1 ",
                &[FieldRule::Byte(*speed as u8), FieldRule::Byte(*direction)],
            )),
            Command::WriteAddress { address } => {
                Some(Expectation::new("w ", &[FieldRule::Word(*address)]))
            }
            Command::ReadAddress => Some(Expectation::new("r ", &[FieldRule::Capture])),
            Command::WriteCvByte { cv, value } => Some(Expectation::new(
                CV_REPLY_PREFIX,
                &[FieldRule::Word(*cv), FieldRule::Byte(*value)],
            )),
            Command::ReadCvByte { cv } => Some(Expectation::new(
                CV_REPLY_PREFIX,
                &[FieldRule::Word(*cv), FieldRule::Capture],
            )),
            Command::WriteCvBit { cv, bit, value } => Some(Expectation::new(
                CV_REPLY_PREFIX,
                &[
                    FieldRule::Word(*cv),
                    FieldRule::Byte(*bit),
                    FieldRule::Byte(*value as u8),
                ],
            )),
            _ => None,
        }
    }
}
