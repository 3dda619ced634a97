//! DCC-EX protocol client
//!
//! Turns one [`Command`] into exactly one write to the transport and, for
//! commands that solicit a reply, reads and validates exactly one reply
//! line within the configured time. No retries: every failure is reported
//! upward and the caller decides what to do next.

use pantograph_protocol::{Command, ReplyError, Track, MAX_REPLY};

use crate::loco::Direction;
use crate::traits::{Transport, TransportError};

/// Default reply window, matching the station's worst-case PROG-track
/// acknowledgement time
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u32 = 2500;

/// Client-wide configuration
///
/// The timeout applies to every validating call; callers needing a
/// different window reconfigure the client rather than overriding per
/// call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationConfig {
    /// How long to wait for a reply line, in milliseconds
    pub response_timeout_ms: u32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
        }
    }
}

/// Why a validating exchange failed
///
/// Public operations collapse this to a `bool` or `Option`, the only
/// distinction the operator surface shows; the tagged form keeps each
/// failure mode separately testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExchangeError {
    /// No reply line arrived in time
    Timeout,
    /// A reply arrived but did not have the expected shape
    Malformed,
    /// The reply parsed but echoed different values than were sent
    Mismatch,
}

/// Client for a DCC-EX command station behind a [`Transport`]
pub struct CommandStation<T> {
    transport: T,
    config: StationConfig,
}

impl<T: Transport> CommandStation<T> {
    /// Create a client with the default configuration
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, StationConfig::default())
    }

    /// Create a client with an explicit configuration
    pub fn with_config(transport: T, config: StationConfig) -> Self {
        Self { transport, config }
    }

    /// Get access to the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get the active configuration
    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    /// Write a fire-and-forget command
    fn send(&mut self, command: &Command) {
        self.transport.write_line(&command.encode());
    }

    /// One full round-trip: write the command, then read and validate the
    /// reply it solicits, if any
    fn exchange(&mut self, command: &Command) -> Result<Option<u16>, ExchangeError> {
        self.send(command);
        let Some(expectation) = command.expectation() else {
            return Ok(None);
        };

        let mut buf = [0u8; MAX_REPLY];
        let len = self
            .transport
            .read_line(&mut buf, self.config.response_timeout_ms)
            .map_err(|e| match e {
                TransportError::Timeout => ExchangeError::Timeout,
                TransportError::Io => ExchangeError::Malformed,
            })?;
        if len == 0 {
            // An empty line is no reply at all
            return Err(ExchangeError::Timeout);
        }

        let text = core::str::from_utf8(&buf[..len]).map_err(|_| ExchangeError::Malformed)?;
        expectation.evaluate(text).map_err(|e| match e {
            ReplyError::Malformed => ExchangeError::Malformed,
            ReplyError::Mismatch => ExchangeError::Mismatch,
        })
    }

    /// Power off the selected track
    pub fn power_off(&mut self, track: Track) {
        self.send(&Command::PowerOff(track));
    }

    /// Power on the selected track
    pub fn power_on(&mut self, track: Track) {
        self.send(&Command::PowerOn(track));
    }

    /// Join PROG and MAIN tracks
    pub fn power_join(&mut self) {
        self.send(&Command::PowerJoin);
    }

    /// Emergency stop all locos
    pub fn emergency_stop_all(&mut self) {
        self.send(&Command::EmergencyStopAll);
    }

    /// Set the speed and direction of the loco at `address`
    ///
    /// Succeeds only when the station echoes back exactly the speed and
    /// direction sent, within the configured time.
    pub fn set_throttle(&mut self, address: u16, speed: i8, direction: Direction) -> bool {
        self.exchange(&Command::Throttle {
            address,
            speed,
            direction: direction.wire(),
        })
        .is_ok()
    }

    /// Switch a decoder function on or off
    pub fn set_fn(&mut self, address: u16, function: u8, on: bool) {
        self.send(&Command::Function {
            address,
            function,
            on,
        });
    }

    /// Release the loco at `address` from this throttle
    pub fn release(&mut self, address: u16) {
        self.send(&Command::Release { address });
    }

    /// Write a new address to the loco on the PROG track
    pub fn write_address(&mut self, address: u16) -> bool {
        self.exchange(&Command::WriteAddress { address }).is_ok()
    }

    /// Read the address of the loco on the PROG track
    pub fn read_address(&mut self) -> Option<u16> {
        self.exchange(&Command::ReadAddress).ok().flatten()
    }

    /// Write a CV byte to the loco on the PROG track
    pub fn write_cv_byte(&mut self, cv: u16, value: u8) -> bool {
        self.exchange(&Command::WriteCvByte { cv, value }).is_ok()
    }

    /// Read a CV byte from the loco on the PROG track
    pub fn read_cv_byte(&mut self, cv: u16) -> Option<u8> {
        self.exchange(&Command::ReadCvByte { cv })
            .ok()
            .flatten()
            .map(|v| v as u8)
    }

    /// Write a single CV bit to the loco on the PROG track
    pub fn write_cv_bit(&mut self, cv: u16, bit: u8, value: bool) -> bool {
        self.exchange(&Command::WriteCvBit { cv, bit, value }).is_ok()
    }

    /// Discard at most one byte of unsolicited station chatter
    ///
    /// Some station commands send responses this throttle never reads;
    /// the outer polling loop calls this once per cycle to keep the
    /// receive buffer from silting up. Not a flush: one byte per call.
    pub fn clear_pending_response(&mut self) {
        self.transport.drain_byte();
    }
}
