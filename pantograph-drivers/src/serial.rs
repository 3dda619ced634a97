//! Serial command-station link
//!
//! Implements the core [`Transport`] over any `embedded-io` byte stream
//! (a UART, typically) plus a millisecond clock for read deadlines.

use embedded_io::{Read, ReadReady, Write};
use pantograph_core::traits::{Monotonic, Transport, TransportError};

/// Line terminator appended to every outbound command
const LINE_END: &[u8] = b"\r\n";

/// Serial link to a DCC-EX command station
///
/// Writes are best-effort; reads poll the stream one byte at a time
/// against a deadline taken once at call entry, so a validating call can
/// never block past its configured timeout.
pub struct SerialLink<S, C> {
    serial: S,
    clock: C,
}

impl<S, C> SerialLink<S, C>
where
    S: Read + ReadReady + Write,
    C: Monotonic,
{
    /// Create a link over a byte stream and a clock
    pub fn new(serial: S, clock: C) -> Self {
        Self { serial, clock }
    }

    /// Get access to the underlying stream
    pub fn serial(&self) -> &S {
        &self.serial
    }

    /// Get access to the underlying clock
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<S, C> Transport for SerialLink<S, C>
where
    S: Read + ReadReady + Write,
    C: Monotonic,
{
    fn write_line(&mut self, line: &str) {
        // The station sends no write acknowledgement; a lost command
        // surfaces as a failed exchange upstream
        let _ = self.serial.write_all(line.as_bytes());
        let _ = self.serial.write_all(LINE_END);
        let _ = self.serial.flush();
    }

    fn read_line(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, TransportError> {
        let start = self.clock.now_ms();
        let mut len = 0;

        loop {
            match self.serial.read_ready() {
                Ok(true) => {
                    let mut byte = [0u8; 1];
                    match self.serial.read(&mut byte) {
                        Ok(0) => {}
                        Ok(_) => {
                            if byte[0] == b'\n' {
                                return Ok(len);
                            }
                            if len < buf.len() {
                                buf[len] = byte[0];
                                len += 1;
                                if len == buf.len() {
                                    // Buffer full without a terminator;
                                    // leftovers are the drain's problem
                                    return Ok(len);
                                }
                            }
                        }
                        Err(_) => return Err(TransportError::Io),
                    }
                }
                Ok(false) => {}
                Err(_) => return Err(TransportError::Io),
            }

            if self.clock.now_ms().wrapping_sub(start) >= timeout_ms {
                return Err(TransportError::Timeout);
            }
        }
    }

    fn drain_byte(&mut self) {
        if let Ok(true) = self.serial.read_ready() {
            let mut byte = [0u8; 1];
            let _ = self.serial.read(&mut byte);
        }
    }
}
