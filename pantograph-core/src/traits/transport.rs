//! Serial link to the command station

/// Errors surfaced by a [`Transport`] read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// No line terminator arrived within the allowed time
    Timeout,
    /// The underlying stream failed (framing, overrun)
    Io,
}

/// A duplex line transport to the command station
///
/// One logical thread owns the link: writes and reads strictly alternate,
/// and at most one request is outstanding at a time. Implementations do
/// not need interior locking.
pub trait Transport {
    /// Write one command line, followed by a line terminator
    ///
    /// Best-effort: the command station link has no write acknowledgement,
    /// so a lost write surfaces later as a failed exchange.
    fn write_line(&mut self, line: &str);

    /// Read bytes into `buf` until a `\n` terminator, a full buffer, or
    /// the timeout elapses
    ///
    /// Returns the number of bytes stored; the terminator is consumed but
    /// not stored. The timeout is wall-clock, measured from call entry.
    fn read_line(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, TransportError>;

    /// Discard at most one pending byte from the receive buffer
    ///
    /// Best-effort hygiene for unsolicited station chatter; callers run
    /// this once per polling cycle. Not a flush.
    fn drain_byte(&mut self);
}
