//! Reply scanning and expectation matching
//!
//! Replies arrive as one line of text holding a single `<`/`>` frame.
//! Matching is structural first (frame present, literal prefix, the right
//! number of unsigned decimal fields), then semantic: each field is
//! checked against the rule derived from the command that was sent.

use heapless::Vec;

/// Maximum reply line length the throttle will buffer
pub const MAX_REPLY: usize = 32;

/// Maximum fields any expected reply carries
pub const MAX_CAPTURES: usize = 3;

/// Errors from evaluating a reply against an expectation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReplyError {
    /// The line does not have the expected frame, prefix, or field shape
    Malformed,
    /// The frame parsed but an echoed field differs from the value sent
    Mismatch,
}

/// How one reply field is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldRule {
    /// Must equal this value after truncation to 8 bits
    Byte(u8),
    /// Must equal this value after truncation to 16 bits
    Word(u16),
    /// Not compared; its value is returned to the caller
    Capture,
}

/// Expected shape of the reply to one command
///
/// Fixed once the command is built: a literal body prefix followed by one
/// rule per field, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Expectation {
    prefix: &'static str,
    rules: Vec<FieldRule, MAX_CAPTURES>,
}

impl Expectation {
    pub(crate) fn new(prefix: &'static str, rules: &[FieldRule]) -> Self {
        let mut rule_vec = Vec::new();
        // Every expectation in this protocol has at most MAX_CAPTURES fields
        let _ = rule_vec.extend_from_slice(rules);
        Self {
            prefix,
            rules: rule_vec,
        }
    }

    /// Evaluate a received line against this expectation
    ///
    /// Returns the captured field value, if the expectation has one.
    /// Leading bytes before `<` and trailing bytes after `>` (a stray
    /// `\r`, typically) are ignored.
    pub fn evaluate(&self, line: &str) -> Result<Option<u16>, ReplyError> {
        let open = line.find('<').ok_or(ReplyError::Malformed)?;
        let body = &line[open + 1..];
        let close = body.find('>').ok_or(ReplyError::Malformed)?;
        let body = &body[..close];

        let fields_text = body.strip_prefix(self.prefix).ok_or(ReplyError::Malformed)?;

        let mut captured = None;
        let mut fields = fields_text.split(' ');
        for rule in &self.rules {
            let field = fields.next().ok_or(ReplyError::Malformed)?;
            let value = parse_field(field)?;
            match rule {
                FieldRule::Byte(expected) => {
                    if value as u8 != *expected {
                        return Err(ReplyError::Mismatch);
                    }
                }
                FieldRule::Word(expected) => {
                    if value as u16 != *expected {
                        return Err(ReplyError::Mismatch);
                    }
                }
                FieldRule::Capture => captured = Some(value as u16),
            }
        }
        if fields.next().is_some() {
            return Err(ReplyError::Malformed);
        }

        Ok(captured)
    }
}

/// Parse one unsigned decimal field
///
/// Signs are not part of the reply grammar; a negative value can only be
/// echoed as its unsigned two's-complement image.
fn parse_field(field: &str) -> Result<u32, ReplyError> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ReplyError::Malformed);
    }
    field.parse().map_err(|_| ReplyError::Malformed)
}
