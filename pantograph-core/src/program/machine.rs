//! Step machine for multi-field programming operations
//!
//! One [`Sequencer`] is alive only while an operation is in progress.
//! Entering a value either advances to the next collection step or issues
//! the protocol call and terminates. The sequencer is consumed on every
//! transition, so a cancelled operation is simply dropped - there is no
//! way to commit a partially collected operation.

use heapless::Vec;
use pantograph_protocol::{MAX_ADDRESS, MAX_CV};

use super::{ProgramOp, ProgramOutcome, ValuePrompt};
use crate::client::CommandStation;
use crate::traits::Transport;

/// The value the operation is currently waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProgramStep {
    WriteAddressGetAddress,
    WriteCvByteGetCv,
    WriteCvByteGetValue,
    WriteCvBitGetCv,
    WriteCvBitGetBit,
    WriteCvBitGetValue,
    ReadCvByteGetCv,
}

impl ProgramStep {
    /// Keypad title and bounds for this step
    pub fn prompt(&self) -> ValuePrompt {
        match self {
            ProgramStep::WriteAddressGetAddress => ValuePrompt {
                title: "Enter Address",
                min: 1,
                max: MAX_ADDRESS,
            },
            ProgramStep::WriteCvByteGetCv
            | ProgramStep::WriteCvBitGetCv
            | ProgramStep::ReadCvByteGetCv => ValuePrompt {
                title: "Enter CV Address",
                min: 1,
                max: MAX_CV,
            },
            ProgramStep::WriteCvByteGetValue => ValuePrompt {
                title: "Enter Byte Value",
                min: 0,
                max: 255,
            },
            ProgramStep::WriteCvBitGetBit => ValuePrompt {
                title: "Enter Bit",
                min: 0,
                max: 7,
            },
            ProgramStep::WriteCvBitGetValue => ValuePrompt {
                title: "Enter Value",
                min: 0,
                max: 1,
            },
        }
    }
}

/// Result of entering one value
#[derive(Debug)]
pub enum StepOutcome {
    /// More values needed; continue with this sequencer and prompt
    Next(Sequencer, ValuePrompt),
    /// The operation ran; the context is gone
    Done(ProgramOutcome),
}

/// In-progress multi-field operation: current step plus the values
/// collected so far, in step order
#[derive(Debug)]
pub struct Sequencer {
    step: ProgramStep,
    collected: Vec<u16, 2>,
}

impl Sequencer {
    /// Start an operation, returning the sequencer and its first prompt
    ///
    /// Returns `None` for single-shot operations that collect nothing.
    pub fn begin(op: ProgramOp) -> Option<(Self, ValuePrompt)> {
        let step = match op {
            ProgramOp::WriteAddress => ProgramStep::WriteAddressGetAddress,
            ProgramOp::WriteCvByte => ProgramStep::WriteCvByteGetCv,
            ProgramOp::WriteCvBit => ProgramStep::WriteCvBitGetCv,
            ProgramOp::ReadCvByte => ProgramStep::ReadCvByteGetCv,
            ProgramOp::ReadAddress => return None,
        };
        let prompt = step.prompt();
        Some((
            Self {
                step,
                collected: Vec::new(),
            },
            prompt,
        ))
    }

    /// The step currently awaiting a value
    pub fn step(&self) -> ProgramStep {
        self.step
    }

    /// Enter the value for the current step
    ///
    /// `value` has already been bounds-checked by the entry surface
    /// against this step's prompt.
    pub fn enter<T: Transport>(
        self,
        value: u16,
        station: &mut CommandStation<T>,
    ) -> StepOutcome {
        match self.step {
            ProgramStep::WriteAddressGetAddress => {
                StepOutcome::Done(ProgramOutcome::Write(station.write_address(value)))
            }
            ProgramStep::WriteCvByteGetCv => self.advance(value, ProgramStep::WriteCvByteGetValue),
            ProgramStep::WriteCvByteGetValue => {
                // collected[0] was stored when the CV step advanced
                let cv = self.collected[0];
                StepOutcome::Done(ProgramOutcome::Write(
                    station.write_cv_byte(cv, value as u8),
                ))
            }
            ProgramStep::WriteCvBitGetCv => self.advance(value, ProgramStep::WriteCvBitGetBit),
            ProgramStep::WriteCvBitGetBit => self.advance(value, ProgramStep::WriteCvBitGetValue),
            ProgramStep::WriteCvBitGetValue => {
                let cv = self.collected[0];
                let bit = self.collected[1] as u8;
                StepOutcome::Done(ProgramOutcome::Write(
                    station.write_cv_bit(cv, bit, value != 0),
                ))
            }
            ProgramStep::ReadCvByteGetCv => StepOutcome::Done(ProgramOutcome::Read(
                station.read_cv_byte(value).map(u16::from),
            )),
        }
    }

    fn advance(mut self, value: u16, next: ProgramStep) -> StepOutcome {
        // Capacity 2 is bounded by the longest step chain (CV, bit)
        let _ = self.collected.push(value);
        self.step = next;
        let prompt = next.prompt();
        StepOutcome::Next(self, prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::TransportError;
    use heapless::String;
    use pantograph_protocol::MAX_LINE;

    struct MockTransport {
        written: heapless::Vec<String<MAX_LINE>, 4>,
        reply: Option<&'static str>,
    }

    impl MockTransport {
        fn new(reply: Option<&'static str>) -> Self {
            Self {
                written: heapless::Vec::new(),
                reply,
            }
        }
    }

    impl Transport for MockTransport {
        fn write_line(&mut self, line: &str) {
            let _ = self.written.push(String::try_from(line).unwrap());
        }

        fn read_line(&mut self, buf: &mut [u8], _timeout_ms: u32) -> Result<usize, TransportError> {
            let line = self.reply.ok_or(TransportError::Timeout)?;
            let len = line.len().min(buf.len());
            buf[..len].copy_from_slice(&line.as_bytes()[..len]);
            Ok(len)
        }

        fn drain_byte(&mut self) {}
    }

    #[test]
    fn test_write_cv_bit_step_chain() {
        let mut cs = CommandStation::new(MockTransport::new(Some("<r12345|32767|5 3 1>")));

        let (seq, prompt) = Sequencer::begin(ProgramOp::WriteCvBit).unwrap();
        assert_eq!(seq.step(), ProgramStep::WriteCvBitGetCv);
        assert_eq!(prompt.title, "Enter CV Address");

        let StepOutcome::Next(seq, prompt) = seq.enter(5, &mut cs) else {
            panic!("expected another step");
        };
        assert_eq!(seq.step(), ProgramStep::WriteCvBitGetBit);
        assert_eq!(prompt.title, "Enter Bit");
        assert!(cs.transport().written.is_empty());

        let StepOutcome::Next(seq, prompt) = seq.enter(3, &mut cs) else {
            panic!("expected another step");
        };
        assert_eq!(seq.step(), ProgramStep::WriteCvBitGetValue);
        assert_eq!(prompt.title, "Enter Value");
        assert!(cs.transport().written.is_empty());

        let StepOutcome::Done(outcome) = seq.enter(1, &mut cs) else {
            panic!("expected terminal step");
        };
        assert_eq!(outcome, ProgramOutcome::Write(true));
        assert_eq!(cs.transport().written.len(), 1);
        assert_eq!(cs.transport().written[0], "<B 5 3 1 12345 32767>");
    }

    #[test]
    fn test_write_cv_byte_carries_cv_between_steps() {
        let mut cs = CommandStation::new(MockTransport::new(Some("<r12345|32767|29 18>")));

        let (seq, _) = Sequencer::begin(ProgramOp::WriteCvByte).unwrap();
        let StepOutcome::Next(seq, _) = seq.enter(29, &mut cs) else {
            panic!("expected another step");
        };
        let StepOutcome::Done(outcome) = seq.enter(18, &mut cs) else {
            panic!("expected terminal step");
        };
        assert_eq!(outcome, ProgramOutcome::Write(true));
        assert_eq!(cs.transport().written[0], "<W 29 18 12345 32767>");
    }

    #[test]
    fn test_read_cv_byte_terminal() {
        let mut cs = CommandStation::new(MockTransport::new(Some("<r12345|32767|7 129>")));

        let (seq, prompt) = Sequencer::begin(ProgramOp::ReadCvByte).unwrap();
        assert_eq!((prompt.min, prompt.max), (1, MAX_CV));

        let StepOutcome::Done(outcome) = seq.enter(7, &mut cs) else {
            panic!("expected terminal step");
        };
        assert_eq!(outcome, ProgramOutcome::Read(Some(129)));
    }

    #[test]
    fn test_failed_write_reports_failure() {
        let mut cs = CommandStation::new(MockTransport::new(None));

        let (seq, _) = Sequencer::begin(ProgramOp::WriteAddress).unwrap();
        let StepOutcome::Done(outcome) = seq.enter(4098, &mut cs) else {
            panic!("expected terminal step");
        };
        assert_eq!(outcome, ProgramOutcome::Write(false));
    }

    #[test]
    fn test_read_address_has_no_steps() {
        assert!(Sequencer::begin(ProgramOp::ReadAddress).is_none());
    }
}
