//! Decoder programming operations
//!
//! Multi-field operations (write address, write CV byte, write CV bit,
//! read CV byte) are driven by the step machine in [`machine`]: one value
//! collected per step, the protocol call issued only once every value for
//! the operation is in hand. Reading the address is single-shot and
//! bypasses the machine entirely.

pub mod machine;

pub use machine::{ProgramStep, Sequencer, StepOutcome};

use crate::client::CommandStation;
use crate::traits::{NumberEntry, ResultSink, Transport};

/// A programming operation the operator can select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProgramOp {
    WriteAddress,
    WriteCvByte,
    WriteCvBit,
    ReadCvByte,
    ReadAddress,
}

/// A request for one numeric value from the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ValuePrompt {
    /// Title shown above the keypad
    pub title: &'static str,
    /// Lowest accepted value
    pub min: u16,
    /// Highest accepted value
    pub max: u16,
}

/// Terminal result of one programming operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProgramOutcome {
    /// A write finished, successfully or not
    Write(bool),
    /// A read finished, with the value it produced
    Read(Option<u16>),
}

/// Drive one programming operation to its terminal outcome
///
/// Collects values through `entry` step by step, issues the protocol call
/// once the operation is fully specified, and reports the outcome to
/// `sink`. Returns `false` when the operator cancels; a cancelled
/// operation makes no protocol call for that attempt and leaves no
/// residual context.
pub fn run_program<T, E, S>(
    op: ProgramOp,
    station: &mut CommandStation<T>,
    entry: &mut E,
    sink: &mut S,
) -> bool
where
    T: Transport,
    E: NumberEntry,
    S: ResultSink,
{
    let Some((mut sequencer, mut prompt)) = Sequencer::begin(op) else {
        // Single-shot: nothing to collect
        sink.read_result(station.read_address());
        return true;
    };

    loop {
        let Some(value) = entry.request(&prompt) else {
            // Cancelled; dropping the sequencer discards the context
            return false;
        };
        match sequencer.enter(value, station) {
            StepOutcome::Next(next, next_prompt) => {
                sequencer = next;
                prompt = next_prompt;
            }
            StepOutcome::Done(outcome) => {
                match outcome {
                    ProgramOutcome::Write(ok) => sink.write_result(ok),
                    ProgramOutcome::Read(value) => sink.read_result(value),
                }
                return true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{Transport, TransportError};
    use heapless::{String, Vec};
    use pantograph_protocol::MAX_LINE;

    struct MockTransport {
        written: Vec<String<MAX_LINE>, 8>,
        replies: Vec<Result<&'static str, TransportError>, 8>,
        reads: usize,
    }

    impl MockTransport {
        fn new(replies: &[Result<&'static str, TransportError>]) -> Self {
            let mut script = Vec::new();
            let _ = script.extend_from_slice(replies);
            Self {
                written: Vec::new(),
                replies: script,
                reads: 0,
            }
        }
    }

    impl Transport for MockTransport {
        fn write_line(&mut self, line: &str) {
            let _ = self.written.push(String::try_from(line).unwrap());
        }

        fn read_line(&mut self, buf: &mut [u8], _timeout_ms: u32) -> Result<usize, TransportError> {
            let reply = self
                .replies
                .get(self.reads)
                .copied()
                .unwrap_or(Err(TransportError::Timeout));
            self.reads += 1;
            let line = reply?;
            let len = line.len().min(buf.len());
            buf[..len].copy_from_slice(&line.as_bytes()[..len]);
            Ok(len)
        }

        fn drain_byte(&mut self) {}
    }

    /// Keypad scripted with a fixed sequence of entries
    struct ScriptedEntry {
        script: Vec<Option<u16>, 4>,
        requests: Vec<ValuePrompt, 4>,
    }

    impl ScriptedEntry {
        fn new(script: &[Option<u16>]) -> Self {
            let mut values = Vec::new();
            let _ = values.extend_from_slice(script);
            Self {
                script: values,
                requests: Vec::new(),
            }
        }
    }

    impl NumberEntry for ScriptedEntry {
        fn request(&mut self, prompt: &ValuePrompt) -> Option<u16> {
            let index = self.requests.len();
            let _ = self.requests.push(*prompt);
            self.script.get(index).copied().flatten()
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<bool, 4>,
        reads: Vec<Option<u16>, 4>,
    }

    impl ResultSink for RecordingSink {
        fn write_result(&mut self, ok: bool) {
            let _ = self.writes.push(ok);
        }

        fn read_result(&mut self, value: Option<u16>) {
            let _ = self.reads.push(value);
        }
    }

    #[test]
    fn test_write_cv_bit_issues_exactly_one_call() {
        let mut cs = CommandStation::new(MockTransport::new(&[Ok("<r12345|32767|5 3 1>")]));
        let mut entry = ScriptedEntry::new(&[Some(5), Some(3), Some(1)]);
        let mut sink = RecordingSink::default();

        assert!(run_program(ProgramOp::WriteCvBit, &mut cs, &mut entry, &mut sink));

        assert_eq!(cs.transport().written.len(), 1);
        assert_eq!(cs.transport().written[0], "<B 5 3 1 12345 32767>");
        assert_eq!(sink.writes[0], true);

        // Prompts arrived in step order with the declared bounds
        assert_eq!(entry.requests[0].title, "Enter CV Address");
        assert_eq!((entry.requests[0].min, entry.requests[0].max), (1, 1023));
        assert_eq!(entry.requests[1].title, "Enter Bit");
        assert_eq!((entry.requests[1].min, entry.requests[1].max), (0, 7));
        assert_eq!(entry.requests[2].title, "Enter Value");
        assert_eq!((entry.requests[2].min, entry.requests[2].max), (0, 1));
    }

    #[test]
    fn test_cancel_mid_operation_makes_no_call() {
        let mut cs = CommandStation::new(MockTransport::new(&[]));
        let mut entry = ScriptedEntry::new(&[Some(5), None]);
        let mut sink = RecordingSink::default();

        assert!(!run_program(ProgramOp::WriteCvBit, &mut cs, &mut entry, &mut sink));

        assert_eq!(cs.transport().written.len(), 0);
        assert!(sink.writes.is_empty());
        assert!(sink.reads.is_empty());
    }

    #[test]
    fn test_cancel_at_first_prompt() {
        let mut cs = CommandStation::new(MockTransport::new(&[]));
        let mut entry = ScriptedEntry::new(&[None]);
        let mut sink = RecordingSink::default();

        assert!(!run_program(ProgramOp::WriteAddress, &mut cs, &mut entry, &mut sink));
        assert_eq!(cs.transport().written.len(), 0);
    }

    #[test]
    fn test_write_address_flow() {
        let mut cs = CommandStation::new(MockTransport::new(&[Ok("<w 4098>")]));
        let mut entry = ScriptedEntry::new(&[Some(4098)]);
        let mut sink = RecordingSink::default();

        assert!(run_program(ProgramOp::WriteAddress, &mut cs, &mut entry, &mut sink));
        assert_eq!(cs.transport().written[0], "<W 4098>");
        assert_eq!(sink.writes[0], true);
        assert_eq!(entry.requests[0].title, "Enter Address");
        assert_eq!((entry.requests[0].min, entry.requests[0].max), (1, 10293));
    }

    #[test]
    fn test_write_cv_byte_flow() {
        let mut cs = CommandStation::new(MockTransport::new(&[Ok("<r12345|32767|8 3>")]));
        let mut entry = ScriptedEntry::new(&[Some(8), Some(3)]);
        let mut sink = RecordingSink::default();

        assert!(run_program(ProgramOp::WriteCvByte, &mut cs, &mut entry, &mut sink));
        assert_eq!(cs.transport().written[0], "<W 8 3 12345 32767>");
        assert_eq!(sink.writes[0], true);
        assert_eq!(entry.requests[1].title, "Enter Byte Value");
        assert_eq!((entry.requests[1].min, entry.requests[1].max), (0, 255));
    }

    #[test]
    fn test_read_cv_byte_flow_reports_failure() {
        let mut cs = CommandStation::new(MockTransport::new(&[Err(TransportError::Timeout)]));
        let mut entry = ScriptedEntry::new(&[Some(7)]);
        let mut sink = RecordingSink::default();

        assert!(run_program(ProgramOp::ReadCvByte, &mut cs, &mut entry, &mut sink));
        assert_eq!(sink.reads[0], None);
    }

    #[test]
    fn test_read_address_bypasses_collection() {
        let mut cs = CommandStation::new(MockTransport::new(&[Ok("<r 3>")]));
        let mut entry = ScriptedEntry::new(&[]);
        let mut sink = RecordingSink::default();

        assert!(run_program(ProgramOp::ReadAddress, &mut cs, &mut entry, &mut sink));
        assert!(entry.requests.is_empty());
        assert_eq!(cs.transport().written[0], "<R>");
        assert_eq!(sink.reads[0], Some(3));
    }
}
