//! Operator panel contracts
//!
//! The rendering side of these surfaces (keypad widgets, result screens)
//! lives outside this crate; the core only needs a value in range or a
//! cancellation, and somewhere to report an outcome.

use crate::program::ValuePrompt;

/// Input-collection surface: a numeric keypad or equivalent
pub trait NumberEntry {
    /// Ask the operator for a value within the prompt's bounds
    ///
    /// Returns `None` when the operator cancels. Implementations are
    /// responsible for enforcing `prompt.min..=prompt.max`.
    fn request(&mut self, prompt: &ValuePrompt) -> Option<u16>;
}

/// Operation-result surface: where terminal outcomes are displayed
pub trait ResultSink {
    /// A write-style operation finished
    fn write_result(&mut self, ok: bool);

    /// A read-style operation finished, with the value it read
    fn read_result(&mut self, value: Option<u16>);
}
