//! Hardware and UI collaborator traits
//!
//! Everything the core needs from the outside world, abstracted the same
//! way for real hardware and for test mocks.

pub mod panel;
pub mod time;
pub mod transport;

pub use panel::{NumberEntry, ResultSink};
pub use time::Monotonic;
pub use transport::{Transport, TransportError};
