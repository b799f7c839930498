//! lexenv_replay: Replay orchestration.
//!
//! Parses driver traces and replays them against a persistent scope stack,
//! collecting the resolutions the emitter would see and the diagnostics the
//! compiler would report.

pub mod session;
pub mod trace;

pub use session::{OutputLine, ReplayError, ReplayReport, Session};
pub use trace::{parse_line, parse_type, TraceCommand, TraceError};
