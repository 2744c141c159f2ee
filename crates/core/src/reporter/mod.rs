//! Reporter module: presentation of run progress.
//!
//! The dispatch engine emits three events through the [`Reporter`] trait: run
//! start, one progress event per finished file, and run finish. Progress
//! events are delivered while the coordination lock is held, so reporters see
//! a consistent snapshot and never interleave their output.

mod console;
mod traits;

pub use console::{ConsoleReporter, ReporterError};
pub use traits::{NullReporter, Reporter, Verbosity};
