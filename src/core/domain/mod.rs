//! Domain types.

mod object;
mod report;
mod target;

pub use object::RemoteObject;
pub use report::{CycleReport, ObjectReport, ObjectStatus, Report, TerminalState, Totals};
pub use target::SyncTarget;
