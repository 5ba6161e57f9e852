//! Ordered, skippable, fail-fast task lists.
//!
//! A [`TaskList`] is built up front with [`TaskList::add`], then handed to an
//! [`Executor`] which runs each [`Step`] strictly in order and stops at the
//! first failure. Steps either stream a subprocess ([`Action::Exec`]), run
//! arbitrary async work ([`Action::Task`]), or expand into a nested list
//! ([`Action::Sequence`]). Progress is reported as [`ProgressEvent`]s.

mod executor;
mod progress;
mod step;

pub use executor::{Executor, TaskContext};
pub use progress::{ProgressEvent, ProgressSender, StepState};
pub use step::{Action, OutlineEntry, Step, TaskList};
