#![doc = include_str!("../README.md")]

pub(crate) mod error;
pub(crate) mod format;
pub(crate) mod options;
pub(crate) mod runner;
pub(crate) mod task;
pub(crate) mod view;
pub(crate) mod writer;

#[cfg(feature = "tracing")]
pub(crate) mod bridge;

pub mod util;

#[cfg(test)]
mod test;

/// Re-exports of all public types and traits.
pub mod prelude {
    #[cfg(feature = "tracing")]
    pub use crate::bridge::TaskLayer;
    pub use crate::error::{Error, Result};
    pub use crate::format::{RenderContext, Theme, format_tasks};
    pub use crate::options::{PartialRenderOptions, RenderOptions};
    pub use crate::runner::{DEFAULT_INTERVAL, ThreadTicker, Ticker, TickerThread, UpdateRenderer};
    pub use crate::task::{Action, SharedTasks, TaskId, TaskStore};
    pub use crate::view::TaskView;
    pub use crate::writer::{FrameWriter, Redraw};
    pub use crate::{Task, TaskState};
}

pub use crate::prelude::*;

/// Lifecycle state of a task as reported by the task engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskState {
    /// Currently running.
    Pending,
    /// Finished without error.
    Succeeded,
    Failed,
    Skipped,
    /// Will not run at all.
    Disabled,
    /// Declared but not reached yet.
    #[default]
    Unknown,
}

/// Read-only capabilities the formatter needs from a task.
///
/// Implemented by [`TaskView`] for tasks held in a [`TaskStore`], but any
/// tree-shaped type can implement it to be rendered with [`format_tasks`].
///
/// ```rust,ignore
/// struct Step { name: String, done: bool, children: Vec<Step> }
///
/// impl<'a> Task for &'a Step {
///     fn title(&self) -> &str { &self.name }
///     fn state(&self) -> TaskState {
///         if self.done { TaskState::Succeeded } else { TaskState::Pending }
///     }
///     fn output(&self) -> Option<&str> { None }
///     fn subtasks(&self) -> impl Iterator<Item = Self> { self.children.iter() }
/// }
/// ```
pub trait Task: Sized {
    /// Display title of the task.
    fn title(&self) -> &str;

    fn state(&self) -> TaskState;

    /// Most recent captured output, possibly multi-line and styled.
    fn output(&self) -> Option<&str>;

    /// Direct children in display order.
    fn subtasks(&self) -> impl Iterator<Item = Self>;

    fn has_subtasks(&self) -> bool {
        self.subtasks().next().is_some()
    }

    fn is_enabled(&self) -> bool {
        self.state() != TaskState::Disabled
    }

    fn is_skipped(&self) -> bool {
        self.state() == TaskState::Skipped
    }

    fn is_pending(&self) -> bool {
        self.state() == TaskState::Pending
    }

    fn has_failed(&self) -> bool {
        self.state() == TaskState::Failed
    }
}
