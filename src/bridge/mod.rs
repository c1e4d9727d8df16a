//! Feeds `tracing` spans into a [`TaskStore`](crate::TaskStore).
//!
//! Every span becomes a task, nested under the task of its parent span.
//! The task's title is the span's `message` field, or its name when the
//! span has none.
//!
//! | tracing                    | task                           |
//! |----------------------------|--------------------------------|
//! | span created               | declared ([`TaskState::Unknown`]) |
//! | span entered               | [`TaskState::Pending`]         |
//! | event in span              | output replaced by the message |
//! | `ERROR` event in span      | [`TaskState::Failed`]          |
//! | span closed while running  | [`TaskState::Succeeded`]       |
//! | span closed, never entered | [`TaskState::Skipped`]         |
//!
//! Events logged by the render session itself are not task output and are
//! ignored, so a session can be started inside a span.
//!
//! ```rust,ignore
//! use tracing_subscriber::layer::SubscriberExt;
//! use tracing_subscriber::util::SubscriberInitExt;
//!
//! let tasks = TaskStore::shared();
//! tracing_subscriber::registry().with(TaskLayer::new(tasks.clone())).init();
//!
//! let mut renderer = UpdateRenderer::new(tasks, RenderOptions::default());
//! renderer.render()?;
//! tracing::info_span!("build").in_scope(|| tracing::info!("compiling"));
//! renderer.end(None)?;
//! ```
//!
//! [`TaskState::Unknown`]: crate::TaskState::Unknown
//! [`TaskState::Pending`]: crate::TaskState::Pending
//! [`TaskState::Failed`]: crate::TaskState::Failed
//! [`TaskState::Succeeded`]: crate::TaskState::Succeeded
//! [`TaskState::Skipped`]: crate::TaskState::Skipped

mod layer;

pub use layer::TaskLayer;

/// Collects the `message` field of a span or event.
struct MessageVisitor<'a>(&'a mut String);

impl<'a> tracing::field::Visit for MessageVisitor<'a> {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.0.push_str(value);
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{:?}", value);
        }
    }
}
