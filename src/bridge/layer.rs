use tracing::span::{Attributes, Id};
use tracing::{Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::{LookupSpan, SpanRef};

use super::MessageVisitor;
use crate::TaskState;
use crate::runner::LOG_TARGET;
use crate::task::{SharedTasks, TaskId, TaskStore};

/// A `tracing` [`Layer`] that mirrors spans into a shared task tree.
#[derive(Clone)]
pub struct TaskLayer {
    tasks: SharedTasks,
}

impl TaskLayer {
    pub fn new(tasks: SharedTasks) -> Self {
        Self { tasks }
    }

    fn task_id<S>(span: &SpanRef<'_, S>) -> Option<TaskId>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        span.extensions().get::<TaskIdExt>().map(|ext| ext.0)
    }
}

impl<S> Layer<S> for TaskLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let parent = span.parent().and_then(|parent| Self::task_id(&parent));

        let mut title = String::new();
        attrs.record(&mut MessageVisitor(&mut title));
        if title.is_empty() {
            title = attrs.metadata().name().to_string();
        }

        let task_id = TaskStore::lock(&self.tasks).add(parent, title);
        span.extensions_mut().insert(TaskIdExt(task_id));
    }

    fn on_enter(&self, id: &Id, ctx: Context<'_, S>) {
        let Some(task_id) = ctx.span(id).and_then(|span| Self::task_id(&span)) else {
            return;
        };
        let mut store = TaskStore::lock(&self.tasks);
        if store.state(task_id) == Some(TaskState::Unknown) {
            store.set_state(task_id, TaskState::Pending);
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(task_id) = ctx.span(&id).and_then(|span| Self::task_id(&span)) else {
            return;
        };
        let mut store = TaskStore::lock(&self.tasks);
        match store.state(task_id) {
            Some(TaskState::Pending) => store.set_state(task_id, TaskState::Succeeded),
            Some(TaskState::Unknown) => store.set_state(task_id, TaskState::Skipped),
            _ => {}
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        if event.metadata().target() == LOG_TARGET {
            return;
        }
        let Some(task_id) = ctx.event_span(event).and_then(|span| Self::task_id(&span)) else {
            return;
        };

        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));

        let mut store = TaskStore::lock(&self.tasks);
        if !message.is_empty() {
            store.set_output(task_id, message);
        }
        if *event.metadata().level() == Level::ERROR {
            store.set_state(task_id, TaskState::Failed);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TaskIdExt(TaskId);
