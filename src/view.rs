use crate::task::{TaskId, TaskNode, TaskStore};
use crate::{Task, TaskState};

/// Read-only view of a task held in a [`TaskStore`].
///
/// This is what the formatter walks. It borrows the store, so a frame is
/// always formatted against one consistent snapshot of the tree.
///
/// ```rust,ignore
/// let store = TaskStore::lock(&tasks);
/// for task in store.tasks() {
///     println!("{} {:?} (depth={})", task.title(), task.state(), task.depth());
/// }
/// ```
#[derive(Clone, Copy)]
pub struct TaskView<'a> {
    id: TaskId,
    node: &'a TaskNode,
    store: &'a TaskStore,
}

impl<'a> TaskView<'a> {
    pub(crate) fn new(store: &'a TaskStore, id: TaskId, node: &'a TaskNode) -> Self {
        Self { id, node, store }
    }

    /// Returns TaskId of this task.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the parent task, or `None` for top-level tasks.
    pub fn parent(&self) -> Option<TaskView<'a>> {
        self.node.parent.and_then(|id| self.store.view(id))
    }

    /// Nesting depth of this task (top-level tasks are depth 0).
    pub fn depth(&self) -> usize {
        std::iter::successors(self.parent(), |task| task.parent()).count()
    }
}

impl<'a> Task for TaskView<'a> {
    fn title(&self) -> &str {
        &self.node.title
    }

    fn state(&self) -> TaskState {
        self.node.state
    }

    fn output(&self) -> Option<&str> {
        self.node.output.as_deref()
    }

    fn subtasks(&self) -> impl Iterator<Item = Self> {
        self.store.children(self.id)
    }

    fn has_subtasks(&self) -> bool {
        !self.node.subtasks.is_empty()
    }
}

impl std::fmt::Debug for TaskView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskView")
            .field("id", &self.id)
            .field("title", &self.node.title)
            .field("state", &self.node.state)
            .field("subtasks", &self.node.subtasks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Task, TaskState, TaskStore};

    #[test]
    fn depth_and_parent_follow_the_tree() {
        let mut store = TaskStore::new();
        let a = store.add(None, "a");
        let b = store.add(Some(a), "b");
        let c = store.add(Some(b), "c");

        let c = store.view(c).unwrap();
        assert_eq!(c.depth(), 2);
        assert_eq!(c.parent().map(|p| p.id()), Some(b));
        assert_eq!(store.view(a).unwrap().depth(), 0);
        assert!(store.view(a).unwrap().parent().is_none());
    }

    #[test]
    fn state_queries_derive_from_state() {
        let mut store = TaskStore::new();
        let id = store.add(None, "t");
        let check = |store: &TaskStore| {
            let t = store.view(id).unwrap();
            (t.is_enabled(), t.is_skipped(), t.is_pending(), t.has_failed())
        };

        assert_eq!(check(&store), (true, false, false, false));
        store.set_state(id, TaskState::Disabled);
        assert_eq!(check(&store), (false, false, false, false));
        store.set_state(id, TaskState::Skipped);
        assert_eq!(check(&store), (true, true, false, false));
        store.set_state(id, TaskState::Pending);
        assert_eq!(check(&store), (true, false, true, false));
        store.set_state(id, TaskState::Failed);
        assert_eq!(check(&store), (true, false, false, true));
    }
}
