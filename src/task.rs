use indexmap::{IndexMap, IndexSet};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::TaskState;
use crate::view::TaskView;

/// Identifier of a task inside a [`TaskStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(usize);

impl TaskId {
    /// A reserved ID for the virtual root task.
    pub const ROOT: Self = Self(0);

    pub fn new(id: NonZeroUsize) -> Self {
        Self(id.get())
    }

    /// Check if this ID refers to the root.
    pub fn is_root(&self) -> bool {
        self.0 == 0
    }
}

/// A state change in the task tree, produced by whatever engine runs the tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Declare a new task under `parent` (or at the top level if `None`).
    TaskStart {
        id: TaskId,
        parent: Option<TaskId>,
        title: String,
    },
    /// Move a task to a new state.
    SetState { id: TaskId, state: TaskState },
    /// Replace the captured output of a task.
    Output { id: TaskId, text: String },
    /// Rename a task.
    Title { id: TaskId, title: String },
}

/// A task tree shared between the task engine and a render session.
pub type SharedTasks = Arc<Mutex<TaskStore>>;

#[derive(Debug, Clone)]
pub(crate) struct TaskNode {
    pub(crate) title: String,
    pub(crate) state: TaskState,
    pub(crate) output: Option<String>,
    pub(crate) parent: Option<TaskId>,
    pub(crate) subtasks: IndexSet<TaskId>,
}

impl TaskNode {
    fn new(title: String, parent: Option<TaskId>) -> Self {
        Self {
            title,
            parent,
            state: TaskState::Unknown,
            output: None,
            subtasks: IndexSet::new(),
        }
    }
}

/// Insertion-ordered storage for a tree of tasks.
///
/// Top-level tasks hang off a virtual root that is never rendered. Sibling
/// order is the order in which tasks were started.
///
/// ```rust,ignore
/// let mut store = TaskStore::new();
/// let build = store.add(None, "build");
/// let lint = store.add(Some(build), "lint");
/// store.apply_action(Action::SetState { id: lint, state: TaskState::Pending });
/// ```
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: IndexMap<TaskId, TaskNode>,
    next_id: usize,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        let mut tasks = IndexMap::new();
        tasks.insert(TaskId::ROOT, TaskNode::new(String::new(), None));
        Self { tasks, next_id: 1 }
    }

    /// Wraps an empty store for sharing with a render session.
    pub fn shared() -> SharedTasks {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Locks a shared store, recovering the data if a writer panicked.
    pub fn lock(shared: &SharedTasks) -> MutexGuard<'_, TaskStore> {
        shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserves an id for a task that will be started with [`Action::TaskStart`].
    /// Once `usize::MAX` is handed out, the same id is returned again.
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Declares a task and returns its id. New tasks start as [`TaskState::Unknown`].
    pub fn add(&mut self, parent: Option<TaskId>, title: impl Into<String>) -> TaskId {
        let id = self.next_id();
        self.apply_action(Action::TaskStart {
            id,
            parent,
            title: title.into(),
        });
        id
    }

    pub fn set_state(&mut self, id: TaskId, state: TaskState) {
        self.apply_action(Action::SetState { id, state });
    }

    pub fn set_output(&mut self, id: TaskId, text: impl Into<String>) {
        self.apply_action(Action::Output {
            id,
            text: text.into(),
        });
    }

    /// Whether a task with this id was started. Never true for the root.
    pub fn contains(&self, id: TaskId) -> bool {
        !id.is_root() && self.tasks.contains_key(&id)
    }

    pub fn state(&self, id: TaskId) -> Option<TaskState> {
        self.node(&id).map(|task| task.state)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.len() == 1
    }

    pub fn len(&self) -> usize {
        self.tasks.len() - 1
    }

    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::TaskStart { id, parent, title } => {
                if id.is_root() || self.contains(id) {
                    return;
                }
                let parent_id = parent
                    .filter(|id| self.tasks.contains_key(id))
                    .unwrap_or(TaskId::ROOT);

                self.tasks.insert(id, TaskNode::new(title, Some(parent_id)));
                if let Some(parent) = self.tasks.get_mut(&parent_id) {
                    parent.subtasks.insert(id);
                }
                self.next_id = self.next_id.max(id.0.saturating_add(1));
            }
            Action::SetState { id, state } => {
                if let Some(task) = self.resolve_task(id) {
                    task.state = state;
                }
            }
            Action::Output { id, text } => {
                if let Some(task) = self.resolve_task(id) {
                    task.output = Some(text);
                }
            }
            Action::Title { id, title } => {
                if let Some(task) = self.resolve_task(id) {
                    task.title = title;
                }
            }
        }
    }

    /// Views over the top-level tasks, in display order.
    pub fn tasks(&self) -> impl DoubleEndedIterator<Item = TaskView<'_>> {
        self.children(TaskId::ROOT)
    }

    /// View of a single task.
    pub fn view(&self, id: TaskId) -> Option<TaskView<'_>> {
        self.node(&id).map(|node| TaskView::new(self, id, node))
    }

    pub(crate) fn children(&self, id: TaskId) -> impl DoubleEndedIterator<Item = TaskView<'_>> {
        self.tasks
            .get(&id)
            .into_iter()
            .flat_map(|task| task.subtasks.iter())
            .filter_map(move |id| self.view(*id))
    }

    pub(crate) fn node(&self, id: &TaskId) -> Option<&TaskNode> {
        self.tasks.get(id).filter(|_| !id.is_root())
    }

    fn resolve_task(&mut self, id: TaskId) -> Option<&mut TaskNode> {
        if id.is_root() {
            return None;
        }
        self.tasks.get_mut(&id)
    }
}
