/// Display options for the task tree.
///
/// ```rust,ignore
/// let options = RenderOptions::default().collapse(false).clear_output(true);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Show tasks that have not been reached yet ([`crate::TaskState::Unknown`]).
    pub show_next_tasks: bool,
    /// Render subtasks. When `false`, only failed tasks show their subtasks.
    pub show_subtasks: bool,
    /// Hide output and subtasks of tasks that finished successfully.
    pub collapse: bool,
    /// Erase the rendered tree on a clean finish instead of leaving it on screen.
    pub clear_output: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_next_tasks: true,
            show_subtasks: true,
            collapse: true,
            clear_output: false,
        }
    }
}

impl RenderOptions {
    /// Fills every field `partial` leaves unset with its default.
    pub fn merge(partial: PartialRenderOptions) -> Self {
        let defaults = Self::default();
        Self {
            show_next_tasks: partial.show_next_tasks.unwrap_or(defaults.show_next_tasks),
            show_subtasks: partial.show_subtasks.unwrap_or(defaults.show_subtasks),
            collapse: partial.collapse.unwrap_or(defaults.collapse),
            clear_output: partial.clear_output.unwrap_or(defaults.clear_output),
        }
    }

    pub fn show_next_tasks(mut self, yes: bool) -> Self {
        self.show_next_tasks = yes;
        self
    }

    pub fn show_subtasks(mut self, yes: bool) -> Self {
        self.show_subtasks = yes;
        self
    }

    pub fn collapse(mut self, yes: bool) -> Self {
        self.collapse = yes;
        self
    }

    pub fn clear_output(mut self, yes: bool) -> Self {
        self.clear_output = yes;
        self
    }
}

/// Options as supplied by a caller, where `None` means "use the default".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialRenderOptions {
    pub show_next_tasks: Option<bool>,
    pub show_subtasks: Option<bool>,
    pub collapse: Option<bool>,
    pub clear_output: Option<bool>,
}

impl From<PartialRenderOptions> for RenderOptions {
    fn from(partial: PartialRenderOptions) -> Self {
        Self::merge(partial)
    }
}
