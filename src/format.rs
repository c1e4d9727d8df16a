use std::borrow::Cow;

use crate::options::RenderOptions;
use crate::util::{Style, Symbols, expand_tabs, strip_ansi, truncate};
use crate::{Task, TaskState};

/// Left margin in front of every captured output line.
const OUTPUT_MARGIN: &str = "   ";

/// Styling and glyphs used when formatting the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Theme {
    pub style: Style,
    pub symbols: Symbols,
}

impl Theme {
    /// No colors, unicode glyphs.
    pub fn plain() -> Self {
        Self {
            style: Style::plain(),
            symbols: Symbols::unicode(),
        }
    }
}

/// Everything outside the task tree that affects a frame.
///
/// Passing this explicitly keeps [`format_tasks`] deterministic: the same tree,
/// options and context always produce the same text.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Terminal width in columns. `None` means no limit.
    pub columns: Option<usize>,
    pub theme: &'a Theme,
    /// Current spinner frame, drawn next to running tasks.
    pub spinner: &'a str,
}

impl<'a> RenderContext<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            columns: None,
            theme,
            spinner: " ",
        }
    }

    pub fn columns(mut self, columns: Option<usize>) -> Self {
        self.columns = columns;
        self
    }

    pub fn spinner(mut self, frame: &'a str) -> Self {
        self.spinner = frame;
        self
    }

    /// Truncates `text` to the terminal width minus `reserved` columns.
    fn fit<'t>(&self, text: &'t str, reserved: usize) -> Cow<'t, str> {
        match self.columns {
            Some(columns) => truncate(text, columns.saturating_sub(reserved)),
            None => Cow::Borrowed(text),
        }
    }

    fn symbol<T: Task>(&self, task: &T, options: &RenderOptions) -> String {
        let Theme { style, symbols } = self.theme;
        match task.state() {
            TaskState::Pending if options.show_subtasks && task.has_subtasks() => {
                style.yellow(symbols.pointer)
            }
            TaskState::Pending => style.yellow(self.spinner),
            TaskState::Succeeded => style.green(symbols.tick),
            TaskState::Failed if task.has_subtasks() => style.red(symbols.pointer),
            TaskState::Failed => style.red(symbols.cross),
            TaskState::Skipped => style.yellow(symbols.arrow_down),
            TaskState::Disabled | TaskState::Unknown => " ".to_string(),
        }
    }
}

/// Formats a task tree into newline-separated display lines.
///
/// Each task contributes a status line, then its captured output, then its
/// subtasks one level deeper. Which of those appear depends on the task's
/// state and on `options`:
///
/// - unreached tasks are hidden unless `show_next_tasks` is set,
/// - output shows while a task is running, disabled, skipped or failed, or
///   always when `collapse` is off,
/// - subtasks show while a task is running or failed, or always when
///   `collapse` is off, and `show_subtasks = false` hides them except under
///   failed tasks.
///
/// No line is wider than `ctx.columns`.
///
/// ```rust,ignore
/// let theme = Theme::plain();
/// let ctx = RenderContext::new(&theme).columns(Some(80));
/// let store = TaskStore::lock(&tasks);
/// let frame = format_tasks(store.tasks(), &RenderOptions::default(), &ctx);
/// ```
pub fn format_tasks<T: Task>(
    tasks: impl IntoIterator<Item = T>, options: &RenderOptions, ctx: &RenderContext<'_>,
) -> String {
    let mut lines = Vec::new();
    format_level(tasks, options, ctx, 0, &mut lines);
    lines.join("\n")
}

fn format_level<T: Task>(
    tasks: impl IntoIterator<Item = T>, options: &RenderOptions, ctx: &RenderContext<'_>,
    level: usize, lines: &mut Vec<String>,
) {
    let style = &ctx.theme.style;
    let indent = "  ".repeat(level);

    for task in tasks {
        if task.state() == TaskState::Unknown && !options.show_next_tasks {
            continue;
        }

        let mut line = format!("{indent} {} {}", ctx.symbol(&task, options), task.title());
        if !task.is_enabled() {
            line.push(' ');
            line.push_str(&style.dim("[disabled]"));
        }
        if task.is_skipped() {
            line.push(' ');
            line.push_str(&style.dim("[skipped]"));
        }
        lines.push(ctx.fit(&expand_tabs(&line), 0).into_owned());

        let active =
            task.is_pending() || !task.is_enabled() || task.is_skipped() || task.has_failed();
        if !options.collapse || active {
            if let Some(output) = task.output() {
                format_output(output, &indent, ctx, lines);
            }
        }

        let expand = task.is_pending() || task.has_failed() || !options.collapse;
        let allowed = task.has_failed() || options.show_subtasks;
        if expand && allowed && task.has_subtasks() {
            format_level(task.subtasks(), options, ctx, level + 1, lines);
        }
    }
}

fn format_output(output: &str, indent: &str, ctx: &RenderContext<'_>, lines: &mut Vec<String>) {
    let arrow = ctx.theme.symbols.arrow_right;
    for datum in output.trim().lines().map(strip_ansi) {
        if datum.is_empty() {
            continue;
        }
        let out = format!("{indent}{arrow} {datum}");
        let out = ctx.theme.style.dim(&ctx.fit(&out, OUTPUT_MARGIN.len()));
        lines.push(ctx.fit(&format!("{OUTPUT_MARGIN}{out}"), 0).into_owned());
    }
}
