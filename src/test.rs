use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use proptest::prelude::*;

use crate::util::{Spinner, Style, visible_width};
use crate::{
    FrameWriter, PartialRenderOptions, Redraw, RenderContext, RenderOptions, Result, TaskState,
    TaskStore, Theme, Ticker, UpdateRenderer, format_tasks,
};

/// Interprets the subset of ANSI used by [`FrameWriter`] into screen lines.
pub struct VirtualTerm {
    pub lines: Vec<String>,
    pub cursor_row: usize,
    buf: Vec<u8>,
}

impl VirtualTerm {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_row: 0,
            buf: Vec::new(),
        }
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }

    fn ensure_row(&mut self, row: usize) {
        while self.lines.len() <= row {
            self.lines.push(String::new());
        }
    }

    fn process(&mut self, s: &str) {
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\x1b' if chars.peek() == Some(&'[') => {
                    chars.next();
                    let mut params = String::new();
                    let mut command = None;
                    for c in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&c) {
                            command = Some(c);
                            break;
                        }
                        params.push(c);
                    }
                    match command {
                        Some('A') => {
                            let n = params.parse::<usize>().unwrap_or(1);
                            self.cursor_row = self.cursor_row.saturating_sub(n);
                        }
                        Some('K') => {
                            self.ensure_row(self.cursor_row);
                            self.lines[self.cursor_row].clear();
                        }
                        Some('J') => self.lines.truncate(self.cursor_row + 1),
                        _ => {}
                    }
                }
                '\r' => {}
                '\n' => {
                    self.cursor_row += 1;
                    self.ensure_row(self.cursor_row);
                }
                _ => {
                    self.ensure_row(self.cursor_row);
                    self.lines[self.cursor_row].push(c);
                }
            }
        }
    }
}

impl std::io::Write for VirtualTerm {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.buf.is_empty() {
            let s = String::from_utf8(std::mem::take(&mut self.buf)).unwrap();
            self.process(&s);
        }
        Ok(())
    }
}

/// A [`VirtualTerm`] that can be handed to a session and inspected afterwards.
#[derive(Clone)]
pub struct SharedTerm(Arc<Mutex<VirtualTerm>>);

impl SharedTerm {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(VirtualTerm::new())))
    }

    pub fn screen(&self) -> String {
        self.0.lock().unwrap().render()
    }
}

impl std::io::Write for SharedTerm {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Draw(String),
    Clear,
    Done,
}

/// Records every redraw call.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Call>>>);

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }
}

impl Redraw for Recorder {
    fn draw(&mut self, text: &str) -> std::io::Result<()> {
        self.0.lock().unwrap().push(Call::Draw(text.to_string()));
        Ok(())
    }

    fn clear(&mut self) -> std::io::Result<()> {
        self.0.lock().unwrap().push(Call::Clear);
        Ok(())
    }

    fn done(&mut self) -> std::io::Result<()> {
        self.0.lock().unwrap().push(Call::Done);
        Ok(())
    }
}

type Tick = Box<dyn FnMut() + Send + 'static>;

#[derive(Default)]
struct TickerState {
    ticks: Vec<Option<Tick>>,
    intervals: Vec<Duration>,
    stopped: usize,
}

/// A ticker that only ticks when told to.
#[derive(Clone, Default)]
pub struct ManualTicker(Arc<Mutex<TickerState>>);

impl ManualTicker {
    /// Runs every active timer once.
    pub fn fire(&self) {
        let mut state = self.0.lock().unwrap();
        for tick in state.ticks.iter_mut().flatten() {
            tick();
        }
    }

    pub fn registrations(&self) -> usize {
        self.0.lock().unwrap().ticks.len()
    }

    pub fn intervals(&self) -> Vec<Duration> {
        self.0.lock().unwrap().intervals.clone()
    }

    pub fn stopped(&self) -> usize {
        self.0.lock().unwrap().stopped
    }
}

impl Ticker for ManualTicker {
    type Handle = usize;

    fn start(&mut self, interval: Duration, tick: Tick) -> Result<usize> {
        let mut state = self.0.lock().unwrap();
        state.intervals.push(interval);
        state.ticks.push(Some(tick));
        Ok(state.ticks.len() - 1)
    }

    fn stop(&mut self, handle: usize) {
        let mut state = self.0.lock().unwrap();
        state.ticks[handle] = None;
        state.stopped += 1;
    }
}

struct TestEnv {
    term: SharedTerm,
    ticker: ManualTicker,
    renderer: UpdateRenderer<FrameWriter<SharedTerm>, ManualTicker>,
    tasks: crate::SharedTasks,
}

impl TestEnv {
    fn new(options: RenderOptions) -> Self {
        let term = SharedTerm::new();
        let ticker = ManualTicker::default();
        let tasks = TaskStore::shared();
        let redraw = FrameWriter::new(term.clone()).hide_cursor(false);
        let renderer = UpdateRenderer::with_ticker(tasks.clone(), options, redraw, ticker.clone())
            .theme(Theme::plain())
            .spinner(Spinner::custom(&["*"]))
            .columns(|| Some(40));
        Self {
            term,
            ticker,
            renderer,
            tasks,
        }
    }

    fn store(&self) -> std::sync::MutexGuard<'_, TaskStore> {
        TaskStore::lock(&self.tasks)
    }

    fn tick(&self) -> String {
        self.ticker.fire();
        self.term.screen()
    }
}

#[test]
fn test_frames_replace_each_other() {
    let mut env = TestEnv::new(RenderOptions::default());
    let build = env.store().add(None, "build");
    let test = env.store().add(None, "test");
    env.renderer.render().unwrap();

    env.store().set_state(build, TaskState::Pending);
    env.store().set_output(build, "compiling");
    assert_eq!(env.tick(), " * build\n   → compiling\n   test\n");

    env.store().set_state(build, TaskState::Succeeded);
    env.store().set_state(test, TaskState::Pending);
    assert_eq!(env.tick(), " ✔ build\n * test\n");
}

#[test]
fn test_end_commits_final_frame() {
    let mut env = TestEnv::new(RenderOptions::default());
    let id = env.store().add(None, "deploy");
    env.renderer.render().unwrap();
    env.store().set_state(id, TaskState::Pending);
    env.tick();
    env.store().set_state(id, TaskState::Succeeded);
    env.renderer.end(None).unwrap();
    assert_eq!(env.term.screen(), " ✔ deploy\n");

    // Later output starts below the committed frame.
    let mut term = env.term.clone();
    writeln!(term, "after").unwrap();
    term.flush().unwrap();
    assert_eq!(env.term.screen(), " ✔ deploy\nafter\n");
}

#[test]
fn test_end_clears_frame() {
    let mut env = TestEnv::new(RenderOptions::default().clear_output(true));
    let id = env.store().add(None, "deploy");
    env.store().set_state(id, TaskState::Pending);
    env.renderer.render().unwrap();
    env.tick();
    env.renderer.end(None).unwrap();
    assert_eq!(env.term.screen(), "");
}

#[test]
fn test_failed_nested_run() {
    let options = RenderOptions::merge(PartialRenderOptions {
        show_subtasks: Some(false),
        ..Default::default()
    });
    let mut env = TestEnv::new(options);
    let (root, child) = {
        let mut store = env.store();
        let root = store.add(None, "release");
        let child = store.add(Some(root), "upload");
        (root, child)
    };
    env.renderer.render().unwrap();

    env.store().set_state(root, TaskState::Pending);
    env.store().set_state(child, TaskState::Pending);
    assert_eq!(env.tick(), " * release\n");

    env.store().set_state(child, TaskState::Failed);
    env.store().set_output(child, "\x1b[31mconnection refused\x1b[0m");
    env.store().set_state(root, TaskState::Failed);
    let error = std::io::Error::other("upload failed");
    env.renderer.end(Some(&error)).unwrap();
    assert_eq!(
        env.term.screen(),
        " ❯ release\n   ✖ upload\n     → connection refused\n"
    );
}

#[test]
fn test_narrow_terminal() {
    let term = SharedTerm::new();
    let tasks = TaskStore::shared();
    let id = TaskStore::lock(&tasks).add(None, "a title that does not fit");
    TaskStore::lock(&tasks).set_state(id, TaskState::Skipped);

    let redraw = FrameWriter::new(term.clone()).hide_cursor(false);
    let mut renderer = UpdateRenderer::with_ticker(
        tasks,
        RenderOptions::default(),
        redraw,
        ManualTicker::default(),
    )
    .theme(Theme::plain())
    .columns(|| Some(12));
    renderer.end(None).unwrap();
    assert_eq!(term.screen(), " ↓ a title …\n");
}

fn arb_tree() -> impl Strategy<Value = Vec<(String, String, usize, usize, bool)>> {
    prop::collection::vec(
        (
            "[a-zA-Z0-9 \té日本語→✔-]{0,30}",
            "[a-zA-Z0-9 \n日本-]{0,60}",
            0..6usize,
            0..4usize,
            any::<bool>(),
        ),
        0..10,
    )
}

const STATES: [TaskState; 6] = [
    TaskState::Pending,
    TaskState::Succeeded,
    TaskState::Failed,
    TaskState::Skipped,
    TaskState::Disabled,
    TaskState::Unknown,
];

/// Builds a tree where entry `i` is attached under an earlier entry picked by `parent`.
fn build(entries: &[(String, String, usize, usize, bool)], state: Option<TaskState>) -> TaskStore {
    let mut store = TaskStore::new();
    let mut ids = Vec::new();
    let style = Style::colored();
    for (title, output, state_index, parent, styled) in entries {
        let parent = match ids.len() {
            0 => None,
            n => Some(ids[parent % n]).filter(|_| *parent != 0),
        };
        let title = match *styled {
            true => style.red(title),
            false => title.clone(),
        };
        let id = store.add(parent, title);
        store.set_state(id, state.unwrap_or(STATES[*state_index]));
        store.set_output(id, style.green(output));
        ids.push(id);
    }
    store
}

proptest! {
    #[test]
    fn prop_lines_fit_terminal(
        entries in arb_tree(),
        columns in 0..60usize,
        collapse in any::<bool>(),
    ) {
        let store = build(&entries, None);
        let theme = Theme::default();
        let ctx = RenderContext::new(&theme).columns(Some(columns)).spinner("⠋");
        let options = RenderOptions::default().collapse(collapse);
        let out = format_tasks(store.tasks(), &options, &ctx);
        for line in out.lines() {
            prop_assert!(visible_width(line) <= columns, "{line:?} wider than {columns}");
        }
    }

    #[test]
    fn prop_hidden_unknown_tasks_render_nothing(entries in arb_tree()) {
        let store = build(&entries, Some(TaskState::Unknown));
        let theme = Theme::plain();
        let ctx = RenderContext::new(&theme).columns(Some(80));
        let options = RenderOptions::default().show_next_tasks(false).collapse(false);
        prop_assert_eq!(format_tasks(store.tasks(), &options, &ctx), "");
    }
}
