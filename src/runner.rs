use std::io::{IsTerminal, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::format::{RenderContext, Theme, format_tasks};
use crate::options::RenderOptions;
use crate::task::{SharedTasks, TaskStore};
use crate::util::{Spinner, terminal_columns};
use crate::writer::{FrameWriter, Redraw};

/// Target of the events this module logs. The tracing bridge ignores them so
/// they never show up as task output.
pub(crate) const LOG_TARGET: &str = module_path!();

/// Repaint interval used unless [`UpdateRenderer::interval`] overrides it.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Runs a callback periodically until stopped.
///
/// Implement this to drive the render session from a custom timer, e.g. a
/// test clock or an existing event loop.
pub trait Ticker {
    /// Identifies a running timer.
    type Handle;

    /// Starts calling `tick` every `interval`. The first call happens one
    /// interval after starting, and a call never overlaps the previous one.
    fn start(
        &mut self, interval: Duration, tick: Box<dyn FnMut() + Send + 'static>,
    ) -> Result<Self::Handle>;

    /// Stops the timer. No tick runs after this returns.
    fn stop(&mut self, handle: Self::Handle);
}

/// Ticks on a dedicated background thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadTicker;

/// A running [`ThreadTicker`] timer.
#[derive(Debug)]
pub struct TickerThread {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl Ticker for ThreadTicker {
    type Handle = TickerThread;

    fn start(
        &mut self, interval: Duration, mut tick: Box<dyn FnMut() + Send + 'static>,
    ) -> Result<TickerThread> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let thread = std::thread::Builder::new()
            .name("tally-update".into())
            .spawn(move || {
                let mut next = Instant::now() + interval;
                loop {
                    let now = Instant::now();
                    if now < next {
                        std::thread::park_timeout(next - now);
                    }
                    if stop_flag.load(Ordering::Acquire) {
                        break;
                    }
                    // Woken early without a stop request.
                    if Instant::now() < next {
                        continue;
                    }
                    tick();
                    next = Instant::now() + interval;
                }
            })
            .map_err(Error::Spawn)?;
        Ok(TickerThread { stop, thread })
    }

    fn stop(&mut self, handle: TickerThread) {
        handle.stop.store(true, Ordering::Release);
        handle.thread.thread().unpark();
        if handle.thread.join().is_err() {
            warn!("render ticker thread panicked");
        }
    }
}

type Columns = Box<dyn Fn() -> Option<usize> + Send>;

/// State shared between the session and its ticker.
struct Frame<D> {
    redraw: D,
    options: RenderOptions,
    theme: Theme,
    spinner: Spinner,
    columns: Columns,
}

impl<D: Redraw> Frame<D> {
    fn render(&mut self, tasks: &SharedTasks) -> std::io::Result<()> {
        self.spinner.tick();
        let ctx = RenderContext::new(&self.theme)
            .columns((self.columns)())
            .spinner(self.spinner.frame());
        let text = {
            let store = TaskStore::lock(tasks);
            format_tasks(store.tasks(), &self.options, &ctx)
        };
        self.redraw.draw(&text)
    }
}

fn lock<D>(frame: &Mutex<Frame<D>>) -> MutexGuard<'_, Frame<D>> {
    frame.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Repaints a task tree in place on a fixed interval.
///
/// [`render`](Self::render) starts the repaint timer, [`end`](Self::end)
/// stops it, draws one last frame and either clears it or leaves it on
/// screen.
///
/// ```rust,ignore
/// let tasks = TaskStore::shared();
/// let mut renderer = UpdateRenderer::new(tasks.clone(), RenderOptions::default());
/// renderer.render()?;
///
/// let build = TaskStore::lock(&tasks).add(None, "build");
/// TaskStore::lock(&tasks).set_state(build, TaskState::Pending);
/// // ... run the work, updating `tasks` ...
/// TaskStore::lock(&tasks).set_state(build, TaskState::Succeeded);
///
/// renderer.end(None)?;
/// ```
pub struct UpdateRenderer<D: Redraw + Send + 'static, K: Ticker = ThreadTicker> {
    tasks: SharedTasks,
    frame: Arc<Mutex<Frame<D>>>,
    ticker: K,
    handle: Option<K::Handle>,
    interval: Duration,
}

impl UpdateRenderer<FrameWriter<Stdout>> {
    /// Renders to stdout, with colors when stdout is a terminal.
    pub fn new(tasks: SharedTasks, options: RenderOptions) -> Self {
        let stdout = std::io::stdout();
        let theme = match stdout.is_terminal() {
            true => Theme::default(),
            false => Theme::plain(),
        };
        Self::with_redraw(tasks, options, FrameWriter::new(stdout)).theme(theme)
    }
}

impl<D: Redraw + Send + 'static> UpdateRenderer<D> {
    /// Renders through a custom redraw target.
    pub fn with_redraw(tasks: SharedTasks, options: RenderOptions, redraw: D) -> Self {
        Self::with_ticker(tasks, options, redraw, ThreadTicker)
    }
}

impl<D: Redraw + Send + 'static, K: Ticker> UpdateRenderer<D, K> {
    /// Renders through a custom redraw target, timed by `ticker`.
    pub fn with_ticker(tasks: SharedTasks, options: RenderOptions, redraw: D, ticker: K) -> Self {
        let frame = Frame {
            redraw,
            options,
            theme: Theme::default(),
            spinner: Spinner::default(),
            columns: Box::new(terminal_columns),
        };
        Self {
            tasks,
            frame: Arc::new(Mutex::new(frame)),
            ticker,
            handle: None,
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Set the repaint interval. Takes effect on the next [`render`](Self::render).
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn theme(self, theme: Theme) -> Self {
        lock(&self.frame).theme = theme;
        self
    }

    pub fn spinner(self, spinner: Spinner) -> Self {
        lock(&self.frame).spinner = spinner;
        self
    }

    /// Replace the terminal width source, queried once per frame.
    pub fn columns(self, columns: impl Fn() -> Option<usize> + Send + 'static) -> Self {
        lock(&self.frame).columns = Box::new(columns);
        self
    }

    pub fn options(&self) -> RenderOptions {
        lock(&self.frame).options
    }

    /// Whether the repaint timer is running.
    pub fn is_rendering(&self) -> bool {
        self.handle.is_some()
    }

    /// Starts repainting. Does nothing if already repainting.
    pub fn render(&mut self) -> Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }

        let frame = self.frame.clone();
        let tasks = self.tasks.clone();
        let tick = Box::new(move || {
            if let Err(error) = lock(&frame).render(&tasks) {
                warn!(%error, "failed to draw task tree");
            }
        });

        self.handle = Some(self.ticker.start(self.interval, tick)?);
        debug!(interval = ?self.interval, "started rendering");
        Ok(())
    }

    /// Stops repainting and draws the final state of the tree.
    ///
    /// With [`RenderOptions::clear_output`] set and no `error`, the rendered
    /// tree is erased. Otherwise it stays on screen and later output starts
    /// below it. Call this once per [`render`](Self::render).
    pub fn end(&mut self, error: Option<&dyn std::error::Error>) -> Result<()> {
        self.stop();

        let mut frame = lock(&self.frame);
        // The region is closed even when the last frame fails, so the
        // cursor is shown again.
        let drawn = frame.render(&self.tasks);

        let closed = match (frame.options.clear_output, error) {
            (true, None) => {
                debug!("clearing rendered tasks");
                frame.redraw.clear()
            }
            (_, error) => {
                if let Some(error) = error {
                    debug!(%error, "ending render after error");
                }
                frame.redraw.done()
            }
        };
        drawn?;
        closed?;
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.ticker.stop(handle);
            debug!("stopped rendering");
        }
    }
}

impl<D: Redraw + Send + 'static, K: Ticker> Drop for UpdateRenderer<D, K> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<D: Redraw + Send + 'static, K: Ticker> std::fmt::Debug for UpdateRenderer<D, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateRenderer")
            .field("interval", &self.interval)
            .field("rendering", &self.is_rendering())
            .finish()
    }
}
