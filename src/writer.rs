use std::io::Write;

const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

/// A terminal region that can be rewritten in place.
pub trait Redraw {
    /// Replaces the previously drawn region with `text`.
    fn draw(&mut self, text: &str) -> std::io::Result<()>;

    /// Erases the drawn region.
    fn clear(&mut self) -> std::io::Result<()>;

    /// Commits the drawn region: later draws start below it.
    fn done(&mut self) -> std::io::Result<()>;
}

/// Write target with ANSI cursor control for frame clearing.
///
/// Counts the lines it writes so the next [`Redraw::draw`] can move the
/// cursor back up and erase them before writing the new frame.
///
/// ```rust,ignore
/// let mut region = FrameWriter::new(std::io::stderr());
/// region.draw(" ⠋ build")?;
/// region.draw(" ✔ build")?;
/// region.done()?;
/// ```
pub struct FrameWriter<W: Write> {
    target: W,
    frame_lines: usize,
    hide_cursor: bool,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(target: W) -> Self {
        Self {
            target,
            frame_lines: 0,
            hide_cursor: true,
        }
    }

    /// Whether to hide the cursor while a frame is on screen. Enabled by default.
    pub fn hide_cursor(mut self, yes: bool) -> Self {
        self.hide_cursor = yes;
        self
    }

    /// Number of lines currently drawn in the active region.
    pub fn frame_lines(&self) -> usize {
        self.frame_lines
    }

    pub fn get_ref(&self) -> &W {
        &self.target
    }

    pub fn into_inner(self) -> W {
        self.target
    }

    fn clear_frame(&mut self) -> std::io::Result<()> {
        let lines_drawn = self.frame_lines;
        if lines_drawn > 0 {
            write!(self.target, "\r\x1b[{}A\x1b[2K\x1b[J", lines_drawn)?;
        }
        self.frame_lines = 0;
        Ok(())
    }

    fn show_cursor(&mut self) -> std::io::Result<()> {
        if self.hide_cursor {
            self.target.write_all(SHOW_CURSOR.as_bytes())?;
        }
        Ok(())
    }
}

impl<W: Write> Redraw for FrameWriter<W> {
    fn draw(&mut self, text: &str) -> std::io::Result<()> {
        self.clear_frame()?;
        if self.hide_cursor {
            self.target.write_all(HIDE_CURSOR.as_bytes())?;
        }
        self.target.write_all(text.as_bytes())?;
        self.target.write_all(b"\n")?;
        self.frame_lines = text.matches('\n').count() + 1;
        self.target.flush()
    }

    fn clear(&mut self) -> std::io::Result<()> {
        self.clear_frame()?;
        self.show_cursor()?;
        self.target.flush()
    }

    fn done(&mut self) -> std::io::Result<()> {
        self.frame_lines = 0;
        self.show_cursor()?;
        self.target.flush()
    }
}

impl<W: Write> std::fmt::Debug for FrameWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameWriter")
            .field("frame_lines", &self.frame_lines)
            .field("hide_cursor", &self.hide_cursor)
            .finish()
    }
}
