/// A frame-based spinner animation shown next to running tasks.
///
/// The render session calls [`Spinner::tick`] once per frame and hands
/// [`Spinner::frame`] to the formatter through the render context.
#[derive(Debug, Clone)]
pub struct Spinner {
    frames: &'static [&'static str],
    index: usize,
}

impl Spinner {
    /// Braille dot spinner.
    pub fn dots() -> Self {
        Self {
            frames: &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
            index: 0,
        }
    }

    /// Classic line spinner, for terminals without braille glyphs.
    pub fn line() -> Self {
        Self {
            frames: &["-", "\\", "|", "/"],
            index: 0,
        }
    }

    /// Custom frames. An empty slice renders as a blank.
    pub fn custom(frames: &'static [&'static str]) -> Self {
        Self { frames, index: 0 }
    }

    /// Advance to the next frame.
    pub fn tick(&mut self) {
        if !self.frames.is_empty() {
            self.index = (self.index + 1) % self.frames.len();
        }
    }

    /// Current frame string.
    pub fn frame(&self) -> &'static str {
        self.frames.get(self.index).copied().unwrap_or(" ")
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::dots()
    }
}

impl std::fmt::Display for Spinner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.frame())
    }
}
