use owo_colors::OwoColorize;

/// Applies ANSI styling, or passes text through untouched when disabled.
///
/// ```rust,ignore
/// let style = Style::colored();
/// writeln!(f, "{} {}", style.green("✔"), style.dim("[skipped]"))?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    colored: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self::colored()
    }
}

impl Style {
    pub fn colored() -> Self {
        Self { colored: true }
    }

    /// Identity styling, for non-interactive output and tests.
    pub fn plain() -> Self {
        Self { colored: false }
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(text, |t| t.dimmed().to_string())
    }

    pub fn yellow(&self, text: &str) -> String {
        self.paint(text, |t| t.yellow().to_string())
    }

    pub fn green(&self, text: &str) -> String {
        self.paint(text, |t| t.green().to_string())
    }

    pub fn red(&self, text: &str) -> String {
        self.paint(text, |t| t.red().to_string())
    }

    fn paint(&self, text: &str, f: impl FnOnce(&str) -> String) -> String {
        match self.colored {
            true => f(text),
            false => text.to_string(),
        }
    }
}

/// Glyphs used for task states and output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbols {
    pub tick: &'static str,
    pub cross: &'static str,
    pub pointer: &'static str,
    pub arrow_down: &'static str,
    pub arrow_right: &'static str,
}

impl Default for Symbols {
    fn default() -> Self {
        Self::unicode()
    }
}

impl Symbols {
    pub fn unicode() -> Self {
        Self {
            tick: "✔",
            cross: "✖",
            pointer: "❯",
            arrow_down: "↓",
            arrow_right: "→",
        }
    }

    /// Fallback set for consoles with limited glyph coverage.
    pub fn ascii() -> Self {
        Self {
            tick: "√",
            cross: "×",
            pointer: ">",
            arrow_down: "↓",
            arrow_right: "→",
        }
    }
}
