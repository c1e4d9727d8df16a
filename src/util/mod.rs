//! Rendering primitives used by the formatter.
//!
//! # Styling and symbols
//!
//! [`Style`] applies colors through `owo-colors` and can be switched off for
//! plain output. [`Symbols`] holds the glyphs drawn for each task state:
//!
//! ```text
//!  ✔ compile
//!  ❯ test
//!    ⠹ unit
//!       → running 12 tests
//!  ✖ deploy
//!  ↓ publish [skipped]
//! ```
//!
//! # Spinner
//!
//! [`Spinner`] cycles through animation frames on each [`tick`](Spinner::tick).
//!
//! # Text
//!
//! [`truncate`] cuts a line to a column budget, measuring with
//! `unicode-width` and treating escape sequences as zero width:
//!
//! ```rust,ignore
//! assert_eq!(truncate("hello world", 8), "hello w…");
//! ```
//!
//! Tabs are expanded with [`expand_tabs`] before measuring, since their
//! width depends on where they start.

mod spinner;
mod style;
mod text;

pub use spinner::*;
pub use style::*;
pub use text::*;
