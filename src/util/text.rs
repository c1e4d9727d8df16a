use std::borrow::Cow;
use std::io::IsTerminal;

use unicode_width::UnicodeWidthChar;

const ELLIPSIS: char = '…';
const RESET: &str = "\x1b[0m";
const TAB_STOP: usize = 8;

/// Removes ANSI escape sequences from `text`.
pub fn strip_ansi(text: &str) -> String {
    strip_ansi_escapes::strip_str(text)
}

/// Number of terminal columns `text` occupies, ignoring escape sequences.
///
/// Control characters count as zero columns. Tabs depend on the cursor
/// position, so run text through [`expand_tabs`] before measuring it.
pub fn visible_width(text: &str) -> usize {
    let mut width = 0;
    for token in Tokens::new(text) {
        if let Token::Char(c) = token {
            width += c.width().unwrap_or(0);
        }
    }
    width
}

/// Replaces each tab with spaces up to the next tab stop (every 8 columns),
/// counting columns from the start of `text`.
pub fn expand_tabs(text: &str) -> Cow<'_, str> {
    if !text.contains('\t') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + TAB_STOP);
    let mut column = 0;
    for token in Tokens::new(text) {
        match token {
            Token::Escape(seq) => out.push_str(seq),
            Token::Char('\t') => {
                let pad = TAB_STOP - column % TAB_STOP;
                out.extend(std::iter::repeat_n(' ', pad));
                column += pad;
            }
            Token::Char(c) => {
                column += c.width().unwrap_or(0);
                out.push(c);
            }
        }
    }
    Cow::Owned(out)
}

/// Cuts `text` so it fits in `max_columns` terminal columns.
///
/// Escape sequences are kept and count as zero width. When anything is cut,
/// the kept prefix ends with `…`, followed by a style reset if any escape
/// sequence was kept.
pub fn truncate(text: &str, max_columns: usize) -> Cow<'_, str> {
    if visible_width(text) <= max_columns {
        return Cow::Borrowed(text);
    }
    if max_columns == 0 {
        return Cow::Borrowed("");
    }

    let budget = max_columns - 1;
    let mut out = String::with_capacity(text.len());
    let mut width = 0;
    let mut styled = false;

    for token in Tokens::new(text) {
        match token {
            Token::Escape(seq) => {
                styled = true;
                out.push_str(seq);
            }
            Token::Char(c) => {
                let w = c.width().unwrap_or(0);
                if width + w > budget {
                    break;
                }
                width += w;
                out.push(c);
            }
        }
    }

    out.push(ELLIPSIS);
    if styled {
        out.push_str(RESET);
    }
    Cow::Owned(out)
}

/// Current width of the terminal attached to stdout, or `None` when stdout
/// is not a terminal or its size cannot be queried.
pub fn terminal_columns() -> Option<usize> {
    if !std::io::stdout().is_terminal() {
        return None;
    }
    match crossterm::terminal::size() {
        Ok((0, _)) | Err(_) => None,
        Ok((columns, _)) => Some(columns as usize),
    }
}

enum Token<'a> {
    Char(char),
    Escape(&'a str),
}

/// Splits text into printable characters and whole escape sequences.
struct Tokens<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn escape_len(rest: &str) -> usize {
        let bytes = rest.as_bytes();
        match bytes.get(1) {
            // CSI: parameters and intermediates, then a final byte in @..~
            Some(b'[') => bytes[2..]
                .iter()
                .position(|b| (0x40..=0x7e).contains(b))
                .map_or(bytes.len(), |end| end + 3),
            // OSC: terminated by BEL or ST
            Some(b']') => {
                let body = &rest[2..];
                match (body.find('\x07'), body.find("\x1b\\")) {
                    (Some(bel), Some(st)) if st < bel => st + 4,
                    (Some(bel), _) => bel + 3,
                    (None, Some(st)) => st + 4,
                    (None, None) => bytes.len(),
                }
            }
            Some(_) => 1 + rest[1..].chars().next().map_or(0, char::len_utf8),
            None => 1,
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        let c = rest.chars().next()?;
        if c == '\x1b' {
            let len = Self::escape_len(rest);
            self.pos += len;
            return Some(Token::Escape(&rest[..len]));
        }
        self.pos += c.len_utf8();
        Some(Token::Char(c))
    }
}
