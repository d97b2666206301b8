//! # Cursor
//!
//! UTF-8 code-point navigation through the source text, with one- and
//! two-rune lookahead and line tracking.
//!
//! Source files in this language are tiny, so the whole source is read
//! into a `String` up front and lookahead is satisfied by slicing the
//! remaining `&str` directly rather than buffering bytes from a streaming
//! reader; no separate pushback buffer is needed.

/// A cursor for iterating through source code by Unicode scalar value.
pub struct Cursor<'a> {
    rest: &'a str,
    previous: Option<char>,
    line: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            rest: source,
            previous: None,
            line: 1,
        }
    }

    /// The current line number (1-indexed).
    pub fn line(&self) -> usize {
        self.line
    }

    /// The last character consumed by `advance`, if any.
    ///
    /// Used by string scanning to tell an escaped quote (`previous == '\\'`)
    /// apart from a closing quote.
    pub fn previous(&self) -> Option<char> {
        self.previous
    }

    pub fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// Peek the next two runes as a two-character string, for multi-char
    /// operator recognition (`===`, `!==`, `<=`, `>=`, `++`, `--`, `&&`, `||`).
    pub fn peek_two(&self) -> Option<String> {
        let mut chars = self.rest.chars();
        let first = chars.next()?;
        let second = chars.next()?;
        Some([first, second].iter().collect())
    }

    /// Advance past the current rune and return it.
    pub fn advance(&mut self) -> Option<char> {
        let mut chars = self.rest.chars();
        let ch = chars.next()?;
        self.rest = chars.as_str();

        if ch == '\n' {
            self.line += 1;
        }

        self.previous = Some(ch);
        Some(ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_line_number_across_newlines() {
        let mut cursor = Cursor::new("a\nb\nc");
        assert_eq!(cursor.line(), 1);
        cursor.advance();
        assert_eq!(cursor.line(), 1);
        cursor.advance(); // consumes '\n'
        assert_eq!(cursor.line(), 2);
    }

    #[test]
    fn peek_two_handles_multibyte_utf8() {
        let cursor = Cursor::new("\u{00e9}!x");
        assert_eq!(cursor.peek(), Some('\u{00e9}'));
        assert_eq!(cursor.peek_two(), Some("\u{00e9}!".to_string()));
    }

    #[test]
    fn peek_two_none_at_end() {
        let cursor = Cursor::new("a");
        assert_eq!(cursor.peek_two(), None);
    }

    #[test]
    fn previous_tracks_last_advanced_char() {
        let mut cursor = Cursor::new("ab");
        assert_eq!(cursor.previous(), None);
        cursor.advance();
        assert_eq!(cursor.previous(), Some('a'));
    }
}
