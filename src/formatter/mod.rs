//! # Formatter
//!
//! Overlays an emitted instruction stream onto an arbitrary host text file:
//! the host's whitespace positions become the Whitespace program while its
//! visible characters and in-string/in-comment layout are preserved. The
//! result is simultaneously a valid Whitespace program (stripped of every
//! byte outside {SPACE, TAB, LINE_FEED}) and a readable text file.
//!
//! The instruction list's final entry is always the end-of-program marker
//! (§4.A `end_program`); its body is never woven into the host — it is
//! appended once, verbatim, after the host is fully consumed. Everything
//! before it is the token stream `I` this module draws from.

#[cfg(test)]
mod tests;

use std::io::{Read, Write};

use crate::error::Result;
use crate::ir::{self, Instruction, WsToken};

/// Figure space — visually a space, outside the Whitespace alphabet.
const PLACEHOLDER_SPACE: char = '\u{2007}';
/// Line separator — visually a line break, outside the Whitespace alphabet.
const PLACEHOLDER_NEWLINE: char = '\u{2028}';

/// Weaves `instructions` through `host`'s whitespace positions and writes
/// the overlaid result to `sink`. Reads the whole host into memory (hosts
/// are text source files, not large binaries) but writes to `sink`
/// incrementally rather than buffering the formatted output in a `String`.
pub fn format<R: Read, W: Write>(mut host: R, instructions: &[Instruction], mut sink: W) -> Result<()> {
    let mut host_text = String::new();
    host.read_to_string(&mut host_text)?;

    let body_end = instructions.len().saturating_sub(1);
    let mut stream = TokenStream::new(&instructions[..body_end]);
    let final_tokens: &[WsToken] = instructions.last().map(Instruction::tokens).unwrap_or(&[]);

    let mut cursor = HostCursor::new(&host_text);
    let mut out = String::with_capacity(host_text.len());

    while let Some(ch) = cursor.peek() {
        match ch {
            ' ' | '\t' => {
                cursor.advance();
                if cursor.peek_two().as_deref() == Some("=>") && stream.peek() == WsToken::Lf {
                    out.push(PLACEHOLDER_SPACE);
                } else {
                    out.push(stream.next().as_char());
                }
            }
            '\n' => {
                cursor.advance();
                for token in stream.next_until_lf() {
                    out.push(token.as_char());
                }
            }
            '"' | '\'' | '`' => {
                let quote = ch;
                cursor.advance();
                let body = read_balanced_string(&mut cursor, quote);
                out.push(quote);
                sanitize_into(&body, &mut out);
                out.push(quote);
            }
            '/' if cursor.peek_second() == Some('/') => {
                cursor.advance();
                cursor.advance();
                let body = read_line_comment(&mut cursor);
                out.push_str("//");
                sanitize_into(&body, &mut out);
                for token in stream.next_until_lf() {
                    out.push(token.as_char());
                }
            }
            '/' if cursor.peek_second() == Some('*') => {
                cursor.advance();
                cursor.advance();
                let body = read_block_comment(&mut cursor);
                out.push_str("/*");
                sanitize_into(&body, &mut out);
                out.push_str("*/");
            }
            other => {
                cursor.advance();
                out.push(other);
            }
        }
    }

    for token in stream.remaining() {
        out.push(token.as_char());
    }
    for token in final_tokens {
        out.push(token.as_char());
    }

    sink.write_all(out.as_bytes())?;
    sink.flush()?;
    Ok(())
}

/// Replaces the three Whitespace-alphabet characters inside string and
/// comment bodies with printable-looking substitutes, so preserved source
/// text never pollutes the emitted token stream.
fn sanitize_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            ' ' => out.push(PLACEHOLDER_SPACE),
            '\t' => {
                for _ in 0..4 {
                    out.push(PLACEHOLDER_SPACE);
                }
            }
            '\n' => out.push(PLACEHOLDER_NEWLINE),
            other => out.push(other),
        }
    }
}

/// Reads a quote-matched string body from the host, `\`-escape aware.
/// Backslashes are preserved in the returned body — the formatter
/// reproduces host text rather than interpreting it the way the lexer
/// does, it only needs escapes to avoid ending on an escaped quote.
fn read_balanced_string(cursor: &mut HostCursor, quote: char) -> String {
    let mut body = String::new();
    loop {
        match cursor.peek() {
            None => break,
            Some(c) if c == quote => {
                cursor.advance();
                break;
            }
            Some('\\') => {
                body.push('\\');
                cursor.advance();
                if let Some(escaped) = cursor.peek() {
                    body.push(escaped);
                    cursor.advance();
                }
            }
            Some(c) => {
                body.push(c);
                cursor.advance();
            }
        }
    }
    body
}

/// Reads to (and consumes) the line's terminating `\n`; the body excludes
/// it. Consuming the newline here — rather than leaving it for the next
/// loop iteration's `'\n'` case — is what lets this arm also drain `I` up
/// to the next `LF` token in the same step, per the formatter's table.
fn read_line_comment(cursor: &mut HostCursor) -> String {
    let mut body = String::new();
    while let Some(c) = cursor.peek() {
        cursor.advance();
        if c == '\n' {
            break;
        }
        body.push(c);
    }
    body
}

/// Reads up to (and consumes) the closing `*/`. A block comment never
/// consumes any `I` tokens, even across the newlines it may contain.
fn read_block_comment(cursor: &mut HostCursor) -> String {
    let mut body = String::new();
    loop {
        match cursor.peek() {
            None => break,
            Some('*') if cursor.peek_second() == Some('/') => {
                cursor.advance();
                cursor.advance();
                break;
            }
            Some(c) => {
                body.push(c);
                cursor.advance();
            }
        }
    }
    body
}

/// One-and-two-rune lookahead over the host text, mirroring
/// `lexer::cursor::Cursor` but without line tracking — the formatter
/// reports no diagnostics, so it has no use for source positions.
struct HostCursor<'a> {
    rest: &'a str,
}

impl<'a> HostCursor<'a> {
    fn new(source: &'a str) -> Self {
        Self { rest: source }
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest.chars().nth(1)
    }

    fn peek_two(&self) -> Option<String> {
        let mut chars = self.rest.chars();
        let first = chars.next()?;
        let second = chars.next()?;
        Some([first, second].iter().collect())
    }

    fn advance(&mut self) -> Option<char> {
        let mut chars = self.rest.chars();
        let ch = chars.next()?;
        self.rest = chars.as_str();
        Some(ch)
    }
}

/// Demand-driven view over the flattened non-final instruction tokens.
/// Pulling past the end pads with `Noop` instructions rather than
/// returning `None` — the Whitespace VM ignores bytes outside its
/// alphabet, so a bare, tokenless space in the output would silently
/// merge with whatever real tokens surround it; padding makes every
/// space/tab position carry an explicit token boundary.
struct TokenStream {
    tokens: Vec<WsToken>,
    pos: usize,
}

impl TokenStream {
    fn new(instructions: &[Instruction]) -> Self {
        let mut tokens = Vec::new();
        for instruction in instructions {
            tokens.extend_from_slice(instruction.tokens());
        }
        Self { tokens, pos: 0 }
    }

    fn pad_if_exhausted(&mut self) {
        if self.pos >= self.tokens.len() {
            self.tokens.extend_from_slice(ir::noop().tokens());
        }
    }

    fn peek(&mut self) -> WsToken {
        self.pad_if_exhausted();
        self.tokens[self.pos]
    }

    fn next(&mut self) -> WsToken {
        self.pad_if_exhausted();
        let token = self.tokens[self.pos];
        self.pos += 1;
        token
    }

    /// Consumes tokens up to and including the next `LF`, padding with
    /// `Noop` if necessary — `Noop`'s body itself contains an `LF`, so this
    /// always terminates.
    fn next_until_lf(&mut self) -> Vec<WsToken> {
        let mut out = Vec::new();
        loop {
            let token = self.next();
            out.push(token);
            if token == WsToken::Lf {
                break;
            }
        }
        out
    }

    /// The unconsumed tail, without triggering padding — used only once,
    /// at host EOF, to flush whatever real tokens are still left.
    fn remaining(&self) -> &[WsToken] {
        if self.pos >= self.tokens.len() {
            &[]
        } else {
            &self.tokens[self.pos..]
        }
    }
}
