//! # Lexer
//!
//! Scans UTF-8 source text into a flat token stream. Lexing never fails on
//! an unrecognized character — it records an `Illegal` token and lets the
//! parser report it as a syntax error, the way an unexpected token of any
//! other kind would be. Only conditions the lexer itself cannot recover
//! from at all (an unterminated string, a reserved comment marker) abort
//! tokenization early.

mod cursor;
pub mod token;


use crate::error::{CompileError, ErrorKind, Result, Span};
use cursor::Cursor;
pub use token::{lookup_identifier, Token, TokenKind};

/// Tokenizes an entire source string, ending with a single `Eof` token.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();

    loop {
        let token = next_token(&mut cursor)?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }

    Ok(tokens)
}

fn skip_whitespace(cursor: &mut Cursor) {
    while let Some(ch) = cursor.peek() {
        if ch.is_whitespace() {
            cursor.advance();
        } else {
            break;
        }
    }
}

fn next_token(cursor: &mut Cursor) -> Result<Token> {
    skip_whitespace(cursor);

    let line = cursor.line();

    let Some(ch) = cursor.advance() else {
        return Ok(Token::new(TokenKind::Eof, "", line));
    };

    let token = match ch {
        '=' => {
            if cursor.peek_two().as_deref() == Some("==") {
                cursor.advance();
                cursor.advance();
                Token::new(TokenKind::Equals, "===", line)
            } else if cursor.peek() == Some('=') {
                cursor.advance();
                Token::new(TokenKind::Illegal, "==", line)
            } else {
                Token::new(TokenKind::Assign, "=", line)
            }
        }
        '!' => {
            if cursor.peek_two().as_deref() == Some("==") {
                cursor.advance();
                cursor.advance();
                Token::new(TokenKind::NotEquals, "!==", line)
            } else {
                Token::new(TokenKind::Bang, "!", line)
            }
        }
        '<' => {
            if cursor.peek() == Some('=') {
                cursor.advance();
                Token::new(TokenKind::LessThanOrEqual, "<=", line)
            } else {
                Token::new(TokenKind::LessThan, "<", line)
            }
        }
        '>' => {
            if cursor.peek() == Some('=') {
                cursor.advance();
                Token::new(TokenKind::GreaterThanOrEqual, ">=", line)
            } else {
                Token::new(TokenKind::GreaterThan, ">", line)
            }
        }
        '+' => {
            if cursor.peek() == Some('+') {
                cursor.advance();
                Token::new(TokenKind::Increment, "++", line)
            } else {
                Token::new(TokenKind::Plus, "+", line)
            }
        }
        '-' => {
            if cursor.peek() == Some('-') {
                cursor.advance();
                Token::new(TokenKind::Decrement, "--", line)
            } else {
                Token::new(TokenKind::Minus, "-", line)
            }
        }
        '&' => {
            if cursor.peek() == Some('&') {
                cursor.advance();
                Token::new(TokenKind::And, "&&", line)
            } else {
                Token::new(TokenKind::Illegal, "&", line)
            }
        }
        '|' => {
            if cursor.peek() == Some('|') {
                cursor.advance();
                Token::new(TokenKind::Or, "||", line)
            } else {
                Token::new(TokenKind::Illegal, "|", line)
            }
        }
        '/' => {
            if matches!(cursor.peek(), Some('/') | Some('*')) {
                return Err(CompileError::lex(
                    ErrorKind::ReservedCommentSyntax,
                    "comments are not permitted in source; they are a formatter-only construct",
                    Span::new(line),
                ));
            }
            Token::new(TokenKind::Slash, "/", line)
        }
        '*' => Token::new(TokenKind::Asterisk, "*", line),
        '%' => Token::new(TokenKind::Percent, "%", line),
        ',' => Token::new(TokenKind::Comma, ",", line),
        ';' => Token::new(TokenKind::Semicolon, ";", line),
        '(' => Token::new(TokenKind::LeftParen, "(", line),
        ')' => Token::new(TokenKind::RightParen, ")", line),
        '{' => Token::new(TokenKind::LeftBrace, "{", line),
        '}' => Token::new(TokenKind::RightBrace, "}", line),
        '\'' | '"' | '`' => lex_string(cursor, ch, line)?,
        c if c.is_ascii_digit() => lex_number(cursor, c, line),
        c if is_identifier_start(c) => lex_identifier(cursor, c, line),
        other => Token::new(TokenKind::Illegal, other.to_string(), line),
    };

    Ok(token)
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '.'
}

fn lex_identifier(cursor: &mut Cursor, first: char, line: usize) -> Token {
    let mut literal = String::new();
    literal.push(first);

    while let Some(ch) = cursor.peek() {
        if is_identifier_continue(ch) {
            literal.push(ch);
            cursor.advance();
        } else {
            break;
        }
    }

    let kind = lookup_identifier(&literal);
    Token::new(kind, literal, line)
}

fn lex_number(cursor: &mut Cursor, first: char, line: usize) -> Token {
    let mut literal = String::new();
    literal.push(first);

    while let Some(ch) = cursor.peek() {
        if ch.is_ascii_digit() {
            literal.push(ch);
            cursor.advance();
        } else {
            break;
        }
    }

    // Validated above to be all decimal digits; only i64 overflow can fail.
    match literal.parse::<i64>() {
        Ok(value) => Token::new(TokenKind::Int(value), literal, line),
        Err(_) => Token::new(TokenKind::Illegal, literal, line),
    }
}

fn lex_string(cursor: &mut Cursor, quote: char, start_line: usize) -> Result<Token> {
    let mut literal = String::new();

    loop {
        match cursor.peek() {
            None => {
                return Err(CompileError::lex(
                    ErrorKind::UnterminatedString,
                    "string literal is missing its closing quote",
                    Span::new(start_line),
                ))
            }
            Some(c) if c == quote => {
                cursor.advance();
                break;
            }
            Some('\\') => {
                cursor.advance();
                match cursor.advance() {
                    Some(escaped) => literal.push(escaped),
                    None => {
                        return Err(CompileError::lex(
                            ErrorKind::InvalidEscape,
                            "string literal ends with a dangling '\\'",
                            Span::new(start_line),
                        ))
                    }
                }
            }
            Some(c) => {
                cursor.advance();
                literal.push(c);
            }
        }
    }

    Ok(Token::new(TokenKind::String, literal, start_line))
}
