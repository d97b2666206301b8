//! # Whitespace IR
//!
//! A closed set of instruction constructors, each producing the exact
//! Whitespace token sequence for one VM operation. The transpiler never
//! builds a token sequence by hand — it always goes through one of these.

use std::fmt;

/// One token of the Whitespace alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WsToken {
    Space,
    Tab,
    Lf,
}

impl WsToken {
    pub fn as_char(self) -> char {
        match self {
            WsToken::Space => ' ',
            WsToken::Tab => '\t',
            WsToken::Lf => '\n',
        }
    }
}

impl fmt::Display for WsToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One Whitespace operation, as an ordered token body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub body: Vec<WsToken>,
}

impl Instruction {
    fn new(body: Vec<WsToken>) -> Self {
        Self { body }
    }

    pub fn tokens(&self) -> &[WsToken] {
        &self.body
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.body {
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

use WsToken::{Lf, Space as S, Tab as T};

/// Sign token followed by the binary digits of `abs(n)` (MSB first, `S`=0 /
/// `T`=1), terminated by `LF`. Zero is the sign token alone plus `LF`.
fn number(n: i64) -> Vec<WsToken> {
    let mut body = vec![if n >= 0 { S } else { T }];
    let magnitude = n.unsigned_abs();

    if magnitude > 0 {
        let width = u64::BITS - magnitude.leading_zeros();
        for i in (0..width).rev() {
            body.push(if (magnitude >> i) & 1 == 1 { T } else { S });
        }
    }

    body.push(Lf);
    body
}

/// Boolean sentinel values used by comparison/logical lowering.
pub const TRUE: i64 = 1;
pub const FALSE: i64 = 0;

pub fn push(n: i64) -> Instruction {
    let mut body = vec![S, S];
    body.extend(number(n));
    Instruction::new(body)
}

pub fn duplicate() -> Instruction {
    Instruction::new(vec![S, Lf, S])
}

pub fn swap() -> Instruction {
    Instruction::new(vec![S, Lf, T])
}

pub fn copy_nth(n: i64) -> Instruction {
    let mut body = vec![S, T, S];
    body.extend(number(n));
    Instruction::new(body)
}

pub fn add() -> Instruction {
    Instruction::new(vec![T, S, S, S])
}

pub fn subtract() -> Instruction {
    Instruction::new(vec![T, S, S, T])
}

pub fn multiply() -> Instruction {
    Instruction::new(vec![T, S, S, Lf])
}

pub fn divide() -> Instruction {
    Instruction::new(vec![T, S, T, S])
}

pub fn modulo() -> Instruction {
    Instruction::new(vec![T, S, T, T])
}

pub fn heap_store() -> Instruction {
    Instruction::new(vec![T, T, S])
}

pub fn heap_retrieve() -> Instruction {
    Instruction::new(vec![T, T, T])
}

pub fn label(id: i64) -> Instruction {
    let mut body = vec![Lf, S, S];
    body.extend(number(id));
    Instruction::new(body)
}

pub fn jump(id: i64) -> Instruction {
    let mut body = vec![Lf, S, Lf];
    body.extend(number(id));
    Instruction::new(body)
}

pub fn jump_if_zero(id: i64) -> Instruction {
    let mut body = vec![Lf, T, S];
    body.extend(number(id));
    Instruction::new(body)
}

pub fn jump_if_negative(id: i64) -> Instruction {
    let mut body = vec![Lf, T, T];
    body.extend(number(id));
    Instruction::new(body)
}

pub fn print_char() -> Instruction {
    Instruction::new(vec![T, Lf, S, S])
}

pub fn print_int() -> Instruction {
    Instruction::new(vec![T, Lf, S, T])
}

pub fn end_program() -> Instruction {
    Instruction::new(vec![Lf, Lf, Lf])
}

/// A token sequence the formatter pads whitespace positions with once the
/// real instruction stream runs dry.
pub fn noop() -> Instruction {
    Instruction::new(vec![S, T, Lf, S, Lf])
}
