//! # jswsfmt
//!
//! Transpiles a small statically-typed expression language into a program
//! for the *Whitespace* esoteric VM, and optionally overlays (formats) the
//! generated program onto an arbitrary host text file so the host's
//! whitespace positions carry the program while its visible characters are
//! preserved.
//!
//! ## Pipeline
//!
//! The crate processes source through four stages:
//!
//! 1. **Lexer** - tokenizes UTF-8 source into a flat token stream
//! 2. **Parser** - recursive-descent/Pratt parse into a typed AST
//! 3. **Transpiler** - AST walk emitting Whitespace instructions
//! 4. **Formatter** - optional overlay onto a host text file
//!
//! ## Example
//!
//! ```rust,no_run
//! use jswsfmt::{lexer, parser, transpiler};
//!
//! let source = std::fs::read_to_string("program.jsws").unwrap();
//! let tokens = lexer::tokenize(&source).unwrap();
//! let program = parser::parse(tokens).unwrap();
//! let instructions = transpiler::transpile(&program).unwrap();
//!
//! let raw_program: String = instructions.iter().map(|i| i.to_string()).collect();
//! print!("{raw_program}");
//! ```

pub mod environment;
pub mod error;
pub mod formatter;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod transpiler;
