//! # Environment
//!
//! Name → value bindings. The source language has no user-defined functions
//! or closures, so there is exactly one flat scope for the whole program —
//! no nested lexical environments to chain lookups through.
//!
//! Uses a `Vec<(String, Value)>` rather than a `HashMap`, mirroring the
//! insertion-ordered symbol table the original assembler pipeline used for
//! its label table: programs in this language are small, so a linear scan
//! is adequate and keeps iteration order observable for diagnostics.

/// The runtime tag the transpiler assigns to every non-void result.
///
/// `Integer` and each character of a `String` carry a heap address that has
/// already had an initializing `store` emitted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Void,
    Integer(i64),
    String(Vec<i64>),
    BuiltIn(Builtin),
}

/// Built-in functions callable from source. Currently a singleton set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    ConsoleLog,
}

/// Outcome of assigning to an already-declared name, distinguishing a
/// successful write from "no such binding" without forcing callers to do a
/// separate lookup first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    Assigned,
    Undeclared,
}

/// Insertion-only flat name → value mapping.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    entries: Vec<(String, Value)>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Binds a fresh name. Callers must check `is_declared` first — this
    /// does not itself guard against redeclaration, matching the
    /// spec-level split between "declare" and "the check that invokes it".
    pub fn declare(&mut self, name: impl Into<String>, value: Value) {
        self.entries.push((name.into(), value));
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Overwrites the value bound to an existing name in place, preserving
    /// its position so earlier references by heap address remain valid
    /// where the caller keeps the address (integers reuse their slot;
    /// assignment itself still emits a store into that same address).
    pub fn assign_existing(&mut self, name: &str, value: Value) -> AssignOutcome {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => {
                entry.1 = value;
                AssignOutcome::Assigned
            }
            None => AssignOutcome::Undeclared,
        }
    }
}

/// Per-loop pair of labels enabling `break`/`continue` lowering, threaded
/// explicitly through statement dispatch rather than kept as a stack on the
/// transpiler — expression transpilation never needs it.
#[derive(Debug, Clone, Copy)]
pub struct ScopeContext {
    pub control_label: i64,
    pub end_label: i64,
}
