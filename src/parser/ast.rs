//! # Abstract Syntax Tree (AST)
//!
//! Two tagged sum types, `Statement` and `Expression`, replace the
//! marker-interface style of distinguishing the two node families. An
//! `ExprStmt` is the only bridge between them: it wraps an expression so it
//! can appear wherever a statement is expected.
//!
//! Every node carries the `Span` of its originating token for diagnostics.

use crate::error::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let {
        name: String,
        value: Expression,
        span: Span,
    },
    Assign {
        name: String,
        value: Expression,
        span: Span,
    },
    If {
        condition: Expression,
        consequent: Block,
        alternative: Option<Block>,
        span: Span,
    },
    For {
        declaration: Box<Statement>,
        boundary: Expression,
        increment: Expression,
        body: Block,
        span: Span,
    },
    Break {
        span: Span,
    },
    Continue {
        span: Span,
    },
    ExprStmt {
        expr: Expression,
        span: Span,
    },
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Let { span, .. }
            | Statement::Assign { span, .. }
            | Statement::If { span, .. }
            | Statement::For { span, .. }
            | Statement::Break { span }
            | Statement::Continue { span }
            | Statement::ExprStmt { span, .. } => *span,
        }
    }
}

/// A braced sequence of statements, e.g. the body of an `if` or `for`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrefixOperator {
    Minus,
    Bang,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuffixOperator {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InfixOperator {
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier {
        name: String,
        span: Span,
    },
    StringLit {
        value: String,
        span: Span,
    },
    /// Boolean literals desugar to 0/1 at parse time, so `IntLit` is the
    /// only literal-integer node the rest of the pipeline needs to handle.
    IntLit {
        value: i64,
        span: Span,
    },
    Prefix {
        operator: PrefixOperator,
        right: Box<Expression>,
        span: Span,
    },
    Infix {
        operator: InfixOperator,
        left: Box<Expression>,
        right: Box<Expression>,
        span: Span,
    },
    Suffix {
        operator: SuffixOperator,
        left: Box<Expression>,
        span: Span,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
        span: Span,
    },
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier { span, .. }
            | Expression::StringLit { span, .. }
            | Expression::IntLit { span, .. }
            | Expression::Prefix { span, .. }
            | Expression::Infix { span, .. }
            | Expression::Suffix { span, .. }
            | Expression::Call { span, .. } => *span,
        }
    }
}

pub type Program = Vec<Statement>;
