//! # Transpiler
//!
//! Walks the AST once, simultaneously type-classifying each node to one of
//! three runtime tags (`Integer`, `String`, `Void`) and emitting the
//! Whitespace instructions that materialize its value. Every non-`Void`
//! result's canonical representation is a heap address: an `Integer` tag
//! carries one, a `String` tag carries one per character. Nothing is ever
//! pushed to the stack and left there across statements — every
//! intermediate result is immediately spilled to a fresh heap slot.

#[cfg(test)]
mod tests;

use crate::environment::{AssignOutcome, Builtin, Environment, ScopeContext, Value};
use crate::error::{CompileError, ErrorKind, Result, Span};
use crate::ir::{self, Instruction};
use crate::parser::ast::{
    Block, Expression, InfixOperator, PrefixOperator, Program, Statement, SuffixOperator,
};

pub fn transpile(program: &Program) -> Result<Vec<Instruction>> {
    let mut transpiler = Transpiler::new();
    for statement in program {
        transpiler.transpile_statement(statement, None)?;
    }
    transpiler.instructions.push(ir::end_program());
    Ok(transpiler.instructions)
}

struct Transpiler {
    instructions: Vec<Instruction>,
    heap_next: i64,
    label_next: i64,
    env: Environment,
}

impl Transpiler {
    fn new() -> Self {
        Self {
            instructions: Vec::new(),
            heap_next: 0,
            label_next: 0,
            env: Environment::new(),
        }
    }

    fn next_heap(&mut self) -> i64 {
        self.heap_next += 1;
        self.heap_next
    }

    fn next_label(&mut self) -> i64 {
        self.label_next += 1;
        self.label_next
    }

    fn begin_store(&mut self, addr: i64) {
        self.instructions.push(ir::push(addr));
    }

    fn end_store(&mut self) {
        self.instructions.push(ir::heap_store());
    }

    fn emit_store_literal(&mut self, addr: i64, value: i64) {
        self.begin_store(addr);
        self.instructions.push(ir::push(value));
        self.end_store();
    }

    fn emit_retrieve(&mut self, addr: i64) {
        self.instructions.push(ir::push(addr));
        self.instructions.push(ir::heap_retrieve());
    }

    /// Pushes `addr`, swaps it beneath the value already sitting on top of
    /// the stack, then stores — the inverse of `begin_store`/`end_store`,
    /// needed whenever the value isn't the only thing pushed since the
    /// operands were retrieved (`emit_binary_operand_setup` leaves a
    /// garbage copy of `h1` underneath, so the address has to be pushed
    /// and swapped in *after* the op runs, not before it).
    fn store_top_of_stack(&mut self, addr: i64) {
        self.instructions.push(ir::push(addr));
        self.instructions.push(ir::swap());
        self.instructions.push(ir::heap_store());
    }

    /// Loads both operands onto the stack in order, ready for a binary
    /// arithmetic or comparison instruction. Leaves a garbage duplicate of
    /// `h1`'s value underneath the two operands — callers must store the
    /// op's result with `store_top_of_stack`, never a plain `end_store`,
    /// or that garbage value gets mistaken for the destination address.
    fn emit_binary_operand_setup(&mut self, h1: i64, h2: i64) {
        self.emit_retrieve(h1);
        self.emit_retrieve(h2);
        self.instructions.push(ir::copy_nth(1));
        self.instructions.push(ir::swap());
    }

    fn emit_arithmetic(&mut self, op: Instruction, h1: i64, h2: i64) -> i64 {
        self.emit_binary_operand_setup(h1, h2);
        self.instructions.push(op);
        let result = self.next_heap();
        self.store_top_of_stack(result);
        result
    }

    /// Lowers a comparison to subtraction plus a conditional jump, per the
    /// `match`/`end` label scheme: the checks configured for `op` jump to
    /// `match` when they fire; the fallthrough path (neither check fires)
    /// pushes the opposite of `op`'s matching boolean.
    fn emit_comparison(&mut self, op: &InfixOperator, h1: i64, h2: i64) -> i64 {
        let (zero_check, sign_check, matching) = comparison_shape(op);
        let match_label = self.next_label();
        let end_label = self.next_label();

        if zero_check {
            self.emit_binary_operand_setup(h1, h2);
            self.instructions.push(ir::subtract());
            self.instructions.push(ir::jump_if_zero(match_label));
        }
        if sign_check {
            self.emit_binary_operand_setup(h1, h2);
            self.instructions.push(ir::subtract());
            self.instructions.push(ir::jump_if_negative(match_label));
        }

        self.instructions.push(ir::push(negate_bool(matching)));
        self.instructions.push(ir::jump(end_label));
        self.instructions.push(ir::label(match_label));
        self.instructions.push(ir::push(matching));
        self.instructions.push(ir::label(end_label));

        let result = self.next_heap();
        self.store_top_of_stack(result);
        result
    }

    /// Short-circuit-shaped lowering of `&&`: if `left == 0` the result is
    /// `FALSE`; otherwise the result follows `right == 0`.
    fn emit_logical_and(&mut self, left_h: i64, right_h: i64) -> i64 {
        let l_false = self.next_label();
        let l_end = self.next_label();
        let result = self.next_heap();

        self.begin_store(result);
        self.emit_retrieve(left_h);
        self.instructions.push(ir::jump_if_zero(l_false));
        self.emit_retrieve(right_h);
        self.instructions.push(ir::jump_if_zero(l_false));
        self.instructions.push(ir::push(ir::TRUE));
        self.instructions.push(ir::jump(l_end));
        self.instructions.push(ir::label(l_false));
        self.instructions.push(ir::push(ir::FALSE));
        self.instructions.push(ir::label(l_end));
        self.end_store();

        result
    }

    /// Mirror of `emit_logical_and`: if `left != 0` the result is `TRUE`;
    /// otherwise it follows `right != 0`.
    fn emit_logical_or(&mut self, left_h: i64, right_h: i64) -> i64 {
        let l_check_right = self.next_label();
        let l_false = self.next_label();
        let l_end = self.next_label();
        let result = self.next_heap();

        self.begin_store(result);
        self.emit_retrieve(left_h);
        self.instructions.push(ir::jump_if_zero(l_check_right));
        self.instructions.push(ir::push(ir::TRUE));
        self.instructions.push(ir::jump(l_end));
        self.instructions.push(ir::label(l_check_right));
        self.emit_retrieve(right_h);
        self.instructions.push(ir::jump_if_zero(l_false));
        self.instructions.push(ir::push(ir::TRUE));
        self.instructions.push(ir::jump(l_end));
        self.instructions.push(ir::label(l_false));
        self.instructions.push(ir::push(ir::FALSE));
        self.instructions.push(ir::label(l_end));
        self.end_store();

        result
    }

    fn transpile_block(&mut self, block: &Block, ctx: Option<ScopeContext>) -> Result<()> {
        for statement in &block.statements {
            self.transpile_statement(statement, ctx)?;
        }
        Ok(())
    }

    fn transpile_statement(&mut self, stmt: &Statement, ctx: Option<ScopeContext>) -> Result<()> {
        match stmt {
            Statement::Let { name, value, span } => {
                if self.env.is_declared(name) {
                    return Err(CompileError::semantic(
                        ErrorKind::Redeclaration,
                        format!("'{name}' is already declared"),
                        *span,
                    ));
                }
                let value = self.transpile_expression(value)?;
                self.env.declare(name.clone(), value);
                Ok(())
            }
            Statement::Assign { name, value, span } => self.transpile_assign(name, value, *span),
            Statement::If {
                condition,
                consequent,
                alternative,
                span,
            } => self.transpile_if(condition, consequent, alternative.as_ref(), *span, ctx),
            Statement::For {
                declaration,
                boundary,
                increment,
                body,
                span,
            } => self.transpile_for(declaration, boundary, increment, body, *span),
            Statement::Break { span } => match ctx {
                Some(ctx) => {
                    self.instructions.push(ir::jump(ctx.end_label));
                    Ok(())
                }
                None => Err(CompileError::semantic(
                    ErrorKind::BreakOutsideLoop,
                    "'break' used outside of a loop",
                    *span,
                )),
            },
            Statement::Continue { span } => match ctx {
                Some(ctx) => {
                    self.instructions.push(ir::jump(ctx.control_label));
                    Ok(())
                }
                None => Err(CompileError::semantic(
                    ErrorKind::ContinueOutsideLoop,
                    "'continue' used outside of a loop",
                    *span,
                )),
            },
            Statement::ExprStmt { expr, .. } => {
                self.transpile_expression(expr)?;
                Ok(())
            }
        }
    }

    fn transpile_assign(&mut self, name: &str, value: &Expression, span: Span) -> Result<()> {
        let existing = self.env.lookup(name).cloned().ok_or_else(|| {
            CompileError::semantic(
                ErrorKind::UndeclaredAssignment,
                format!("assignment to undeclared name '{name}'"),
                span,
            )
        })?;

        let new_value = self.transpile_expression(value)?;

        let rebound = match (&existing, &new_value) {
            (Value::Integer(dest), Value::Integer(src)) => {
                self.begin_store(*dest);
                self.emit_retrieve(*src);
                self.end_store();
                Value::Integer(*dest)
            }
            (Value::String(_), Value::String(_)) => {
                return Err(CompileError::semantic(
                    ErrorKind::TypeMismatch,
                    "runtime assignment of String values is not supported; \
                     the target VM has no string allocator",
                    span,
                ))
            }
            _ => {
                return Err(CompileError::semantic(
                    ErrorKind::TypeMismatch,
                    format!("type mismatch assigning to '{name}'"),
                    span,
                ))
            }
        };

        match self.env.assign_existing(name, rebound) {
            AssignOutcome::Assigned => Ok(()),
            AssignOutcome::Undeclared => {
                unreachable!("existence already confirmed by the lookup above")
            }
        }
    }

    fn transpile_if(
        &mut self,
        condition: &Expression,
        consequent: &Block,
        alternative: Option<&Block>,
        span: Span,
        ctx: Option<ScopeContext>,
    ) -> Result<()> {
        let l_else = self.next_label();
        let l_end = self.next_label();

        let cond_addr = match self.transpile_expression(condition)? {
            Value::Integer(addr) => addr,
            _ => {
                return Err(CompileError::semantic(
                    ErrorKind::TypeMismatch,
                    "'if' condition must be an integer",
                    span,
                ))
            }
        };
        self.emit_retrieve(cond_addr);
        self.instructions.push(ir::jump_if_zero(l_else));

        self.transpile_block(consequent, ctx)?;
        self.instructions.push(ir::jump(l_end));

        self.instructions.push(ir::label(l_else));
        if let Some(alt) = alternative {
            self.transpile_block(alt, ctx)?;
        }
        self.instructions.push(ir::label(l_end));

        Ok(())
    }

    fn transpile_for(
        &mut self,
        declaration: &Statement,
        boundary: &Expression,
        increment: &Expression,
        body: &Block,
        span: Span,
    ) -> Result<()> {
        let Statement::Let { name: iter_name, .. } = declaration else {
            return Err(CompileError::semantic(
                ErrorKind::UnexpectedToken,
                "for-loop header must declare its iterator with 'let'",
                span,
            ));
        };

        let l_ctl = self.next_label();
        let l_body = self.next_label();
        let l_end = self.next_label();

        self.transpile_statement(declaration, None)?;

        let boundary_addr = self.expect_integer(self.transpile_expression(boundary)?, span)?;
        self.emit_retrieve(boundary_addr);
        self.instructions.push(ir::jump_if_zero(l_end));
        self.instructions.push(ir::jump(l_body));

        self.instructions.push(ir::label(l_ctl));
        let increment_addr = self.expect_integer(self.transpile_expression(increment)?, span)?;
        let iter_addr = match self.env.lookup(iter_name) {
            Some(Value::Integer(addr)) => *addr,
            _ => {
                return Err(CompileError::semantic(
                    ErrorKind::TypeMismatch,
                    format!("for-loop iterator '{iter_name}' must be an integer"),
                    span,
                ))
            }
        };
        self.begin_store(iter_addr);
        self.emit_retrieve(increment_addr);
        self.end_store();

        let boundary_addr_again =
            self.expect_integer(self.transpile_expression(boundary)?, span)?;
        self.emit_retrieve(boundary_addr_again);
        self.instructions.push(ir::jump_if_zero(l_end));

        self.instructions.push(ir::label(l_body));
        let loop_ctx = ScopeContext {
            control_label: l_ctl,
            end_label: l_end,
        };
        self.transpile_block(body, Some(loop_ctx))?;
        self.instructions.push(ir::jump(l_ctl));
        self.instructions.push(ir::label(l_end));

        Ok(())
    }

    fn expect_integer(&self, value: Value, span: Span) -> Result<i64> {
        match value {
            Value::Integer(addr) => Ok(addr),
            _ => Err(CompileError::semantic(
                ErrorKind::TypeMismatch,
                "expected an integer expression",
                span,
            )),
        }
    }

    fn transpile_expression(&mut self, expr: &Expression) -> Result<Value> {
        match expr {
            Expression::IntLit { value, .. } => {
                let addr = self.next_heap();
                self.emit_store_literal(addr, *value);
                Ok(Value::Integer(addr))
            }
            Expression::StringLit { value, .. } => {
                let mut chars = Vec::with_capacity(value.chars().count());
                for ch in value.chars() {
                    let addr = self.next_heap();
                    self.emit_store_literal(addr, ch as i64);
                    chars.push(addr);
                }
                Ok(Value::String(chars))
            }
            Expression::Identifier { name, span } => self.resolve_identifier(name, *span),
            Expression::Prefix {
                operator,
                right,
                span,
            } => self.transpile_prefix(operator, right, *span),
            Expression::Infix {
                operator,
                left,
                right,
                span,
            } => self.transpile_infix(operator, left, right, *span),
            Expression::Suffix {
                operator,
                left,
                span,
            } => self.transpile_suffix(operator, left, *span),
            Expression::Call { callee, args, span } => self.transpile_call(callee, args, *span),
        }
    }

    fn resolve_identifier(&self, name: &str, span: Span) -> Result<Value> {
        if let Some(value) = self.env.lookup(name) {
            return Ok(value.clone());
        }
        if name == "console.log" {
            return Ok(Value::BuiltIn(Builtin::ConsoleLog));
        }
        Err(CompileError::semantic(
            ErrorKind::UnknownIdentifier,
            format!("unknown identifier '{name}'"),
            span,
        ))
    }

    fn transpile_prefix(
        &mut self,
        operator: &PrefixOperator,
        right: &Expression,
        span: Span,
    ) -> Result<Value> {
        let right_val = self.transpile_expression(right)?;
        let Value::Integer(h) = right_val else {
            return Err(CompileError::semantic(
                ErrorKind::UnsupportedOperand,
                "unary operators only apply to integers",
                span,
            ));
        };

        match operator {
            PrefixOperator::Minus => {
                let result = self.next_heap();
                self.begin_store(result);
                self.emit_retrieve(h);
                self.instructions.push(ir::push(-1));
                self.instructions.push(ir::multiply());
                self.end_store();
                Ok(Value::Integer(result))
            }
            PrefixOperator::Bang => {
                let zero = self.next_heap();
                self.emit_store_literal(zero, 0);
                let result = self.emit_comparison(&InfixOperator::Equals, h, zero);
                Ok(Value::Integer(result))
            }
        }
    }

    fn transpile_suffix(
        &mut self,
        operator: &SuffixOperator,
        left: &Expression,
        span: Span,
    ) -> Result<Value> {
        let left_val = self.transpile_expression(left)?;
        let Value::Integer(h) = left_val else {
            return Err(CompileError::semantic(
                ErrorKind::UnsupportedOperand,
                "'++'/'--' only apply to integers",
                span,
            ));
        };

        let result = self.next_heap();
        self.begin_store(result);
        self.emit_retrieve(h);
        self.instructions.push(ir::push(1));
        match operator {
            SuffixOperator::Increment => self.instructions.push(ir::add()),
            SuffixOperator::Decrement => self.instructions.push(ir::subtract()),
        }
        self.end_store();
        Ok(Value::Integer(result))
    }

    fn transpile_infix(
        &mut self,
        operator: &InfixOperator,
        left: &Expression,
        right: &Expression,
        span: Span,
    ) -> Result<Value> {
        let left_val = self.transpile_expression(left)?;
        let right_val = self.transpile_expression(right)?;

        match operator {
            InfixOperator::Plus => match (&left_val, &right_val) {
                (Value::String(a), Value::String(b)) => {
                    let mut chars = a.clone();
                    chars.extend(b.clone());
                    Ok(Value::String(chars))
                }
                (Value::Integer(h1), Value::Integer(h2)) => {
                    Ok(Value::Integer(self.emit_arithmetic(ir::add(), *h1, *h2)))
                }
                _ => Err(type_mismatch("+", span)),
            },
            InfixOperator::Minus | InfixOperator::Asterisk | InfixOperator::Slash | InfixOperator::Percent => {
                match (&left_val, &right_val) {
                    (Value::Integer(h1), Value::Integer(h2)) => {
                        let op = match operator {
                            InfixOperator::Minus => ir::subtract(),
                            InfixOperator::Asterisk => ir::multiply(),
                            InfixOperator::Slash => ir::divide(),
                            InfixOperator::Percent => ir::modulo(),
                            _ => unreachable!(),
                        };
                        Ok(Value::Integer(self.emit_arithmetic(op, *h1, *h2)))
                    }
                    _ => Err(type_mismatch(operator_symbol(operator), span)),
                }
            }
            InfixOperator::Equals
            | InfixOperator::NotEquals
            | InfixOperator::LessThan
            | InfixOperator::LessThanOrEqual
            | InfixOperator::GreaterThan
            | InfixOperator::GreaterThanOrEqual => match (&left_val, &right_val) {
                (Value::Integer(h1), Value::Integer(h2)) => {
                    Ok(Value::Integer(self.emit_comparison(operator, *h1, *h2)))
                }
                _ => Err(type_mismatch(operator_symbol(operator), span)),
            },
            InfixOperator::And => match (&left_val, &right_val) {
                (Value::Integer(h1), Value::Integer(h2)) => {
                    Ok(Value::Integer(self.emit_logical_and(*h1, *h2)))
                }
                _ => Err(type_mismatch("&&", span)),
            },
            InfixOperator::Or => match (&left_val, &right_val) {
                (Value::Integer(h1), Value::Integer(h2)) => {
                    Ok(Value::Integer(self.emit_logical_or(*h1, *h2)))
                }
                _ => Err(type_mismatch("||", span)),
            },
        }
    }

    fn transpile_call(
        &mut self,
        callee: &Expression,
        args: &[Expression],
        span: Span,
    ) -> Result<Value> {
        let callee_val = self.transpile_expression(callee)?;
        let arg_vals = args
            .iter()
            .map(|a| self.transpile_expression(a))
            .collect::<Result<Vec<_>>>()?;

        match callee_val {
            Value::BuiltIn(Builtin::ConsoleLog) => {
                self.emit_console_log(&arg_vals, span)?;
                Ok(Value::Void)
            }
            _ => Err(CompileError::semantic(
                ErrorKind::CallToNonBuiltin,
                "calls are only supported to the built-in 'console.log'",
                span,
            )),
        }
    }

    fn emit_console_log(&mut self, args: &[Value], span: Span) -> Result<()> {
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.instructions.push(ir::push(' ' as i64));
                self.instructions.push(ir::print_char());
            }
            match arg {
                Value::String(chars) => {
                    for &addr in chars {
                        self.emit_retrieve(addr);
                        self.instructions.push(ir::print_char());
                    }
                }
                Value::Integer(addr) => {
                    self.emit_retrieve(*addr);
                    self.instructions.push(ir::print_int());
                }
                _ => {
                    return Err(CompileError::semantic(
                        ErrorKind::UnsupportedLogArgument,
                        "console.log only accepts integer and string arguments",
                        span,
                    ))
                }
            }
        }
        self.instructions.push(ir::push('\n' as i64));
        self.instructions.push(ir::print_char());
        Ok(())
    }
}

fn negate_bool(value: i64) -> i64 {
    if value == ir::TRUE {
        ir::FALSE
    } else {
        ir::TRUE
    }
}

/// Which checks fire for a comparison operator, and the boolean pushed when
/// one of them does. See `Transpiler::emit_comparison`.
fn comparison_shape(op: &InfixOperator) -> (bool, bool, i64) {
    match op {
        InfixOperator::Equals => (true, false, ir::TRUE),
        InfixOperator::NotEquals => (true, false, ir::FALSE),
        InfixOperator::LessThan => (false, true, ir::TRUE),
        InfixOperator::GreaterThanOrEqual => (false, true, ir::FALSE),
        InfixOperator::GreaterThan => (true, true, ir::FALSE),
        InfixOperator::LessThanOrEqual => (true, true, ir::TRUE),
        _ => unreachable!("comparison_shape only called for comparison operators"),
    }
}

fn operator_symbol(op: &InfixOperator) -> &'static str {
    match op {
        InfixOperator::Plus => "+",
        InfixOperator::Minus => "-",
        InfixOperator::Asterisk => "*",
        InfixOperator::Slash => "/",
        InfixOperator::Percent => "%",
        InfixOperator::Equals => "===",
        InfixOperator::NotEquals => "!==",
        InfixOperator::LessThan => "<",
        InfixOperator::LessThanOrEqual => "<=",
        InfixOperator::GreaterThan => ">",
        InfixOperator::GreaterThanOrEqual => ">=",
        InfixOperator::And => "&&",
        InfixOperator::Or => "||",
    }
}

fn type_mismatch(op: &str, span: Span) -> CompileError {
    CompileError::semantic(
        ErrorKind::TypeMismatch,
        format!("unsupported operand types for '{op}'"),
        span,
    )
}
