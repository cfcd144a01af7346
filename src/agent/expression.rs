//! Guard and test expressions over a [`Context`].

use crate::error::{ExecResult, ExecutionError, TermError};
use crate::fuzzy::FuzzyValue;
use crate::path::Path;
use crate::term::{Context, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
    Xor,
}

/// An expression tree evaluated against variable bindings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    Constant(Value),
    /// Reading an unbound variable is a hard error.
    Variable(Path),
    Unary(UnaryOp, Box<Expression>),
    Binary(BinaryOp, Box<Expression>, Box<Expression>),
}

impl Expression {
    pub fn constant(value: impl Into<Value>) -> Self {
        Expression::Constant(value.into())
    }

    pub fn var(name: &str) -> Self {
        Expression::Variable(Path::parse(name))
    }

    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Expression::Unary(op, Box::new(operand))
    }

    pub fn binary(op: BinaryOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn evaluate(&self, context: &Context) -> ExecResult<Value> {
        match self {
            Expression::Constant(value) => Ok(value.snapshot()),
            Expression::Variable(name) => Ok(context.value(name)?.raw()?.snapshot()),
            Expression::Unary(op, operand) => unary(*op, operand.evaluate(context)?),
            Expression::Binary(op, lhs, rhs) => {
                let left = lhs.evaluate(context)?;
                // short-circuit so `X != 0 and Y / X > 1` never divides by zero
                match (op, &left) {
                    (BinaryOp::And, Value::Bool(false)) => return Ok(Value::Bool(false)),
                    (BinaryOp::Or, Value::Bool(true)) => return Ok(Value::Bool(true)),
                    _ => {}
                }
                binary(*op, left, rhs.evaluate(context)?)
            }
        }
    }

    /// Evaluate as a certain fuzzy boolean.
    pub fn evaluate_fuzzy(&self, context: &Context) -> ExecResult<FuzzyValue<bool>> {
        Ok(FuzzyValue::certain(self.evaluate(context)?.as_bool()?))
    }

    /// Variables read by this expression.
    pub fn variables(&self) -> Vec<Path> {
        let mut found = Vec::new();
        self.collect_variables(&mut found);
        found
    }

    fn collect_variables(&self, found: &mut Vec<Path>) {
        match self {
            Expression::Constant(_) => {}
            Expression::Variable(name) => {
                if !found.contains(name) {
                    found.push(name.clone());
                }
            }
            Expression::Unary(_, operand) => operand.collect_variables(found),
            Expression::Binary(_, lhs, rhs) => {
                lhs.collect_variables(found);
                rhs.collect_variables(found);
            }
        }
    }
}

fn unary(op: UnaryOp, value: Value) -> ExecResult<Value> {
    match (op, value) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.as_bool()?)),
        (UnaryOp::Negate, Value::Int(i)) => Ok(Value::Int(i.wrapping_neg())),
        (UnaryOp::Negate, v) => Ok(Value::Float(-v.as_f64()?)),
    }
}

fn binary(op: BinaryOp, left: Value, right: Value) -> ExecResult<Value> {
    use BinaryOp::*;
    match op {
        Add | Subtract | Multiply | Divide | Modulo | Power => arithmetic(op, left, right),
        Equal => Ok(Value::Bool(equal(&left, &right))),
        NotEqual => Ok(Value::Bool(!equal(&left, &right))),
        Less | LessEqual | Greater | GreaterEqual => {
            let ordering = compare(&left, &right)?;
            Ok(Value::Bool(match op {
                Less => ordering.is_lt(),
                LessEqual => ordering.is_le(),
                Greater => ordering.is_gt(),
                _ => ordering.is_ge(),
            }))
        }
        And => Ok(Value::Bool(left.as_bool()? && right.as_bool()?)),
        Or => Ok(Value::Bool(left.as_bool()? || right.as_bool()?)),
        Xor => Ok(Value::Bool(left.as_bool()? ^ right.as_bool()?)),
    }
}

fn arithmetic(op: BinaryOp, left: Value, right: Value) -> ExecResult<Value> {
    match (op, &left, &right) {
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => return Ok(Value::Str(format!("{a}{b}"))),
        (_, Value::Int(a), Value::Int(b)) => return integer(op, *a, *b),
        _ => {}
    }
    let (a, b) = (left.as_f64()?, right.as_f64()?);
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        BinaryOp::Multiply => a * b,
        BinaryOp::Divide | BinaryOp::Modulo if b == 0.0 => return Err(ExecutionError::DivisionByZero),
        BinaryOp::Divide => a / b,
        BinaryOp::Modulo => a % b,
        _ => a.powf(b),
    };
    Ok(Value::Float(result))
}

fn integer(op: BinaryOp, a: i64, b: i64) -> ExecResult<Value> {
    let result = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Subtract => a.wrapping_sub(b),
        BinaryOp::Multiply => a.wrapping_mul(b),
        BinaryOp::Divide | BinaryOp::Modulo if b == 0 => return Err(ExecutionError::DivisionByZero),
        BinaryOp::Divide => a.wrapping_div(b),
        BinaryOp::Modulo => a.wrapping_rem(b),
        _ => match u32::try_from(b) {
            Ok(exp) => a.wrapping_pow(exp),
            Err(_) => return Ok(Value::Float((a as f64).powf(b as f64))),
        },
    };
    Ok(Value::Int(result))
}

fn equal(left: &Value, right: &Value) -> bool {
    if left.is_number() && right.is_number() {
        matches!((left.as_f64(), right.as_f64()), (Ok(a), Ok(b)) if a == b)
    } else {
        left == right
    }
}

fn compare(left: &Value, right: &Value) -> ExecResult<std::cmp::Ordering> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        _ => {
            let (a, b) = (left.as_f64()?, right.as_f64()?);
            a.partial_cmp(&b).ok_or_else(|| {
                TermError::TypeMismatch {
                    expected: "comparable number".into(),
                    found: "NaN".into(),
                }
                .into()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Variable;

    fn ctx_with(name: &str, value: i64) -> Context {
        let mut ctx = Context::new();
        ctx.insert(Variable::new(name).bound(value).unwrap());
        ctx
    }

    #[test]
    fn arithmetic_and_comparison() {
        let ctx = ctx_with("X", 3);
        let expr = Expression::binary(
            BinaryOp::Greater,
            Expression::binary(BinaryOp::Multiply, Expression::var("X"), Expression::constant(2i64)),
            Expression::constant(5.5),
        );
        assert_eq!(expr.evaluate(&ctx).unwrap(), Value::Bool(true));
        assert!(*expr.evaluate_fuzzy(&ctx).unwrap().value());
    }

    #[test]
    fn integer_power_and_modulo() {
        let ctx = Context::new();
        let pow = Expression::binary(BinaryOp::Power, Expression::constant(2i64), Expression::constant(10i64));
        assert_eq!(pow.evaluate(&ctx).unwrap(), Value::Int(1024));
        let rem = Expression::binary(BinaryOp::Modulo, Expression::constant(7i64), Expression::constant(3i64));
        assert_eq!(rem.evaluate(&ctx).unwrap(), Value::Int(1));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let ctx = ctx_with("X", 0);
        let expr = Expression::binary(BinaryOp::Divide, Expression::constant(1i64), Expression::var("X"));
        assert!(matches!(expr.evaluate(&ctx), Err(ExecutionError::DivisionByZero)));
    }

    #[test]
    fn and_short_circuits() {
        let ctx = ctx_with("X", 0);
        let guarded = Expression::binary(
            BinaryOp::And,
            Expression::binary(BinaryOp::NotEqual, Expression::var("X"), Expression::constant(0i64)),
            Expression::binary(BinaryOp::Divide, Expression::constant(1i64), Expression::var("X")),
        );
        assert_eq!(guarded.evaluate(&ctx).unwrap(), Value::Bool(false));
    }

    #[test]
    fn unbound_read_is_a_hard_error() {
        let mut ctx = Context::new();
        ctx.insert(Variable::new("X"));
        let err = Expression::var("X").evaluate(&ctx).unwrap_err();
        assert!(matches!(err, ExecutionError::Term(TermError::UnboundVariable { .. })));
    }

    #[test]
    fn mixed_numeric_equality() {
        let ctx = Context::new();
        let eq = Expression::binary(BinaryOp::Equal, Expression::constant(2i64), Expression::constant(2.0));
        assert_eq!(eq.evaluate(&ctx).unwrap(), Value::Bool(true));
        let not = Expression::unary(UnaryOp::Not, eq);
        assert_eq!(not.evaluate(&ctx).unwrap(), Value::Bool(false));
    }

    #[test]
    fn variables_are_collected_once() {
        let expr = Expression::binary(BinaryOp::Add, Expression::var("X"), Expression::var("X"));
        assert_eq!(expr.variables(), vec![Path::parse("X")]);
    }
}
