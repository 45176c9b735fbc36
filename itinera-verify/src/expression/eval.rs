//! Tree-walking evaluation of parsed expressions.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::{BinaryOp, Node, UnaryOp};
use crate::{Concepts, ExpressionError, Value};

impl Node {
    pub(super) fn evaluate(&self, concepts: &Concepts) -> Result<Value, ExpressionError> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Concept(name) => concepts
                .get(name)
                .cloned()
                .ok_or_else(|| ExpressionError::UnknownConcept { name: name.clone() }),
            Self::Set(items) => items
                .iter()
                .map(|item| match item.evaluate(concepts)? {
                    Value::Text(text) => Ok(text),
                    other => Err(ExpressionError::OperandMismatch {
                        operator: "{}",
                        operand: other.kind(),
                    }),
                })
                .collect::<Result<BTreeSet<_>, _>>()
                .map(Value::Set),
            Self::Call { name, args } => {
                let values = args
                    .iter()
                    .map(|arg| arg.evaluate(concepts))
                    .collect::<Result<Vec<_>, _>>()?;
                call(name, values)
            }
            Self::Unary(op, operand) => unary(*op, operand.evaluate(concepts)?),
            Self::Binary(lhs, BinaryOp::And, rhs) => {
                let symbol = BinaryOp::And.symbol();
                if !lhs.evaluate(concepts)?.as_bool(symbol)? {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(rhs.evaluate(concepts)?.as_bool(symbol)?))
            }
            Self::Binary(lhs, BinaryOp::Or, rhs) => {
                let symbol = BinaryOp::Or.symbol();
                if lhs.evaluate(concepts)?.as_bool(symbol)? {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(rhs.evaluate(concepts)?.as_bool(symbol)?))
            }
            Self::Binary(lhs, op, rhs) => {
                binary(*op, lhs.evaluate(concepts)?, rhs.evaluate(concepts)?)
            }
        }
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "numeric concepts are evaluated as f64"
)]
fn unary(op: UnaryOp, operand: Value) -> Result<Value, ExpressionError> {
    match (op, operand) {
        (UnaryOp::Not, Value::Bool(value)) => Ok(Value::Bool(!value)),
        (UnaryOp::Neg, Value::Number(value)) => Ok(Value::Number(-value)),
        (UnaryOp::Not, other) => Err(ExpressionError::OperandMismatch {
            operator: "not",
            operand: other.kind(),
        }),
        (UnaryOp::Neg, other) => Err(ExpressionError::OperandMismatch {
            operator: "-",
            operand: other.kind(),
        }),
    }
}

fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, ExpressionError> {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            arithmetic(op, left, right)
        }
        BinaryOp::In => contains(&right, &left).map(Value::Bool),
        BinaryOp::NotIn => contains(&right, &left).map(|found| Value::Bool(!found)),
        _ => compare(op, &left, &right).map(Value::Bool),
    }
}

fn mismatch(op: BinaryOp, left: &Value, right: &Value) -> ExpressionError {
    ExpressionError::TypeMismatch {
        operator: op.symbol(),
        left: left.kind(),
        right: right.kind(),
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "numeric concepts are evaluated as f64"
)]
fn arithmetic(op: BinaryOp, left: Value, right: Value) -> Result<Value, ExpressionError> {
    match (op, left, right) {
        (BinaryOp::Add, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (BinaryOp::Sub, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
        (BinaryOp::Mul, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
        (BinaryOp::Div, Value::Number(_), Value::Number(b)) if b == 0.0 => {
            Err(ExpressionError::DivisionByZero)
        }
        (BinaryOp::Div, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
        (BinaryOp::Add, Value::Set(a), Value::Set(b)) => Ok(Value::Set(&a | &b)),
        (BinaryOp::Sub, Value::Set(a), Value::Set(b)) => Ok(Value::Set(&a - &b)),
        (BinaryOp::Add, Value::Text(a), Value::Text(b)) => Ok(Value::Text(a + &b)),
        (_, left, right) => Err(mismatch(op, &left, &right)),
    }
}

/// Whether `needle` is an element of, substring of or subset of `haystack`.
fn contains(haystack: &Value, needle: &Value) -> Result<bool, ExpressionError> {
    match (haystack, needle) {
        (Value::Set(items), Value::Text(item)) => Ok(items.contains(item)),
        (Value::Set(items), Value::Set(subset)) => Ok(subset.is_subset(items)),
        (Value::Text(text), Value::Text(fragment)) => Ok(text.contains(fragment.as_str())),
        _ => Err(mismatch(BinaryOp::In, needle, haystack)),
    }
}

/// Order two values. Sets are ordered by inclusion, so `<=` reads as subset
/// and two sets that overlap only partially are unordered.
fn order(op: BinaryOp, left: &Value, right: &Value) -> Result<Option<Ordering>, ExpressionError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(a.partial_cmp(b)),
        (Value::Text(a), Value::Text(b)) => Ok(Some(a.cmp(b))),
        (Value::Bool(a), Value::Bool(b)) if matches!(op, BinaryOp::Eq | BinaryOp::Ne) => {
            Ok(Some(a.cmp(b)))
        }
        (Value::Set(a), Value::Set(b)) => Ok(if a == b {
            Some(Ordering::Equal)
        } else if a.is_subset(b) {
            Some(Ordering::Less)
        } else if a.is_superset(b) {
            Some(Ordering::Greater)
        } else {
            None
        }),
        _ => Err(mismatch(op, left, right)),
    }
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<bool, ExpressionError> {
    let ordering = order(op, left, right)?;
    Ok(match op {
        BinaryOp::Eq => ordering == Some(Ordering::Equal),
        BinaryOp::Ne => ordering != Some(Ordering::Equal),
        BinaryOp::Lt => ordering == Some(Ordering::Less),
        BinaryOp::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        BinaryOp::Gt => ordering == Some(Ordering::Greater),
        BinaryOp::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        _ => return Err(mismatch(op, left, right)),
    })
}

fn call(name: &str, args: Vec<Value>) -> Result<Value, ExpressionError> {
    match name {
        "len" => {
            let [value] = one_arg("len", args)?;
            match value {
                Value::Set(items) => Ok(Value::count(items.len())),
                Value::Text(text) => Ok(Value::count(text.chars().count())),
                other => Err(ExpressionError::OperandMismatch {
                    operator: "len",
                    operand: other.kind(),
                }),
            }
        }
        "abs" => match one_arg("abs", args)? {
            [Value::Number(value)] => Ok(Value::Number(value.abs())),
            [other] => Err(ExpressionError::OperandMismatch {
                operator: "abs",
                operand: other.kind(),
            }),
        },
        "min" => extremum("min", args, f64::min),
        "max" => extremum("max", args, f64::max),
        _ => Err(ExpressionError::UnknownFunction {
            name: name.to_owned(),
        }),
    }
}

fn one_arg(function: &'static str, args: Vec<Value>) -> Result<[Value; 1], ExpressionError> {
    let found = args.len();
    <[Value; 1]>::try_from(args).map_err(|_| ExpressionError::Arity {
        function,
        expected: "1",
        found,
    })
}

fn numbers(function: &'static str, args: Vec<Value>) -> Result<Vec<f64>, ExpressionError> {
    args.into_iter()
        .map(|arg| match arg {
            Value::Number(value) => Ok(value),
            other => Err(ExpressionError::OperandMismatch {
                operator: function,
                operand: other.kind(),
            }),
        })
        .collect()
}

fn extremum(
    function: &'static str,
    args: Vec<Value>,
    pick: fn(f64, f64) -> f64,
) -> Result<Value, ExpressionError> {
    let found = args.len();
    numbers(function, args)?
        .into_iter()
        .reduce(pick)
        .map(Value::Number)
        .ok_or(ExpressionError::Arity {
            function,
            expected: "at least 1",
            found,
        })
}
