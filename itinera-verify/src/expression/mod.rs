//! A small expression language over itinerary concepts.
//!
//! Expressions combine concept names, number, string and boolean literals,
//! set literals (`{'museum', 'garden'}`) and calls to `len`, `min`, `max`
//! and `abs` with the operators below, loosest binding first:
//!
//! | Operators | Meaning |
//! |-----------|---------|
//! | `or` | logical or |
//! | `and` | logical and |
//! | `not` | logical negation |
//! | `==` `!=` `<` `<=` `>` `>=` `in` `not in` | comparison, subset, membership |
//! | `+` `-` | addition or union, subtraction or difference |
//! | `*` `/` | multiplication, division |
//! | `-` | negation |

mod eval;

use std::str::FromStr;
use std::sync::LazyLock;

use pest::Parser;
use pest::error::{Error as PestError, LineColLocation};
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

use crate::{Concepts, ExpressionError, Value};

#[derive(Parser)]
#[grammar = "expression/grammar.pest"]
struct ExpressionParser;

static PRATT: LazyLock<PrattParser<Rule>> = LazyLock::new(|| {
    PrattParser::new()
        .op(Op::infix(Rule::or, Assoc::Left))
        .op(Op::infix(Rule::and, Assoc::Left))
        .op(Op::prefix(Rule::not))
        .op(Op::infix(Rule::eq, Assoc::Left)
            | Op::infix(Rule::ne, Assoc::Left)
            | Op::infix(Rule::lt, Assoc::Left)
            | Op::infix(Rule::le, Assoc::Left)
            | Op::infix(Rule::gt, Assoc::Left)
            | Op::infix(Rule::ge, Assoc::Left)
            | Op::infix(Rule::in_op, Assoc::Left)
            | Op::infix(Rule::not_in, Assoc::Left))
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
        .op(Op::infix(Rule::mul, Assoc::Left) | Op::infix(Rule::div, Assoc::Left))
        .op(Op::prefix(Rule::neg))
});

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnaryOp {
    Not,
    Neg,
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Literal(Value),
    Concept(String),
    Set(Vec<Node>),
    Call { name: String, args: Vec<Node> },
    Unary(UnaryOp, Box<Node>),
    Binary(Box<Node>, BinaryOp, Box<Node>),
}

/// A parsed expression, ready to evaluate against [`Concepts`].
///
/// # Examples
/// ```
/// use itinera_verify::{Concepts, Expression, Value};
///
/// let expression: Expression = "total_cost <= budget and 'museum' in kinds".parse()?;
/// let concepts = Concepts::default()
///     .with("total_cost", Value::from(900_u32))
///     .with("budget", Value::from(1000_u32))
///     .with("kinds", Value::set(["museum", "garden"]));
/// assert_eq!(expression.evaluate(&concepts)?, Value::Bool(true));
/// # Ok::<(), itinera_verify::ExpressionError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Node,
}

impl Expression {
    /// Parse `source`.
    ///
    /// # Errors
    /// Returns [`ExpressionError::Syntax`] when `source` is not a valid
    /// expression and [`ExpressionError::InvalidNumber`] for unrepresentable
    /// literals.
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        let mut pairs = ExpressionParser::parse(Rule::expression, source)
            .map_err(|error| syntax_error(&error))?;
        let Some(expr) = pairs.next() else {
            return Err(ExpressionError::Syntax {
                column: 1,
                message: "empty expression".to_owned(),
            });
        };
        Ok(Self {
            source: source.to_owned(),
            root: build(expr.into_inner())?,
        })
    }

    /// The text the expression was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against `concepts`.
    ///
    /// # Errors
    /// Returns an [`ExpressionError`] when the expression names an unknown
    /// concept or function, or applies an operator to values it does not
    /// support.
    pub fn evaluate(&self, concepts: &Concepts) -> Result<Value, ExpressionError> {
        self.root.evaluate(concepts)
    }

    /// Evaluate to a boolean, as a logical constraint.
    ///
    /// # Errors
    /// As [`Expression::evaluate`], plus [`ExpressionError::ResultType`] for
    /// non-boolean results.
    pub fn holds(&self, concepts: &Concepts) -> Result<bool, ExpressionError> {
        match self.evaluate(concepts)? {
            Value::Bool(value) => Ok(value),
            other => Err(ExpressionError::ResultType {
                expected: "bool",
                found: other.kind(),
            }),
        }
    }

    /// Evaluate to a number, as a preference objective.
    ///
    /// # Errors
    /// As [`Expression::evaluate`], plus [`ExpressionError::ResultType`] for
    /// non-numeric results.
    pub fn measure(&self, concepts: &Concepts) -> Result<f64, ExpressionError> {
        match self.evaluate(concepts)? {
            Value::Number(value) => Ok(value),
            other => Err(ExpressionError::ResultType {
                expected: "number",
                found: other.kind(),
            }),
        }
    }
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn syntax_error(error: &PestError<Rule>) -> ExpressionError {
    let column = match error.line_col {
        LineColLocation::Pos((_, column)) | LineColLocation::Span((_, column), _) => column,
    };
    ExpressionError::Syntax {
        column,
        message: error.variant.message().into_owned(),
    }
}

fn build(pairs: Pairs<'_, Rule>) -> Result<Node, ExpressionError> {
    PRATT
        .map_primary(build_primary)
        .map_prefix(|prefix, operand| {
            let op = match prefix.as_rule() {
                Rule::not => UnaryOp::Not,
                _ => UnaryOp::Neg,
            };
            Ok(Node::Unary(op, Box::new(operand?)))
        })
        .map_infix(|lhs, infix, rhs| {
            let op = binary_op(&infix)?;
            Ok(Node::Binary(Box::new(lhs?), op, Box::new(rhs?)))
        })
        .parse(pairs)
}

fn build_primary(pair: Pair<'_, Rule>) -> Result<Node, ExpressionError> {
    match pair.as_rule() {
        Rule::expr => build(pair.into_inner()),
        Rule::number => pair
            .as_str()
            .parse::<f64>()
            .map(|number| Node::Literal(Value::Number(number)))
            .map_err(|_| ExpressionError::InvalidNumber {
                literal: pair.as_str().to_owned(),
            }),
        Rule::string => {
            let text = pair
                .into_inner()
                .next()
                .map_or("", |inner| inner.as_str());
            Ok(Node::Literal(Value::Text(text.to_owned())))
        }
        Rule::boolean => Ok(Node::Literal(Value::Bool(
            pair.as_str().eq_ignore_ascii_case("true"),
        ))),
        Rule::concept => Ok(Node::Concept(pair.as_str().to_owned())),
        Rule::set => pair
            .into_inner()
            .map(|item| build(item.into_inner()))
            .collect::<Result<Vec<_>, _>>()
            .map(Node::Set),
        Rule::call => {
            let mut inner = pair.into_inner();
            let name = inner
                .next()
                .map_or_else(String::new, |name| name.as_str().to_owned());
            let args = inner
                .map(|arg| build(arg.into_inner()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Node::Call { name, args })
        }
        other => Err(unexpected(&pair, other)),
    }
}

fn binary_op(pair: &Pair<'_, Rule>) -> Result<BinaryOp, ExpressionError> {
    Ok(match pair.as_rule() {
        Rule::or => BinaryOp::Or,
        Rule::and => BinaryOp::And,
        Rule::eq => BinaryOp::Eq,
        Rule::ne => BinaryOp::Ne,
        Rule::lt => BinaryOp::Lt,
        Rule::le => BinaryOp::Le,
        Rule::gt => BinaryOp::Gt,
        Rule::ge => BinaryOp::Ge,
        Rule::in_op => BinaryOp::In,
        Rule::not_in => BinaryOp::NotIn,
        Rule::add => BinaryOp::Add,
        Rule::sub => BinaryOp::Sub,
        Rule::mul => BinaryOp::Mul,
        Rule::div => BinaryOp::Div,
        other => return Err(unexpected(pair, other)),
    })
}

fn unexpected(pair: &Pair<'_, Rule>, rule: Rule) -> ExpressionError {
    ExpressionError::Syntax {
        column: pair.line_col().1,
        message: format!("unexpected {rule:?}"),
    }
}
