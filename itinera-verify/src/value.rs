//! Values produced by concepts and expressions.

use std::collections::BTreeSet;
use std::fmt;

use crate::ExpressionError;

/// A concept or expression value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Truth value.
    Bool(bool),
    /// Counts, costs and durations.
    Number(f64),
    /// Names such as a city.
    Text(String),
    /// A set of names, such as the cuisines eaten.
    Set(BTreeSet<String>),
}

impl Value {
    /// Name of the value's kind, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Set(_) => "set",
        }
    }

    /// A number from a count.
    #[must_use]
    pub fn count(count: usize) -> Self {
        Self::Number(u32::try_from(count).map_or(f64::from(u32::MAX), f64::from))
    }

    /// A set from any names.
    pub fn set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Set(items.into_iter().map(Into::into).collect())
    }

    /// The boolean inside, or an error naming `operator`.
    pub(crate) const fn as_bool(&self, operator: &'static str) -> Result<bool, ExpressionError> {
        match self {
            Self::Bool(value) => Ok(*value),
            other => Err(ExpressionError::OperandMismatch {
                operator,
                operand: other.kind(),
            }),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "'{value}'"),
            Self::Set(items) => {
                f.write_str("{")?;
                for (position, item) in items.iter().enumerate() {
                    if position > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{item}'")?;
                }
                f.write_str("}")
            }
        }
    }
}
