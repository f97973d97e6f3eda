//! Metric values and comparison operators.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A typed metric value carried by events and condition literals.
///
/// Serialized untagged so event files read as plain JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Coerces a raw capture into a typed value.
    ///
    /// Tried in order: `true`/`false` (any case), a float when the text
    /// contains `.`, an integer, and finally the trimmed text itself.
    pub fn coerce(raw: &str) -> Self {
        let raw = raw.trim();

        if raw.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        if raw.contains('.')
            && let Ok(f) = raw.parse::<f64>()
        {
            return Self::Float(f);
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Self::Int(i);
        }
        Self::Str(raw.to_string())
    }

    /// The numeric reading of this value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Bool(_) | Self::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// Comparison operator used by condition clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
}

impl Op {
    /// Parses an operator token as written in condition sentences.
    ///
    /// Accepts both the typographic forms (`≥`, `≤`) and ASCII.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "≥" | ">=" => Some(Self::Ge),
            "≤" | "<=" => Some(Self::Le),
            "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }

    /// Applies the operator to two numbers.
    #[allow(clippy::float_cmp)]
    pub fn holds(self, actual: f64, expected: f64) -> bool {
        match self {
            Self::Ge => actual >= expected,
            Self::Le => actual <= expected,
            Self::Eq => actual == expected,
            Self::Ne => actual != expected,
            Self::Gt => actual > expected,
            Self::Lt => actual < expected,
        }
    }

    /// Applies the operator to two values.
    ///
    /// Numbers compare across `Int` and `Float`. Booleans and strings only
    /// support `==` and `!=` against their own kind. Every other pairing is
    /// false.
    pub fn compare(self, actual: &Value, expected: &Value) -> bool {
        if let (Some(a), Some(e)) = (actual.as_f64(), expected.as_f64()) {
            return self.holds(a, e);
        }
        match (actual, expected) {
            (Value::Bool(a), Value::Bool(e)) => self.equality(a == e),
            (Value::Str(a), Value::Str(e)) => self.equality(a == e),
            _ => false,
        }
    }

    fn equality(self, equal: bool) -> bool {
        match self {
            Self::Eq => equal,
            Self::Ne => !equal,
            _ => false,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
