//! Filter expressions of the PDS Search API query language

use crate::errors::QueryError;
use chrono::{DateTime, SecondsFormat, Utc};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq, // field eq value
    Ne, // field ne value
    Lt, // field lt value, strictly before for timestamps
    Le, // field le value
    Gt, // field gt value, strictly after for timestamps
    Ge, // field ge value
    Like, // field like "*pattern*"
    In, // field eq a or field eq b ...
}

impl Operator {
    /// Keyword of the backend grammar
    pub fn keyword(&self) -> &'static str {
        match self {
            Operator::Eq | Operator::In => "eq",
            Operator::Ne => "ne",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::Like => "like",
        }
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "eq" | "=" | "==" | "equals" => Ok(Operator::Eq),
            "ne" | "!=" => Ok(Operator::Ne),
            "lt" | "<" | "before" => Ok(Operator::Lt),
            "le" | "<=" => Ok(Operator::Le),
            "gt" | ">" | "after" => Ok(Operator::Gt),
            "ge" | ">=" => Ok(Operator::Ge),
            "like" | "~" => Ok(Operator::Like),
            "in" | "one_of" => Ok(Operator::In),
            _ => Err(format!("Invalid comparison operator: {}", s)),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::In => write!(f, "in"),
            other => write!(f, "{}", other.keyword()),
        }
    }
}

/// Operand of a predicate
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    /// A LID or LIDVID
    Identifier(String),
    Timestamp(DateTime<Utc>),
    Number(f64),
}

impl FilterValue {
    /// Timestamp operand, or RFC 3339 text
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FilterValue::Timestamp(t) => Some(*t),
            FilterValue::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            _ => None,
        }
    }
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::Text(s) | FilterValue::Identifier(s) => write!(f, "\"{}\"", escape(s)),
            FilterValue::Timestamp(t) => {
                write!(f, "\"{}\"", t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            FilterValue::Number(n) => write!(f, "{}", n),
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        FilterValue::Number(n)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Number(n as f64)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(t: DateTime<Utc>) -> Self {
        FilterValue::Timestamp(t)
    }
}

/// One leaf clause: a dotted property path, an operator and its operands
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub operator: Operator,
    pub values: Vec<FilterValue>, // several values only for Operator::In
}

impl Predicate {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            values: vec![value.into()],
        }
    }

    /// Membership test, compiled as a disjunction of equalities on one field.
    ///
    /// An empty set would match nothing and has no rendering in the backend
    /// grammar, so it is refused.
    pub fn one_of(field: impl Into<String>, values: Vec<FilterValue>) -> Result<Self, QueryError> {
        let field = field.into();
        if values.is_empty() {
            return Err(QueryError::InvalidArgument {
                argument: "values",
                reason: format!("membership test on `{}` needs at least one value", field),
            });
        }
        Ok(Self {
            field,
            operator: Operator::In,
            values,
        })
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .values
            .iter()
            .map(|value| format!("{} {} {}", self.field, self.operator.keyword(), value))
            .collect();
        write!(f, "{}", parts.join(" or "))
    }
}

/// Immutable filter tree. Combining expressions always builds a new value.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    Predicate(Predicate),
    /// Pre-formed clause passed through verbatim
    Raw(String),
    /// Conjunction of the children, in order
    All(Vec<FilterExpression>),
}

impl Default for FilterExpression {
    fn default() -> Self {
        FilterExpression::All(Vec::new())
    }
}

impl FilterExpression {
    pub fn predicate(
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<FilterValue>,
    ) -> Self {
        FilterExpression::Predicate(Predicate::new(field, operator, value))
    }

    pub fn raw(clause: impl Into<String>) -> Self {
        FilterExpression::Raw(clause.into())
    }

    pub fn all(children: Vec<FilterExpression>) -> Self {
        FilterExpression::All(children.into_iter().filter(|c| !c.is_empty()).collect())
    }

    /// True for the empty conjunction, which matches everything, and for a
    /// blank raw clause. A predicate is never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterExpression::All(children) => children.iter().all(|c| c.is_empty()),
            FilterExpression::Raw(clause) => clause.trim().is_empty(),
            FilterExpression::Predicate(_) => false,
        }
    }

    /// New conjunction of `self` followed by `other`
    pub fn and(self, other: FilterExpression) -> FilterExpression {
        if other.is_empty() {
            return self;
        }
        let mut children = self.into_children();
        children.push(other);
        FilterExpression::All(children)
    }

    /// Top-level conjuncts; a single leaf is its own only conjunct
    pub fn children(&self) -> &[FilterExpression] {
        match self {
            FilterExpression::All(children) => children,
            leaf => std::slice::from_ref(leaf),
        }
    }

    pub fn into_children(self) -> Vec<FilterExpression> {
        match self {
            FilterExpression::All(children) => children,
            leaf if leaf.is_empty() => Vec::new(),
            leaf => vec![leaf],
        }
    }
}

impl std::fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterExpression::Predicate(p) => write!(f, "{}", p),
            FilterExpression::Raw(clause) => write!(f, "{}", clause.trim()),
            FilterExpression::All(children) => {
                let parts: Vec<String> = children
                    .iter()
                    .filter(|c| !c.is_empty())
                    .map(|c| format!("({})", c))
                    .collect();
                write!(f, "{}", parts.join(" and "))
            }
        }
    }
}
