//! Bound parameters.
//!
//! Every caller-supplied literal reaches the store through a placeholder and
//! a [`BoundValue`], never through the SQL text.

use serde::Serialize;

use super::expr::Expr;

/// A value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BoundValue {
    /// Text, bound as a string.
    Text(String),
    /// Double-precision number.
    Double(f64),
    /// Timestamp rendered as `YYYY-MM-DD HH:MM:SS`, bound as text and cast
    /// to a timestamp by the statement.
    Timestamp(String),
}

/// Ordered parameter list collected while building a statement.
///
/// `bind` hands back the placeholder expression for the value it stored;
/// placeholder numbers follow binding order, starting at 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamList {
    values: Vec<BoundValue>,
}

impl ParamList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` and return its placeholder.
    pub fn bind(&mut self, value: BoundValue) -> Expr {
        self.values.push(value);
        Expr::Param(self.values.len())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[BoundValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<BoundValue> {
        self.values
    }
}
