//! Result values and rows.

use bigdecimal::{BigDecimal, ToPrimitive};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single result value.
///
/// Stores return aggregates in different numeric representations depending
/// on the aggregation and the column type (`SUM` over integers may come back
/// as an integer, a double or a decimal). Compare through
/// [`Value::normalized`] rather than matching on a variant.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    BigInt(i64),
    Double(f64),
    Decimal(BigDecimal),
    String(String),
    Null,
}

impl Value {
    /// Canonical text form: integers and integral doubles and decimals render
    /// without a fractional part (`8`, not `8.0` or `8.000`).
    ///
    /// Returns `None` for NULL.
    pub fn normalized(&self) -> Option<String> {
        match self {
            Value::BigInt(n) => Some(n.to_string()),
            Value::Double(f) if *f == 0.0 => Some("0".to_string()),
            Value::Double(f) => Some(f.to_string()),
            Value::Decimal(d) => Some(d.normalized().to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::BigInt(n) => Some(*n),
            Value::Double(f) if f.fract() == 0.0 => Some(*f as i64),
            Value::Decimal(d) if d.is_integer() => d.to_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::BigInt(n) => Some(*n as f64),
            Value::Double(f) => Some(*f),
            Value::Decimal(d) => d.to_f64(),
            Value::String(s) => s.parse().ok(),
            Value::Null => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::BigInt(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Double(f)
    }
}

impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// One result row: output aliases mapped to values, in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, alias: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.push((alias.into(), value.into()));
        self
    }

    /// Value under `alias`, if the row has that column.
    pub fn get(&self, alias: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == alias)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
