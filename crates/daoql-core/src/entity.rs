//! Entity and matchable-property traits.
//!
//! Matchable properties are an opt-in capability: an entity declares the
//! fields visible to match-by-example queries as an explicit accessor list
//! instead of exposing every getter. Undeclared fields can never leak into
//! a generated constraint.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar value that a match constraint can encode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    /// UTF-8 string.
    Str(String),
    /// Single character.
    Char(char),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point.
    Float(f64),
    /// Boolean.
    Bool(bool),
}

impl ScalarValue {
    /// Render the value as a statement literal.
    ///
    /// Strings and characters are single-quoted; embedded single quotes
    /// are doubled, never backslash-escaped, matching the target query
    /// language's own escaping convention. Numbers and booleans render
    /// bare.
    pub fn to_literal(&self) -> String {
        match self {
            ScalarValue::Str(s) => format!("'{}'", s.replace('\'', "''")),
            ScalarValue::Char(c) => format!("'{}'", c.to_string().replace('\'', "''")),
            ScalarValue::Int(i) => i.to_string(),
            ScalarValue::UInt(u) => u.to_string(),
            ScalarValue::Float(f) => f.to_string(),
            ScalarValue::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Str(s.to_owned())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::Str(s)
    }
}

impl From<char> for ScalarValue {
    fn from(c: char) -> Self {
        ScalarValue::Char(c)
    }
}

impl From<i32> for ScalarValue {
    fn from(i: i32) -> Self {
        ScalarValue::Int(i64::from(i))
    }
}

impl From<i64> for ScalarValue {
    fn from(i: i64) -> Self {
        ScalarValue::Int(i)
    }
}

impl From<u32> for ScalarValue {
    fn from(u: u32) -> Self {
        ScalarValue::UInt(u64::from(u))
    }
}

impl From<u64> for ScalarValue {
    fn from(u: u64) -> Self {
        ScalarValue::UInt(u)
    }
}

impl From<f64> for ScalarValue {
    fn from(f: f64) -> Self {
        ScalarValue::Float(f)
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        ScalarValue::Bool(b)
    }
}

/// What a matchable accessor yields for one field of an example object.
pub enum MatchValue<'a> {
    /// Absent value; skipped as "don't care".
    Null,
    /// A supported scalar, emitted as an equality constraint.
    Scalar(ScalarValue),
    /// A nested example object, recursed into with a dotted path prefix.
    Nested(&'a dyn Matchable),
    /// A declared field whose value type has no constraint encoding.
    /// Extraction fails naming this type.
    Unsupported(&'static str),
}

impl<'a> MatchValue<'a> {
    /// Scalar from an optional value, mapping `None` to [`MatchValue::Null`].
    pub fn from_option<V>(value: &Option<V>) -> Self
    where
        V: Clone + Into<ScalarValue>,
    {
        match value {
            Some(v) => MatchValue::Scalar(v.clone().into()),
            None => MatchValue::Null,
        }
    }

    /// Nested example from an optional sub-object.
    pub fn from_nested<M: Matchable>(value: &'a Option<M>) -> Self {
        match value {
            Some(m) => MatchValue::Nested(m),
            None => MatchValue::Null,
        }
    }
}

impl<'a> fmt::Debug for MatchValue<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchValue::Null => f.write_str("Null"),
            MatchValue::Scalar(v) => write!(f, "Scalar({v:?})"),
            MatchValue::Nested(m) => write!(f, "Nested({})", m.type_name()),
            MatchValue::Unsupported(t) => write!(f, "Unsupported({t})"),
        }
    }
}

/// Opt-in marker for match-by-example visibility.
///
/// Implementors return their matchable properties as `(field name, value)`
/// pairs in declaration order. Fields not listed here are invisible to
/// Match queries by design, which prevents accidental over-matching on
/// derived or sensitive fields.
pub trait Matchable {
    /// The declared matchable properties of this object.
    fn match_fields(&self) -> Vec<(&'static str, MatchValue<'_>)>;

    /// Type name used in extraction diagnostics.
    fn type_name(&self) -> &'static str;
}

/// A persistent record with a stable, comparable identity.
///
/// The primary key type is opaque to the query engine: it is never
/// interpreted, only equality-compared and passed through to backend
/// identity lookups.
pub trait Entity: Matchable + Clone {
    /// Entity name used in generated statements.
    const NAME: &'static str;

    /// Opaque primary key type.
    type Key: PartialEq + Clone + fmt::Debug;

    /// The identity value of this record.
    fn primary_key(&self) -> Self::Key;
}
