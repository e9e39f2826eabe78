//! Accumulator for the statement text being built.

use std::fmt;

/// An append-only buffer for a query-language statement.
///
/// Two write modes: [`add`](Self::add) joins fragments with a single
/// space, [`and_add`](Self::and_add) inserts the boolean connective
/// `" and "` before all but the first fragment. A buffer is created per
/// query build and discarded once the statement is produced; it carries
/// fragment state and must not be reused across queries.
#[derive(Debug, Default)]
pub struct StatementText {
    text: String,
}

impl StatementText {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment, space-joined to any existing text.
    pub fn add(&mut self, fragment: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(fragment);
    }

    /// Append a fragment, AND-joined to any existing text.
    pub fn and_add(&mut self, fragment: &str) {
        if !self.text.is_empty() {
            self.text.push_str(" and ");
        }
        self.text.push_str(fragment);
    }

    /// Append raw text with no connective.
    pub fn append(&mut self, raw: &str) {
        self.text.push_str(raw);
    }

    /// Whether the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The accumulated statement text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume the buffer, yielding the statement.
    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for StatementText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
