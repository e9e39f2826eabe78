//! Parser and evaluator for the statement grammar the query builder
//! emits.
//!
//! The memory backend only speaks that grammar: projection head, base
//! clause, eager-fetch hints (accepted and ignored, there is nothing to
//! join eagerly in memory), the `where 1 = 1` seed, AND-joined equality
//! constraints, and a trailing order-by. Raw `Where` fragments are
//! backend-language-specific by contract and are rejected at prepare
//! time.

use daoql_core::{Matchable, MatchValue, StoreError};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Shape of a parsed statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatementKind {
    /// Row query.
    Rows,
    /// Cardinality query.
    Count,
    /// Bulk delete.
    Delete,
}

/// One equality constraint: dotted field path and the literal it must
/// equal, kept in the statement's own rendering.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Constraint {
    pub path: String,
    pub literal: String,
}

/// One order-by key.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrderKey {
    pub path: String,
    pub descending: bool,
}

/// A statement decomposed into evaluatable parts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedStatement {
    pub kind: StatementKind,
    pub entity: String,
    pub distinct: Vec<String>,
    pub constraints: Vec<Constraint>,
    pub order: Vec<OrderKey>,
}

impl ParsedStatement {
    /// Parse a statement produced by the query builder.
    pub fn parse(statement: &str) -> Result<Self, StoreError> {
        let reject = || StoreError::InvalidStatement(statement.to_owned());

        let (kind, mut distinct, rest) = if let Some(rest) = statement.strip_prefix("delete ") {
            (StatementKind::Delete, Vec::new(), rest)
        } else if let Some(rest) = statement.strip_prefix("select count(distinct ") {
            let close = rest.find(')').ok_or_else(reject)?;
            let fields = parse_projection_fields(&rest[..close]).ok_or_else(reject)?;
            (
                StatementKind::Count,
                fields,
                rest[close + 1..].strip_prefix(' ').ok_or_else(reject)?,
            )
        } else if let Some(rest) = statement.strip_prefix("select count(*) ") {
            (StatementKind::Count, Vec::new(), rest)
        } else if let Some(rest) = statement.strip_prefix("select distinct ") {
            let from = find_top_level(rest, " from ").ok_or_else(reject)?;
            let fields = parse_projection_fields(&rest[..from]).ok_or_else(reject)?;
            (StatementKind::Rows, fields, &rest[from + 1..])
        } else if let Some(rest) = statement.strip_prefix("select ") {
            (StatementKind::Rows, Vec::new(), rest)
        } else {
            return Err(reject());
        };

        let rest = rest.strip_prefix("from ").ok_or_else(reject)?;
        let alias = rest.find(" as target").ok_or_else(reject)?;
        let entity = rest[..alias].to_owned();
        if entity.is_empty() || entity.contains(' ') {
            return Err(reject());
        }
        let mut rest = &rest[alias + " as target".len()..];

        // Eager-fetch hints carry no meaning for an in-memory backend.
        while let Some(after) = rest.strip_prefix(" left join fetch ") {
            let stop = after.find(" as ").ok_or_else(reject)?;
            let alias_end = after[stop + 4..]
                .find(' ')
                .map(|i| stop + 4 + i)
                .unwrap_or(after.len());
            rest = &after[alias_end..];
        }

        let rest = rest.strip_prefix(" where 1 = 1").ok_or_else(reject)?;

        let (constraint_text, order_text) = match find_top_level(rest, " order by ") {
            Some(at) => (&rest[..at], Some(&rest[at + " order by ".len()..])),
            None => (rest, None),
        };

        let mut constraints = Vec::new();
        if !constraint_text.is_empty() {
            let stripped = constraint_text.strip_prefix(" and ").ok_or_else(reject)?;
            for fragment in split_top_level(stripped, " and ") {
                constraints.push(parse_constraint(fragment).ok_or_else(reject)?);
            }
        }

        let mut order = Vec::new();
        if let Some(order_text) = order_text {
            if kind == StatementKind::Delete {
                return Err(reject());
            }
            for key in order_text.split(", ") {
                order.push(parse_order_key(key).ok_or_else(reject)?);
            }
        }

        if kind == StatementKind::Delete {
            distinct.clear();
        }

        Ok(Self {
            kind,
            entity,
            distinct,
            constraints,
            order,
        })
    }

    /// Rows matching the constraints, ordered and de-duplicated per the
    /// statement. Windows are applied by the caller.
    pub fn matching<T: Matchable + Clone>(&self, rows: &[T]) -> Vec<T> {
        let mut selected: Vec<(BTreeMap<String, String>, T)> = rows
            .iter()
            .map(|row| (flatten(row), row))
            .filter(|(fields, _)| {
                self.constraints
                    .iter()
                    .all(|c| fields.get(&c.path) == Some(&c.literal))
            })
            .map(|(fields, row)| (fields, row.clone()))
            .collect();

        if !self.order.is_empty() {
            selected.sort_by(|(a, _), (b, _)| {
                for key in &self.order {
                    let ordering = compare_literals(a.get(&key.path), b.get(&key.path));
                    let ordering = if key.descending {
                        ordering.reverse()
                    } else {
                        ordering
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        if !self.distinct.is_empty() {
            let mut seen: Vec<Vec<Option<String>>> = Vec::new();
            selected.retain(|(fields, _)| {
                let tuple: Vec<Option<String>> = self
                    .distinct
                    .iter()
                    .map(|f| fields.get(f).cloned())
                    .collect();
                if seen.contains(&tuple) {
                    false
                } else {
                    seen.push(tuple);
                    true
                }
            });
        }

        selected.into_iter().map(|(_, row)| row).collect()
    }
}

/// Flatten an object's matchable properties to `dotted path -> literal`.
fn flatten(object: &dyn Matchable) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    flatten_into(None, object, &mut fields);
    fields
}

fn flatten_into(
    prefix: Option<&str>,
    object: &dyn Matchable,
    out: &mut BTreeMap<String, String>,
) {
    for (name, value) in object.match_fields() {
        let path = match prefix {
            Some(p) => format!("{p}.{name}"),
            None => name.to_owned(),
        };
        match value {
            MatchValue::Scalar(scalar) => {
                out.insert(path, scalar.to_literal());
            }
            MatchValue::Nested(inner) => flatten_into(Some(&path), inner, out),
            // Null and unsupported values cannot satisfy any equality
            // constraint; leave them out of the row image.
            MatchValue::Null | MatchValue::Unsupported(_) => {}
        }
    }
}

/// Compare two field literals; absent values sort last.
fn compare_literals(a: Option<&String>, b: Option<&String>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        // Integers compare exactly; f64 loses precision past 2^53.
        (Some(a), Some(b)) => match (parse_integer(a), parse_integer(b)) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => match (parse_number(a), parse_number(b)) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => a.cmp(b),
            },
        },
    }
}

fn parse_integer(literal: &str) -> Option<i128> {
    if literal.starts_with('\'') {
        return None;
    }
    literal.parse().ok()
}

fn parse_number(literal: &str) -> Option<f64> {
    if literal.starts_with('\'') {
        return None;
    }
    literal.parse().ok()
}

fn parse_projection_fields(text: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    for part in text.split(", ") {
        fields.push(part.strip_prefix("target.")?.to_owned());
    }
    Some(fields)
}

fn parse_constraint(fragment: &str) -> Option<Constraint> {
    let rest = fragment.strip_prefix("target.")?;
    let eq = find_top_level(rest, " = ")?;
    let path = rest[..eq].to_owned();
    let literal = rest[eq + 3..].to_owned();
    if path.is_empty() || literal.is_empty() || !well_formed_literal(&literal) {
        return None;
    }
    Some(Constraint { path, literal })
}

fn well_formed_literal(literal: &str) -> bool {
    if let Some(inner) = literal.strip_prefix('\'') {
        // A quoted literal must close, with interior quotes doubled.
        let Some(inner) = inner.strip_suffix('\'') else {
            return false;
        };
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\'' && chars.next() != Some('\'') {
                return false;
            }
        }
        true
    } else {
        literal == "true" || literal == "false" || literal.parse::<f64>().is_ok()
    }
}

fn parse_order_key(text: &str) -> Option<OrderKey> {
    let rest = text.strip_prefix("target.")?;
    if let Some(path) = rest.strip_suffix(" asc") {
        return Some(OrderKey {
            path: path.to_owned(),
            descending: false,
        });
    }
    rest.strip_suffix(" desc").map(|path| OrderKey {
        path: path.to_owned(),
        descending: true,
    })
}

/// Find `needle` outside any single-quoted literal.
fn find_top_level(haystack: &str, needle: &str) -> Option<usize> {
    let mut in_quote = false;
    let mut chars = haystack.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\'' {
            // A doubled quote inside a literal is an escaped quote.
            if in_quote && matches!(chars.peek(), Some((_, '\''))) {
                chars.next();
                continue;
            }
            in_quote = !in_quote;
            continue;
        }
        if !in_quote && haystack[i..].starts_with(needle) {
            return Some(i);
        }
    }
    None
}

/// Split on `separator` occurrences outside quoted literals.
fn split_top_level<'s>(text: &'s str, separator: &str) -> Vec<&'s str> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some(at) = find_top_level(rest, separator) {
        parts.push(&rest[..at]);
        rest = &rest[at + separator.len()..];
    }
    parts.push(rest);
    parts
}
