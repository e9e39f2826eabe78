//! Clause-to-statement translation.
//!
//! The builder deterministically turns an ordered clause list plus the
//! entity name into a statement string and a result window. Clause-shape
//! errors are detected here, before any backend contact; compiling the
//! statement and binding the window happen at execution time through the
//! store boundary.

use crate::clause::{Clause, ClauseKind, ClauseList};
use crate::entity::Entity;
use crate::error::QueryError;
use crate::matcher::MatchExtractor;
use crate::statement::StatementText;
use crate::store::Window;
use tracing::debug;

/// Projection shape of a built statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Full-row projection.
    Rows,
    /// Row-count projection.
    Count,
    /// De-duplicated field projection.
    Distinct,
    /// Mutating delete statement.
    Delete,
}

/// The product of a build: statement text, optional result window, and
/// the projection shape.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    /// The backend-executable statement text.
    pub statement: String,
    /// Result window from a `Range` clause, if one was present.
    pub window: Option<Window>,
    /// Projection shape.
    pub projection: Projection,
}

/// Translates a [`ClauseList`] into a [`BuiltQuery`] for entity `T`.
///
/// Builders are created per query construction and never shared; a failed
/// build leaves no state behind beyond the abandoned text buffer.
pub struct QueryBuilder<'a, T: Entity> {
    clauses: &'a ClauseList<T>,
}

impl<'a, T: Entity> QueryBuilder<'a, T> {
    /// A builder over the given clauses.
    pub fn new(clauses: &'a ClauseList<T>) -> Self {
        Self { clauses }
    }

    /// Build a row, count, or distinct query statement.
    pub fn build(&self) -> Result<BuiltQuery, QueryError> {
        let count = self.clauses.find(ClauseKind::Count)?.is_some();
        let distinct_fields = self.distinct_fields();

        let projection = if count {
            Projection::Count
        } else if !distinct_fields.is_empty() {
            Projection::Distinct
        } else {
            Projection::Rows
        };

        let mut text = StatementText::new();
        text.add(&Self::projection_head(count, &distinct_fields));
        self.append_body(&mut text, true)?;
        self.finish(text, projection)
    }

    /// Build a delete statement over the filter clauses.
    ///
    /// Only `Match` and `Where` participate; projection, sort, fetch, and
    /// range clauses have no meaning for a bulk delete.
    pub fn build_delete(&self) -> Result<BuiltQuery, QueryError> {
        let mut text = StatementText::new();
        text.add("delete");
        self.append_body(&mut text, false)?;
        self.finish(text, Projection::Delete)
    }

    fn projection_head(count: bool, distinct_fields: &[String]) -> String {
        let distinct = distinct_fields
            .iter()
            .map(|f| format!("target.{f}"))
            .collect::<Vec<_>>()
            .join(", ");
        match (count, distinct_fields.is_empty()) {
            (true, true) => "select count(*)".to_owned(),
            (true, false) => format!("select count(distinct {distinct})"),
            (false, false) => format!("select distinct {distinct}"),
            (false, true) => "select".to_owned(),
        }
    }

    /// Base clause, eager-fetch joins, the unconditional seed predicate,
    /// and the filter chain. Sort clauses are only applied to row queries.
    fn append_body(&self, text: &mut StatementText, with_shape: bool) -> Result<(), QueryError> {
        text.add(&format!("from {} as target", T::NAME));

        if with_shape {
            // Each fetch gets a unique alias derived from its field name
            // so multiple fetches cannot collide.
            for (position, clause) in self.clauses.find_all(ClauseKind::Fetch).into_iter().enumerate() {
                if let Clause::Fetch(field) = clause {
                    let alias = format!("{}_{}", field.replace('.', "_"), position);
                    text.add(&format!("left join fetch target.{field} as {alias}"));
                }
            }
        }

        // Seed predicate: every later constraint AND-joins without
        // special-casing the first fragment.
        text.add("where 1 = 1");

        let match_clause = self.clauses.find(ClauseKind::Match)?;
        let where_clause = self.clauses.find(ClauseKind::Where)?;
        if let Some(Clause::Match(example)) = match_clause {
            MatchExtractor::new().extract(example, text)?;
            if where_clause.is_some() {
                return Err(QueryError::ConflictingClauses {
                    first: ClauseKind::Match,
                    second: ClauseKind::Where,
                });
            }
        }
        if let Some(Clause::Where(fragment)) = where_clause {
            text.and_add(&format!("({fragment})"));
        }

        if with_shape {
            self.append_order(text)?;
        }
        Ok(())
    }

    fn append_order(&self, text: &mut StatementText) -> Result<(), QueryError> {
        let ascending = self.clauses.find(ClauseKind::Ascending)?;
        let descending = self.clauses.find(ClauseKind::Descending)?;
        if ascending.is_some() && descending.is_some() {
            return Err(QueryError::ConflictingClauses {
                first: ClauseKind::Ascending,
                second: ClauseKind::Descending,
            });
        }
        let (fields, direction) = match (ascending, descending) {
            (Some(Clause::Ascending(fields)), _) => (fields, "asc"),
            (_, Some(Clause::Descending(fields))) => (fields, "desc"),
            _ => return Ok(()),
        };
        let keys = fields
            .iter()
            .map(|f| format!("target.{f} {direction}"))
            .collect::<Vec<_>>()
            .join(", ");
        text.add(&format!("order by {keys}"));
        Ok(())
    }

    fn finish(
        &self,
        text: StatementText,
        projection: Projection,
    ) -> Result<BuiltQuery, QueryError> {
        let window = match self.clauses.find(ClauseKind::Range)? {
            Some(Clause::Range { first, count }) => Some(Window::new(*first, *count)),
            _ => None,
        };
        let statement = text.into_string();
        debug!(entity = T::NAME, statement = %statement, "built query statement");
        Ok(BuiltQuery {
            statement,
            window,
            projection,
        })
    }

    fn distinct_fields(&self) -> Vec<String> {
        self.clauses
            .find_all(ClauseKind::Distinct)
            .into_iter()
            .filter_map(|c| match c {
                Clause::Distinct(field) => Some(field.clone()),
                _ => None,
            })
            .collect()
    }
}
