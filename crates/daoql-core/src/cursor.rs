//! Forward-only, page-at-a-time result cursor.

use crate::builder::BuiltQuery;
use crate::entity::Entity;
use crate::error::QueryError;
use crate::store::{Store, Window};
use tracing::debug;

/// A forward-only, single-pass cursor over a query's results.
///
/// The cursor owns no rows beyond the current page. Every page fetch
/// re-prepares and re-executes the statement with a fresh
/// `(offset, page size)` window, so no backend statement or session is
/// held open across pages: one extra round trip per page buys bounded
/// resource retention. A cursor is not restartable and has no internal
/// synchronization; it must be consumed by a single owner on a single
/// thread.
pub struct PagedCursor<'a, T: Entity> {
    store: &'a dyn Store<T>,
    statement: String,
    page_size: u64,
    /// Base offset contributed by a `Range` clause.
    base_first: u64,
    /// Rows still allowed by a `Range` clause's count, when one was given.
    remaining: Option<u64>,
    /// Logical rows consumed so far, relative to `base_first`.
    index: u64,
    page: std::vec::IntoIter<T>,
    exhausted: bool,
}

impl<'a, T: Entity> PagedCursor<'a, T> {
    /// A cursor over `built`, fetching `page_size` rows per round trip.
    pub fn new(store: &'a dyn Store<T>, built: BuiltQuery, page_size: u64) -> Self {
        let (base_first, remaining) = match built.window {
            Some(Window { first, count }) => (first, Some(count)),
            None => (0, None),
        };
        Self {
            store,
            statement: built.statement,
            page_size: page_size.max(1),
            base_first,
            remaining,
            index: 0,
            page: Vec::new().into_iter(),
            exhausted: false,
        }
    }

    /// The statement this cursor executes per page.
    pub fn statement(&self) -> &str {
        &self.statement
    }

    fn fetch_page(&mut self) -> Result<(), QueryError> {
        let want = match self.remaining {
            Some(remaining) => remaining.min(self.page_size),
            None => self.page_size,
        };
        if want == 0 {
            self.exhausted = true;
            return Ok(());
        }
        let window = Window::new(self.base_first + self.index, want);
        let prepared =
            self.store
                .prepare(&self.statement)
                .map_err(|source| QueryError::Compilation {
                    statement: self.statement.clone(),
                    source,
                })?;
        let rows = prepared.rows(Some(window))?;
        debug!(
            offset = window.first,
            requested = want,
            returned = rows.len(),
            "fetched result page"
        );
        if (rows.len() as u64) < want {
            self.exhausted = true;
        }
        if let Some(remaining) = &mut self.remaining {
            *remaining -= rows.len() as u64;
        }
        self.page = rows.into_iter();
        Ok(())
    }
}

impl<'a, T: Entity> Iterator for PagedCursor<'a, T> {
    type Item = Result<T, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(row) = self.page.next() {
            self.index += 1;
            return Some(Ok(row));
        }
        if self.exhausted {
            return None;
        }
        if let Err(error) = self.fetch_page() {
            self.exhausted = true;
            return Some(Err(error));
        }
        let row = self.page.next()?;
        self.index += 1;
        Some(Ok(row))
    }
}
