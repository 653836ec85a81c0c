//! Decoded responses and their lazy row sequences
//!
//! A [`Response`] carries exactly one result shape: a boolean, or columns
//! plus a single-pass [`Rows`] sequence. Rows move through
//! `Streaming → Exhausted | Closed`, or stop at `Failed` and replay that
//! failure on every later call. Leaving `Streaming` by any route closes the
//! attached [`Cleanup`] once.

use crate::column::Column;
use crate::error::{WireError, WireResult};
use crate::node::Node;
use crate::stream::{Bounded, Cleanup, Lookahead};
use std::fmt;
use std::iter;
use tracing::{debug, warn};

/// One result row; `None` marks an absent value
pub type Row = Vec<Option<Node>>;

type RowSource = Box<dyn Iterator<Item = WireResult<Row>> + Send>;

fn empty_source() -> RowSource {
    Box::new(iter::empty())
}

#[derive(Debug, Clone)]
enum RowsState {
    Streaming,
    Exhausted,
    Closed,
    Failed(WireError),
}

/// Forward-only sequence of rows with attached cleanup
///
/// Iteration yields `Result<Row, WireError>`. After a wire failure every
/// further `next`, `peek` or `has_next` returns that same failure, so loops
/// over a failed sequence must stop on the first `Err`.
pub struct Rows {
    source: Lookahead<RowSource>,
    state: RowsState,
    cleanup: Cleanup,
}

impl Rows {
    pub fn new<I>(source: I, cleanup: Cleanup) -> Self
    where
        I: Iterator<Item = WireResult<Row>> + Send + 'static,
    {
        Self {
            source: Lookahead::new(Box::new(source)),
            state: RowsState::Streaming,
            cleanup,
        }
    }

    /// Rows already in memory
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self::new(rows.into_iter().map(Ok), Cleanup::noop())
    }

    /// Cap the sequence at `max` further rows; reaching the cap runs cleanup
    ///
    /// A row already peeked counts toward the cap.
    pub fn limit(mut self, max: usize) -> Self {
        let source = std::mem::replace(&mut self.source, Lookahead::new(empty_source()));
        let bounded: RowSource = Box::new(Bounded::new(source, Some(max)));
        self.source = Lookahead::new(bounded);
        self
    }

    /// Whether another row follows, without consuming it
    pub fn has_next(&mut self) -> WireResult<bool> {
        match &self.state {
            RowsState::Failed(error) => return Err(error.clone()),
            RowsState::Exhausted | RowsState::Closed => return Ok(false),
            RowsState::Streaming => {}
        }
        match self.source.peek() {
            Some(Ok(_)) => return Ok(true),
            None => {
                self.finish(RowsState::Exhausted);
                return Ok(false);
            }
            Some(Err(_)) => {}
        }
        match self.source.next() {
            Some(Err(error)) => Err(self.fail(error)),
            _ => Ok(false),
        }
    }

    /// The next row, left in place for the following `next`
    pub fn peek(&mut self) -> WireResult<Option<&Row>> {
        if !self.has_next()? {
            return Ok(None);
        }
        match self.source.peek() {
            Some(Ok(row)) => Ok(Some(row)),
            _ => Ok(None),
        }
    }

    /// Stop early and release the underlying resources
    pub fn close(&mut self) {
        if matches!(self.state, RowsState::Streaming) {
            self.finish(RowsState::Closed);
        } else {
            self.cleanup.close();
        }
    }

    /// Whether the sequence can still produce rows
    pub fn is_open(&self) -> bool {
        matches!(self.state, RowsState::Streaming)
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, RowsState::Exhausted)
    }

    /// The terminal failure, if iteration stopped on one
    pub fn failure(&self) -> Option<&WireError> {
        match &self.state {
            RowsState::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn cleanup(&self) -> &Cleanup {
        &self.cleanup
    }

    fn finish(&mut self, state: RowsState) {
        match state {
            RowsState::Exhausted => debug!("Row sequence exhausted"),
            RowsState::Closed => debug!("Row sequence closed early"),
            _ => {}
        }
        self.state = state;
        // Drops the byte source before the cleanup runs
        self.source = Lookahead::new(empty_source());
        self.cleanup.close();
    }

    fn fail(&mut self, error: WireError) -> WireError {
        warn!("Row sequence failed: {}", error);
        self.finish(RowsState::Failed(error.clone()));
        error
    }
}

impl Iterator for Rows {
    type Item = WireResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match &self.state {
            RowsState::Failed(error) => return Some(Err(error.clone())),
            RowsState::Exhausted | RowsState::Closed => return None,
            RowsState::Streaming => {}
        }
        match self.source.next() {
            Some(Ok(row)) => Some(Ok(row)),
            Some(Err(error)) => Some(Err(self.fail(error))),
            None => {
                self.finish(RowsState::Exhausted);
                None
            }
        }
    }
}

impl Drop for Rows {
    fn drop(&mut self) {
        self.cleanup.close();
    }
}

impl fmt::Debug for Rows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rows")
            .field("state", &self.state)
            .field("cleanup", &self.cleanup)
            .finish()
    }
}

/// A decoded response: a boolean, or columns with their rows
#[derive(Debug)]
pub struct Response {
    boolean: Option<bool>,
    columns: Option<Vec<Column>>,
    rows: Option<Rows>,
    cleanup: Cleanup,
}

impl Response {
    /// Boolean result; nothing remains to read, so the cleanup runs now
    pub fn from_boolean(value: bool, cleanup: Cleanup) -> Self {
        cleanup.close();
        Self {
            boolean: Some(value),
            columns: None,
            rows: None,
            cleanup,
        }
    }

    /// Tabular result sharing the row sequence's cleanup
    pub fn from_rows(columns: Vec<Column>, rows: Rows) -> Self {
        let cleanup = rows.cleanup().clone();
        Self {
            boolean: None,
            columns: Some(columns),
            rows: Some(rows),
            cleanup,
        }
    }

    /// Assemble a response, rejecting contradictory or empty shapes
    pub fn from_parts(
        boolean: Option<bool>,
        columns: Option<Vec<Column>>,
        rows: Option<Rows>,
        cleanup: Cleanup,
    ) -> WireResult<Self> {
        match (boolean, columns, rows) {
            (Some(value), None, None) => Ok(Self::from_boolean(value, cleanup)),
            (None, Some(columns), Some(rows)) => Ok(Self {
                boolean: None,
                columns: Some(columns),
                rows: Some(rows.chain_cleanup(&cleanup)),
                cleanup,
            }),
            (None, None, None) => {
                cleanup.close();
                Err(WireError::protocol("neither a boolean nor a tabular result"))
            }
            (Some(_), _, _) => {
                cleanup.close();
                Err(WireError::protocol("both a boolean and a tabular result"))
            }
            _ => {
                cleanup.close();
                Err(WireError::protocol("columns and rows must be given together"))
            }
        }
    }

    pub fn boolean(&self) -> Option<bool> {
        self.boolean
    }

    pub fn columns(&self) -> Option<&[Column]> {
        self.columns.as_deref()
    }

    pub fn rows(&mut self) -> Option<&mut Rows> {
        self.rows.as_mut()
    }

    pub fn is_boolean(&self) -> bool {
        self.boolean.is_some()
    }

    pub fn cleanup(&self) -> &Cleanup {
        &self.cleanup
    }

    /// Release the response's resources; later calls are no-ops
    pub fn close(&mut self) {
        if let Some(rows) = self.rows.as_mut() {
            rows.close();
        }
        self.cleanup.close();
    }

    /// Cap the row sequence, if any, at `max` further rows
    pub fn limit_rows(&mut self, max: usize) {
        if let Some(rows) = self.rows.take() {
            self.rows = Some(rows.limit(max));
        }
    }

    pub fn into_parts(self) -> (Option<bool>, Option<Vec<Column>>, Option<Rows>, Cleanup) {
        (self.boolean, self.columns, self.rows, self.cleanup)
    }
}

impl Rows {
    fn chain_cleanup(mut self, next: &Cleanup) -> Self {
        self.cleanup = self.cleanup.chain(next.clone());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnTyping, Nullability};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counted() -> (Cleanup, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let cleanup = Cleanup::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (cleanup, count)
    }

    fn row(iri: &str) -> Row {
        vec![Some(Node::iri(iri))]
    }

    fn column(name: &str) -> Column {
        Column::detect(name, None, None, Nullability::Nullable, ColumnTyping::Detected)
    }

    #[test]
    fn test_exhaustion_runs_cleanup_once() {
        let (cleanup, count) = counted();
        let mut rows = Rows::new(vec![Ok(row("a")), Ok(row("b"))].into_iter(), cleanup);
        assert!(rows.has_next().unwrap());
        assert_eq!(rows.peek().unwrap(), Some(&row("a")));
        assert_eq!(rows.next().unwrap().unwrap(), row("a"));
        assert_eq!(rows.next().unwrap().unwrap(), row("b"));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(rows.next().is_none());
        assert!(rows.is_exhausted());
        assert!(rows.next().is_none());
        rows.close();
        drop(rows);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_is_replayed() {
        let (cleanup, count) = counted();
        let source = vec![Ok(row("a")), Err(WireError::malformed("truncated stream")), Ok(row("b"))];
        let mut rows = Rows::new(source.into_iter(), cleanup);
        assert!(rows.next().unwrap().is_ok());
        let first = rows.next().unwrap().unwrap_err();
        assert!(first.is_malformed());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert!(rows.has_next().unwrap_err().is_malformed());
        assert!(rows.peek().is_err());
        assert_eq!(rows.next().unwrap().unwrap_err().to_string(), first.to_string());
        assert!(rows.failure().is_some());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_peeked_failure_terminates() {
        let (cleanup, count) = counted();
        let mut rows = Rows::new(
            vec![Err(WireError::malformed("bad row"))].into_iter(),
            cleanup,
        );
        assert!(rows.has_next().is_err());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(rows.next().unwrap().is_err());
    }

    #[test]
    fn test_limit_stops_and_cleans_up() {
        let (cleanup, count) = counted();
        let source = (0..).map(|i| Ok(row(&format!("http://example.org/{}", i))));
        let mut rows = Rows::new(source, cleanup).limit(2);
        assert!(rows.has_next().unwrap());
        assert_eq!(rows.by_ref().filter_map(Result::ok).count(), 2);
        assert!(rows.is_exhausted());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_early_close() {
        let (cleanup, count) = counted();
        let mut rows = Rows::new((0..10).map(|_| Ok(row("a"))), cleanup);
        rows.next();
        rows.close();
        rows.close();
        assert!(!rows.is_open());
        assert!(rows.next().is_none());
        assert!(!rows.has_next().unwrap());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_runs_cleanup() {
        let (cleanup, count) = counted();
        let rows = Rows::new(iter::once(Ok(row("a"))), cleanup);
        drop(rows);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_boolean_response() {
        let (cleanup, count) = counted();
        let response = Response::from_boolean(true, cleanup);
        assert_eq!(response.boolean(), Some(true));
        assert!(response.columns().is_none());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_contradictory_shapes_rejected() {
        let (cleanup, count) = counted();
        let err = Response::from_parts(
            Some(true),
            Some(vec![column("x")]),
            Some(Rows::from_rows(vec![])),
            cleanup,
        )
        .unwrap_err();
        assert!(err.is_protocol());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        let err = Response::from_parts(None, None, None, Cleanup::noop()).unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn test_tabular_parts_share_cleanup() {
        let (cleanup, count) = counted();
        let mut response = Response::from_parts(
            None,
            Some(vec![column("x")]),
            Some(Rows::from_rows(vec![row("a")])),
            cleanup,
        )
        .unwrap();
        assert_eq!(response.columns().map(<[Column]>::len), Some(1));
        let rows = response.rows().unwrap();
        assert_eq!(rows.count(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        response.close();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
