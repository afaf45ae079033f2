use crate::clock;
use crate::driver::{DriverConnection, DriverError, StatementId};
use crate::factory::Factory;
use crate::options::TracingOptions;
use crate::statement::{PooledStatement, StatementOwner};
use crate::{Error, Result};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;

/// A pooled connection handle.
///
/// Owns the native connection, the transaction-dirty flag consulted by the pool before reuse, and the registry of
/// statements currently open against the connection. Every statement handed out by
/// {{ConnectionHandle::prepare}} is wrapped into a {{PooledStatement}} so the pool can observe and control its
/// lifecycle without the caller needing pool-awareness.
///
/// The handle is meant to be used by a single logical unit of work at a time, there is no internal locking.
///
/// ```rust,ignore
/// use poolproxy::connection::ConnectionHandle;
///
/// let conn = ConnectionHandle::open("mock://?trace_statements=true&slow_statement_threshold=100")?;
///
/// let mut stmt = conn.prepare("INSERT INTO employee (id) VALUES (1)")?;
/// stmt.execute_update("INSERT INTO employee (id) VALUES (1)")?;
/// drop(stmt);
///
/// // The pool must roll back or commit before handing the connection out again.
/// assert!(conn.is_dirty());
/// ```
pub struct ConnectionHandle {
    inner: Box<dyn DriverConnection>,
    options: TracingOptions,
    dirty: Cell<bool>,
    broken: Cell<bool>,
    open_statements: RefCell<HashSet<StatementId>>,
    next_statement_id: Cell<StatementId>,
}

impl ConnectionHandle {
    /// Open a connection.
    ///
    /// The driver is resolved from the URI scheme through the factory registry. The tracing options are read from
    /// the URI query pairs, see {{TracingOptions::from_uri}}.
    pub fn open(uri: &str) -> Result<Self> {
        let parsed_uri = url::Url::parse(uri)
            .map_err(|e| Error::InvalidUri { uri: uri.to_string(), reason: e.to_string() })?;
        let options = TracingOptions::from_uri(&parsed_uri)?;
        let inner = Factory::open(uri)?;
        Ok(Self::new(inner, options))
    }

    /// Wrap an already opened native connection.
    pub fn new(inner: Box<dyn DriverConnection>, options: TracingOptions) -> Self {
        Self {
            inner,
            options,
            dirty: Cell::new(false),
            broken: Cell::new(false),
            open_statements: RefCell::new(HashSet::new()),
            next_statement_id: Cell::new(0),
        }
    }

    /// Get the driver name used by the connection.
    pub fn driver_name(&self) -> &str {
        self.inner.driver_name()
    }

    pub fn tracing_options(&self) -> TracingOptions {
        self.options
    }

    /// Prepare a statement.
    ///
    /// The returned statement is registered with the open-statement registry until it is closed or dropped.
    pub fn prepare(&self, statement: &str) -> Result<PooledStatement<'_>> {
        let delegate = self.inner.prepare(statement).map_err(|e| self.translate(e))?;
        let id = self.next_statement_id.get();
        self.next_statement_id.set(id + 1);
        self.open_statements.borrow_mut().insert(id);
        Ok(PooledStatement::new(self, delegate, &*clock::MONOTONIC, id, self.options))
    }

    /// Whether an execution may have left transactional state behind.
    ///
    /// The pool must perform a commit/rollback cleanup before reusing a dirty connection.
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Called by the pool once the transactional cleanup has been performed.
    pub fn clear_dirty(&self) {
        self.dirty.set(false);
    }

    /// Whether a translated failure marked the connection unusable.
    ///
    /// A broken connection must be evicted by the pool instead of being reused.
    pub fn is_broken(&self) -> bool {
        self.broken.get()
    }

    /// Number of statements currently open against this connection.
    pub fn open_statement_count(&self) -> usize {
        self.open_statements.borrow().len()
    }

    /// Close the connection.
    ///
    /// Because a {{PooledStatement}} borrows the connection, all statements must be dropped before calling
    /// `close()`.
    pub fn close(self) -> Result<()> {
        self.inner.close().map_err(Error::from)
    }
}

impl StatementOwner for ConnectionHandle {
    fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    fn untrack(&self, statement_id: StatementId) {
        self.open_statements.borrow_mut().remove(&statement_id);
    }

    fn translate(&self, error: DriverError) -> Error {
        if self.inner.is_fatal(&error) {
            self.broken.set(true);
            return Error::ConnectionBroken { error };
        }
        Error::from(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_ok;

    #[test]
    fn test_open() {
        assert!(matches!(ConnectionHandle::open("unknown://"), Err(Error::DriverNotFound { .. })));
        assert!(ConnectionHandle::open("mock://?error").is_err());
        let conn = assert_ok!(ConnectionHandle::open("mock://"));
        assert_eq!(conn.driver_name(), "mock");
        assert!(!conn.is_dirty());
        assert!(!conn.is_broken());
        assert_eq!(conn.open_statement_count(), 0);
    }

    #[test]
    fn test_open_with_tracing_options() {
        let conn = assert_ok!(ConnectionHandle::open("mock://?trace_statements=true&slow_statement_threshold=100"));
        assert_eq!(conn.tracing_options(), TracingOptions { enabled: true, threshold_millis: 100 });
        assert!(ConnectionHandle::open("mock://?slow_statement_threshold=oops").is_err());
    }

    #[test]
    fn test_prepare_tracks_statements() {
        let conn = assert_ok!(ConnectionHandle::open("mock://"));
        assert!(conn.prepare("XINSERT").is_err());

        let mut stmt = assert_ok!(conn.prepare("INSERT 1"));
        assert_eq!(conn.open_statement_count(), 1);
        assert!(stmt.close().is_ok());
        assert_eq!(conn.open_statement_count(), 0);
        drop(stmt);

        // Dropping a statement without closing it untracks it as well.
        {
            let _stmt = assert_ok!(conn.prepare("INSERT 1"));
            let _stmt2 = assert_ok!(conn.prepare("INSERT 2"));
            assert_eq!(conn.open_statement_count(), 2);
        }
        assert_eq!(conn.open_statement_count(), 0);
    }

    #[test]
    fn test_executions_mark_the_connection_dirty() {
        let conn = assert_ok!(ConnectionHandle::open("mock://"));
        let mut stmt = assert_ok!(conn.prepare("INSERT 1"));
        assert!(!conn.is_dirty());
        assert_eq!(stmt.execute_update("INSERT 1").unwrap(), 1);
        assert!(conn.is_dirty());
        drop(stmt);

        conn.clear_dirty();
        assert!(!conn.is_dirty());
    }

    #[test]
    fn test_fatal_failures_break_the_connection() {
        let conn = assert_ok!(ConnectionHandle::open("mock://"));
        let mut stmt = assert_ok!(conn.prepare("INSERT 1"));

        // A plain failure does not break the connection.
        assert!(matches!(stmt.execute_update("SELECT 1"), Err(Error::DriverError { .. })));
        assert!(!conn.is_broken());

        // A fatal failure does, and the connection stays dirty for the cleanup.
        assert!(matches!(stmt.execute_update("INSERT FATAL"), Err(Error::ConnectionBroken { .. })));
        assert!(conn.is_broken());
        assert!(conn.is_dirty());
    }

    #[test]
    fn test_query_through_the_interceptor() {
        let conn = assert_ok!(ConnectionHandle::open("mock://"));
        let mut stmt = assert_ok!(conn.prepare("SELECT 2"));
        let mut cursor = assert_ok!(stmt.execute_query("SELECT 2"));
        let batch = cursor.next_batch().unwrap().unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert!(cursor.next_batch().unwrap().is_none());
        assert!(conn.is_dirty());
    }

    #[test]
    fn test_close() {
        let conn = assert_ok!(ConnectionHandle::open("mock://"));
        let stmt = assert_ok!(conn.prepare("SELECT 1"));

        // If not dropped, the rust compiler will complain about it borrowing `conn` when trying to call
        // `conn.close()`.
        drop(stmt);

        assert!(conn.close().is_ok());
    }
}
