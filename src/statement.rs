use crate::clock::Clock;
use crate::cursor::{self, PooledCursor};
use crate::driver::{DriverError, DriverStatement, GeneratedKeys, StatementId};
use crate::options::TracingOptions;
use crate::parameters::Parameters;
use crate::trace;
use crate::{Error, Result};
use std::any::Any;

#[cfg(any(test, feature = "mock"))]
use mockall::automock;

/// The narrow view of the owning connection a pooled statement needs.
///
/// The owner is shared by every statement the connection produces, but only for these three operations. All of them
/// must be safe to call repeatedly: marking dirty is monotonic until the pool resets the connection, untracking an
/// already untracked statement is a no-op.
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait StatementOwner {
    /// Mark the connection transaction state dirty.
    ///
    /// Called before every execution that could have started a transaction or produced side effects, so the pool
    /// knows a commit/rollback cleanup is required before the connection is reused.
    fn mark_dirty(&self);

    /// Stop tracking an open statement.
    fn untrack(&self, statement_id: StatementId);

    /// Translate a raw driver failure into a pool-aware failure.
    ///
    /// The owner may mark itself unusable as a side effect.
    fn translate(&self, error: DriverError) -> Error;
}

/// A statement handed out by a pooled connection.
///
/// Wraps the native statement handle so the pool can observe and control its lifecycle: the owner is marked dirty
/// on every execution, executions are optionally timed and logged when slow, result cursors are wrapped through the
/// same interception discipline, and driver failures are translated through the owner before being surfaced.
///
/// A statement is created by {{crate::connection::ConnectionHandle::prepare}}; registration with the owner's
/// open-statement registry is the owner's responsibility at creation time.
///
/// The handle is not safe for concurrent use: a single logical unit of work holds the connection and its statements
/// exclusively while using them.
pub struct PooledStatement<'c> {
    delegate: Box<dyn DriverStatement>,
    owner: &'c dyn StatementOwner,
    clock: &'c dyn Clock,
    id: StatementId,
    options: TracingOptions,
    closed: bool,
    cached_cursor: Option<PooledCursor<'c>>,
}

impl<'c> PooledStatement<'c> {
    pub fn new(
        owner: &'c dyn StatementOwner,
        delegate: Box<dyn DriverStatement>,
        clock: &'c dyn Clock,
        id: StatementId,
        options: TracingOptions,
    ) -> Self {
        Self { delegate, owner, clock, id, options, closed: false, cached_cursor: None }
    }

    /// The id under which this statement is tracked by its owner.
    pub fn id(&self) -> StatementId {
        self.id
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Execute a statement.
    ///
    /// Returns `true` when the execution produced a result cursor, retrievable via
    /// {{PooledStatement::result_set}}.
    pub fn execute(&mut self, statement: &str) -> Result<bool> {
        self.intercept(statement, |stmt| stmt.execute(statement, GeneratedKeys::None))
    }

    /// Same as {{PooledStatement::execute}}, with auto-generated keys reporting.
    pub fn execute_with_keys(&mut self, statement: &str, keys: GeneratedKeys) -> Result<bool> {
        self.intercept(statement, move |stmt| stmt.execute(statement, keys))
    }

    /// Execute a statement expected to return a result cursor.
    pub fn execute_query(&mut self, statement: &str) -> Result<PooledCursor<'c>> {
        let raw = self.intercept(statement, |stmt| stmt.execute_query(statement))?;
        Ok(cursor::wrap(self.owner, raw))
    }

    /// Execute a statement and return the number of rows affected.
    pub fn execute_update(&mut self, statement: &str) -> Result<u32> {
        self.intercept(statement, |stmt| stmt.execute_update(statement, GeneratedKeys::None))
    }

    /// Same as {{PooledStatement::execute_update}}, with auto-generated keys reporting.
    pub fn execute_update_with_keys(&mut self, statement: &str, keys: GeneratedKeys) -> Result<u32> {
        self.intercept(statement, move |stmt| stmt.execute_update(statement, keys))
    }

    /// Same as {{PooledStatement::execute_update}} for statements expected to affect more than
    /// `u32::MAX` rows.
    pub fn execute_large_update(&mut self, statement: &str) -> Result<u64> {
        self.intercept(statement, |stmt| stmt.execute_large_update(statement, GeneratedKeys::None))
    }

    pub fn execute_large_update_with_keys(&mut self, statement: &str, keys: GeneratedKeys) -> Result<u64> {
        self.intercept(statement, move |stmt| stmt.execute_large_update(statement, keys))
    }

    /// Execute the queued batch and return one update count per queued statement.
    ///
    /// Batch executions mark the owner dirty like any other execution but are never timed or logged: they carry no
    /// single statement text to attribute in the log line.
    pub fn execute_batch(&mut self) -> Result<Vec<u32>> {
        if self.closed {
            return Err(Error::StatementClosed);
        }
        self.owner.mark_dirty();
        self.delegate.execute_batch().map_err(|e| self.owner.translate(e))
    }

    /// Same as {{PooledStatement::execute_batch}} with 64-bit update counts.
    pub fn execute_large_batch(&mut self) -> Result<Vec<u64>> {
        if self.closed {
            return Err(Error::StatementClosed);
        }
        self.owner.mark_dirty();
        self.delegate.execute_large_batch().map_err(|e| self.owner.translate(e))
    }

    /// Queue a statement for batched execution.
    pub fn add_batch(&mut self, statement: &str) -> Result<()> {
        if self.closed {
            return Err(Error::StatementClosed);
        }
        self.delegate.add_batch(statement).map_err(|e| self.owner.translate(e))
    }

    /// Bind positional parameters to the statement.
    pub fn bind(&mut self, parameters: Parameters) -> Result<()> {
        if self.closed {
            return Err(Error::StatementClosed);
        }
        self.delegate.bind(parameters).map_err(|e| self.owner.translate(e))
    }

    /// The current result cursor of the statement, or `None` when there is none.
    ///
    /// The wrapper is cached keyed by the identity of the raw cursor so that polling the statement repeatedly does
    /// not re-wrap the same cursor. The cache is dropped as soon as the underlying cursor changes or becomes absent,
    /// a stale wrapper is never returned.
    pub fn result_set(&mut self) -> Result<Option<&mut PooledCursor<'c>>> {
        if self.closed {
            return Err(Error::StatementClosed);
        }
        match self.delegate.result_set().map_err(|e| self.owner.translate(e))? {
            Some(raw) => {
                if self.cached_cursor.as_ref().map_or(true, |cached| cached.id() != raw.id()) {
                    self.cached_cursor = Some(cursor::wrap(self.owner, raw));
                }
                Ok(self.cached_cursor.as_mut())
            }
            None => {
                self.cached_cursor = None;
                Ok(None)
            }
        }
    }

    /// Return the underlying driver statement if it is a `T`.
    ///
    /// When the delegate is itself a wrapper, its nested chain is walked. Fails with
    /// {{Error::UnsupportedUnwrapTarget}} when no statement in the chain is a `T`.
    pub fn unwrap_ref<T: Any>(&self) -> Result<&T> {
        let mut current: &dyn DriverStatement = self.delegate.as_ref();
        loop {
            if let Some(target) = current.as_any().downcast_ref::<T>() {
                return Ok(target);
            }
            match current.inner() {
                Some(inner) => current = inner,
                None => {
                    return Err(Error::UnsupportedUnwrapTarget {
                        type_name: std::any::type_name::<T>().to_string(),
                    })
                }
            }
        }
    }

    /// Close the statement.
    ///
    /// Closing is idempotent: the first call stops the owner from tracking the statement and closes the delegate,
    /// any subsequent call returns immediately with no side effect. A failure from closing the delegate is
    /// translated and surfaced, but the statement stays closed and untracked.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.owner.untrack(self.id);
        self.delegate.close().map_err(|e| self.owner.translate(e))
    }

    /// The interception template shared by every timed execution: record the start time, mark the owner dirty,
    /// forward to the delegate, then report the elapsed time before translating a failure and returning.
    fn intercept<T, F>(&mut self, statement: &str, op: F) -> Result<T>
    where
        F: FnOnce(&mut dyn DriverStatement) -> std::result::Result<T, DriverError>,
    {
        if self.closed {
            return Err(Error::StatementClosed);
        }
        let start = self.clock.current_time();
        // Dirty-marking happens before the delegate call so that a failure mid-call still leaves the
        // connection flagged for cleanup.
        self.owner.mark_dirty();
        let result = op(self.delegate.as_mut());
        self.trace(statement, self.clock.elapsed_millis(start));
        result.map_err(|e| self.owner.translate(e))
    }

    fn trace(&self, statement: &str, elapsed_millis: u64) {
        if !trace::is_slow(&self.options, elapsed_millis) {
            return;
        }
        // Parameter metadata is best effort, a retrieval failure degrades to an empty description.
        let parameters = self.delegate.parameter_metadata().unwrap_or_default().unwrap_or_default();
        tracing::warn!("{}", trace::slow_statement_message(statement, elapsed_millis, &parameters));
    }
}

impl std::fmt::Display for PooledStatement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PooledStatement#{} wrapping {}", self.id, self.delegate.describe())
    }
}

impl Drop for PooledStatement<'_> {
    fn drop(&mut self) {
        // Best effort cleanup, nobody is left to observe a failure here.
        let _ = self.close();
    }
}
