use crate::parameters::Parameters;
use arrow_array::RecordBatch;
use std::any::Any;

/// The error type that the drivers will use to return errors.
///
/// It's a pass-through error type that the drivers will use to return errors. Because each driver may have to deal with
/// specific error types coming from the underlying crate used to interact with the database, the drivers will have to
/// convert those errors to this error type.
///
/// Driver errors never reach the user of the library directly: every failure raised by a delegate call is routed
/// through the owning connection's translation hook which converts it into a {{crate::error::Error}}.
pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, DriverError>;

/// Identity of a statement handle open against a connection.
///
/// Allocated by the connection when it creates the statement and used by the open-statement registry.
pub type StatementId = u64;

/// Stable identity of a raw result cursor.
///
/// Two cursor handles with the same id wrap the same underlying cursor. Drivers typically implement this with a
/// per-statement generation counter bumped on every execution that produces a new cursor.
pub type CursorId = u64;

/// How an execution should report auto-generated keys.
///
/// Collapses the per-overload variants of the usual statement surface (mode flag, column indexes, column names)
/// into a single argument forwarded verbatim to the driver.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GeneratedKeys {
    #[default]
    None,
    Auto,
    ByIndex(Vec<usize>),
    ByName(Vec<String>),
}

pub trait DriverConnection {
    /// Get the name of the driver.
    ///
    /// The name of the driver should be one of the schemes used to register the driver with the factory but it's not
    /// enforced. This name is mostly intended for logging and debugging purposes.
    fn driver_name(&self) -> &str;

    /// Prepare a statement for execution.
    ///
    /// If the statement uses parameters, the statement should be prepared with placeholders for the parameters. The
    /// placeholders themselves are depending on the driver implementation.
    fn prepare(&self, statement: &str) -> Result<Box<dyn DriverStatement>>;

    /// Whether a failure indicates the connection itself is no longer usable.
    ///
    /// Consulted by the connection's translation hook: a fatal failure flips the connection to a broken state so the
    /// pool evicts it instead of reusing it.
    fn is_fatal(&self, _error: &DriverError) -> bool {
        false
    }

    /// Close the connection.
    fn close(self: Box<Self>) -> Result<()>;
}

/// A native statement handle prepared by a driver.
///
/// A statement can be executed multiple times, with different statement texts or parameters. The handle is not safe
/// for concurrent use: at most one call is in flight at any time.
pub trait DriverStatement {
    /// Bind positional parameters to the statement.
    ///
    /// The latest bound parameters are used by the subsequent executions. The number of parameters must match the
    /// number of placeholders in the statement otherwise an error is returned.
    fn bind(&mut self, parameters: Parameters) -> Result<()>;

    /// Queue a statement for batched execution.
    fn add_batch(&mut self, statement: &str) -> Result<()>;

    /// Execute a statement.
    ///
    /// Returns `true` when the execution produced a result cursor.
    fn execute(&mut self, statement: &str, keys: GeneratedKeys) -> Result<bool>;

    /// Execute a statement expected to return a result cursor.
    fn execute_query(&mut self, statement: &str) -> Result<Box<dyn DriverCursor>>;

    /// Execute a statement and return the number of rows affected.
    fn execute_update(&mut self, statement: &str, keys: GeneratedKeys) -> Result<u32>;

    /// Same as {{DriverStatement::execute_update}} for statements expected to affect more than
    /// `u32::MAX` rows.
    fn execute_large_update(&mut self, statement: &str, keys: GeneratedKeys) -> Result<u64>;

    /// Execute the queued batch and return one update count per queued statement.
    fn execute_batch(&mut self) -> Result<Vec<u32>>;

    /// Same as {{DriverStatement::execute_batch}} with 64-bit update counts.
    fn execute_large_batch(&mut self) -> Result<Vec<u64>>;

    /// Get the current result cursor of the statement, if any.
    ///
    /// Every call returns a fresh handle but the id of the handle is stable for a given underlying cursor, so callers
    /// can detect whether two handles wrap the same cursor.
    fn result_set(&mut self) -> Result<Option<Box<dyn DriverCursor>>>;

    /// A description of the parameters currently bound to the statement.
    ///
    /// Returns `Ok(None)` when the statement is not parameterized. Used for diagnostics only.
    fn parameter_metadata(&self) -> Result<Option<String>>;

    /// A human-readable representation of the statement handle, for diagnostics only.
    fn describe(&self) -> String;

    fn as_any(&self) -> &dyn Any;

    /// The next statement handle in a nested wrapping chain, if this handle is itself a wrapper.
    fn inner(&self) -> Option<&dyn DriverStatement> {
        None
    }

    /// Close the statement.
    fn close(&mut self) -> Result<()>;
}

/// A raw result cursor produced by a statement execution.
pub trait DriverCursor {
    /// The stable identity of the underlying cursor.
    fn id(&self) -> CursorId;

    /// Fetch the next batch of records, or `None` when the cursor is exhausted.
    fn next_batch(&mut self) -> Result<Option<RecordBatch>>;
}

pub trait DriverFactory: Sync + Send {
    /// Get the schemes associated with the driver.
    fn schemes(&self) -> &'static [&'static str];
    fn open(&self, uri: &str) -> Result<Box<dyn DriverConnection>>;
}
