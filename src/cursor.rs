use crate::driver::{CursorId, DriverCursor};
use crate::statement::StatementOwner;
use crate::Result;
use arrow_array::RecordBatch;

/// A result cursor obtained from a pooled statement.
///
/// Wraps the raw driver cursor with the same interception discipline as the statement that produced it: failures
/// raised while fetching are routed through the owning connection's translation hook before being surfaced.
pub struct PooledCursor<'c> {
    delegate: Box<dyn DriverCursor>,
    owner: &'c dyn StatementOwner,
}

impl PooledCursor<'_> {
    /// The identity of the underlying raw cursor.
    pub fn id(&self) -> CursorId {
        self.delegate.id()
    }

    /// Fetch the next batch of records, or `None` when the cursor is exhausted.
    pub fn next_batch(&mut self) -> Result<Option<RecordBatch>> {
        self.delegate.next_batch().map_err(|e| self.owner.translate(e))
    }
}

impl Iterator for PooledCursor<'_> {
    type Item = Result<RecordBatch>;

    fn next(&mut self) -> Option<Result<RecordBatch>> {
        self.next_batch().transpose()
    }
}

/// Wrap a raw driver cursor for the given owner.
///
/// Every cursor handed out by this layer goes through here, whether returned directly by a query execution or
/// fetched later from the statement.
pub(crate) fn wrap<'c>(owner: &'c dyn StatementOwner, delegate: Box<dyn DriverCursor>) -> PooledCursor<'c> {
    PooledCursor { delegate, owner }
}
