//! An ordered batch of write operations, submitted atomically.

use trellis_core::{AppId, Record, RecordId};

/// One pending write operation. The target app travels with each
/// operation, so a single batch may span several apps.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Insert new records; the store assigns ids in order.
    Insert { app: AppId, records: Vec<Record> },
    /// Apply one record's fields to every listed id, unconditionally.
    Update {
        app: AppId,
        ids: Vec<RecordId>,
        record: Record,
    },
    /// Update each record by its own id, checking its revision if it
    /// carries one.
    UpdateByRecords { app: AppId, records: Vec<Record> },
    /// Delete the listed ids, unconditionally.
    Delete { app: AppId, ids: Vec<RecordId> },
    /// Delete each record by its own id, checking its revision if it
    /// carries one.
    DeleteByRecords { app: AppId, records: Vec<Record> },
}

/// An accumulator of pending operations, executed later as one atomic
/// unit in submission order.
///
/// No validation beyond shape happens here; existence, permissions and
/// revision conflicts are checked by the store at submission time, and a
/// single failure rejects the whole batch.
#[derive(Debug, Clone, Default)]
pub struct BulkRequest {
    operations: Vec<Operation>,
}

impl BulkRequest {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated operations, in submission order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub(crate) fn operations_mut(&mut self) -> &mut [Operation] {
        &mut self.operations
    }

    /// The number of accumulated operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns true if no operations have been accumulated.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Append an insert of one record.
    pub fn insert(&mut self, app: AppId, record: Record) {
        self.insert_all(app, vec![record]);
    }

    /// Append an insert of several records.
    pub fn insert_all(&mut self, app: AppId, records: Vec<Record>) {
        self.operations.push(Operation::Insert { app, records });
    }

    /// Append an unconditional update of one id.
    pub fn update(&mut self, app: AppId, id: RecordId, record: Record) {
        self.update_all(app, vec![id], record);
    }

    /// Append an unconditional update of several ids with the same
    /// fields.
    pub fn update_all(&mut self, app: AppId, ids: Vec<RecordId>, record: Record) {
        self.operations.push(Operation::Update { app, ids, record });
    }

    /// Append a revision-checked update of one record.
    pub fn update_by_record(&mut self, app: AppId, record: Record) {
        self.update_by_records(app, vec![record]);
    }

    /// Append a revision-checked update of several records.
    pub fn update_by_records(&mut self, app: AppId, records: Vec<Record>) {
        self.operations
            .push(Operation::UpdateByRecords { app, records });
    }

    /// Append an unconditional delete of one id.
    pub fn delete(&mut self, app: AppId, id: RecordId) {
        self.delete_all(app, vec![id]);
    }

    /// Append an unconditional delete of several ids.
    pub fn delete_all(&mut self, app: AppId, ids: Vec<RecordId>) {
        self.operations.push(Operation::Delete { app, ids });
    }

    /// Append a revision-checked delete of one record.
    pub fn delete_by_record(&mut self, app: AppId, record: Record) {
        self.delete_by_records(app, vec![record]);
    }

    /// Append a revision-checked delete of several records.
    pub fn delete_by_records(&mut self, app: AppId, records: Vec<Record>) {
        self.operations
            .push(Operation::DeleteByRecords { app, records });
    }
}
