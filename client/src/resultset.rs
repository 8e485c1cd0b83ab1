//! A materialized, restartable cursor over query results.

use crate::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use trellis_core::{FileRef, Record, RecordId, Revision, UserRef};

/// The records returned by one query, with a cursor for positional
/// navigation.
///
/// The set is fully materialized at construction; `first()` rewinds to
/// before the first record so the same set can be iterated again without
/// re-querying. Typed getters read the record at the current position and
/// inherit the type-mismatch semantics of field accessors.
#[derive(Debug, Clone)]
pub struct ResultSet {
    records: Vec<Record>,
    cursor: isize,
}

impl ResultSet {
    /// Build a result set positioned before its first record.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            cursor: -1,
        }
    }

    /// The total number of records, independent of cursor position.
    pub fn size(&self) -> usize {
        self.records.len()
    }

    /// Advance to the next record. Returns true iff a record exists at
    /// the new position.
    pub fn next(&mut self) -> bool {
        if (self.cursor + 1) as usize >= self.records.len() {
            self.cursor = self.records.len() as isize;
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Rewind to before the first record so iteration can restart.
    pub fn first(&mut self) {
        self.cursor = -1;
    }

    /// The record at the current cursor position.
    pub fn record(&self) -> ApiResult<&Record> {
        if self.cursor < 0 {
            return Err(ApiError::CursorOutOfRange {
                position: self.cursor,
            });
        }
        self.records
            .get(self.cursor as usize)
            .ok_or(ApiError::CursorOutOfRange {
                position: self.cursor,
            })
    }

    /// All records, ignoring the cursor.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consume the set, yielding its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// The id of the current record.
    pub fn get_id(&self) -> ApiResult<RecordId> {
        Ok(self.record()?.id())
    }

    /// The revision of the current record, if the store returned one.
    pub fn get_revision(&self) -> ApiResult<Option<Revision>> {
        Ok(self.record()?.revision())
    }

    /// The numeric value of a number field of the current record.
    pub fn get_long(&self, code: &str) -> ApiResult<i64> {
        Ok(self.record()?.get_long(code)?)
    }

    /// The text of a text field of the current record.
    pub fn get_string(&self, code: &str) -> ApiResult<&str> {
        Ok(self.record()?.get_string(code)?)
    }

    /// The values of a multi-select field of the current record.
    pub fn get_strings(&self, code: &str) -> ApiResult<&[String]> {
        Ok(self.record()?.get_strings(code)?)
    }

    /// The attachments of a file field of the current record.
    pub fn get_files(&self, code: &str) -> ApiResult<&[FileRef]> {
        Ok(self.record()?.get_files(code)?)
    }

    /// The single user of a user-select field of the current record.
    pub fn get_user(&self, code: &str) -> ApiResult<&UserRef> {
        Ok(self.record()?.get_user(code)?)
    }

    /// All users of a user-select field of the current record.
    pub fn get_users(&self, code: &str) -> ApiResult<&[UserRef]> {
        Ok(self.record()?.get_users(code)?)
    }

    /// The nested rows of a subtable field of the current record.
    pub fn get_subtable(&self, code: &str) -> ApiResult<&[Record]> {
        Ok(self.record()?.get_subtable(code)?)
    }

    /// The date-time stored in a text field of the current record.
    pub fn get_date(&self, code: &str) -> ApiResult<DateTime<Utc>> {
        Ok(self.record()?.get_date(code)?)
    }
}
