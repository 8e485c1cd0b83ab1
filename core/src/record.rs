//! A record: one row of a remote application.

use crate::{
    CoreError, CoreResult, Field, FieldValue, FileRef, RecordId, Revision, UploadSource, UserRef,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;

/// The combined-date-time text form used on the wire, always UTC.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// One row of a remote application: an id, a revision, and a mapping of
/// field code to field.
///
/// Field codes are case-insensitive; the mapping key is lowercased at every
/// insertion, so lookups never depend on the caller's casing. A field whose
/// value is a record number is never stored in the mapping — adding one
/// sets the record id instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RecordId,
    revision: Option<Revision>,
    fields: HashMap<String, Field>,
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl Record {
    /// Create an empty record with no id assigned.
    pub fn new() -> Self {
        Self {
            id: RecordId::UNASSIGNED,
            revision: None,
            fields: HashMap::new(),
        }
    }

    /// Create an empty record referring to an existing row.
    pub fn with_id(id: RecordId) -> Self {
        Self {
            id,
            revision: None,
            fields: HashMap::new(),
        }
    }

    /// The row id; `RecordId::UNASSIGNED` for a record not stored yet.
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Set the row id.
    pub fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    /// The revision this record was read at, if any. `None` means updates
    /// and deletes through this record skip the conflict check.
    pub fn revision(&self) -> Option<Revision> {
        self.revision
    }

    /// Set the expected revision for conflict-checked writes.
    pub fn set_revision(&mut self, revision: Revision) {
        self.revision = Some(revision);
    }

    /// Drop the revision, making later writes unconditional.
    pub fn clear_revision(&mut self) {
        self.revision = None;
    }

    /// Add a field. This is the single normalization point: the mapping key
    /// is the lowercased field code, and a record-number field sets `id`
    /// instead of entering the mapping.
    pub fn add_field(&mut self, field: Field) {
        if let FieldValue::RecordNumber(n) = field.value() {
            self.id = RecordId::new(*n);
            return;
        }
        self.fields.insert(field.code().to_lowercase(), field);
    }

    /// Look up a field by code, case-insensitively.
    pub fn field(&self, code: &str) -> Option<&Field> {
        self.fields.get(&code.to_lowercase())
    }

    /// Returns true if a field with this code exists.
    pub fn has_field(&self, code: &str) -> bool {
        self.fields.contains_key(&code.to_lowercase())
    }

    /// The normalized codes of all fields, in no particular order.
    pub fn field_codes(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(String::as_str)
    }

    /// All fields, in no particular order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.fields.values()
    }

    /// Mutable access to all fields. Used by the serialization layer to
    /// resolve pending uploads in place.
    pub fn fields_mut(&mut self) -> impl Iterator<Item = &mut Field> + '_ {
        self.fields.values_mut()
    }

    /// The number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true iff the named field holds its kind's empty form.
    pub fn is_field_empty(&self, code: &str) -> CoreResult<bool> {
        Ok(self.require(code)?.is_empty())
    }

    /// Returns true if any file field (including inside subtables) still
    /// awaits upload.
    pub fn has_pending_upload(&self) -> bool {
        self.fields.values().any(|f| f.value().has_pending_upload())
    }

    fn require(&self, code: &str) -> CoreResult<&Field> {
        self.field(code)
            .ok_or_else(|| CoreError::field_not_found(code))
    }

    // Typed getters. Each inherits the type-mismatch semantics of `Field`.

    /// The numeric value of a number field.
    pub fn get_long(&self, code: &str) -> CoreResult<i64> {
        self.require(code)?.as_long()
    }

    /// The text of a text field.
    pub fn get_string(&self, code: &str) -> CoreResult<&str> {
        self.require(code)?.as_string()
    }

    /// The values of a multi-select or check-box field.
    pub fn get_strings(&self, code: &str) -> CoreResult<&[String]> {
        self.require(code)?.as_string_list()
    }

    /// The attachments of a file field.
    pub fn get_files(&self, code: &str) -> CoreResult<&[FileRef]> {
        self.require(code)?.as_file_list()
    }

    /// The single user of a user-select field.
    pub fn get_user(&self, code: &str) -> CoreResult<&UserRef> {
        self.require(code)?.as_user()
    }

    /// All users of a user-select field.
    pub fn get_users(&self, code: &str) -> CoreResult<&[UserRef]> {
        self.require(code)?.as_user_list()
    }

    /// The nested rows of a subtable field.
    pub fn get_subtable(&self, code: &str) -> CoreResult<&[Record]> {
        self.require(code)?.as_subtable()
    }

    /// The date-time stored in a text field, parsed from the exact
    /// `%Y-%m-%dT%H:%M:%SZ` UTC form. A malformed value is a type
    /// mismatch.
    pub fn get_date(&self, code: &str) -> CoreResult<DateTime<Utc>> {
        let text = self.get_string(code)?;
        let naive = NaiveDateTime::parse_from_str(text, DATE_FORMAT).map_err(|_| {
            CoreError::type_mismatch(code, "date-time in %Y-%m-%dT%H:%M:%SZ form", text.to_string())
        })?;
        Ok(naive.and_utc())
    }

    // Typed setters. All funnel through `add_field`.

    /// Set a single-line text field.
    pub fn set_text(&mut self, code: &str, value: impl Into<String>) {
        self.add_field(Field::new(code, FieldValue::SingleLineText(value.into())));
    }

    /// Set a multi-line text field.
    pub fn set_multiline_text(&mut self, code: &str, value: impl Into<String>) {
        self.add_field(Field::new(code, FieldValue::MultiLineText(value.into())));
    }

    /// Set a number field.
    pub fn set_number(&mut self, code: &str, value: i64) {
        self.add_field(Field::new(code, FieldValue::Number(Some(value))));
    }

    /// Set a multi-select field.
    pub fn set_strings<I, S>(&mut self, code: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.add_field(Field::new(code, FieldValue::MultiSelect(values)));
    }

    /// Set a user-select field from login codes.
    pub fn set_users<I, S>(&mut self, code: &str, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let users = codes.into_iter().map(UserRef::new).collect();
        self.add_field(Field::new(code, FieldValue::UserSelect(users)));
    }

    /// Set a file field from content keys the store already holds.
    pub fn set_file_keys<I, S>(&mut self, code: &str, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let refs = keys.into_iter().map(FileRef::stored).collect();
        self.add_field(Field::new(code, FieldValue::File(refs)));
    }

    /// Set a file field from a local file path. The content is uploaded at
    /// submission time, not now.
    pub fn set_upload(&mut self, code: &str, path: impl Into<PathBuf>, content_type: Option<&str>) {
        let source = UploadSource::Path {
            path: path.into(),
            content_type: content_type.map(str::to_string),
        };
        self.add_field(Field::new(code, FieldValue::File(vec![FileRef::Pending(source)])));
    }

    /// Set a file field from in-memory bytes. The content is uploaded at
    /// submission time, not now.
    pub fn set_upload_bytes(
        &mut self,
        code: &str,
        data: Vec<u8>,
        file_name: impl Into<String>,
        content_type: Option<&str>,
    ) {
        let source = UploadSource::Bytes {
            data,
            file_name: file_name.into(),
            content_type: content_type.map(str::to_string),
        };
        self.add_field(Field::new(code, FieldValue::File(vec![FileRef::Pending(source)])));
    }

    /// Set a subtable field.
    pub fn set_subtable(&mut self, code: &str, rows: Vec<Record>) {
        self.add_field(Field::new(code, FieldValue::Subtable(rows)));
    }

    /// Set a date-time, encoded to the `%Y-%m-%dT%H:%M:%SZ` UTC text form
    /// at one-second resolution and stored as single-line text.
    pub fn set_date(&mut self, code: &str, date: DateTime<Utc>) {
        self.set_text(code, date.format(DATE_FORMAT).to_string());
    }
}
