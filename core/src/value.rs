//! Field value types for Trellis records.
//!
//! `FieldValue` is a closed tagged union: one variant per field kind, with
//! the payload shape bound to the tag. An accessor against the wrong
//! variant is a type mismatch, never a silent misread.

use crate::Record;
use std::fmt;
use std::path::PathBuf;

/// The kind of a field, matching the wire-level type tags of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    SingleLineText,
    MultiLineText,
    Number,
    RecordNumber,
    MultiSelect,
    CheckBox,
    UserSelect,
    File,
    Subtable,
    /// Any field kind not modeled explicitly; carries its wire tag.
    Other,
}

impl FieldType {
    /// The wire tag for this kind. `Other` has no fixed tag; the tag
    /// travels with the value instead.
    pub fn wire_tag(&self) -> &'static str {
        match self {
            FieldType::SingleLineText => "SINGLE_LINE_TEXT",
            FieldType::MultiLineText => "MULTI_LINE_TEXT",
            FieldType::Number => "NUMBER",
            FieldType::RecordNumber => "RECORD_NUMBER",
            FieldType::MultiSelect => "MULTI_SELECT",
            FieldType::CheckBox => "CHECK_BOX",
            FieldType::UserSelect => "USER_SELECT",
            FieldType::File => "FILE",
            FieldType::Subtable => "SUBTABLE",
            FieldType::Other => "OTHER",
        }
    }

    /// Resolve a wire tag to a kind. Unknown tags map to `Other`.
    pub fn from_wire_tag(tag: &str) -> FieldType {
        match tag {
            "SINGLE_LINE_TEXT" => FieldType::SingleLineText,
            "MULTI_LINE_TEXT" => FieldType::MultiLineText,
            "NUMBER" => FieldType::Number,
            "RECORD_NUMBER" => FieldType::RecordNumber,
            "MULTI_SELECT" => FieldType::MultiSelect,
            "CHECK_BOX" => FieldType::CheckBox,
            "USER_SELECT" => FieldType::UserSelect,
            "FILE" => FieldType::File,
            "SUBTABLE" => FieldType::Subtable,
            _ => FieldType::Other,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_tag())
    }
}

/// A reference to a user of the store, as stored in a user-select field.
///
/// `name` is display-only; the store resolves it from `code` and it may be
/// absent on records built locally for writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub code: String,
    pub name: Option<String>,
}

impl UserRef {
    /// Create a user reference from a login code.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: None,
        }
    }

    /// Attach the display name (as returned by the store).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// The source of a file upload that has not reached the store yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    /// A file on the local filesystem.
    Path {
        path: PathBuf,
        content_type: Option<String>,
    },
    /// An in-memory byte stream with a declared file name.
    Bytes {
        data: Vec<u8>,
        file_name: String,
        content_type: Option<String>,
    },
}

impl UploadSource {
    /// The file name the store will record for this upload.
    pub fn file_name(&self) -> String {
        match self {
            UploadSource::Path { path, .. } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            UploadSource::Bytes { file_name, .. } => file_name.clone(),
        }
    }

    /// The declared content type, if any.
    pub fn content_type(&self) -> Option<&str> {
        match self {
            UploadSource::Path { content_type, .. } => content_type.as_deref(),
            UploadSource::Bytes { content_type, .. } => content_type.as_deref(),
        }
    }
}

/// One element of a file field: either content already held by the store
/// (identified by its key) or a local upload pending resolution.
///
/// Pending references are resolved to `Stored` at serialization time,
/// immediately before submission, never earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRef {
    /// Content the store already holds.
    Stored { file_key: String },
    /// Local content not uploaded yet.
    Pending(UploadSource),
}

impl FileRef {
    /// Create a reference to content the store already holds.
    pub fn stored(file_key: impl Into<String>) -> Self {
        FileRef::Stored {
            file_key: file_key.into(),
        }
    }

    /// Returns true if this reference still awaits upload.
    pub fn is_pending(&self) -> bool {
        matches!(self, FileRef::Pending(_))
    }

    /// The content key, if already resolved.
    pub fn file_key(&self) -> Option<&str> {
        match self {
            FileRef::Stored { file_key } => Some(file_key),
            FileRef::Pending(_) => None,
        }
    }
}

/// A field value. One variant per field kind; the payload shape is fixed
/// by the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Single-line text.
    SingleLineText(String),
    /// Multi-line text.
    MultiLineText(String),
    /// Numeric value, transmitted as a decimal string to avoid
    /// floating-point precision loss. `None` is the store's empty number.
    Number(Option<i64>),
    /// The row number of the record. Never stored in a field map; adding
    /// it to a record sets the record id instead.
    RecordNumber(u64),
    /// Multi-value selection.
    MultiSelect(Vec<String>),
    /// Check-box selection.
    CheckBox(Vec<String>),
    /// One or more user references.
    UserSelect(Vec<UserRef>),
    /// File attachments, each stored or pending upload.
    File(Vec<FileRef>),
    /// A table within the row: a sequence of nested records.
    Subtable(Vec<Record>),
    /// Any field kind not modeled explicitly. Keeps the wire tag and raw
    /// value so unknown fields round-trip losslessly.
    Other {
        tag: String,
        value: serde_json::Value,
    },
}

impl FieldValue {
    /// The kind of this value.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::SingleLineText(_) => FieldType::SingleLineText,
            FieldValue::MultiLineText(_) => FieldType::MultiLineText,
            FieldValue::Number(_) => FieldType::Number,
            FieldValue::RecordNumber(_) => FieldType::RecordNumber,
            FieldValue::MultiSelect(_) => FieldType::MultiSelect,
            FieldValue::CheckBox(_) => FieldType::CheckBox,
            FieldValue::UserSelect(_) => FieldType::UserSelect,
            FieldValue::File(_) => FieldType::File,
            FieldValue::Subtable(_) => FieldType::Subtable,
            FieldValue::Other { .. } => FieldType::Other,
        }
    }

    /// The wire tag of this value, including the carried tag of `Other`.
    pub fn wire_tag(&self) -> &str {
        match self {
            FieldValue::Other { tag, .. } => tag,
            other => other.field_type().wire_tag(),
        }
    }

    /// Returns true iff the value equals its kind's empty form: empty
    /// string, empty list, or absent number.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::SingleLineText(s) | FieldValue::MultiLineText(s) => s.is_empty(),
            FieldValue::Number(n) => n.is_none(),
            FieldValue::RecordNumber(_) => false,
            FieldValue::MultiSelect(v) | FieldValue::CheckBox(v) => v.is_empty(),
            FieldValue::UserSelect(v) => v.is_empty(),
            FieldValue::File(v) => v.is_empty(),
            FieldValue::Subtable(v) => v.is_empty(),
            FieldValue::Other { value, .. } => value.is_null(),
        }
    }

    /// Returns true if any file reference in this value awaits upload.
    /// Non-file values never do.
    pub fn has_pending_upload(&self) -> bool {
        match self {
            FieldValue::File(refs) => refs.iter().any(FileRef::is_pending),
            FieldValue::Subtable(rows) => rows.iter().any(Record::has_pending_upload),
            _ => false,
        }
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::SingleLineText(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::SingleLineText(v.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Number(Some(v))
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        FieldValue::MultiSelect(v)
    }
}

impl From<Vec<UserRef>> for FieldValue {
    fn from(v: Vec<UserRef>) -> Self {
        FieldValue::UserSelect(v)
    }
}
