//! A named, typed attribute of a record.

use crate::{CoreError, CoreResult, FieldType, FieldValue, FileRef, Record, UserRef};

/// One named field of a record.
///
/// Accessors are type-checked: reading a field through the wrong kind
/// fails with [`CoreError::TypeMismatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    code: String,
    value: FieldValue,
}

impl Field {
    /// Create a field from a code and a value.
    pub fn new(code: impl Into<String>, value: FieldValue) -> Self {
        Self {
            code: code.into(),
            value,
        }
    }

    /// The field code as supplied by the caller or the store.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The kind of this field.
    pub fn field_type(&self) -> FieldType {
        self.value.field_type()
    }

    /// The value.
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Mutable access to the value. Used by the serialization layer to
    /// replace pending file uploads with their resolved keys.
    pub fn value_mut(&mut self) -> &mut FieldValue {
        &mut self.value
    }

    /// Returns true iff the value equals its kind's empty form.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    fn mismatch(&self, expected: &'static str) -> CoreError {
        CoreError::type_mismatch(&self.code, expected, self.value.wire_tag().to_string())
    }

    /// The numeric value of a number or record-number field.
    pub fn as_long(&self) -> CoreResult<i64> {
        match &self.value {
            FieldValue::Number(Some(n)) => Ok(*n),
            FieldValue::RecordNumber(n) => Ok(*n as i64),
            _ => Err(self.mismatch("NUMBER")),
        }
    }

    /// The text of a single-line or multi-line text field.
    pub fn as_string(&self) -> CoreResult<&str> {
        match &self.value {
            FieldValue::SingleLineText(s) | FieldValue::MultiLineText(s) => Ok(s),
            _ => Err(self.mismatch("text")),
        }
    }

    /// The values of a multi-select or check-box field.
    pub fn as_string_list(&self) -> CoreResult<&[String]> {
        match &self.value {
            FieldValue::MultiSelect(v) | FieldValue::CheckBox(v) => Ok(v),
            _ => Err(self.mismatch("MULTI_SELECT")),
        }
    }

    /// The attachments of a file field.
    pub fn as_file_list(&self) -> CoreResult<&[FileRef]> {
        match &self.value {
            FieldValue::File(v) => Ok(v),
            _ => Err(self.mismatch("FILE")),
        }
    }

    /// The single user of a user-select field holding exactly one user.
    pub fn as_user(&self) -> CoreResult<&UserRef> {
        match &self.value {
            FieldValue::UserSelect(v) if v.len() == 1 => Ok(&v[0]),
            FieldValue::UserSelect(_) => Err(self.mismatch("USER_SELECT with one user")),
            _ => Err(self.mismatch("USER_SELECT")),
        }
    }

    /// All users of a user-select field.
    pub fn as_user_list(&self) -> CoreResult<&[UserRef]> {
        match &self.value {
            FieldValue::UserSelect(v) => Ok(v),
            _ => Err(self.mismatch("USER_SELECT")),
        }
    }

    /// The nested rows of a subtable field.
    pub fn as_subtable(&self) -> CoreResult<&[Record]> {
        match &self.value {
            FieldValue::Subtable(v) => Ok(v),
            _ => Err(self.mismatch("SUBTABLE")),
        }
    }
}
