//! The row wire format.
//!
//! A record travels as a mapping of field code to `{ "type": tag,
//! "value": shape }`. Identity and revision use the reserved keys `$id`
//! and `$revision` alongside the field map, never inside it. Numbers are
//! transmitted as decimal strings. Unknown type tags decode to
//! `FieldValue::Other`, keeping the tag and raw value so every row
//! round-trips losslessly.

use crate::{ApiError, ApiResult};
use serde_json::{json, Map, Value};
use trellis_core::{
    Field, FieldType, FieldValue, FileRef, Record, RecordId, Revision, UserRef,
};

/// Reserved wire key for the row id.
pub const KEY_ID: &str = "$id";
/// Reserved wire key for the row revision.
pub const KEY_REVISION: &str = "$revision";

/// Encode a record's field map for submission. Fails if any file
/// reference still awaits upload; resolution must happen first.
pub fn encode_fields(record: &Record) -> ApiResult<Value> {
    let mut map = Map::new();
    for field in record.fields() {
        map.insert(field.code().to_lowercase(), encode_field(field)?);
    }
    Ok(Value::Object(map))
}

/// Encode a full row: the field map plus `$id` and `$revision`.
pub fn encode_row(record: &Record) -> ApiResult<Value> {
    let mut map = match encode_fields(record)? {
        Value::Object(map) => map,
        _ => unreachable!("encode_fields always returns an object"),
    };
    map.insert(KEY_ID.to_string(), json!(record.id().raw()));
    if let Some(revision) = record.revision() {
        map.insert(KEY_REVISION.to_string(), json!(revision.raw()));
    }
    Ok(Value::Object(map))
}

fn encode_field(field: &Field) -> ApiResult<Value> {
    let value = match field.value() {
        FieldValue::SingleLineText(s) | FieldValue::MultiLineText(s) => json!(s),
        FieldValue::Number(Some(n)) => json!(n.to_string()),
        FieldValue::Number(None) => json!(""),
        FieldValue::RecordNumber(n) => json!(n.to_string()),
        FieldValue::MultiSelect(items) | FieldValue::CheckBox(items) => json!(items),
        FieldValue::UserSelect(users) => {
            Value::Array(users.iter().map(encode_user).collect())
        }
        FieldValue::File(refs) => {
            let mut entries = Vec::with_capacity(refs.len());
            for file_ref in refs {
                match file_ref {
                    FileRef::Stored { file_key } => entries.push(json!({ "fileKey": file_key })),
                    FileRef::Pending(_) => {
                        return Err(ApiError::wire(format!(
                            "unresolved pending upload on field '{}'",
                            field.code()
                        )))
                    }
                }
            }
            Value::Array(entries)
        }
        FieldValue::Subtable(rows) => {
            let mut entries = Vec::with_capacity(rows.len());
            for row in rows {
                let mut entry = Map::new();
                if !row.id().is_unassigned() {
                    entry.insert("id".to_string(), json!(row.id().raw()));
                }
                entry.insert("value".to_string(), encode_fields(row)?);
                entries.push(Value::Object(entry));
            }
            Value::Array(entries)
        }
        FieldValue::Other { value, .. } => value.clone(),
    };
    Ok(json!({ "type": field.value().wire_tag(), "value": value }))
}

fn encode_user(user: &UserRef) -> Value {
    match &user.name {
        Some(name) => json!({ "code": user.code, "name": name }),
        None => json!({ "code": user.code }),
    }
}

/// Decode a row object (field map plus reserved keys) into a record.
pub fn decode_row(value: &Value) -> ApiResult<Record> {
    let map = value
        .as_object()
        .ok_or_else(|| ApiError::wire("row is not an object"))?;

    let mut record = Record::new();
    for (key, entry) in map {
        match key.as_str() {
            KEY_ID => record.set_id(RecordId::new(u64_value(entry, KEY_ID)?)),
            KEY_REVISION => record.set_revision(Revision::new(u64_value(entry, KEY_REVISION)?)),
            code => record.add_field(decode_field(code, entry)?),
        }
    }
    Ok(record)
}

fn decode_field(code: &str, entry: &Value) -> ApiResult<Field> {
    let tag = entry
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::wire(format!("field '{}' has no type tag", code)))?;
    let raw = entry
        .get("value")
        .ok_or_else(|| ApiError::wire(format!("field '{}' has no value", code)))?;

    let value = match FieldType::from_wire_tag(tag) {
        FieldType::SingleLineText => FieldValue::SingleLineText(str_value(raw, code)?),
        FieldType::MultiLineText => FieldValue::MultiLineText(str_value(raw, code)?),
        FieldType::Number => FieldValue::Number(number_value(raw, code)?),
        FieldType::RecordNumber => FieldValue::RecordNumber(u64_value(raw, code)?),
        FieldType::MultiSelect => FieldValue::MultiSelect(string_list(raw, code)?),
        FieldType::CheckBox => FieldValue::CheckBox(string_list(raw, code)?),
        FieldType::UserSelect => FieldValue::UserSelect(user_list(raw, code)?),
        FieldType::File => FieldValue::File(file_list(raw, code)?),
        FieldType::Subtable => FieldValue::Subtable(subtable_rows(raw, code)?),
        FieldType::Other => FieldValue::Other {
            tag: tag.to_string(),
            value: raw.clone(),
        },
    };
    Ok(Field::new(code, value))
}

fn str_value(raw: &Value, code: &str) -> ApiResult<String> {
    raw.as_str()
        .map(str::to_string)
        .ok_or_else(|| ApiError::wire(format!("field '{}': expected a string value", code)))
}

/// Numbers arrive as decimal strings (the empty string is the empty
/// number) or, leniently, as JSON integers.
fn number_value(raw: &Value, code: &str) -> ApiResult<Option<i64>> {
    match raw {
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => s.parse().map(Some).map_err(|_| {
            ApiError::wire(format!("field '{}': malformed number '{}'", code, s))
        }),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| ApiError::wire(format!("field '{}': non-integer number", code))),
        _ => Err(ApiError::wire(format!(
            "field '{}': expected a decimal string",
            code
        ))),
    }
}

pub(crate) fn u64_value(raw: &Value, what: &str) -> ApiResult<u64> {
    match raw {
        Value::String(s) => s
            .parse()
            .map_err(|_| ApiError::wire(format!("{}: malformed integer '{}'", what, s))),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ApiError::wire(format!("{}: non-integer value", what))),
        _ => Err(ApiError::wire(format!("{}: expected an integer", what))),
    }
}

fn string_list(raw: &Value, code: &str) -> ApiResult<Vec<String>> {
    let items = raw
        .as_array()
        .ok_or_else(|| ApiError::wire(format!("field '{}': expected an array", code)))?;
    items
        .iter()
        .map(|item| str_value(item, code))
        .collect()
}

fn user_list(raw: &Value, code: &str) -> ApiResult<Vec<UserRef>> {
    let items = raw
        .as_array()
        .ok_or_else(|| ApiError::wire(format!("field '{}': expected an array", code)))?;
    items
        .iter()
        .map(|item| {
            let user_code = item.get("code").and_then(Value::as_str).ok_or_else(|| {
                ApiError::wire(format!("field '{}': user entry has no code", code))
            })?;
            let mut user = UserRef::new(user_code);
            if let Some(name) = item.get("name").and_then(Value::as_str) {
                user = user.with_name(name);
            }
            Ok(user)
        })
        .collect()
}

fn file_list(raw: &Value, code: &str) -> ApiResult<Vec<FileRef>> {
    let items = raw
        .as_array()
        .ok_or_else(|| ApiError::wire(format!("field '{}': expected an array", code)))?;
    items
        .iter()
        .map(|item| {
            let key = item.get("fileKey").and_then(Value::as_str).ok_or_else(|| {
                ApiError::wire(format!("field '{}': file entry has no fileKey", code))
            })?;
            Ok(FileRef::stored(key))
        })
        .collect()
}

fn subtable_rows(raw: &Value, code: &str) -> ApiResult<Vec<Record>> {
    let items = raw
        .as_array()
        .ok_or_else(|| ApiError::wire(format!("field '{}': expected an array", code)))?;
    items
        .iter()
        .map(|item| {
            let fields = item.get("value").ok_or_else(|| {
                ApiError::wire(format!("field '{}': subtable row has no value", code))
            })?;
            let mut row = decode_row(fields)?;
            if let Some(id) = item.get("id") {
                row.set_id(RecordId::new(u64_value(id, code)?));
            }
            Ok(row)
        })
        .collect()
}
