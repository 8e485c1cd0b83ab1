//! The connection: CRUD and query orchestration against the store.

use crate::bulk::{BulkRequest, Operation};
use crate::transport::{paths, ApiRequest, Method, Transport};
use crate::wire;
use crate::{ApiError, ApiResult, ResultSet};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;
use trellis_core::{AppId, FieldValue, FileRef, Record, RecordId, UploadSource};

/// A connection to one store, generic over the transport that carries
/// its requests.
///
/// Every operation is synchronous request/response. The connection holds
/// no row state and takes no locks; the only concurrency control is the
/// store-side revision compare-and-swap exercised by the by-record
/// operations.
pub struct Connection<T: Transport> {
    transport: T,
}

impl<T: Transport> Connection<T> {
    /// Create a connection over the given transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a query and materialize the matching records. The empty query
    /// selects every record in default order.
    pub fn select(&self, app: AppId, query: &str) -> ApiResult<ResultSet> {
        debug!(app = app.raw(), query, "select");
        let body = json!({ "app": app.raw(), "query": query });
        let response = self.execute(Method::Get, paths::RECORDS, body)?;

        let rows = response
            .get("records")
            .and_then(Value::as_array)
            .ok_or_else(|| ApiError::wire("select response has no records array"))?;
        let records = rows.iter().map(wire::decode_row).collect::<ApiResult<_>>()?;
        Ok(ResultSet::new(records))
    }

    /// Insert one record; the store assigns and returns its id.
    pub fn insert(&self, app: AppId, record: Record) -> ApiResult<RecordId> {
        let ids = self.insert_all(app, vec![record])?;
        ids.into_iter()
            .next()
            .ok_or_else(|| ApiError::wire("store returned no id for insert"))
    }

    /// Insert several records; ids are returned in request order.
    pub fn insert_all(&self, app: AppId, records: Vec<Record>) -> ApiResult<Vec<RecordId>> {
        debug!(app = app.raw(), count = records.len(), "insert");
        let mut records = records;
        let mut encoded = Vec::with_capacity(records.len());
        for record in &mut records {
            self.resolve_uploads(record)?;
            encoded.push(wire::encode_fields(record)?);
        }

        let body = json!({ "app": app.raw(), "records": encoded });
        let response = self.execute(Method::Post, paths::RECORDS, body)?;
        decode_ids(&response)
    }

    /// Apply one record's fields to an existing row by id, without a
    /// revision check.
    pub fn update(&self, app: AppId, id: RecordId, record: Record) -> ApiResult<()> {
        self.update_all(app, &[id], record)
    }

    /// Apply one record's fields to several rows by id, without revision
    /// checks.
    pub fn update_all(&self, app: AppId, ids: &[RecordId], record: Record) -> ApiResult<()> {
        debug!(app = app.raw(), count = ids.len(), "update by ids");
        let mut record = record;
        self.resolve_uploads(&mut record)?;
        let body = json!({
            "app": app.raw(),
            "ids": ids_value(ids),
            "record": wire::encode_fields(&record)?,
        });
        self.execute(Method::Put, paths::RECORDS, body)?;
        Ok(())
    }

    /// Update one row by the record's own id, checking its revision if it
    /// carries one.
    pub fn update_by_record(&self, app: AppId, record: Record) -> ApiResult<()> {
        self.update_by_records(app, vec![record])
    }

    /// Update several rows, each by its record's own id and revision. One
    /// stale revision rejects the whole group.
    pub fn update_by_records(&self, app: AppId, records: Vec<Record>) -> ApiResult<()> {
        debug!(app = app.raw(), count = records.len(), "update by records");
        let mut records = records;
        let mut entries = Vec::with_capacity(records.len());
        for record in &mut records {
            self.resolve_uploads(record)?;
            entries.push(record_entry(record, true)?);
        }
        let body = json!({ "app": app.raw(), "records": entries });
        self.execute(Method::Put, paths::RECORDS, body)?;
        Ok(())
    }

    /// Apply one record's fields to every row matching the query, without
    /// revision checks: the row set is resolved by the store at execution
    /// time, so no caller-held revision exists to compare.
    pub fn update_by_query(&self, app: AppId, query: &str, record: Record) -> ApiResult<()> {
        debug!(app = app.raw(), query, "update by query");
        let mut record = record;
        self.resolve_uploads(&mut record)?;
        let body = json!({
            "app": app.raw(),
            "query": query,
            "record": wire::encode_fields(&record)?,
        });
        self.execute(Method::Put, paths::RECORDS, body)?;
        Ok(())
    }

    /// Delete one row by id, without a revision check.
    pub fn delete(&self, app: AppId, id: RecordId) -> ApiResult<()> {
        self.delete_all(app, &[id])
    }

    /// Delete several rows by id, without revision checks.
    pub fn delete_all(&self, app: AppId, ids: &[RecordId]) -> ApiResult<()> {
        debug!(app = app.raw(), count = ids.len(), "delete by ids");
        let body = json!({ "app": app.raw(), "ids": ids_value(ids) });
        self.execute(Method::Delete, paths::RECORDS, body)?;
        Ok(())
    }

    /// Delete one row by the record's own id, checking its revision if it
    /// carries one.
    pub fn delete_by_record(&self, app: AppId, record: &Record) -> ApiResult<()> {
        self.delete_by_records(app, std::slice::from_ref(record))
    }

    /// Delete several rows, each by its record's own id and revision. One
    /// stale revision rejects the whole group.
    pub fn delete_by_records(&self, app: AppId, records: &[Record]) -> ApiResult<()> {
        debug!(app = app.raw(), count = records.len(), "delete by records");
        let entries = records
            .iter()
            .map(|record| record_entry(record, false))
            .collect::<ApiResult<Vec<_>>>()?;
        let body = json!({ "app": app.raw(), "records": entries });
        self.execute(Method::Delete, paths::RECORDS, body)?;
        Ok(())
    }

    /// Delete every row matching the query, without revision checks.
    pub fn delete_by_query(&self, app: AppId, query: &str) -> ApiResult<()> {
        debug!(app = app.raw(), query, "delete by query");
        let body = json!({ "app": app.raw(), "query": query });
        self.execute(Method::Delete, paths::RECORDS, body)?;
        Ok(())
    }

    /// Submit every accumulated operation as one atomic unit, in
    /// submission order. Any single failure rejects the whole batch with
    /// no observable effects.
    pub fn bulk_request(&self, bulk: BulkRequest) -> ApiResult<()> {
        debug!(operations = bulk.len(), "bulk request");
        let mut bulk = bulk;
        for operation in bulk.operations_mut() {
            match operation {
                Operation::Insert { records, .. } | Operation::UpdateByRecords { records, .. } => {
                    for record in records {
                        self.resolve_uploads(record)?;
                    }
                }
                Operation::Update { record, .. } => self.resolve_uploads(record)?,
                Operation::Delete { .. } | Operation::DeleteByRecords { .. } => {}
            }
        }

        let requests = bulk
            .operations()
            .iter()
            .map(operation_entry)
            .collect::<ApiResult<Vec<_>>>()?;
        let body = json!({ "requests": requests });
        self.execute(Method::Post, paths::BULK, body)?;
        Ok(())
    }

    /// Upload file content, returning the key the store assigned. Called
    /// automatically for pending uploads immediately before submission.
    pub fn upload(&self, source: &UploadSource) -> ApiResult<String> {
        let (content, file_name, content_type) = match source {
            UploadSource::Path { path, content_type } => {
                let data = std::fs::read(path).map_err(|e| {
                    ApiError::upload(format!("failed to read {}: {}", path.display(), e))
                })?;
                (data, source.file_name(), content_type.clone())
            }
            UploadSource::Bytes {
                data,
                file_name,
                content_type,
            } => (data.clone(), file_name.clone(), content_type.clone()),
        };
        debug!(file_name = %file_name, size = content.len(), "upload");

        #[derive(Serialize)]
        struct UploadPayload {
            #[serde(rename = "fileName")]
            file_name: String,
            #[serde(rename = "contentType", skip_serializing_if = "Option::is_none")]
            content_type: Option<String>,
            content: Vec<u8>,
        }

        let body = serde_json::to_value(UploadPayload {
            file_name,
            content_type,
            content,
        })
        .map_err(|e| ApiError::wire(e.to_string()))?;

        let response = self.execute(Method::Post, paths::FILE, body)?;
        response
            .get("fileKey")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ApiError::wire("upload response has no fileKey"))
    }

    /// Replace every pending file reference in the record (including
    /// inside subtables) with its uploaded key. Runs immediately before
    /// serialization, never earlier.
    fn resolve_uploads(&self, record: &mut Record) -> ApiResult<()> {
        for field in record.fields_mut() {
            match field.value_mut() {
                FieldValue::File(refs) => {
                    for file_ref in refs.iter_mut() {
                        if let FileRef::Pending(source) = file_ref {
                            let key = self.upload(&*source)?;
                            *file_ref = FileRef::stored(key);
                        }
                    }
                }
                FieldValue::Subtable(rows) => {
                    for row in rows.iter_mut() {
                        self.resolve_uploads(row)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Send one request and map the response status: 2xx passes the body
    /// through, 409 is a revision conflict, anything else a remote
    /// failure with the store's message.
    fn execute(&self, method: Method, path: &str, body: Value) -> ApiResult<Value> {
        let response = self
            .transport
            .send(ApiRequest::new(method, path, body))?;
        if response.is_success() {
            return Ok(response.body);
        }
        let message = error_message(&response.body);
        if response.status == 409 {
            Err(ApiError::conflict(message))
        } else {
            Err(ApiError::remote(response.status, message))
        }
    }
}

fn error_message(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

fn ids_value(ids: &[RecordId]) -> Value {
    Value::Array(ids.iter().map(|id| json!(id.raw())).collect())
}

fn decode_ids(response: &Value) -> ApiResult<Vec<RecordId>> {
    let ids = response
        .get("ids")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::wire("insert response has no ids array"))?;
    ids.iter()
        .map(|id| Ok(RecordId::new(wire::u64_value(id, "ids")?)))
        .collect()
}

/// The by-record wire entry: id, revision when the record carries one,
/// and the field map for updates.
fn record_entry(record: &Record, with_fields: bool) -> ApiResult<Value> {
    let mut entry = Map::new();
    entry.insert("id".to_string(), json!(record.id().raw()));
    if let Some(revision) = record.revision() {
        entry.insert("revision".to_string(), json!(revision.raw()));
    }
    if with_fields {
        entry.insert("record".to_string(), wire::encode_fields(record)?);
    }
    Ok(Value::Object(entry))
}

#[derive(Serialize)]
struct EnvelopeEntry {
    method: &'static str,
    api: &'static str,
    payload: Value,
}

fn operation_entry(operation: &Operation) -> ApiResult<EnvelopeEntry> {
    let entry = match operation {
        Operation::Insert { app, records } => {
            let encoded = records
                .iter()
                .map(wire::encode_fields)
                .collect::<ApiResult<Vec<_>>>()?;
            EnvelopeEntry {
                method: "POST",
                api: paths::RECORDS,
                payload: json!({ "app": app.raw(), "records": encoded }),
            }
        }
        Operation::Update { app, ids, record } => EnvelopeEntry {
            method: "PUT",
            api: paths::RECORDS,
            payload: json!({
                "app": app.raw(),
                "ids": ids_value(ids),
                "record": wire::encode_fields(record)?,
            }),
        },
        Operation::UpdateByRecords { app, records } => {
            let entries = records
                .iter()
                .map(|record| record_entry(record, true))
                .collect::<ApiResult<Vec<_>>>()?;
            EnvelopeEntry {
                method: "PUT",
                api: paths::RECORDS,
                payload: json!({ "app": app.raw(), "records": entries }),
            }
        }
        Operation::Delete { app, ids } => EnvelopeEntry {
            method: "DELETE",
            api: paths::RECORDS,
            payload: json!({ "app": app.raw(), "ids": ids_value(ids) }),
        },
        Operation::DeleteByRecords { app, records } => {
            let entries = records
                .iter()
                .map(|record| record_entry(record, false))
                .collect::<ApiResult<Vec<_>>>()?;
            EnvelopeEntry {
                method: "DELETE",
                api: paths::RECORDS,
                payload: json!({ "app": app.raw(), "records": entries }),
            }
        }
    };
    Ok(entry)
}
