//! Bulk submission: ordering and all-or-nothing application.

use trellis_tests::prelude::*;

fn app() -> AppId {
    AppId::new(1)
}

fn seed(db: &Connection<Arc<SimStore>>) -> Vec<RecordId> {
    let records = ["foo", "bar", "baz"]
        .into_iter()
        .map(|text| {
            let mut record = Record::new();
            record.set_text("Single_line_text", text);
            record
        })
        .collect();
    db.insert_all(app(), records).unwrap()
}

#[test]
fn test_mixed_bulk_is_applied_in_submission_order() {
    let (db, _store) = SimStore::connect();
    let ids = seed(&db);

    // Revision-checked updates of all three rows, two inserts, then a
    // delete of the middle row.
    let mut rs = db.select(app(), "order by Record_number asc").unwrap();
    let mut updates = Vec::new();
    let mut i = 0;
    while rs.next() {
        let mut record = Record::with_id(rs.get_id().unwrap());
        record.set_revision(rs.get_revision().unwrap().unwrap());
        record.set_text("Single_line_text", format!("hoge{}", i));
        updates.push(record);
        i += 1;
    }

    let mut bulk = BulkRequest::new();
    bulk.update_by_records(app(), updates);
    let mut fuga = Record::new();
    fuga.set_text("Single_line_text", "fuga");
    let mut piyo = Record::new();
    piyo.set_text("Single_line_text", "piyo");
    bulk.insert_all(app(), vec![fuga, piyo]);
    bulk.delete(app(), ids[1]);

    db.bulk_request(bulk).unwrap();

    let mut rs = db.select(app(), "order by Record_number asc").unwrap();
    assert_eq!(rs.size(), 4);
    let expected = ["hoge0", "hoge2", "fuga", "piyo"];
    let mut i = 0;
    while rs.next() {
        assert_eq!(rs.get_string("Single_line_text").unwrap(), expected[i]);
        i += 1;
    }
}

#[test]
fn test_rejected_bulk_leaves_the_store_untouched() {
    // GIVEN a store with one row and a batch holding a valid insert
    // followed by a conflicting update
    let (db, _store) = SimStore::connect();
    let id = seed(&db)[0];

    let mut inserted = Record::new();
    inserted.set_text("Single_line_text", "new row");

    let mut stale = Record::with_id(id);
    stale.set_revision(Revision::new(99));
    stale.set_text("Single_line_text", "stale write");

    let mut bulk = BulkRequest::new();
    bulk.insert(app(), inserted);
    bulk.update_by_record(app(), stale);

    // WHEN the batch is submitted
    let err = db.bulk_request(bulk).unwrap_err();

    // THEN the whole batch is rejected and the insert is not observed.
    assert!(matches!(err, ApiError::Conflict { .. }));
    assert_eq!(db.select(app(), "").unwrap().size(), 3);
    assert_eq!(
        db.select(app(), "Single_line_text = \"new row\"").unwrap().size(),
        0
    );
}

#[test]
fn test_bulk_failure_in_later_operation_reverts_earlier_ones() {
    let (db, _store) = SimStore::connect();
    seed(&db);

    let mut bulk = BulkRequest::new();
    let mut record = Record::new();
    record.set_text("Single_line_text", "added");
    bulk.insert(app(), record);
    // Deleting an id that does not exist fails the batch.
    bulk.delete(app(), RecordId::new(99));

    let err = db.bulk_request(bulk).unwrap_err();
    assert!(matches!(err, ApiError::Remote { status: 404, .. }));
    assert_eq!(db.select(app(), "").unwrap().size(), 3);
}

#[test]
fn test_bulk_spans_multiple_apps_atomically() {
    let (db, _store) = SimStore::connect();
    let first = AppId::new(1);
    let second = AppId::new(2);

    let mut bulk = BulkRequest::new();
    let mut a = Record::new();
    a.set_text("Single_line_text", "in first");
    bulk.insert(first, a);
    let mut b = Record::new();
    b.set_text("Single_line_text", "in second");
    bulk.insert(second, b);

    db.bulk_request(bulk).unwrap();

    assert_eq!(db.select(first, "").unwrap().size(), 1);
    assert_eq!(db.select(second, "").unwrap().size(), 1);
}

#[test]
fn test_later_operations_see_earlier_effects_within_one_batch() {
    let (db, _store) = SimStore::connect();
    let ids = seed(&db);

    // Update a row, then delete it, in the same batch.
    let mut fields = Record::new();
    fields.set_text("Single_line_text", "short lived");
    let mut bulk = BulkRequest::new();
    bulk.update(app(), ids[0], fields);
    bulk.delete(app(), ids[0]);

    db.bulk_request(bulk).unwrap();

    assert_eq!(db.select(app(), "").unwrap().size(), 2);
    assert_eq!(
        db.select(app(), "Single_line_text = \"short lived\"").unwrap().size(),
        0
    );
}

#[test]
fn test_empty_bulk_is_a_no_op() {
    let (db, _store) = SimStore::connect();
    seed(&db);

    db.bulk_request(BulkRequest::new()).unwrap();
    assert_eq!(db.select(app(), "").unwrap().size(), 3);
}
