//! Optimistic concurrency: the revision compare-and-swap contract.

use trellis_tests::prelude::*;

fn app() -> AppId {
    AppId::new(1)
}

fn seed_one(db: &Connection<Arc<SimStore>>, text: &str) -> RecordId {
    let mut record = Record::new();
    record.set_text("Single_line_text", text);
    db.insert(app(), record).unwrap()
}

/// Read the current (id, revision) of a row through a fresh select.
fn read_head(db: &Connection<Arc<SimStore>>, id: RecordId) -> (RecordId, Revision) {
    let mut rs = db
        .select(app(), &format!("Record_number = {}", id.raw()))
        .unwrap();
    assert!(rs.next());
    (rs.get_id().unwrap(), rs.get_revision().unwrap().unwrap())
}

#[test]
fn test_stale_revision_update_conflicts_and_leaves_row_unmodified() {
    // GIVEN a row read at revision R
    let (db, store) = SimStore::connect();
    let id = seed_one(&db, "original");
    let (_, revision) = read_head(&db, id);

    // WHEN another caller updates the row out of band (revision becomes R+1)
    let other = Connection::new(store.clone());
    let mut out_of_band = Record::new();
    out_of_band.set_text("Single_line_text", "theirs");
    other.update(app(), id, out_of_band).unwrap();

    // THEN submitting the stale revision fails with a conflict
    let mut mine = Record::with_id(id);
    mine.set_revision(revision);
    mine.set_text("Single_line_text", "mine");
    let err = db.update_by_record(app(), mine).unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }));

    // and the stored row still holds the out-of-band value.
    let rs = db.select(app(), "Single_line_text = \"theirs\"").unwrap();
    assert_eq!(rs.size(), 1);
}

#[test]
fn test_current_revision_update_applies_cleanly() {
    let (db, _store) = SimStore::connect();
    let id = seed_one(&db, "original");
    let (_, revision) = read_head(&db, id);

    let mut mine = Record::with_id(id);
    mine.set_revision(revision);
    mine.set_text("Single_line_text", "mine");
    db.update_by_record(app(), mine).unwrap();

    let (_, after) = read_head(&db, id);
    assert_eq!(after, revision.next());
    let rs = db.select(app(), "Single_line_text = \"mine\"").unwrap();
    assert_eq!(rs.size(), 1);
}

#[test]
fn test_record_without_revision_updates_unconditionally() {
    let (db, store) = SimStore::connect();
    let id = seed_one(&db, "original");

    // Out-of-band write advances the revision.
    let other = Connection::new(store.clone());
    let mut out_of_band = Record::new();
    out_of_band.set_text("Single_line_text", "theirs");
    other.update(app(), id, out_of_band).unwrap();

    // No revision on the record: no conflict check.
    let mut mine = Record::with_id(id);
    mine.set_text("Single_line_text", "mine");
    db.update_by_record(app(), mine).unwrap();

    let rs = db.select(app(), "Single_line_text = \"mine\"").unwrap();
    assert_eq!(rs.size(), 1);
}

#[test]
fn test_one_stale_record_rejects_the_whole_update_group() {
    let (db, store) = SimStore::connect();
    let first = seed_one(&db, "a");
    let second = seed_one(&db, "b");
    let heads = [read_head(&db, first), read_head(&db, second)];

    // Invalidate only the second row's revision out of band.
    let other = Connection::new(store.clone());
    let mut out_of_band = Record::new();
    out_of_band.set_text("Single_line_text", "moved");
    other.update(app(), second, out_of_band).unwrap();

    let records: Vec<Record> = heads
        .iter()
        .map(|(id, revision)| {
            let mut record = Record::with_id(*id);
            record.set_revision(*revision);
            record.set_text("Single_line_text", "mine");
            record
        })
        .collect();
    let err = db.update_by_records(app(), records).unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }));

    // Neither row changed: the fresh first row was not updated either.
    assert_eq!(db.select(app(), "Single_line_text = \"mine\"").unwrap().size(), 0);
    assert_eq!(db.select(app(), "Single_line_text = \"a\"").unwrap().size(), 1);
}

#[test]
fn test_delete_by_record_checks_revision() {
    let (db, store) = SimStore::connect();
    let id = seed_one(&db, "original");
    let (_, revision) = read_head(&db, id);

    let other = Connection::new(store.clone());
    let mut out_of_band = Record::new();
    out_of_band.set_text("Single_line_text", "theirs");
    other.update(app(), id, out_of_band).unwrap();

    let mut stale = Record::with_id(id);
    stale.set_revision(revision);
    let err = db.delete_by_record(app(), &stale).unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }));
    assert_eq!(db.select(app(), "").unwrap().size(), 1);

    // With the current revision the delete goes through.
    let (_, current) = read_head(&db, id);
    let mut fresh = Record::with_id(id);
    fresh.set_revision(current);
    db.delete_by_record(app(), &fresh).unwrap();
    assert_eq!(db.select(app(), "").unwrap().size(), 0);
}

#[test]
fn test_one_stale_record_rejects_the_whole_delete_group() {
    let (db, store) = SimStore::connect();
    let first = seed_one(&db, "a");
    let second = seed_one(&db, "b");
    let heads = [read_head(&db, first), read_head(&db, second)];

    let other = Connection::new(store.clone());
    let mut out_of_band = Record::new();
    out_of_band.set_text("Single_line_text", "moved");
    other.update(app(), first, out_of_band).unwrap();

    let records: Vec<Record> = heads
        .iter()
        .map(|(id, revision)| {
            let mut record = Record::with_id(*id);
            record.set_revision(*revision);
            record
        })
        .collect();
    let err = db.delete_by_records(app(), &records).unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }));
    assert_eq!(db.select(app(), "").unwrap().size(), 2);
}
