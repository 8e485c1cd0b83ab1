//! Insert, select, update and delete against the simulated store.

use trellis_tests::prelude::*;

fn app() -> AppId {
    AppId::new(1)
}

/// Three rows with text values "foo", "bar", "baz"; returns their ids.
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
fn test_insert_returns_ids_in_request_order() {
    let (db, _store) = SimStore::connect();

    let ids = seed(&db);

    assert_eq!(ids.len(), 3);
    assert!(ids[0] < ids[1] && ids[1] < ids[2]);
}

#[test]
fn test_select_filters_and_keeps_insertion_order() {
    let (db, _store) = SimStore::connect();
    for text in ["foo", "bar", "foo"] {
        let mut record = Record::new();
        record.set_text("Single_line_text", text);
        db.insert(app(), record).unwrap();
    }

    let mut rs = db.select(app(), "Single_line_text = \"foo\"").unwrap();

    assert_eq!(rs.size(), 2);
    let mut ids = Vec::new();
    while rs.next() {
        assert_eq!(rs.get_string("Single_line_text").unwrap(), "foo");
        ids.push(rs.get_id().unwrap());
    }
    // Insertion order: first and third inserted records.
    assert_eq!(ids, vec![RecordId::new(1), RecordId::new(3)]);
}

#[test]
fn test_empty_query_selects_everything() {
    let (db, _store) = SimStore::connect();
    seed(&db);

    let rs = db.select(app(), "").unwrap();
    assert_eq!(rs.size(), 3);
}

#[test]
fn test_cursor_visits_every_record_exactly_once() {
    let (db, _store) = SimStore::connect();
    seed(&db);

    let mut rs = db.select(app(), "").unwrap();
    let mut visited = 0;
    while rs.next() {
        visited += 1;
    }
    assert_eq!(visited, 3);
    assert!(!rs.next());

    // first() rewinds for a second full pass without re-querying.
    rs.first();
    let mut second_pass = 0;
    while rs.next() {
        second_pass += 1;
    }
    assert_eq!(second_pass, 3);
}

#[test]
fn test_update_by_id_changes_one_row() {
    let (db, _store) = SimStore::connect();
    let ids = seed(&db);

    let mut fields = Record::new();
    fields.set_text("Single_line_text", "hoge");
    db.update(app(), ids[1], fields).unwrap();

    let rs = db.select(app(), "Single_line_text = \"hoge\"").unwrap();
    assert_eq!(rs.size(), 1);
    let untouched = db.select(app(), "Single_line_text = \"foo\"").unwrap();
    assert_eq!(untouched.size(), 1);
}

#[test]
fn test_update_by_id_list_applies_same_fields_to_each() {
    let (db, _store) = SimStore::connect();
    let ids = seed(&db);

    let mut fields = Record::new();
    fields.set_text("Single_line_text", "hoge");
    db.update_all(app(), &ids, fields).unwrap();

    let rs = db.select(app(), "Single_line_text = \"hoge\"").unwrap();
    assert_eq!(rs.size(), 3);
}

#[test]
fn test_update_unknown_id_is_a_remote_error() {
    let (db, _store) = SimStore::connect();
    seed(&db);

    let mut fields = Record::new();
    fields.set_text("Single_line_text", "hoge");
    let err = db.update(app(), RecordId::new(99), fields).unwrap_err();
    assert!(matches!(err, ApiError::Remote { status: 404, .. }));
}

#[test]
fn test_delete_by_id_and_id_list() {
    let (db, _store) = SimStore::connect();
    let ids = seed(&db);

    db.delete(app(), ids[1]).unwrap();
    assert_eq!(db.select(app(), "").unwrap().size(), 2);

    db.delete_all(app(), &[ids[0], ids[2]]).unwrap();
    assert_eq!(db.select(app(), "").unwrap().size(), 0);
}

#[test]
fn test_order_by_record_number() {
    let (db, _store) = SimStore::connect();
    seed(&db);

    let mut rs = db.select(app(), "order by Record_number desc").unwrap();
    let mut ids = Vec::new();
    while rs.next() {
        ids.push(rs.get_id().unwrap().raw());
    }
    assert_eq!(ids, vec![3, 2, 1]);
}

#[test]
fn test_order_by_field_value() {
    let (db, _store) = SimStore::connect();
    seed(&db);

    let mut rs = db.select(app(), "order by Single_line_text asc").unwrap();
    let mut texts = Vec::new();
    while rs.next() {
        texts.push(rs.get_string("Single_line_text").unwrap().to_string());
    }
    assert_eq!(texts, vec!["bar", "baz", "foo"]);
}

#[test]
fn test_malformed_query_surfaces_remote_failure() {
    let (db, _store) = SimStore::connect();
    seed(&db);

    let err = db.select(app(), "Single_line_text =").unwrap_err();
    assert!(matches!(err, ApiError::Remote { status: 400, .. }));
}

#[test]
fn test_revision_travels_with_selected_records() {
    let (db, _store) = SimStore::connect();
    seed(&db);

    let mut rs = db.select(app(), "").unwrap();
    rs.next();
    assert_eq!(rs.get_revision().unwrap(), Some(Revision::new(1)));
}
