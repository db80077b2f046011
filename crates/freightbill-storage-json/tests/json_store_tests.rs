use std::{fs, str::FromStr, sync::Arc};

use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;

use freightbill_core::{
    DocumentLifecycle, DraftKey, LifecycleConfig, RecordStore, SequentialNumberSource,
    SystemClock, DRAFTS_COLLECTION,
};
use freightbill_domain::{ChargeLine, DocumentKind, DocumentStatus, FinancialDocument};
use freightbill_storage_json::JsonRecordStore;

#[test]
fn json_store_round_trips_records() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(dir.path()).expect("create store");

    store
        .put("se_invoices", "a", json!({"number": "SEI-00001"}))
        .expect("put");
    assert_eq!(
        store.get("se_invoices", "a").expect("get"),
        Some(json!({"number": "SEI-00001"}))
    );

    let path = store.collection_path("se_invoices");
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("json"));
    assert!(path.exists());
}

#[test]
fn missing_collection_reads_as_empty() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(dir.path()).expect("create store");

    assert_eq!(store.get("se_invoices", "a").expect("get"), None);
    assert!(store.list_all("se_invoices").expect("list").is_empty());
    // Deleting from a collection that was never written is a no-op.
    store.delete("se_invoices", "a").expect("delete");
    assert!(!store.collection_path("se_invoices").exists());
}

#[test]
fn delete_removes_only_the_targeted_record() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(dir.path()).expect("create store");

    store.put("drafts", "a", json!(1)).expect("put");
    store.put("drafts", "b", json!(2)).expect("put");
    store.delete("drafts", "a").expect("delete");

    assert_eq!(store.get("drafts", "a").expect("get"), None);
    assert_eq!(store.get("drafts", "b").expect("get"), Some(json!(2)));
    assert_eq!(store.list_all("drafts").expect("list").len(), 1);
}

#[test]
fn no_tmp_file_survives_a_write() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(dir.path()).expect("create store");

    store.put("drafts", "a", json!({"x": 1})).expect("put");
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.path().extension().and_then(|ext| ext.to_str()) == Some("tmp")
        })
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn store_survives_a_process_restart() {
    let dir = tempdir().expect("tempdir");
    {
        let store = JsonRecordStore::new(dir.path()).expect("create store");
        store
            .put("ae_invoices", "k", json!({"status": "Issued"}))
            .expect("put");
    }
    let reopened = JsonRecordStore::new(dir.path()).expect("reopen store");
    assert_eq!(
        reopened.get("ae_invoices", "k").expect("get"),
        Some(json!({"status": "Issued"}))
    );
}

#[test]
fn lifecycle_runs_end_to_end_on_the_json_store() {
    let dir = tempdir().expect("tempdir");
    let store = Arc::new(JsonRecordStore::new(dir.path()).expect("create store"));
    let lifecycle = DocumentLifecycle::new(
        store.clone(),
        Arc::new(SequentialNumberSource::new()),
        Arc::new(SystemClock),
        LifecycleConfig::default(),
    );

    let key = DraftKey::new_document(DocumentKind::SeaExportInvoice);
    let mut document = lifecycle.load_for_edit(key).expect("load").document;
    document.lines.push(ChargeLine::new(
        "Ocean Freight",
        Decimal::from_str("500").expect("decimal"),
        1,
        true,
    ));

    lifecycle.save_draft(&document, key).expect("save draft");
    assert_eq!(store.list_all(DRAFTS_COLLECTION).expect("list").len(), 1);

    lifecycle.save_final(&mut document, key).expect("save final");
    assert!(store.list_all(DRAFTS_COLLECTION).expect("list").is_empty());

    let persisted = lifecycle
        .list_final(DocumentKind::SeaExportInvoice)
        .expect("list final");
    assert_eq!(persisted.len(), 1);
    let restored: &FinancialDocument = &persisted[0];
    assert_eq!(restored.status, DocumentStatus::Submitted);
    assert_eq!(restored.document_number.as_deref(), Some("SEI-00001"));
    assert_eq!(restored.lines, document.lines);
}
