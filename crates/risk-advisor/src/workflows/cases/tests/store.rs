use std::collections::HashSet;
use std::fs;

use super::common::*;
use crate::workflows::cases::domain::CaseId;
use crate::workflows::cases::repository::{CaseRepository, PurgeScope};
use crate::workflows::cases::CaseStore;

#[test]
fn append_prepends_and_generates_unique_ids() {
    let store = CaseStore::new();
    let profile = baseline_profile();

    let first = store
        .append(profile.clone(), Vec::new())
        .expect("first append");
    let second = store.append(profile, Vec::new()).expect("second append");

    assert_ne!(first.id, second.id);
    assert!(second.created_at >= first.created_at);
    let listed = store.list().expect("list cases");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
}

#[test]
fn rapid_appends_never_collide() {
    let store = CaseStore::new();
    let ids: HashSet<CaseId> = (0..50)
        .map(|_| {
            store
                .append(baseline_profile(), Vec::new())
                .expect("append")
                .id
        })
        .collect();

    assert_eq!(ids.len(), 50);
}

#[test]
fn find_by_id_returns_none_for_unknown_case() {
    let store = CaseStore::new();
    store
        .append(baseline_profile(), Vec::new())
        .expect("append");

    let missing = store
        .find_by_id(&CaseId("case-missing".to_string()))
        .expect("lookup");

    assert!(missing.is_none());
}

#[test]
fn comments_append_in_order_and_unknown_case_is_a_no_op() {
    let store = CaseStore::new();
    let record = store
        .append(baseline_profile(), Vec::new())
        .expect("append");

    assert!(store
        .append_comment(&record.id, comment("1111", "Offer the RMF first"))
        .expect("comment"));
    assert!(store
        .append_comment(&record.id, comment("1111", "Follow up next week"))
        .expect("comment"));
    assert!(!store
        .append_comment(&CaseId("case-missing".to_string()), comment("1111", "lost"))
        .expect("comment on missing case"));

    let stored = store
        .find_by_id(&record.id)
        .expect("lookup")
        .expect("case exists");
    let texts: Vec<&str> = stored
        .comments
        .iter()
        .map(|comment| comment.text.as_str())
        .collect();
    assert_eq!(texts, vec!["Offer the RMF first", "Follow up next week"]);
    assert_eq!(stored.profile, record.profile);
    assert_eq!(stored.findings, record.findings);
}

#[test]
fn seeded_records_are_ordered_newest_first() {
    let store = CaseStore::with_records(vec![
        record_at("old", utc("2024-01-10T08:00:00Z"), "Anong", baseline_profile()),
        record_at("new", utc("2024-03-02T08:00:00Z"), "Anong", baseline_profile()),
        record_at("mid", utc("2024-02-14T08:00:00Z"), "Anong", baseline_profile()),
    ]);

    let ids: Vec<String> = store
        .list()
        .expect("list")
        .into_iter()
        .map(|record| record.id.0)
        .collect();

    assert_eq!(ids, vec!["new", "mid", "old"]);
}

#[test]
fn purge_before_current_month_keeps_this_month_only() {
    let store = CaseStore::with_records(vec![
        record_at("this-month", utc("2024-05-03T08:00:00Z"), "Anong", baseline_profile()),
        record_at("last-month", utc("2024-04-28T08:00:00Z"), "Anong", baseline_profile()),
        record_at("last-year", utc("2023-05-15T08:00:00Z"), "Anong", baseline_profile()),
    ]);

    let removed = store
        .purge(PurgeScope::BeforeCurrentMonth, utc("2024-05-20T12:00:00Z"))
        .expect("purge");

    assert_eq!(removed, 2);
    let remaining = store.list().expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id.0, "this-month");
}

#[test]
fn purge_all_empties_the_store() {
    let store = CaseStore::new();
    store.append(baseline_profile(), Vec::new()).expect("append");
    store.append(baseline_profile(), Vec::new()).expect("append");

    let removed = store
        .purge(PurgeScope::All, utc("2024-05-20T12:00:00Z"))
        .expect("purge");

    assert_eq!(removed, 2);
    assert!(store.is_empty());
}

#[test]
fn snapshot_survives_reopen() {
    let path = scratch_path("store-reopen");
    let store = CaseStore::open(&path);
    assert!(store.is_empty());

    let record = store
        .append(baseline_profile(), engine().evaluate(&baseline_profile()))
        .expect("append");
    store
        .append_comment(&record.id, comment("1111", "Looks fine"))
        .expect("comment");

    let reopened = CaseStore::open(&path);
    let stored = reopened
        .find_by_id(&record.id)
        .expect("lookup")
        .expect("case persisted");
    assert_eq!(stored.profile, record.profile);
    assert_eq!(stored.comments.len(), 1);

    let _ = fs::remove_file(&path);
}

#[test]
fn failed_snapshot_write_leaves_store_unchanged() {
    let path = scratch_path("store-unwritable");
    let store = CaseStore::open(&path);
    let record = store
        .append(baseline_profile(), Vec::new())
        .expect("append before snapshot breaks");

    fs::remove_file(&path).expect("remove snapshot");
    fs::create_dir(&path).expect("replace snapshot with a directory");

    assert!(store.append(baseline_profile(), Vec::new()).is_err());
    assert_eq!(store.len(), 1);

    assert!(store
        .append_comment(&record.id, comment("1111", "Retry me"))
        .is_err());
    let stored = store
        .find_by_id(&record.id)
        .expect("lookup")
        .expect("case still present");
    assert!(stored.comments.is_empty());

    assert!(store
        .purge(PurgeScope::All, utc("2024-05-20T12:00:00Z"))
        .is_err());
    assert_eq!(store.len(), 1);

    let _ = fs::remove_dir(&path);
}

#[test]
fn corrupt_snapshot_starts_empty() {
    let path = scratch_path("store-corrupt");
    fs::write(&path, "{ not json").expect("write corrupt snapshot");

    let store = CaseStore::open(&path);

    assert!(store.is_empty());
    let _ = fs::remove_file(&path);
}

#[test]
fn stored_case_uses_namespaced_keys() {
    let mut profile = baseline_profile();
    profile.finances.home_loan = 2_000_000.0;
    let record = record_at("case-1", utc("2024-05-03T08:00:00Z"), "Anong", profile);

    let value = serde_json::to_value(&record).expect("serialize case");

    for key in [
        "id", "createdAt", "emp", "cust", "fam", "biz", "fin", "policies", "analysis", "comments",
    ] {
        assert!(value.get(key).is_some(), "missing key {key} in {value}");
    }
    assert_eq!(value["createdAt"], "2024-05-03T08:00:00Z");
    assert_eq!(value["emp"]["id"], OWNER_ID);
    assert_eq!(value["cust"]["monthlyIncome"], 50_000.0);
    assert_eq!(value["analysis"][0]["severity"], "Critical");
    assert_eq!(value["analysis"][0]["name"], "Excessive Debt");
}
