use chrono::{Duration, TimeZone, Utc};
use scorecard_core::db::open_db;
use scorecard_core::{
    default_sections, DecisionStatus, InterviewRecord, KeyValueStore, MemoryKeyValueStore,
    RecordDraft, ScorecardService, ScorecardWarning, SqliteKeyValueStore, StorageError,
    DEFAULT_ICON, RECORDS_STORAGE_KEY, SECTIONS_STORAGE_KEY,
};

/// Fills `service` with records of mixed decisions, scores and comments.
fn seed_records<S: KeyValueStore>(service: &mut ScorecardService<S>) -> Vec<InterviewRecord> {
    let ids = service
        .schema()
        .iter()
        .map(|section| section.id)
        .collect::<Vec<_>>();
    let started = Utc.with_ymd_and_hms(2026, 4, 1, 9, 15, 30).unwrap();
    let drafts = [
        RecordDraft::new("Ann")
            .with_section(ids[0], "4", "calm, \"direct\"")
            .with_section(ids[3], "5", "")
            .with_decision(Some(DecisionStatus::Selected))
            .with_final_comment("hire"),
        RecordDraft::new("Bob")
            .with_section(ids[1], "2", "line one\nline two")
            .with_decision(Some(DecisionStatus::Rejected)),
        RecordDraft::new("Cid").with_final_comment("waiting on references"),
        RecordDraft::new("Dee")
            .with_section(ids[7], "3", "")
            .with_decision(Some(DecisionStatus::Pending)),
    ];
    for (offset, draft) in drafts.iter().enumerate() {
        let at = started + Duration::minutes(offset as i64 * 45) + Duration::milliseconds(7);
        let outcome = service.create_record_with_timestamp(draft, at).unwrap();
        assert!(outcome.warning.is_none());
    }
    let _ = service.delete_record_at(2).unwrap();
    service.records().records().to_vec()
}

#[test]
fn records_and_schema_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scorecard.sqlite3");

    let (record_id, leadership_id) = {
        let conn = open_db(&path).unwrap();
        let (mut service, warnings) = ScorecardService::open(SqliteKeyValueStore::new(&conn));
        assert!(warnings.is_empty());

        let leadership = service.add_section("Leadership", DEFAULT_ICON).unwrap();
        assert!(leadership.warning.is_none());
        let created = service
            .create_record(
                &RecordDraft::new("Ann")
                    .with_section(leadership.value, "5", "leads well")
                    .with_decision(Some(DecisionStatus::Selected)),
            )
            .unwrap();
        assert!(created.warning.is_none());
        (created.value, leadership.value)
    };

    let conn = open_db(&path).unwrap();
    let (service, warnings) = ScorecardService::open(SqliteKeyValueStore::new(&conn));
    assert!(warnings.is_empty());
    assert_eq!(service.schema().len(), 9);
    assert_eq!(service.schema().get(8).unwrap().id, leadership_id);

    let record = service.records().get(record_id).unwrap();
    assert_eq!(record.name, "Ann");
    assert_eq!(record.final_decision, Some(DecisionStatus::Selected));
    assert_eq!(record.entry(leadership_id).unwrap().score, Some(5));
    assert_eq!(service.average(record_id).unwrap().to_string(), "5.00 / 5");
}

#[test]
fn stored_record_uses_camel_case_fields() {
    let store = MemoryKeyValueStore::new();
    let (mut service, _) = ScorecardService::open(&store);
    let _ = service
        .create_record(&RecordDraft::new("Ann").with_final_comment("ok"))
        .unwrap();

    let blob = store.get(RECORDS_STORAGE_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
    let mut keys = value[0]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect::<Vec<_>>();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "finalComment",
            "finalDecision",
            "id",
            "name",
            "overall",
            "sections",
            "timestamp",
        ]
    );
    assert_eq!(value[0]["finalDecision"], "");
    assert_eq!(value[0]["finalComment"], "ok");
    assert_eq!(value[0]["overall"]["totalScore"], 0);
    assert_eq!(value[0]["overall"]["averageScore"], "N/A");
}

#[test]
fn sqlite_reload_reproduces_records_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scorecard.sqlite3");

    let saved = {
        let conn = open_db(&path).unwrap();
        let (mut service, _) = ScorecardService::open(SqliteKeyValueStore::new(&conn));
        seed_records(&mut service)
    };

    let conn = open_db(&path).unwrap();
    let (service, warnings) = ScorecardService::open(SqliteKeyValueStore::new(&conn));
    assert!(warnings.is_empty());
    assert_eq!(saved.len(), 3);
    assert_eq!(service.records().records(), saved.as_slice());
}

#[test]
fn memory_reload_reproduces_records_in_order() {
    let store = MemoryKeyValueStore::new();
    let saved = {
        let (mut service, _) = ScorecardService::open(&store);
        seed_records(&mut service)
    };

    let (service, warnings) = ScorecardService::open(&store);
    assert!(warnings.is_empty());
    assert_eq!(service.records().records(), saved.as_slice());
    let names = service
        .records()
        .records()
        .iter()
        .map(|record| record.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Ann", "Bob", "Dee"]);
}

#[test]
fn corrupt_blobs_fall_back_with_warnings() {
    let store = MemoryKeyValueStore::new();
    store.set(RECORDS_STORAGE_KEY, "{ not json").unwrap();
    store.set(SECTIONS_STORAGE_KEY, "[]").unwrap();

    let (service, warnings) = ScorecardService::open(&store);
    assert!(service.records().is_empty());
    assert_eq!(service.schema().list(), default_sections().as_slice());
    assert_eq!(warnings.len(), 2);
    assert!(warnings
        .iter()
        .all(|warning| matches!(warning, ScorecardWarning::LoadFallback(_))));
}

#[test]
fn absent_blobs_load_defaults_silently() {
    let (service, warnings) = ScorecardService::open(MemoryKeyValueStore::new());
    assert!(warnings.is_empty());
    assert!(service.records().is_empty());
    assert_eq!(service.schema().len(), 8);
}

#[test]
fn unavailable_backend_keeps_mutation_in_memory() {
    let (mut service, _) = ScorecardService::open(MemoryKeyValueStore::new());
    service.backend().set_unavailable("private mode");

    let outcome = service.create_record(&RecordDraft::new("Ann")).unwrap();
    assert!(matches!(
        outcome.warning,
        Some(ScorecardWarning::PersistFailed {
            key: RECORDS_STORAGE_KEY,
            ..
        })
    ));
    assert_eq!(service.records().len(), 1);

    let removed = service.remove_section(0).unwrap();
    assert!(matches!(
        removed.warning,
        Some(ScorecardWarning::PersistFailed {
            key: SECTIONS_STORAGE_KEY,
            ..
        })
    ));
    assert_eq!(service.schema().len(), 7);
}

#[test]
fn quota_exceeded_is_reported_as_warning() {
    let (mut service, _) = ScorecardService::open(MemoryKeyValueStore::with_quota(64));

    let outcome = service
        .create_record(&RecordDraft::new("A candidate with a rather long name"))
        .unwrap();
    match outcome.warning {
        Some(ScorecardWarning::PersistFailed { error, .. }) => {
            assert!(error.to_string().contains("quota"), "{error}");
        }
        other => panic!("expected persist warning, got {other:?}"),
    }
    assert_eq!(service.records().len(), 1);
    assert_eq!(service.backend().get(RECORDS_STORAGE_KEY).unwrap(), None);
}

#[test]
fn blank_rename_is_not_persisted() {
    let store = MemoryKeyValueStore::new();
    let (mut service, _) = ScorecardService::open(&store);

    let outcome = service.rename_section(0, "  ").unwrap();
    assert!(!outcome.value);
    assert_eq!(store.get(SECTIONS_STORAGE_KEY).unwrap(), None);
}

#[test]
fn sqlite_store_rejects_blank_keys() {
    let conn = scorecard_core::db::open_db_in_memory().unwrap();
    let store = SqliteKeyValueStore::new(&conn);
    assert!(matches!(
        store.set("  ", "[]").unwrap_err(),
        StorageError::InvalidKey(_)
    ));
}
