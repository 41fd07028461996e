use chrono::{DateTime, Duration, TimeZone, Utc};
use scorecard_core::{
    dashboard_view, filter_records, sort_records, DateBucket, DecisionStatus, InterviewRecord,
    QueryState, RecordDraft, RecordStore, SectionSchema, SortColumn,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 31, 15, 0, 0).unwrap()
}

fn seed(schema: &SectionSchema) -> RecordStore {
    let skill = schema.find_by_name("Skill").unwrap().id;
    let mut store = RecordStore::new();
    let rows: [(&str, &str, Option<DecisionStatus>, DateTime<Utc>); 4] = [
        ("bob", "3", Some(DecisionStatus::Rejected), now() - Duration::hours(2)),
        ("Alice", "5", Some(DecisionStatus::Selected), now() - Duration::days(3)),
        ("carol", "", None, now() - Duration::days(20)),
        ("Dave", "4", Some(DecisionStatus::Selected), now() - Duration::days(40)),
    ];
    for (name, score, decision, at) in rows {
        store
            .create(
                &RecordDraft::new(name)
                    .with_section(skill, score, "")
                    .with_decision(decision),
                schema,
                at,
            )
            .unwrap();
    }
    store
}

fn names(view: &[&InterviewRecord]) -> Vec<String> {
    view.iter().map(|record| record.name.clone()).collect()
}

#[test]
fn untouched_controls_show_full_store() {
    let schema = SectionSchema::default();
    let store = seed(&schema);
    let state = QueryState::new();

    let view = dashboard_view(store.records(), &schema, &state, &now());
    assert_eq!(names(&view), vec!["bob", "Alice", "carol", "Dave"]);
}

#[test]
fn engaged_filter_with_no_match_shows_nothing() {
    let schema = SectionSchema::default();
    let store = seed(&schema);
    let mut state = QueryState::new();
    state.set_search_term("zelda");

    assert!(dashboard_view(store.records(), &schema, &state, &now()).is_empty());
}

#[test]
fn search_is_case_insensitive_substring() {
    let schema = SectionSchema::default();
    let store = seed(&schema);
    let mut state = QueryState::new();
    state.set_search_term("A");

    let view = filter_records(store.records(), &state, &now());
    assert_eq!(names(&view), vec!["Alice", "carol", "Dave"]);
}

#[test]
fn unset_decision_matches_pending_only() {
    let schema = SectionSchema::default();
    let store = seed(&schema);
    let mut state = QueryState::new();

    state.set_status_filter(Some(DecisionStatus::Pending));
    assert_eq!(names(&filter_records(store.records(), &state, &now())), vec!["carol"]);

    state.set_status_filter(Some(DecisionStatus::Selected));
    assert_eq!(
        names(&filter_records(store.records(), &state, &now())),
        vec!["Alice", "Dave"]
    );
}

#[test]
fn filtering_is_idempotent() {
    let schema = SectionSchema::default();
    let store = seed(&schema);
    let mut state = QueryState::new();
    state.set_search_term("a");
    state.set_status_filter(Some(DecisionStatus::Selected));

    let once = filter_records(store.records(), &state, &now())
        .into_iter()
        .cloned()
        .collect::<Vec<_>>();
    let twice = filter_records(&once, &state, &now());
    assert_eq!(names(&twice), vec!["Alice", "Dave"]);
}

#[test]
fn date_buckets_use_relative_windows() {
    let schema = SectionSchema::default();
    let store = seed(&schema);
    let mut state = QueryState::new();

    state.set_date_filter(Some(DateBucket::Today));
    assert_eq!(names(&filter_records(store.records(), &state, &now())), vec!["bob"]);

    state.set_date_filter(Some(DateBucket::Week));
    assert_eq!(
        names(&filter_records(store.records(), &state, &now())),
        vec!["bob", "Alice"]
    );

    // A month back from 31 March rolls over to 3 March.
    state.set_date_filter(Some(DateBucket::Month));
    assert_eq!(
        names(&filter_records(store.records(), &state, &now())),
        vec!["bob", "Alice", "carol"]
    );

    state.set_date_filter(None);
    assert_eq!(filter_records(store.records(), &state, &now()).len(), 4);
}

#[test]
fn name_sort_toggles_direction() {
    let schema = SectionSchema::default();
    let store = seed(&schema);
    let mut state = QueryState::new();

    state.toggle_sort(SortColumn::Name);
    let view = dashboard_view(store.records(), &schema, &state, &now());
    assert_eq!(names(&view), vec!["Alice", "bob", "carol", "Dave"]);

    state.toggle_sort(SortColumn::Name);
    let view = dashboard_view(store.records(), &schema, &state, &now());
    assert_eq!(names(&view), vec!["Dave", "carol", "bob", "Alice"]);
}

#[test]
fn score_sort_places_unscored_records_first() {
    let schema = SectionSchema::default();
    let store = seed(&schema);
    let mut view = store.records().iter().collect::<Vec<_>>();
    let mut state = QueryState::new();
    state.toggle_sort(SortColumn::Score);

    sort_records(&mut view, state.sort(), &schema);
    assert_eq!(names(&view), vec!["carol", "bob", "Dave", "Alice"]);
}

#[test]
fn status_and_date_sorts_compare_effective_values() {
    let schema = SectionSchema::default();
    let store = seed(&schema);
    let mut state = QueryState::new();

    state.toggle_sort(SortColumn::Status);
    let view = dashboard_view(store.records(), &schema, &state, &now());
    assert_eq!(names(&view), vec!["carol", "bob", "Alice", "Dave"]);

    state.toggle_sort(SortColumn::Date);
    let view = dashboard_view(store.records(), &schema, &state, &now());
    assert_eq!(names(&view), vec!["Dave", "carol", "Alice", "bob"]);
}

#[test]
fn reset_returns_to_full_store() {
    let schema = SectionSchema::default();
    let store = seed(&schema);
    let mut state = QueryState::new();
    state.set_search_term("zelda");
    state.reset();

    assert!(!state.is_engaged());
    assert_eq!(dashboard_view(store.records(), &schema, &state, &now()).len(), 4);
}
