use chrono::Utc;
use scorecard_core::{
    average, summarize, AverageScore, MemoryKeyValueStore, RecordDraft, ScorecardService,
    SectionSchema, DEFAULT_ICON,
};

#[test]
fn skill_only_record_averages_over_accepted_scores() {
    let (mut service, _) = ScorecardService::open(MemoryKeyValueStore::new());
    let skill = service.schema().find_by_name("Skill").unwrap().id;

    let id = service
        .create_record(&RecordDraft::new("Ann").with_section(skill, "4", "solid"))
        .unwrap()
        .value;

    let record = service.records().get(id).unwrap();
    assert_eq!(record.overall.total_score, 4);
    assert_eq!(record.overall.average_score, "4.00");
    assert_eq!(service.average(id).unwrap().to_string(), "4.00 / 5");

    let summary = summarize(service.schema(), record);
    assert_eq!((summary.total, summary.count), (4, 1));
}

#[test]
fn absent_and_invalid_scores_are_excluded() {
    let schema = SectionSchema::default();
    let ids = schema.iter().map(|section| section.id).collect::<Vec<_>>();
    let mut store = scorecard_core::RecordStore::new();
    let id = store
        .create(
            &RecordDraft::new("Ann")
                .with_section(ids[0], "4", "")
                .with_section(ids[1], "5", "")
                .with_section(ids[2], "", "no score")
                .with_section(ids[3], "3", "")
                .with_section(ids[4], "0", "")
                .with_section(ids[5], "abc", ""),
            &schema,
            Utc::now(),
        )
        .unwrap();

    let record = store.get(id).unwrap();
    assert_eq!(record.overall.total_score, 12);
    assert_eq!(record.overall.average_score, "4.00");
    assert_eq!(average(&schema, record), AverageScore::Rated(4.0));
}

#[test]
fn record_without_scores_is_not_available() {
    let schema = SectionSchema::default();
    let mut store = scorecard_core::RecordStore::new();
    let id = store
        .create(&RecordDraft::new("Ann"), &schema, Utc::now())
        .unwrap();

    let record = store.get(id).unwrap();
    assert_eq!(record.overall.average_score, "N/A");
    assert_eq!(average(&schema, record), AverageScore::NotAvailable);
    assert_eq!(average(&schema, record).to_string(), "N/A");
    assert_eq!(average(&schema, record).sort_value(), 0.0);
}

#[test]
fn averages_round_half_up_to_hundredths() {
    let schema = SectionSchema::default();
    let ids = schema.iter().map(|section| section.id).collect::<Vec<_>>();
    let mut store = scorecard_core::RecordStore::new();
    let mut draft = RecordDraft::new("Ann");
    for (section, score) in ids.iter().zip(["2", "2", "2", "2", "2", "1", "1", "1"]) {
        draft = draft.with_section(*section, score, "");
    }
    let id = store.create(&draft, &schema, Utc::now()).unwrap();

    assert_eq!(store.get(id).unwrap().overall.average_score, "1.63");
}

#[test]
fn schema_changes_recompute_live_average() {
    let (mut service, _) = ScorecardService::open(MemoryKeyValueStore::new());
    let skill = service.schema().find_by_name("Skill").unwrap().id;
    let id = service
        .create_record(&RecordDraft::new("Ann").with_section(skill, "4", ""))
        .unwrap()
        .value;

    let _ = service.add_section("Leadership", DEFAULT_ICON).unwrap();
    assert_eq!(service.average(id), Some(AverageScore::Rated(4.0)));

    let _ = service.rename_section(3, "Technical Skill").unwrap();
    assert_eq!(service.average(id), Some(AverageScore::Rated(4.0)));

    let _ = service.remove_section(3).unwrap();
    assert_eq!(service.average(id), Some(AverageScore::NotAvailable));
    // The stored snapshot is only refreshed by an edit.
    assert_eq!(
        service.records().get(id).unwrap().overall.average_score,
        "4.00"
    );
}

#[test]
fn edit_after_section_removal_keeps_entry_for_reset() {
    let (mut service, _) = ScorecardService::open(MemoryKeyValueStore::new());
    let skill = service.schema().find_by_name("Skill").unwrap().id;
    let id = service
        .create_record(&RecordDraft::new("Ann").with_section(skill, "4", "solid"))
        .unwrap()
        .value;

    let _ = service.remove_section(3).unwrap();
    let draft = service
        .records()
        .get(id)
        .unwrap()
        .to_draft()
        .with_final_comment("second round");
    let _ = service.update_record(id, &draft).unwrap();

    let record = service.records().get(id).unwrap();
    assert_eq!(record.final_comment, "second round");
    assert_eq!(record.overall.average_score, "N/A");
    assert_eq!(record.entry(skill).unwrap().score, Some(4));

    let _ = service.reset_sections();
    assert_eq!(service.average(id).unwrap().to_string(), "4.00 / 5");
    assert_eq!(
        service.records().get(id).unwrap().entry(skill).unwrap().comment,
        "solid"
    );
}
