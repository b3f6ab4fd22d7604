use chrono::NaiveDate;
use leave_planner::{
    BirthDatePolicy, BlockDraft, BlockMode, CaregiverSlot, HolidayEvent, PlanDocument, PlanError,
    PlanModel,
};
use serde_json::json;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn plan() -> PlanModel {
    PlanModel::new(d(2024, 1, 1), "Mother", "Father").unwrap()
}

#[test]
fn new_plan_has_mandatory_blocks_for_both_caregivers() {
    let plan = plan();
    for slot in CaregiverSlot::ALL {
        let timeline = plan.timeline(slot);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.slot(), slot);
        assert_eq!(timeline.mandatory_block().start_date(), d(2024, 1, 1));
    }
    assert_eq!(plan.timeline(CaregiverSlot::Second).caregiver_name(), "Father");
    assert!(plan.holidays().is_empty());
}

#[test]
fn failed_mutation_leaves_plan_unchanged() {
    let mut plan = plan();
    let before = plan.clone();
    assert!(plan.remove_block(CaregiverSlot::First, 0).is_err());
    assert!(plan.add_block(CaregiverSlot::Second, 7).is_err());
    let draft = BlockDraft::with_weeks(CaregiverSlot::First, "x", d(2024, 3, 1), 1.0);
    assert!(plan.update_block(CaregiverSlot::First, 1, draft).is_err());
    assert_eq!(plan, before);
}

#[test]
fn birth_date_change_reanchors_mandatory_blocks() {
    let mut plan = plan();
    plan.add_block(CaregiverSlot::First, 0).unwrap();
    plan.set_birth_date(d(2023, 12, 25)).unwrap();

    assert_eq!(plan.birth_date(), d(2023, 12, 25));
    for slot in CaregiverSlot::ALL {
        let mandatory = plan.timeline(slot).mandatory_block();
        assert_eq!(mandatory.start_date(), d(2023, 12, 25));
        assert_eq!(mandatory.end_date(), d(2024, 2, 5));
    }
    // later blocks keep their dates
    assert_eq!(
        plan.timeline(CaregiverSlot::First).blocks()[1].start_date(),
        d(2024, 2, 12)
    );
}

#[test]
fn later_birth_date_conflicting_with_a_block_is_rejected() {
    let mut plan = plan();
    plan.add_block(CaregiverSlot::Second, 0).unwrap();
    let before = plan.clone();

    let err = plan.set_birth_date(d(2024, 1, 8)).unwrap_err();
    assert_eq!(
        err,
        PlanError::MandatoryBlockConflict {
            caregiver: CaregiverSlot::Second,
            index: 1,
            start: d(2024, 2, 12),
            mandatory_end: d(2024, 2, 19),
        }
    );
    assert_eq!(plan, before);
}

#[test]
fn shift_all_moves_every_block() {
    let mut plan = plan();
    plan.add_block_with_weeks(CaregiverSlot::First, 0, 3).unwrap();
    plan.set_birth_date_with(d(2024, 1, 8), BirthDatePolicy::ShiftAll)
        .unwrap();

    let first = plan.timeline(CaregiverSlot::First);
    assert_eq!(first.mandatory_block().start_date(), d(2024, 1, 8));
    assert_eq!(first.blocks()[1].start_date(), d(2024, 2, 19));
    assert_eq!(first.blocks()[1].end_date(), d(2024, 3, 11));
    assert_eq!(
        plan.timeline(CaregiverSlot::Second).mandatory_block().end_date(),
        d(2024, 2, 19)
    );
}

#[test]
fn custom_mandatory_label_survives_birth_date_change() {
    let mut plan = plan();
    let mut draft = plan.timeline(CaregiverSlot::First).mandatory_block().to_draft();
    draft.label = "Recovery".into();
    plan.update_block(CaregiverSlot::First, 0, draft).unwrap();
    plan.set_birth_date(d(2024, 1, 3)).unwrap();
    assert_eq!(
        plan.timeline(CaregiverSlot::First).mandatory_block().label(),
        "Recovery"
    );
}

#[test]
fn importing_holidays_twice_keeps_duplicates() {
    let mut plan = plan();
    let events = vec![HolidayEvent::single_day("Good Friday", d(2024, 3, 29))];
    plan.import_holidays(events.clone()).unwrap();
    plan.import_holidays(events).unwrap();
    assert_eq!(plan.holidays().len(), 2);
}

#[test]
fn malformed_holiday_rejects_whole_batch() {
    let mut plan = plan();
    let events = vec![
        HolidayEvent::single_day("Fine", d(2024, 5, 6)),
        HolidayEvent::new("Backwards", d(2024, 5, 10), d(2024, 5, 9)),
    ];
    assert!(matches!(
        plan.import_holidays(events),
        Err(PlanError::Validation(_))
    ));
    assert!(plan.holidays().is_empty());
}

#[test]
fn serializable_round_trip_is_lossless() {
    let mut plan = plan();
    plan.rename_caregiver(CaregiverSlot::Second, "Sam");
    plan.add_block_with_weeks(CaregiverSlot::First, 0, 4).unwrap();
    let end_mode = BlockDraft::with_end_date(
        CaregiverSlot::Second,
        "Autumn",
        d(2024, 9, 2),
        d(2024, 9, 13),
    );
    plan.add_block(CaregiverSlot::Second, 0).unwrap();
    plan.update_block(CaregiverSlot::Second, 1, end_mode).unwrap();
    plan.import_holidays(vec![HolidayEvent::new(
        "Christmas",
        d(2024, 12, 25),
        d(2024, 12, 26),
    )])
    .unwrap();

    let document = plan.to_serializable();
    assert_eq!(document.caregivers.len(), 2);
    assert_eq!(document.caregivers[1].name, "Sam");
    let autumn = &document.caregivers[1].blocks[1];
    assert_eq!(autumn.mode, BlockMode::EndDate);
    assert_eq!(autumn.duration_weeks, None);
    assert_eq!(autumn.end_date, Some(d(2024, 9, 13)));

    let restored = PlanModel::from_serializable(document).unwrap();
    assert_eq!(restored, plan);

    let json = plan.to_json_string().unwrap();
    assert_eq!(PlanModel::from_json_str(&json).unwrap(), plan);
}

fn document_json() -> serde_json::Value {
    json!({
        "birth_date": "2024-01-01",
        "caregivers": [
            {
                "name": "Mother",
                "blocks": [{
                    "label": "Block 1 (Mandatory)",
                    "mode": "duration",
                    "start_date": "2024-01-01",
                    "duration_weeks": 6,
                    "is_mandatory": true
                }]
            },
            {
                "name": "Father",
                "blocks": [{
                    "label": "Block 1 (Mandatory)",
                    "mode": "duration",
                    "start_date": "2024-01-01",
                    "duration_weeks": 6,
                    "is_mandatory": true
                }]
            }
        ],
        "holidays": []
    })
}

fn expect_deserialization_error(value: serde_json::Value) {
    let result = PlanModel::from_json_str(&value.to_string());
    assert!(
        matches!(result, Err(PlanError::Deserialization(_))),
        "expected deserialization error, got {result:?}"
    );
}

#[test]
fn hand_written_document_loads() {
    let plan = PlanModel::from_json_str(&document_json().to_string()).unwrap();
    assert_eq!(plan.birth_date(), d(2024, 1, 1));
    let document: PlanDocument = serde_json::from_value(document_json()).unwrap();
    assert_eq!(plan.to_serializable(), document);
}

#[test]
fn malformed_json_is_a_deserialization_error() {
    assert!(matches!(
        PlanModel::from_json_str("{ not json"),
        Err(PlanError::Deserialization(_))
    ));
}

#[test]
fn fractional_or_negative_stored_weeks_are_rejected() {
    let mut doc = document_json();
    doc["caregivers"][0]["blocks"][0]["duration_weeks"] = json!(5.5);
    expect_deserialization_error(doc);

    let mut doc = document_json();
    doc["caregivers"][1]["blocks"][0]["duration_weeks"] = json!(-6);
    expect_deserialization_error(doc);
}

#[test]
fn missing_mandatory_block_is_rejected() {
    let mut doc = document_json();
    doc["caregivers"][0]["blocks"] = json!([]);
    expect_deserialization_error(doc);

    let mut doc = document_json();
    doc["caregivers"][0]["blocks"][0]["is_mandatory"] = json!(false);
    expect_deserialization_error(doc);
}

#[test]
fn second_mandatory_block_is_rejected() {
    let mut doc = document_json();
    let mandatory = doc["caregivers"][0]["blocks"][0].clone();
    doc["caregivers"][0]["blocks"] = json!([
        mandatory,
        {
            "label": "Block 2",
            "mode": "duration",
            "start_date": "2024-02-12",
            "duration_weeks": 1,
            "is_mandatory": true
        }
    ]);
    expect_deserialization_error(doc);
}

#[test]
fn mandatory_block_off_birth_date_is_rejected() {
    let mut doc = document_json();
    doc["caregivers"][1]["blocks"][0]["start_date"] = json!("2024-01-02");
    expect_deserialization_error(doc);
}

#[test]
fn mode_field_mismatch_is_rejected() {
    let mut doc = document_json();
    doc["caregivers"][0]["blocks"][0]["end_date"] = json!("2024-02-12");
    expect_deserialization_error(doc);
}

#[test]
fn wrong_caregiver_count_is_rejected() {
    let mut doc = document_json();
    let only = doc["caregivers"][0].clone();
    doc["caregivers"] = json!([only]);
    expect_deserialization_error(doc);
}

#[test]
fn backwards_holiday_in_document_is_rejected() {
    let mut doc = document_json();
    doc["holidays"] = json!([
        { "label": "Oops", "start_date": "2024-05-02", "end_date": "2024-05-01" }
    ]);
    expect_deserialization_error(doc);
}
