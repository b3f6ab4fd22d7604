use chrono::NaiveDate;
use leave_planner::{
    CaregiverSlot, HolidayEvent, JsonPlanStore, PersistenceError, PlanError, PlanModel, PlanStore,
    load_plan_from_json, render_view, save_plan_to_json, save_view_to_csv,
};
use std::fs;
use tempfile::{NamedTempFile, tempdir};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn sample_plan() -> PlanModel {
    let mut plan = PlanModel::new(d(2024, 1, 1), "Mother", "Father").unwrap();
    plan.add_block_with_weeks(CaregiverSlot::First, 0, 2).unwrap();
    plan.import_holidays(vec![HolidayEvent::single_day("Easter Monday", d(2024, 4, 1))])
        .unwrap();
    plan
}

#[test]
fn json_file_round_trip() {
    let tmp = NamedTempFile::new().expect("temp file");
    let plan = sample_plan();
    save_plan_to_json(&plan, tmp.path()).unwrap();
    let loaded = load_plan_from_json(tmp.path()).unwrap();
    assert_eq!(loaded, plan);
}

#[test]
fn json_save_creates_parent_directories_and_leaves_no_temp_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("last_plan.json");
    save_plan_to_json(&sample_plan(), &path).unwrap();
    assert!(path.exists());
    assert!(!dir.path().join("nested").join("last_plan.json.tmp").exists());
}

#[test]
fn json_store_returns_none_when_nothing_saved() {
    let dir = tempdir().unwrap();
    let store = JsonPlanStore::new(dir.path().join("missing.json"));
    assert!(store.load_plan().unwrap().is_none());

    store.save_plan(&sample_plan()).unwrap();
    assert_eq!(store.load_plan().unwrap(), Some(sample_plan()));
}

#[test]
fn corrupt_json_file_is_a_deserialization_error() {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(tmp.path(), "{\"birth_date\": \"2024-01-01\", \"caregivers\": 3}").unwrap();
    let err = load_plan_from_json(tmp.path()).unwrap_err();
    assert!(matches!(
        err,
        PersistenceError::Plan(PlanError::Deserialization(_))
    ));
}

#[test]
fn missing_json_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = load_plan_from_json(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, PersistenceError::Io(_)));
}

#[test]
fn view_csv_has_header_and_one_line_per_row() {
    let tmp = NamedTempFile::new().unwrap();
    let plan = sample_plan();
    let view = render_view(&plan);
    save_view_to_csv(&view, tmp.path()).unwrap();

    let text = fs::read_to_string(tmp.path()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "lane,label,start_date,end_date,duration_weeks,working_days"
    );
    assert_eq!(lines.len(), view.rows.len() + 1);
    assert!(
        lines[1].starts_with("Mother,Mother Block 1 (Mandatory),2024-01-01,2024-02-12,6.00,30")
    );
    assert!(text.contains("Holiday,Easter Monday,2024-04-01,2024-04-02,0.14,0"));
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_store_round_trip_and_overwrite() {
    use leave_planner::SqlitePlanStore;

    let store = SqlitePlanStore::in_memory().unwrap();
    assert!(store.load_plan().unwrap().is_none());

    let mut plan = sample_plan();
    store.save_plan(&plan).unwrap();
    assert_eq!(store.load_plan().unwrap(), Some(plan.clone()));

    plan.rename_caregiver(CaregiverSlot::Second, "Robin");
    store.save_plan(&plan).unwrap();
    let loaded = store.load_plan().unwrap().unwrap();
    assert_eq!(
        loaded.timeline(CaregiverSlot::Second).caregiver_name(),
        "Robin"
    );
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_store_on_disk_survives_reopen() {
    use leave_planner::SqlitePlanStore;

    let dir = tempdir().unwrap();
    let path = dir.path().join("plan.db");
    {
        let store = SqlitePlanStore::new(&path).unwrap();
        store.save_plan(&sample_plan()).unwrap();
    }
    let store = SqlitePlanStore::new(&path).unwrap();
    assert_eq!(store.load_plan().unwrap(), Some(sample_plan()));
}
