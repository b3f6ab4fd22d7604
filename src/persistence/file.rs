use super::{PersistenceError, PersistenceResult, PlanStore};
use crate::document::PlanDocument;
use crate::error::PlanError;
use crate::plan::PlanModel;
use crate::view::ViewData;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write the plan as pretty JSON. The document is written to a sibling
/// temporary file and renamed over `path`, so an interrupted save leaves the
/// previous file intact.
pub fn save_plan_to_json<P: AsRef<Path>>(plan: &PlanModel, path: P) -> PersistenceResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let document = plan.to_serializable();
    let tmp_path = temp_path_for(path);
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &document)?;
        writer.flush()?;
    }
    fs::rename(&tmp_path, path)?;
    tracing::info!(path = %path.display(), "plan saved");
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<PlanModel> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let document: PlanDocument = serde_json::from_reader(file).map_err(|err| {
        PersistenceError::Plan(PlanError::Deserialization(err.to_string()))
    })?;
    let plan = PlanModel::from_serializable(document)?;
    tracing::info!(path = %path.display(), "plan loaded");
    Ok(plan)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "plan.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// The "last plan" file.
#[derive(Debug, Clone)]
pub struct JsonPlanStore {
    path: PathBuf,
}

impl JsonPlanStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlanStore for JsonPlanStore {
    fn save_plan(&self, plan: &PlanModel) -> PersistenceResult<()> {
        save_plan_to_json(plan, &self.path)
    }

    fn load_plan(&self) -> PersistenceResult<Option<PlanModel>> {
        if !self.path.exists() {
            return Ok(None);
        }
        load_plan_from_json(&self.path).map(Some)
    }
}

#[derive(Serialize)]
struct ViewCsvRecord<'a> {
    lane: &'a str,
    label: &'a str,
    start_date: String,
    end_date: String,
    duration_weeks: String,
    working_days: i64,
}

/// Export the tabular summary, one row per chart bar.
pub fn save_view_to_csv<P: AsRef<Path>>(view: &ViewData, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for row in &view.rows {
        writer.serialize(ViewCsvRecord {
            lane: row.lane.name(),
            label: &row.label,
            start_date: format_date(row.start_date),
            end_date: format_date(row.end_date),
            duration_weeks: format!("{:.2}", row.duration_weeks),
            working_days: row.working_days,
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn format_date(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
