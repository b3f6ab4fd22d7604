use crate::block::CaregiverSlot;
use crate::calculations::coverage::PlanSummary;
use crate::calculations::overlap::OverlapSegment;
use crate::calendar::LeaveCalendar;
use crate::plan::PlanModel;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Row group of the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Lane {
    Caregiver { slot: CaregiverSlot, name: String },
    Overlap,
    Holiday,
}

impl Lane {
    pub fn name(&self) -> &str {
        match self {
            Lane::Caregiver { name, .. } => name,
            Lane::Overlap => "Overlap",
            Lane::Holiday => "Holiday",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Lane::Caregiver {
                slot: CaregiverSlot::First,
                ..
            } => "#8fb339",
            Lane::Caregiver {
                slot: CaregiverSlot::Second,
                ..
            } => "#3f88c5",
            Lane::Overlap => "#f26419",
            Lane::Holiday => "#9e9e9e",
        }
    }

    fn glyph(&self) -> char {
        match self {
            Lane::Caregiver { .. } => '#',
            Lane::Overlap => 'X',
            Lane::Holiday => '*',
        }
    }
}

/// One bar of the chart and one line of the summary table.
/// `end_date` is exclusive for every lane, holidays included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineRow {
    pub lane: Lane,
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_weeks: f64,
    pub working_days: i64,
}

impl TimelineRow {
    fn new(
        lane: Lane,
        label: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        calendar: &LeaveCalendar,
    ) -> Self {
        let days = (end_date - start_date).num_days();
        Self {
            lane,
            label,
            start_date,
            end_date,
            duration_weeks: days as f64 / 7.0,
            working_days: calendar.count_working_days(start_date, end_date),
        }
    }
}

/// Everything a chart or table needs, recomputed from the plan on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewData {
    pub birth_date: NaiveDate,
    pub rows: Vec<TimelineRow>,
    pub overlaps: Vec<OverlapSegment>,
    pub summary: PlanSummary,
}

pub fn render_view(plan: &PlanModel) -> ViewData {
    render_view_with(plan, &LeaveCalendar::default())
}

/// Like [`render_view`] but with a caller-supplied working week. The plan's
/// holidays are added to `calendar`.
pub fn render_view_with(plan: &PlanModel, calendar: &LeaveCalendar) -> ViewData {
    let mut calendar = calendar.clone();
    calendar.add_holidays(plan.holidays());

    let mut rows = Vec::new();
    for timeline in plan.timelines() {
        let lane = Lane::Caregiver {
            slot: timeline.slot(),
            name: timeline.caregiver_name().to_string(),
        };
        for interval in timeline.effective_intervals() {
            rows.push(TimelineRow::new(
                lane.clone(),
                format!("{} {}", timeline.caregiver_name(), interval.label),
                interval.start_date,
                interval.end_date,
                &calendar,
            ));
        }
    }

    let overlaps = plan.overlaps();
    for segment in &overlaps {
        rows.push(TimelineRow::new(
            Lane::Overlap,
            segment.label(),
            segment.start_date,
            segment.end_date,
            &calendar,
        ));
    }

    for event in plan.holidays() {
        let end = event.end_date.succ_opt().unwrap_or(event.end_date);
        rows.push(TimelineRow::new(
            Lane::Holiday,
            event.label.clone(),
            event.start_date,
            end,
            &calendar,
        ));
    }

    let [first, second] = plan.timelines();
    let summary = PlanSummary::compute(plan.birth_date(), first, second, &overlaps);

    ViewData {
        birth_date: plan.birth_date(),
        rows,
        overlaps,
        summary,
    }
}

impl ViewData {
    pub fn rows_in_lane<'a>(&'a self, lane_name: &'a str) -> impl Iterator<Item = &'a TimelineRow> {
        self.rows
            .iter()
            .filter(move |row| row.lane.name() == lane_name)
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let lanes: Vec<&str> = self.rows.iter().map(|row| row.lane.name()).collect();
        let labels: Vec<&str> = self.rows.iter().map(|row| row.label.as_str()).collect();
        let starts: Vec<i32> = self
            .rows
            .iter()
            .map(|row| date_to_i32(row.start_date))
            .collect();
        let ends: Vec<i32> = self
            .rows
            .iter()
            .map(|row| date_to_i32(row.end_date))
            .collect();
        let weeks: Vec<f64> = self.rows.iter().map(|row| row.duration_weeks).collect();
        let working: Vec<i64> = self.rows.iter().map(|row| row.working_days).collect();

        let columns = vec![
            Series::new(PlSmallStr::from_static("lane"), lanes).into_column(),
            Series::new(PlSmallStr::from_static("label"), labels).into_column(),
            Series::new(PlSmallStr::from_static("start"), starts)
                .cast(&DataType::Date)?
                .into_column(),
            Series::new(PlSmallStr::from_static("end"), ends)
                .cast(&DataType::Date)?
                .into_column(),
            Series::new(PlSmallStr::from_static("duration_weeks"), weeks).into_column(),
            Series::new(PlSmallStr::from_static("working_days"), working).into_column(),
        ];
        DataFrame::new(columns)
    }

    /// Plain-text chart, one line per lane, `width` columns of timeline.
    pub fn to_gantt_text(&self, width: usize) -> String {
        let width = width.max(10);
        let Some(min_start) = self.rows.iter().map(|row| row.start_date).min() else {
            return "(nothing to chart)\n".to_string();
        };
        let max_end = self
            .rows
            .iter()
            .map(|row| row.end_date)
            .max()
            .unwrap_or(min_start);
        let span = (max_end - min_start).num_days().max(1) as usize;
        let column = |date: NaiveDate| -> usize {
            let offset = (date - min_start).num_days().max(0) as usize;
            (offset * width / span).min(width)
        };

        let mut lanes: Vec<&Lane> = Vec::new();
        for row in &self.rows {
            if !lanes.contains(&&row.lane) {
                lanes.push(&row.lane);
            }
        }
        let name_width = lanes.iter().map(|lane| lane.name().len()).max().unwrap_or(0);

        let mut out = String::new();
        for lane in lanes {
            let mut cells = vec![' '; width];
            for row in self.rows.iter().filter(|row| &row.lane == lane) {
                if row.end_date <= row.start_date {
                    continue;
                }
                let from = column(row.start_date).min(width - 1);
                let to = column(row.end_date).max(from + 1);
                for cell in &mut cells[from..to] {
                    *cell = lane.glyph();
                }
            }
            let bar: String = cells.into_iter().collect();
            out.push_str(&format!("{:<name_width$} |{}|\n", lane.name(), bar));
        }
        let axis_pad = " ".repeat(name_width);
        let start_label = min_start.to_string();
        let end_label = max_end.to_string();
        let gap = (width + 2).saturating_sub(start_label.len() + end_label.len());
        out.push_str(&format!(
            "{axis_pad} {start_label}{}{end_label}\n",
            " ".repeat(gap)
        ));
        out
    }
}

fn date_to_i32(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as i32
}
