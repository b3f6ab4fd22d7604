//! Holiday import adapters. Each turns a calendar file into plain
//! [`HolidayEvent`]s for [`PlanModel::import_holidays`](crate::PlanModel::import_holidays).
//! A single malformed entry fails the whole import.

use crate::block_validation;
use crate::calendar::HolidayEvent;
use crate::persistence::{PersistenceError, PersistenceResult};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

const DEFAULT_EVENT_LABEL: &str = "Holiday";

pub fn load_holidays_from_ics<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<HolidayEvent>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let events = parse_ics_holidays(&contents)?;
    tracing::info!(path = %path.display(), count = events.len(), "holidays read from ics");
    Ok(events)
}

/// Read the VEVENTs of an iCalendar document (RFC 5545), e.g. a published
/// bank-holiday feed. Only SUMMARY, DTSTART and DTEND are used.
pub fn parse_ics_holidays(input: &str) -> PersistenceResult<Vec<HolidayEvent>> {
    let mut events = Vec::new();
    let mut current: Option<PendingEvent> = None;

    for (line_no, line) in unfold_lines(input).into_iter().enumerate() {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let property = name
            .split(';')
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();

        match (property.as_str(), current.as_mut()) {
            ("BEGIN", None) if value.eq_ignore_ascii_case("VEVENT") => {
                current = Some(PendingEvent::default());
            }
            ("BEGIN", Some(_)) if value.eq_ignore_ascii_case("VEVENT") => {
                return Err(invalid(line_no, "nested VEVENT"));
            }
            ("END", Some(_)) if value.eq_ignore_ascii_case("VEVENT") => {
                if let Some(pending) = current.take() {
                    events.push(pending.finish(line_no)?);
                }
            }
            ("SUMMARY", Some(pending)) => {
                pending.summary = Some(unescape_text(value));
            }
            ("DTSTART", Some(pending)) => {
                pending.start = Some(parse_ics_date(value).ok_or_else(|| {
                    invalid(line_no, &format!("invalid DTSTART '{value}'"))
                })?);
            }
            ("DTEND", Some(pending)) => {
                let date = parse_ics_date(value)
                    .ok_or_else(|| invalid(line_no, &format!("invalid DTEND '{value}'")))?;
                pending.end = Some((date, value.contains('T')));
            }
            _ => {}
        }
    }

    if current.is_some() {
        return Err(PersistenceError::InvalidData(
            "calendar ended inside a VEVENT".to_string(),
        ));
    }
    Ok(events)
}

#[derive(Default)]
struct PendingEvent {
    summary: Option<String>,
    start: Option<NaiveDate>,
    /// Date plus whether it came from a date-time value.
    end: Option<(NaiveDate, bool)>,
}

impl PendingEvent {
    fn finish(self, line_no: usize) -> PersistenceResult<HolidayEvent> {
        let start = self
            .start
            .ok_or_else(|| invalid(line_no, "VEVENT without DTSTART"))?;
        // all-day DTEND is exclusive; a date-time DTEND lands on the last day
        let end = match self.end {
            Some((end, false)) if end < start => {
                return Err(invalid(line_no, "DTEND before DTSTART"));
            }
            Some((end, false)) if end > start => end.pred_opt().unwrap_or(start),
            Some((end, true)) => end,
            Some((_, false)) | None => start,
        };
        let event = HolidayEvent::new(
            self.summary
                .unwrap_or_else(|| DEFAULT_EVENT_LABEL.to_string()),
            start,
            end,
        );
        block_validation::validate_holiday(&event)?;
        Ok(event)
    }
}

fn invalid(line_no: usize, message: &str) -> PersistenceError {
    PersistenceError::InvalidData(format!("calendar line {}: {message}", line_no + 1))
}

fn unfold_lines(input: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in input.lines() {
        let raw = raw.trim_end_matches('\r');
        if let Some(rest) = raw.strip_prefix(&[' ', '\t'][..]) {
            if let Some(last) = lines.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        if !raw.is_empty() {
            lines.push(raw.to_string());
        }
    }
    lines
}

/// `20240101` or `20240101T090000Z`; only the date part is kept.
fn parse_ics_date(value: &str) -> Option<NaiveDate> {
    let digits = value.get(..8)?;
    NaiveDate::parse_from_str(digits, "%Y%m%d").ok()
}

fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[derive(Deserialize)]
struct HolidayCsvRecord {
    label: String,
    start_date: NaiveDate,
    #[serde(default)]
    end_date: Option<NaiveDate>,
}

/// CSV with a `label,start_date,end_date` header. A blank `end_date` means
/// a one-day holiday.
pub fn load_holidays_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<HolidayEvent>> {
    let path = path.as_ref();
    let events = parse_holidays_csv(File::open(path)?)?;
    tracing::info!(path = %path.display(), count = events.len(), "holidays read from csv");
    Ok(events)
}

pub fn parse_holidays_csv<R: Read>(reader: R) -> PersistenceResult<Vec<HolidayEvent>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut events = Vec::new();
    for record in reader.deserialize::<HolidayCsvRecord>() {
        let record = record?;
        let event = HolidayEvent::new(
            record.label,
            record.start_date,
            record.end_date.unwrap_or(record.start_date),
        );
        block_validation::validate_holiday(&event)?;
        events.push(event);
    }
    Ok(events)
}
