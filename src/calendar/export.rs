//! iCalendar rendering of itinerary text.

use super::segment::split_days;
use crate::error::{PlannerError, Result};
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use icalendar::{Calendar, Component, EventLike, Property, ValueType};
use serde::Serialize;

pub const PRODUCT_ID: &str = "-//AI Travel Planner//github.com//";
pub const CALENDAR_VERSION: &str = "2.0";
pub const FALLBACK_TITLE: &str = "Trip itinerary";
pub const FILE_SUFFIX: &str = "_travel_itinerary.ics";

/// One all-day event derived from the itinerary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEntry {
    /// `None` for the single entry produced when the text has no day sections
    pub day_index: Option<u32>,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

impl CalendarEntry {
    fn all_day(
        day_index: Option<u32>,
        title: String,
        description: String,
        date: NaiveDate,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            day_index,
            title,
            description,
            start_date: date,
            end_date: date,
            timestamp,
        }
    }
}

/// Segment the itinerary into entries, in the order the sections appear.
///
/// `Day N` lands on `start_date + (N - 1)`; numbers are neither deduplicated nor sorted.
pub fn itinerary_entries(
    text: &str,
    start_date: NaiveDate,
    generated_at: DateTime<Utc>,
) -> Result<Vec<CalendarEntry>> {
    let sections = split_days(text);

    if sections.is_empty() {
        return Ok(vec![CalendarEntry::all_day(
            None,
            FALLBACK_TITLE.to_string(),
            text.to_string(),
            start_date,
            generated_at,
        )]);
    }

    sections
        .iter()
        .map(|section| {
            let day = section.day_number().ok_or_else(|| {
                PlannerError::Calendar(format!("day number {} is out of range", section.day))
            })?;
            let date = start_date
                .checked_add_signed(Duration::days(i64::from(day) - 1))
                .ok_or_else(|| {
                    PlannerError::Calendar(format!("Day {} falls outside the calendar", day))
                })?;

            Ok(CalendarEntry::all_day(
                Some(day),
                format!("Day {} itinerary", day),
                section.trimmed_body().to_string(),
                date,
                generated_at,
            ))
        })
        .collect()
}

/// Serialize entries into one VCALENDAR document
pub fn render_calendar(entries: &[CalendarEntry]) -> String {
    let mut calendar = Calendar::new();

    for (position, entry) in entries.iter().enumerate() {
        let mut event = icalendar::Event::new();
        event.uid(&format!(
            "{}-{}@trip-planner",
            entry.start_date.format("%Y%m%d"),
            position + 1
        ));
        event.summary(&entry.title);
        event.description(&entry.description);
        event.add_property("DTSTAMP", entry.timestamp.format("%Y%m%dT%H%M%SZ").to_string());
        add_date_property(&mut event, "DTSTART", entry.start_date);
        add_date_property(&mut event, "DTEND", entry.end_date);
        calendar.push(event.done());
    }

    set_calendar_header(&calendar.done().to_string())
}

/// Convert itinerary text to `.ics` bytes stamped with the current time.
///
/// `start_date` defaults to today in local time.
pub fn convert(text: &str, start_date: Option<NaiveDate>) -> Result<Vec<u8>> {
    let start_date = start_date.unwrap_or_else(|| Local::now().date_naive());
    convert_at(text, start_date, Utc::now())
}

pub fn convert_at(
    text: &str,
    start_date: NaiveDate,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>> {
    let entries = itinerary_entries(text, start_date, generated_at)?;
    Ok(render_calendar(&entries).into_bytes())
}

/// Download name: spaces in the destination become underscores
pub fn download_file_name(destination: &str) -> String {
    format!("{}{}", destination.replace(' ', "_"), FILE_SUFFIX)
}

fn add_date_property(event: &mut icalendar::Event, name: &str, date: NaiveDate) {
    let mut prop = Property::new(name, date.format("%Y%m%d").to_string());
    prop.append_parameter(ValueType::Date);
    event.append_property(prop);
}

/// Replace the library's PRODID and make sure VERSION is present
fn set_calendar_header(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len() + PRODUCT_ID.len());
    let mut in_header = false;
    let mut has_version = false;

    for line in ics.lines() {
        if line == "BEGIN:VCALENDAR" {
            in_header = true;
            result.push_str(line);
            result.push_str("\r\n");
            result.push_str(&format!("PRODID:{}\r\n", PRODUCT_ID));
            continue;
        }

        if in_header {
            if line.starts_with("PRODID:") {
                continue;
            }
            if line.starts_with("VERSION:") {
                has_version = true;
            }
            if line.starts_with("BEGIN:") {
                in_header = false;
                if !has_version {
                    result.push_str(&format!("VERSION:{}\r\n", CALENDAR_VERSION));
                    has_version = true;
                }
            }
        }

        if line == "END:VCALENDAR" && !has_version {
            result.push_str(&format!("VERSION:{}\r\n", CALENDAR_VERSION));
            has_version = true;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}
