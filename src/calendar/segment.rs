//! Splitting itinerary text into `Day N` sections.

use once_cell::sync::Lazy;
use regex::Regex;

/// `Day <n>` followed by at least one colon or whitespace character.
/// Digits are ASCII or full-width (`０`-`９`).
static DAY_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Day ([0-9０-９]+)[:\s]+").expect("day header pattern is valid"));

/// Any `Day <n>` occurrence; ends the body of the preceding section
static DAY_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Day [0-9０-９]+").expect("day boundary pattern is valid"));

/// One `Day N` section as it appears in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySection<'a> {
    /// Digits captured after `Day `, unparsed
    pub day: &'a str,
    /// Text between the header and the next `Day <n>`, untrimmed
    pub body: &'a str,
}

impl DaySection<'_> {
    pub fn trimmed_body(&self) -> &str {
        self.body.trim()
    }

    /// The day number with full-width digits folded to ASCII, `None` on overflow
    pub fn day_number(&self) -> Option<u32> {
        self.day.chars().try_fold(0u32, |number, c| {
            let digit = match c {
                '0'..='9' => c as u32 - '0' as u32,
                '０'..='９' => c as u32 - '０' as u32,
                _ => return None,
            };
            number.checked_mul(10)?.checked_add(digit)
        })
    }
}

/// Find every `Day N` section in source order.
///
/// A body runs from the end of its header up to the next `Day <n>` occurrence or the end of
/// the text, line breaks included. Scanning resumes at that occurrence, so a bare `Day 3`
/// without a separator still closes the previous section without opening a new one.
/// Day numbers are not checked for order or uniqueness.
pub fn split_days(text: &str) -> Vec<DaySection<'_>> {
    let mut sections = Vec::new();
    let mut position = 0;

    while let Some(header) = DAY_HEADER.captures_at(text, position) {
        let (Some(whole), Some(day)) = (header.get(0), header.get(1)) else {
            break;
        };

        let body_start = whole.end();
        let body_end = DAY_BOUNDARY
            .find_at(text, body_start)
            .map(|m| m.start())
            .unwrap_or(text.len());

        sections.push(DaySection {
            day: day.as_str(),
            body: &text[body_start..body_end],
        });
        position = body_end;
    }

    sections
}
