//! Itinerary text to iCalendar conversion

pub mod export;
pub mod segment;

pub use export::{
    convert, convert_at, download_file_name, itinerary_entries, render_calendar, CalendarEntry,
    CALENDAR_VERSION, FALLBACK_TITLE, PRODUCT_ID,
};
pub use segment::{split_days, DaySection};
