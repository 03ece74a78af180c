// Export components
pub mod daily_note;
pub mod google_calendar;
pub mod webhook;

// Re-export the calendar seam
pub use google_calendar::{CalendarSource, GoogleCalendarClient};
