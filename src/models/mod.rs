//! Data models for the masjid site.
//!
//! Field names serialize as camelCase to match the JSON files and the web client.

mod announcement;
mod event;
mod fields;
mod project;
mod site;

pub use announcement::*;
pub use event::*;
pub use fields::*;
pub use project::*;
pub use site::*;

/// Reject blank titles.
pub(crate) fn require_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        Err("Title is required".to_string())
    } else {
        Ok(())
    }
}
