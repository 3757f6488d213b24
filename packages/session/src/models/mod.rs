//! Data models for the session store.

mod library;
mod user;

pub(crate) use library::new_id;
pub use library::{
    normalize_tags, Comparison, SavedAnnotation, SavedAssessment, SearchHistoryEntry, UserNote,
};
pub use user::{
    Plan, Preferences, PreferencesUpdate, ProfileUpdate, ReportSize, Stats, Theme, User,
};
