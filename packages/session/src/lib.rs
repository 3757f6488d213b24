//! # Session crate: user session & personalization store
//!
//! Holds everything the dashboard remembers about the person using it: the
//! signed-in profile, saved assessments, notes, comparisons and search history.
//! State lives in a [`SessionContext`] that the UI layer constructs once and
//! keeps in its own context; every change is written through a
//! [`store::KeyValueStore`].
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | Simulated login/signup: demo and new-account profiles, first-login seed data, latency |
//! | [`catalog`] | The read-only assessment catalog seam and an in-memory implementation |
//! | [`context`] | [`SessionContext`]: load, mutate, persist, flush |
//! | [`models`] | [`User`] and the collection records |
//!
//! ## Example
//!
//! ```no_run
//! # async fn run() -> Result<(), session::SessionError> {
//! use session::{SessionConfig, SessionContext};
//! use store::MemoryStore;
//!
//! let ctx = SessionContext::load(MemoryStore::new(), SessionConfig::default());
//! ctx.login("alex@example.com", "secret").await?;
//! let saved = ctx.save_assessment("signal-001", "Signal", "Signal Foundation");
//! ctx.add_note(&saved.assessment_id, "E2EE by default");
//! ctx.flush()?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod catalog;
pub mod context;
pub mod error;
pub mod models;

pub use auth::AuthKind;
pub use catalog::{AssessmentCatalog, AssessmentSummary, DashboardStats, InMemoryCatalog};
pub use context::SessionContext;
pub use error::SessionError;
pub use models::{
    Comparison, Plan, Preferences, PreferencesUpdate, ProfileUpdate, ReportSize, SavedAnnotation,
    SavedAssessment, SearchHistoryEntry, Stats, Theme, User, UserNote,
};
pub use store::SessionConfig;
