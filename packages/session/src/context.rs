//! # Session context
//!
//! [`SessionContext`] owns the active [`User`] (or none) and the four
//! collections that belong to the browser profile: saved assessments, notes,
//! comparisons and search history. Every read goes through it and every
//! mutation is written back through a [`KeyValueStore`].
//!
//! ## Lifecycle
//!
//! - [`load`](SessionContext::load) reads the five blobs. Missing blobs are
//!   empty; unreadable ones are logged and treated as empty. Nothing is written
//!   until loading is done, because the context does not exist before then.
//! - Mutations update memory under the lock, then re-serialise only the entity
//!   they touched to its own key. A failed write is logged and leaves the other
//!   keys alone.
//! - [`flush`](SessionContext::flush) rewrites every key and reports the first
//!   failure.
//!
//! ## Storage keys
//!
//! | Key | Contents |
//! |-----|----------|
//! | `user` | [`User`], removed on logout |
//! | `savedAssessments` | `Vec<`[`SavedAssessment`]`>` |
//! | `userNotes` | `Vec<`[`UserNote`]`>` |
//! | `comparisons` | `Vec<`[`Comparison`]`>` |
//! | `searchHistory` | `Vec<`[`SearchHistoryEntry`]`>` |
//!
//! Each key is prefixed with `storage.key_prefix` from [`SessionConfig`].
//!
//! ## Auth requests
//!
//! `login` and `signup` are async and claim a single pending slot for their
//! duration. A second request while one is pending fails with
//! [`SessionError::AuthInProgress`]; [`cancel_auth`](SessionContext::cancel_auth)
//! makes the in-flight request resolve with [`SessionError::AuthCancelled`]
//! without changing any state. Dropping the future releases the slot.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::de::DeserializeOwned;
use store::{get_versioned, put_versioned, KeyValueStore, SessionConfig, StoreError};
use tracing::{debug, info, warn};

use crate::auth::{self, AuthKind};
use crate::catalog::{AssessmentCatalog, AssessmentSummary};
use crate::error::SessionError;
use crate::models::{
    Comparison, PreferencesUpdate, ProfileUpdate, SavedAnnotation, SavedAssessment,
    SearchHistoryEntry, Stats, User, UserNote,
};

pub const USER_KEY: &str = "user";
pub const SAVED_KEY: &str = "savedAssessments";
pub const NOTES_KEY: &str = "userNotes";
pub const COMPARISONS_KEY: &str = "comparisons";
pub const HISTORY_KEY: &str = "searchHistory";

/// One independently persisted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    User,
    Saved,
    Notes,
    Comparisons,
    History,
}

impl Slot {
    const ALL: [Slot; 5] = [
        Slot::User,
        Slot::Saved,
        Slot::Notes,
        Slot::Comparisons,
        Slot::History,
    ];

    fn key(self) -> &'static str {
        match self {
            Slot::User => USER_KEY,
            Slot::Saved => SAVED_KEY,
            Slot::Notes => NOTES_KEY,
            Slot::Comparisons => COMPARISONS_KEY,
            Slot::History => HISTORY_KEY,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    kind: AuthKind,
    ticket: u64,
}

#[derive(Debug, Default)]
struct SessionState {
    user: Option<User>,
    saved: Vec<SavedAssessment>,
    notes: Vec<UserNote>,
    comparisons: Vec<Comparison>,
    history: Vec<SearchHistoryEntry>,
    /// Keys holding data from a newer schema; never overwritten.
    frozen: Vec<Slot>,
    pending: Option<Pending>,
    next_ticket: u64,
}

struct Shared<S> {
    store: S,
    config: SessionConfig,
    state: Mutex<SessionState>,
}

/// Handle to the session state. Clones share the same state and store.
pub struct SessionContext<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for SessionContext<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: KeyValueStore> SessionContext<S> {
    /// Build a context from whatever `store` holds.
    pub fn load(store: S, config: SessionConfig) -> Self {
        let mut state = SessionState::default();

        state.user = read_slot(&store, &config, Slot::User, &mut state.frozen);
        state.saved =
            read_slot(&store, &config, Slot::Saved, &mut state.frozen).unwrap_or_default();
        state.notes =
            read_slot(&store, &config, Slot::Notes, &mut state.frozen).unwrap_or_default();
        state.comparisons =
            read_slot(&store, &config, Slot::Comparisons, &mut state.frozen).unwrap_or_default();
        state.history =
            read_slot(&store, &config, Slot::History, &mut state.frozen).unwrap_or_default();

        debug!(
            authenticated = state.user.is_some(),
            saved = state.saved.len(),
            notes = state.notes.len(),
            comparisons = state.comparisons.len(),
            history = state.history.len(),
            "session loaded"
        );

        Self {
            shared: Arc::new(Shared {
                store,
                config,
                state: Mutex::new(state),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    pub fn store(&self) -> &S {
        &self.shared.store
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slot(&self, state: &SessionState, slot: Slot) -> Result<(), StoreError> {
        if state.frozen.contains(&slot) {
            debug!(key = slot.key(), "skipping write to frozen key");
            return Ok(());
        }
        let store = &self.shared.store;
        let key = self.shared.config.storage_key(slot.key());
        match slot {
            Slot::User => match &state.user {
                Some(user) => put_versioned(store, &key, user),
                None => store.remove(&key),
            },
            Slot::Saved => put_versioned(store, &key, &state.saved),
            Slot::Notes => put_versioned(store, &key, &state.notes),
            Slot::Comparisons => put_versioned(store, &key, &state.comparisons),
            Slot::History => put_versioned(store, &key, &state.history),
        }
    }

    /// Write one slot; failures are logged, never propagated.
    fn persist(&self, state: &SessionState, slot: Slot) {
        if let Err(e) = self.write_slot(state, slot) {
            warn!(key = slot.key(), error = %e, "failed to persist session data");
        }
    }

    /// Apply `f` to the active user's stats and persist. False without a user.
    fn bump_stats(&self, state: &mut SessionState, f: impl FnOnce(&mut Stats)) -> bool {
        let Some(user) = state.user.as_mut() else {
            return false;
        };
        f(&mut user.stats);
        self.persist(state, Slot::User);
        true
    }

    /// Rewrite every key. All keys are attempted; the first error is returned.
    pub fn flush(&self) -> Result<(), SessionError> {
        let state = self.lock();
        let mut first_err = None;
        for slot in Slot::ALL {
            if let Err(e) = self.write_slot(&state, slot) {
                warn!(key = slot.key(), error = %e, "flush failed");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    // ---- auth ----------------------------------------------------------

    fn begin_auth(&self, kind: AuthKind) -> Result<PendingAuth<'_, S>, SessionError> {
        let mut state = self.lock();
        if let Some(pending) = state.pending {
            return Err(SessionError::AuthInProgress(pending.kind));
        }
        state.next_ticket += 1;
        let ticket = state.next_ticket;
        state.pending = Some(Pending { kind, ticket });
        debug!(%kind, ticket, "auth request started");
        Ok(PendingAuth { ctx: self, ticket })
    }

    /// The auth request currently in flight, if any.
    pub fn pending_auth(&self) -> Option<AuthKind> {
        self.lock().pending.map(|p| p.kind)
    }

    /// Cancel the in-flight auth request. Returns false if none was pending.
    pub fn cancel_auth(&self) -> bool {
        let cancelled = self.lock().pending.take();
        if let Some(pending) = cancelled {
            info!(kind = %pending.kind, "auth request cancelled");
        }
        cancelled.is_some()
    }

    /// Sign in. Any credentials are accepted and resolve to the demo profile.
    pub async fn login(&self, email: &str, _password: &str) -> Result<User, SessionError> {
        let pending = self.begin_auth(AuthKind::Login)?;
        auth::simulate_latency(self.shared.config.auth.login_latency()).await;

        pending.complete(|state| {
            let user = auth::demo_user(email);
            state.user = Some(user.clone());
            self.persist(state, Slot::User);

            if state.saved.is_empty() {
                state.saved = auth::seed_saved_assessments(Utc::now());
                self.persist(state, Slot::Saved);
            }

            info!(user_id = %user.id, "logged in");
            user
        })
    }

    /// Create a free-tier account. A blank name fails before any waiting.
    pub async fn signup(
        &self,
        email: &str,
        _password: &str,
        name: &str,
    ) -> Result<User, SessionError> {
        auth::validate_signup(name)?;
        let pending = self.begin_auth(AuthKind::Signup)?;
        auth::simulate_latency(self.shared.config.auth.signup_latency()).await;

        pending.complete(|state| {
            let user = auth::new_account(email, name, Utc::now(), &mut rand::thread_rng());
            state.user = Some(user.clone());
            self.persist(state, Slot::User);
            info!(user_id = %user.id, "signed up");
            user
        })
    }

    /// Forget the active user. Collections stay for the next login.
    pub fn logout(&self) {
        let mut state = self.lock();
        if let Some(user) = state.user.take() {
            info!(user_id = %user.id, "logged out");
        }
        self.persist(&state, Slot::User);
    }

    // ---- profile -------------------------------------------------------

    /// Shallow-merge into the active user. Returns false without one.
    pub fn update_profile(&self, update: ProfileUpdate) -> bool {
        let mut state = self.lock();
        let Some(user) = state.user.as_mut() else {
            return false;
        };
        user.apply(update);
        self.persist(&state, Slot::User);
        true
    }

    /// Shallow-merge into the active user's preferences. Returns false without one.
    pub fn update_preferences(&self, update: PreferencesUpdate) -> bool {
        let mut state = self.lock();
        let Some(user) = state.user.as_mut() else {
            return false;
        };
        user.preferences.apply(update);
        self.persist(&state, Slot::User);
        true
    }

    pub fn record_assessment_viewed(&self) -> bool {
        let mut state = self.lock();
        self.bump_stats(&mut state, |s| {
            s.assessments_viewed = s.assessments_viewed.saturating_add(1)
        })
    }

    pub fn record_report_generated(&self) -> bool {
        let mut state = self.lock();
        self.bump_stats(&mut state, |s| {
            s.reports_generated = s.reports_generated.saturating_add(1)
        })
    }

    // ---- saved assessments ---------------------------------------------

    /// Bookmark an assessment. Every call prepends a new record unless
    /// `saved.dedupe_by_assessment` is set, in which case an existing bookmark
    /// for the same assessment is returned unchanged.
    pub fn save_assessment(
        &self,
        assessment_id: &str,
        product_name: &str,
        product_vendor: &str,
    ) -> SavedAssessment {
        let mut state = self.lock();

        if self.shared.config.saved.dedupe_by_assessment {
            if let Some(existing) = state.saved.iter().find(|s| s.assessment_id == assessment_id) {
                debug!(assessment_id, "assessment already saved");
                return existing.clone();
            }
        }

        let saved = SavedAssessment::new(assessment_id, product_name, product_vendor, Utc::now());
        state.saved.insert(0, saved.clone());
        self.persist(&state, Slot::Saved);
        self.bump_stats(&mut state, |s| {
            s.favorites_count = s.favorites_count.saturating_add(1)
        });
        debug!(saved_id = %saved.id, assessment_id, "assessment saved");
        saved
    }

    /// Remove a bookmark by its own id (not the assessment id).
    pub fn unsave_assessment(&self, saved_id: &str) -> bool {
        let mut state = self.lock();
        let before = state.saved.len();
        state.saved.retain(|s| s.id != saved_id);
        if state.saved.len() == before {
            return false;
        }
        self.persist(&state, Slot::Saved);
        self.bump_stats(&mut state, |s| {
            s.favorites_count = s.favorites_count.saturating_sub(1)
        });
        debug!(saved_id, "assessment unsaved");
        true
    }

    pub fn annotate_saved_assessment(&self, saved_id: &str, annotation: SavedAnnotation) -> bool {
        let mut state = self.lock();
        let Some(saved) = state.saved.iter_mut().find(|s| s.id == saved_id) else {
            return false;
        };
        saved.annotate(annotation);
        self.persist(&state, Slot::Saved);
        true
    }

    // ---- notes ---------------------------------------------------------

    pub fn add_note(&self, assessment_id: &str, content: &str) -> UserNote {
        let mut state = self.lock();
        let note = UserNote::new(assessment_id, content, Utc::now());
        state.notes.insert(0, note.clone());
        self.persist(&state, Slot::Notes);
        note
    }

    /// Replace a note's content and bump `updated_at`.
    pub fn update_note(&self, id: &str, content: &str) -> bool {
        let mut state = self.lock();
        let Some(note) = state.notes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        note.content = content.to_string();
        note.updated_at = Utc::now();
        self.persist(&state, Slot::Notes);
        true
    }

    pub fn delete_note(&self, id: &str) -> bool {
        let mut state = self.lock();
        let before = state.notes.len();
        state.notes.retain(|n| n.id != id);
        if state.notes.len() == before {
            return false;
        }
        self.persist(&state, Slot::Notes);
        true
    }

    // ---- comparisons ---------------------------------------------------

    pub fn save_comparison(
        &self,
        name: &str,
        assessment_ids: Vec<String>,
        description: Option<String>,
    ) -> Comparison {
        let mut state = self.lock();
        let comparison = Comparison::new(name, assessment_ids, description, Utc::now());
        state.comparisons.insert(0, comparison.clone());
        self.persist(&state, Slot::Comparisons);
        self.bump_stats(&mut state, |s| {
            s.comparisons_run = s.comparisons_run.saturating_add(1)
        });
        comparison
    }

    pub fn delete_comparison(&self, id: &str) -> bool {
        let mut state = self.lock();
        let before = state.comparisons.len();
        state.comparisons.retain(|c| c.id != id);
        if state.comparisons.len() == before {
            return false;
        }
        self.persist(&state, Slot::Comparisons);
        true
    }

    // ---- search history ------------------------------------------------

    /// Record a search. Only kept when a user is signed in with
    /// `auto_save_searches` on; the oldest entries beyond the cap are dropped.
    pub fn add_to_search_history(
        &self,
        query: &str,
        results_count: u32,
    ) -> Option<SearchHistoryEntry> {
        let mut state = self.lock();
        let enabled = state
            .user
            .as_ref()
            .is_some_and(|u| u.preferences.auto_save_searches);
        if !enabled {
            return None;
        }

        let entry = SearchHistoryEntry::new(query, results_count, Utc::now());
        state.history.insert(0, entry.clone());
        state.history.truncate(self.shared.config.history.max_entries);
        self.persist(&state, Slot::History);
        Some(entry)
    }

    pub fn clear_search_history(&self) {
        let mut state = self.lock();
        state.history.clear();
        self.persist(&state, Slot::History);
    }

    /// Search the catalog and record the query with its result count.
    pub async fn search_and_record<C: AssessmentCatalog>(
        &self,
        catalog: &C,
        query: &str,
    ) -> Vec<AssessmentSummary> {
        let results = catalog.search(query).await;
        if !query.trim().is_empty() {
            let count = u32::try_from(results.len()).unwrap_or(u32::MAX);
            self.add_to_search_history(query.trim(), count);
        }
        results
    }

    // ---- reads ---------------------------------------------------------

    pub fn user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().user.is_some()
    }

    pub fn saved_assessments(&self) -> Vec<SavedAssessment> {
        self.lock().saved.clone()
    }

    pub fn notes(&self) -> Vec<UserNote> {
        self.lock().notes.clone()
    }

    pub fn comparisons(&self) -> Vec<Comparison> {
        self.lock().comparisons.clone()
    }

    pub fn search_history(&self) -> Vec<SearchHistoryEntry> {
        self.lock().history.clone()
    }

    pub fn is_saved(&self, assessment_id: &str) -> bool {
        self.lock()
            .saved
            .iter()
            .any(|s| s.assessment_id == assessment_id)
    }

    /// The most recent bookmark of `assessment_id`.
    pub fn saved_for(&self, assessment_id: &str) -> Option<SavedAssessment> {
        self.lock()
            .saved
            .iter()
            .find(|s| s.assessment_id == assessment_id)
            .cloned()
    }

    /// Notes attached to `assessment_id`, newest first.
    pub fn notes_for(&self, assessment_id: &str) -> Vec<UserNote> {
        self.lock()
            .notes
            .iter()
            .filter(|n| n.assessment_id == assessment_id)
            .cloned()
            .collect()
    }

    pub fn recent_searches(&self, limit: usize) -> Vec<SearchHistoryEntry> {
        self.lock().history.iter().take(limit).cloned().collect()
    }
}

/// Read one slot at startup. Unreadable data is logged and dropped; data from
/// a newer schema also freezes the slot.
fn read_slot<S, T>(
    store: &S,
    config: &SessionConfig,
    slot: Slot,
    frozen: &mut Vec<Slot>,
) -> Option<T>
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    let key = config.storage_key(slot.key());
    match get_versioned(store, &key) {
        Ok(value) => value,
        Err(e @ StoreError::UnsupportedVersion { .. }) => {
            warn!(key = %key, error = %e, "keeping blob from newer schema untouched");
            frozen.push(slot);
            None
        }
        Err(e) => {
            warn!(key = %key, error = %e, "discarding unreadable session data");
            None
        }
    }
}

/// Claim on the single pending-auth slot, held across the simulated round trip.
struct PendingAuth<'a, S: KeyValueStore> {
    ctx: &'a SessionContext<S>,
    ticket: u64,
}

impl<S: KeyValueStore> PendingAuth<'_, S> {
    /// Apply the result if this request is still the pending one.
    fn complete<T>(self, f: impl FnOnce(&mut SessionState) -> T) -> Result<T, SessionError> {
        let mut state = self.ctx.lock();
        match state.pending {
            Some(p) if p.ticket == self.ticket => {
                state.pending = None;
                Ok(f(&mut *state))
            }
            _ => {
                debug!(ticket = self.ticket, "auth request finished after cancellation");
                Err(SessionError::AuthCancelled)
            }
        }
    }
}

impl<S: KeyValueStore> Drop for PendingAuth<'_, S> {
    fn drop(&mut self) {
        let mut state = self.ctx.lock();
        if state.pending.is_some_and(|p| p.ticket == self.ticket) {
            state.pending = None;
        }
    }
}
