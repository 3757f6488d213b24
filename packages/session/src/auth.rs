//! # Simulated authentication
//!
//! There is no auth server behind the dashboard. Login accepts any credentials
//! and returns the demo profile; signup creates a fresh free-tier account. Both
//! pay a configurable latency so the UI exercises its pending state.
//!
//! This module holds the pure pieces: the profiles, the signup validation, the
//! first-login seed data and the platform-aware sleep. The pending-request
//! bookkeeping lives on [`SessionContext`](crate::SessionContext).

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::SessionError;
use crate::models::{new_id, Plan, Preferences, SavedAssessment, Stats, Theme, User};

/// Palette new accounts draw their avatar colour from.
pub const AVATAR_COLORS: [&str; 6] = [
    "#6366f1", "#8b5cf6", "#ec4899", "#f59e0b", "#10b981", "#06b6d4",
];

/// Which auth request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Login,
    Signup,
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthKind::Login => f.write_str("login"),
            AuthKind::Signup => f.write_str("signup"),
        }
    }
}

/// The demo profile every login resolves to, stamped with the caller's email.
pub fn demo_user(email: &str) -> User {
    User {
        id: new_id(),
        email: email.to_string(),
        name: "Alex Johnson".to_string(),
        avatar: None,
        avatar_color: AVATAR_COLORS[0].to_string(),
        joined_date: Utc
            .with_ymd_and_hms(2024, 9, 15, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
        plan: Plan::Pro,
        preferences: Preferences {
            theme: Theme::System,
            weekly_digest: true,
            ..Preferences::default()
        },
        stats: Stats {
            assessments_viewed: 47,
            reports_generated: 12,
            favorites_count: 8,
            comparisons_run: 5,
            account_age: 61,
        },
    }
}

/// A brand-new free-tier account with zeroed stats.
pub fn new_account<R: Rng + ?Sized>(
    email: &str,
    name: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> User {
    let color = AVATAR_COLORS.choose(rng).copied().unwrap_or(AVATAR_COLORS[0]);
    User {
        id: new_id(),
        email: email.to_string(),
        name: name.trim().to_string(),
        avatar: None,
        avatar_color: color.to_string(),
        joined_date: now,
        plan: Plan::Free,
        preferences: Preferences::default(),
        stats: Stats::default(),
    }
}

pub fn validate_signup(name: &str) -> Result<(), SessionError> {
    if name.trim().is_empty() {
        return Err(SessionError::validation("name", "please enter your name"));
    }
    Ok(())
}

/// Saved assessments shown to a first-time user.
pub fn seed_saved_assessments(now: DateTime<Utc>) -> Vec<SavedAssessment> {
    let mut slack = SavedAssessment::new("slack-001", "Slack", "Salesforce", now);
    slack.notes =
        Some("Great for team communication, but review AI features carefully".to_string());
    slack.tags = vec!["collaboration".to_string(), "enterprise".to_string()];
    slack.category = Some("Team Tools".to_string());

    let mut github = SavedAssessment::new(
        "github-001",
        "GitHub",
        "Microsoft",
        now - chrono::Duration::days(1),
    );
    github.tags = vec!["development".to_string(), "must-have".to_string()];
    github.category = Some("Developer Tools".to_string());

    vec![slack, github]
}

/// Wait out the simulated network round trip.
pub async fn simulate_latency(delay: Duration) {
    if delay.is_zero() {
        return;
    }
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(delay).await;
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(delay).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_user_uses_given_email() {
        let a = demo_user("a@x.com");
        let b = demo_user("a@x.com");
        assert_eq!(a.email, "a@x.com");
        assert_eq!(a.plan, Plan::Pro);
        assert_ne!(a.id, b.id);
        assert_eq!(a.joined_date.to_rfc3339(), "2024-09-15T00:00:00+00:00");
    }

    #[test]
    fn test_new_account_is_free_with_zero_stats() {
        let user = new_account("b@x.com", " Bea ", Utc::now(), &mut rand::thread_rng());
        assert_eq!(user.plan, Plan::Free);
        assert_eq!(user.stats, Stats::default());
        assert_eq!(user.name, "Bea");
        assert!(!user.preferences.weekly_digest);
        assert!(AVATAR_COLORS.contains(&user.avatar_color.as_str()));
    }

    #[test]
    fn test_validate_signup() {
        assert!(validate_signup("Bea").is_ok());
        assert!(matches!(
            validate_signup("   "),
            Err(SessionError::Validation { field: "name", .. })
        ));
    }

    #[test]
    fn test_seed_entries() {
        let now = Utc::now();
        let seeded = seed_saved_assessments(now);
        let ids: Vec<_> = seeded.iter().map(|s| s.assessment_id.as_str()).collect();
        assert_eq!(ids, vec!["slack-001", "github-001"]);
        assert!(seeded[1].saved_at < seeded[0].saved_at);
    }
}
