//! # User model for the active session
//!
//! [`User`] is the profile of whoever is signed in, persisted as one blob under
//! the `user` key. It owns two nested records with no lifecycle of their own:
//!
//! - [`Preferences`]: theme, default report size and four display /
//!   notification flags.
//! - [`Stats`]: usage counters shown on the profile page.
//!
//! Field names serialise in camelCase so blobs written by the earlier web
//! client keep loading. Partial updates are expressed as [`ProfileUpdate`] and
//! [`PreferencesUpdate`]; every `Some` field overwrites, every `None` keeps the
//! current value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
    Enterprise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Depth of a generated assessment report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSize {
    Small,
    #[default]
    Medium,
    Full,
    Enterprise,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub theme: Theme,
    pub default_report_size: ReportSize,
    pub email_notifications: bool,
    pub weekly_digest: bool,
    pub auto_save_searches: bool,
    pub compact_mode: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            default_report_size: ReportSize::Medium,
            email_notifications: true,
            weekly_digest: false,
            auto_save_searches: true,
            compact_mode: false,
        }
    }
}

/// Partial update for [`Preferences`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesUpdate {
    pub theme: Option<Theme>,
    pub default_report_size: Option<ReportSize>,
    pub email_notifications: Option<bool>,
    pub weekly_digest: Option<bool>,
    pub auto_save_searches: Option<bool>,
    pub compact_mode: Option<bool>,
}

impl Preferences {
    pub fn apply(&mut self, update: PreferencesUpdate) {
        if let Some(theme) = update.theme {
            self.theme = theme;
        }
        if let Some(size) = update.default_report_size {
            self.default_report_size = size;
        }
        if let Some(v) = update.email_notifications {
            self.email_notifications = v;
        }
        if let Some(v) = update.weekly_digest {
            self.weekly_digest = v;
        }
        if let Some(v) = update.auto_save_searches {
            self.auto_save_searches = v;
        }
        if let Some(v) = update.compact_mode {
            self.compact_mode = v;
        }
    }
}

/// Usage counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    pub assessments_viewed: u32,
    pub reports_generated: u32,
    pub favorites_count: u32,
    pub comparisons_run: u32,
    /// Days since the account was created.
    pub account_age: u32,
}

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub avatar_color: String,
    pub joined_date: DateTime<Utc>,
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub stats: Stats,
}

/// Partial update for [`User`]. Identity (`id`, `joined_date`) is not updatable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    /// `Some(None)` clears the avatar image.
    pub avatar: Option<Option<String>>,
    pub avatar_color: Option<String>,
    pub plan: Option<Plan>,
    pub preferences: Option<Preferences>,
    pub stats: Option<Stats>,
}

impl User {
    /// Shallow merge: each provided field replaces the current one.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(avatar) = update.avatar {
            self.avatar = avatar;
        }
        if let Some(color) = update.avatar_color {
            self.avatar_color = color;
        }
        if let Some(plan) = update.plan {
            self.plan = plan;
        }
        if let Some(preferences) = update.preferences {
            self.preferences = preferences;
        }
        if let Some(stats) = update.stats {
            self.stats = stats;
        }
    }

    /// Get display name, falling back to email if name is blank.
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            &self.email
        } else {
            name
        }
    }

    /// Up to two upper-cased initials, used when there is no avatar image.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}
