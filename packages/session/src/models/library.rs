//! Records in the four user-owned collections: saved assessments, notes,
//! comparisons and search history. Each is created with a fresh UUID v4 id and
//! stored newest-first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A user's bookmark of a catalog assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAssessment {
    pub id: String,
    pub assessment_id: String,
    pub product_name: String,
    pub product_vendor: String,
    pub saved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl SavedAssessment {
    pub fn new(
        assessment_id: impl Into<String>,
        product_name: impl Into<String>,
        product_vendor: impl Into<String>,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            assessment_id: assessment_id.into(),
            product_name: product_name.into(),
            product_vendor: product_vendor.into(),
            saved_at,
            notes: None,
            tags: Vec::new(),
            category: None,
        }
    }

    /// Overwrite the annotations given in `annotation`.
    pub fn annotate(&mut self, annotation: SavedAnnotation) {
        if let Some(notes) = annotation.notes {
            self.notes = non_blank(notes);
        }
        if let Some(category) = annotation.category {
            self.category = non_blank(category);
        }
        if let Some(tags) = annotation.tags {
            self.tags = normalize_tags(tags);
        }
    }
}

/// Partial update of a saved assessment's annotations. A blank string clears
/// `notes` or `category`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedAnnotation {
    pub notes: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Trim tags, drop empties and keep the first occurrence of each.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Free-text note attached to an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNote {
    pub id: String,
    pub assessment_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl UserNote {
    pub fn new(
        assessment_id: impl Into<String>,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            assessment_id: assessment_id.into(),
            content: content.into(),
            created_at: now,
            updated_at: now,
            color: None,
        }
    }
}

/// A named side-by-side comparison of assessments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub id: String,
    pub name: String,
    pub assessment_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Comparison {
    pub fn new(
        name: impl Into<String>,
        assessment_ids: Vec<String>,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            assessment_ids,
            created_at: now,
            description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub id: String,
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub results_count: u32,
}

impl SearchHistoryEntry {
    pub fn new(query: impl Into<String>, results_count: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            query: query.into(),
            timestamp: now,
            results_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_uuids() {
        let now = Utc::now();
        let a = UserNote::new("slack-001", "one", now);
        let b = UserNote::new("slack-001", "two", now);
        assert_ne!(a.id, b.id);
        assert!(uuid::Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(vec![
            " sso ".into(),
            "".into(),
            "mfa".into(),
            "sso".into(),
        ]);
        assert_eq!(tags, vec!["sso", "mfa"]);
    }

    #[test]
    fn test_annotate_sets_and_clears() {
        let mut saved = SavedAssessment::new("jira-001", "Jira", "Atlassian", Utc::now());
        saved.annotate(SavedAnnotation {
            notes: Some("check data residency".into()),
            category: Some("Project Tools".into()),
            tags: Some(vec!["pm".into(), "pm".into()]),
        });
        assert_eq!(saved.notes.as_deref(), Some("check data residency"));
        assert_eq!(saved.category.as_deref(), Some("Project Tools"));
        assert_eq!(saved.tags, vec!["pm"]);

        saved.annotate(SavedAnnotation {
            notes: Some("  ".into()),
            ..Default::default()
        });
        assert!(saved.notes.is_none());
        assert_eq!(saved.category.as_deref(), Some("Project Tools"));
    }

    #[test]
    fn test_optional_fields_omitted_when_empty() {
        let saved = SavedAssessment::new("zoom-001", "Zoom", "Zoom Video", Utc::now());
        let json = serde_json::to_string(&saved).unwrap();
        assert!(json.contains("\"assessmentId\":\"zoom-001\""));
        assert!(!json.contains("notes"));
        assert!(!json.contains("category"));
    }
}
