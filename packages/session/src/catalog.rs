//! # Assessment catalog
//!
//! The session store only ever needs an assessment's id, name and vendor; the
//! full assessment documents belong to the catalog service. [`AssessmentCatalog`]
//! is the seam a real client plugs into. [`InMemoryCatalog`] serves a
//! caller-supplied list and implements the same filter semantics the hosted
//! catalog exposes:
//!
//! | Method | Behaviour |
//! |--------|-----------|
//! | [`get_assessment`](AssessmentCatalog::get_assessment) | exact id lookup |
//! | [`search`](AssessmentCatalog::search) | case-insensitive substring match on name, vendor or category; empty query returns everything |
//! | [`dashboard_stats`](AssessmentCatalog::dashboard_stats) | count, rounded mean trust score, first four as "recent" |
//! | [`suggestions`](AssessmentCatalog::suggestions) | up to five product names containing the query |
//! | [`get_many`](AssessmentCatalog::get_many) | every record whose id is listed, in catalog order |

use serde::{Deserialize, Serialize};

const MAX_SUGGESTIONS: usize = 5;
const RECENT_COUNT: usize = 4;

/// The slice of an assessment the dashboard lists and searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummary {
    pub id: String,
    pub name: String,
    pub vendor: String,
    pub category: String,
    /// 0–100.
    pub trust_score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_assessments: usize,
    pub average_trust_score: u8,
    pub recent_assessments: Vec<AssessmentSummary>,
}

/// Async read-only access to assessments.
pub trait AssessmentCatalog {
    fn get_assessment(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Option<AssessmentSummary>>;
    fn search(&self, query: &str) -> impl std::future::Future<Output = Vec<AssessmentSummary>>;
    fn dashboard_stats(&self) -> impl std::future::Future<Output = DashboardStats>;
    fn suggestions(&self, query: &str) -> impl std::future::Future<Output = Vec<String>>;
    fn get_many(&self, ids: &[String])
        -> impl std::future::Future<Output = Vec<AssessmentSummary>>;
}

/// Catalog over an owned list of summaries.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    assessments: Vec<AssessmentSummary>,
}

impl InMemoryCatalog {
    pub fn new(assessments: Vec<AssessmentSummary>) -> Self {
        Self { assessments }
    }

    fn matches(assessment: &AssessmentSummary, needle: &str) -> bool {
        assessment.name.to_lowercase().contains(needle)
            || assessment.vendor.to_lowercase().contains(needle)
            || assessment.category.to_lowercase().contains(needle)
    }
}

impl AssessmentCatalog for InMemoryCatalog {
    async fn get_assessment(&self, id: &str) -> Option<AssessmentSummary> {
        self.assessments.iter().find(|a| a.id == id).cloned()
    }

    async fn search(&self, query: &str) -> Vec<AssessmentSummary> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.assessments.clone();
        }
        self.assessments
            .iter()
            .filter(|a| Self::matches(a, &needle))
            .cloned()
            .collect()
    }

    async fn dashboard_stats(&self) -> DashboardStats {
        let total = self.assessments.len();
        let average = if total == 0 {
            0
        } else {
            let sum: u64 = self.assessments.iter().map(|a| u64::from(a.trust_score)).sum();
            // Round half up.
            ((sum * 2 + total as u64) / (total as u64 * 2)) as u8
        };
        DashboardStats {
            total_assessments: total,
            average_trust_score: average,
            recent_assessments: self.assessments.iter().take(RECENT_COUNT).cloned().collect(),
        }
    }

    async fn suggestions(&self, query: &str) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        let mut names: Vec<String> = Vec::new();
        for assessment in &self.assessments {
            if names.len() == MAX_SUGGESTIONS {
                break;
            }
            if (needle.is_empty() || assessment.name.to_lowercase().contains(&needle))
                && !names.contains(&assessment.name)
            {
                names.push(assessment.name.clone());
            }
        }
        names
    }

    async fn get_many(&self, ids: &[String]) -> Vec<AssessmentSummary> {
        self.assessments
            .iter()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn summary(
        id: &str,
        name: &str,
        vendor: &str,
        category: &str,
        score: u8,
    ) -> AssessmentSummary {
        AssessmentSummary {
            id: id.into(),
            name: name.into(),
            vendor: vendor.into(),
            category: category.into(),
            trust_score: score,
        }
    }

    pub(crate) fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            summary("slack-001", "Slack", "Salesforce", "Team Collaboration", 78),
            summary("github-001", "GitHub", "Microsoft", "Developer Tools", 85),
            summary("signal-001", "Signal", "Signal Foundation", "Messaging", 95),
            summary("jira-001", "Jira", "Atlassian", "Project Management", 80),
            summary("figma-001", "Figma", "Figma Inc", "Design", 83),
            summary("teams-001", "Microsoft Teams", "Microsoft", "Team Collaboration", 76),
        ])
    }

    #[tokio::test]
    async fn test_get_assessment() {
        let catalog = catalog();
        assert_eq!(
            catalog.get_assessment("jira-001").await.unwrap().vendor,
            "Atlassian"
        );
        assert!(catalog.get_assessment("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_search_matches_name_vendor_category() {
        let catalog = catalog();

        let by_vendor = catalog.search("MICROSOFT").await;
        let ids: Vec<_> = by_vendor.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["github-001", "teams-001"]);

        let by_category = catalog.search("collab").await;
        assert_eq!(by_category.len(), 2);

        assert_eq!(catalog.search("").await.len(), 6);
        assert!(catalog.search("zzz").await.is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_stats() {
        let stats = catalog().dashboard_stats().await;
        assert_eq!(stats.total_assessments, 6);
        // (78 + 85 + 95 + 80 + 83 + 76) / 6 = 82.83
        assert_eq!(stats.average_trust_score, 83);
        assert_eq!(stats.recent_assessments.len(), 4);

        let empty = InMemoryCatalog::default().dashboard_stats().await;
        assert_eq!(empty.average_trust_score, 0);
    }

    #[tokio::test]
    async fn test_suggestions() {
        let catalog = catalog();
        assert_eq!(catalog.suggestions("").await.len(), 5);
        assert_eq!(catalog.suggestions("s").await, vec!["Slack", "Signal", "Microsoft Teams"]);
    }

    #[tokio::test]
    async fn test_get_many_keeps_catalog_order() {
        let ids = vec!["signal-001".to_string(), "slack-001".to_string(), "x".to_string()];
        let found = catalog().get_many(&ids).await;
        let names: Vec<_> = found.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Slack", "Signal"]);
    }
}
