use crate::news::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publisher of an article as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Source {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// A single news article, decoded from the API's JSON representation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: Source,
    pub title: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl Article {
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// "Source ‧ 3h ago" style caption relative to the current time.
    pub fn caption(&self) -> String {
        self.caption_at(Utc::now())
    }

    pub fn caption_at(&self, now: DateTime<Utc>) -> String {
        let when = relative_time(self.published_at, now);
        if self.source.name.is_empty() {
            when
        } else {
            format!("{} ‧ {}", self.source.name, when)
        }
    }
}

fn relative_time(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(published);
    if elapsed.num_seconds() < 60 {
        // Includes timestamps slightly in the future (clock skew)
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{}d ago", elapsed.num_days())
    } else {
        published.format("%Y-%m-%d").to_string()
    }
}

/// The articles returned for one category, in the order the API sent them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryArticles {
    pub category: Category,
    pub articles: Vec<Article>,
}
