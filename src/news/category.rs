use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Topical category understood by the top-headlines endpoint.
///
/// The set is closed: every variant has a stable wire identifier used in the
/// `category` query parameter and a sort rank that fixes display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    General,
    Business,
    Technology,
    Entertainment,
    Sports,
    Science,
    Health,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown category '{0}' (expected one of: general, business, technology, entertainment, sports, science, health)")]
pub struct UnknownCategory(pub String);

impl Category {
    /// Every category, in sort-rank order.
    pub const ALL: [Category; 7] = [
        Category::General,
        Category::Business,
        Category::Technology,
        Category::Entertainment,
        Category::Sports,
        Category::Science,
        Category::Health,
    ];

    /// Identifier sent to the API.
    pub fn wire_id(self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Business => "business",
            Category::Technology => "technology",
            Category::Entertainment => "entertainment",
            Category::Sports => "sports",
            Category::Science => "science",
            Category::Health => "health",
        }
    }

    /// Position of this category in aggregated results (ascending).
    pub fn sort_rank(self) -> u8 {
        match self {
            Category::General => 0,
            Category::Business => 1,
            Category::Technology => 2,
            Category::Entertainment => 3,
            Category::Sports => 4,
            Category::Science => 5,
            Category::Health => 6,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::General => "Top Headlines",
            Category::Business => "Business",
            Category::Technology => "Technology",
            Category::Entertainment => "Entertainment",
            Category::Sports => "Sports",
            Category::Science => "Science",
            Category::Health => "Health",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_id())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.wire_id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_wire_ids_are_unique() {
        let ids: HashSet<_> = Category::ALL.iter().map(|c| c.wire_id()).collect();
        assert_eq!(ids.len(), Category::ALL.len());
    }

    #[test]
    fn test_all_is_in_rank_order() {
        let ranks: Vec<u8> = Category::ALL.iter().map(|c| c.sort_rank()).collect();
        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ranks, sorted);
    }

    #[test]
    fn test_parse_round_trips_wire_id() {
        for category in Category::ALL {
            assert_eq!(category.wire_id().parse::<Category>(), Ok(category));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Technology".parse::<Category>(), Ok(Category::Technology));
        assert_eq!(" SPORTS ".parse::<Category>(), Ok(Category::Sports));
    }

    #[test]
    fn test_parse_unknown_category() {
        let err = "weather".parse::<Category>().unwrap_err();
        assert_eq!(err, UnknownCategory("weather".to_string()));
        assert!(err.to_string().contains("weather"));
    }

    #[test]
    fn test_serializes_as_wire_id() {
        let json = serde_json::to_string(&Category::Science).unwrap();
        assert_eq!(json, "\"science\"");
    }
}
