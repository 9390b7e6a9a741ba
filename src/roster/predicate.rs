//! Free-text search predicate over donor name and email columns

use crate::models::{DonorProfile, TextField};
use serde::{Deserialize, Serialize};

/// Columns a free-text search is matched against, in evaluation order
pub const SEARCH_FIELDS: [TextField; 4] = [
    TextField::FirstName,
    TextField::LastName,
    TextField::DisplayName,
    TextField::Email,
];

/// Store-agnostic description of which donors a search selects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchPredicate {
    /// Every donor matches
    #[default]
    MatchAll,

    /// A donor matches when any listed column contains the needle,
    /// ignoring case
    AnyContains {
        fields: Vec<TextField>,
        /// Needle as typed by the caller
        query: String,
        /// Lowercased needle used for comparison
        needle: String,
    },
}

impl SearchPredicate {
    /// Build a predicate from an optional raw search string.
    ///
    /// An absent or empty string selects everything. The query is taken
    /// literally: no trimming and no wildcard syntax.
    pub fn from_query(query: Option<&str>) -> Self {
        match query {
            None | Some("") => SearchPredicate::MatchAll,
            Some(query) => SearchPredicate::AnyContains {
                fields: SEARCH_FIELDS.to_vec(),
                query: query.to_string(),
                needle: query.to_lowercase(),
            },
        }
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, SearchPredicate::MatchAll)
    }

    /// Evaluate the predicate against a profile
    pub fn matches(&self, profile: &DonorProfile) -> bool {
        match self {
            SearchPredicate::MatchAll => true,
            SearchPredicate::AnyContains { fields, needle, .. } => fields.iter().any(|field| {
                profile
                    .text(*field)
                    .map(|value| value.to_lowercase().contains(needle.as_str()))
                    .unwrap_or(false)
            }),
        }
    }
}

impl std::fmt::Display for SearchPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchPredicate::MatchAll => write!(f, "*"),
            SearchPredicate::AnyContains { fields, query, .. } => {
                let clauses: Vec<String> = fields
                    .iter()
                    .map(|field| format!("{} contains {:?}", field, query))
                    .collect();
                write!(f, "{}", clauses.join(" OR "))
            }
        }
    }
}
