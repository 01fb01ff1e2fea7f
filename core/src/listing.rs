//! Search, category filter and date sort over a recipe list.
//!
//! Both list views (all recipes and favorites) render through [`derive`]. The
//! result is recomputed from scratch whenever an input changes; nothing here
//! holds state between calls.

use serde::{Deserialize, Serialize};

use crate::models::Recipe;

/// What the user has typed or toggled in a list view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListCriteria {
    pub search: String,
    pub category: String,
    pub sort_by_date: bool,
}

impl ListCriteria {
    #[must_use]
    pub fn new(search: impl Into<String>, category: impl Into<String>, sort_by_date: bool) -> Self {
        Self {
            search: search.into(),
            category: category.into(),
            sort_by_date,
        }
    }
}

/// Produce the displayed list from `base`.
///
/// Order of steps is fixed: search, then exact category match, then an
/// optional stable sort newest-first. `base` is never modified.
#[must_use]
pub fn derive(base: &[Recipe], criteria: &ListCriteria) -> Vec<Recipe> {
    let needle = criteria.search.to_lowercase();

    let mut out: Vec<Recipe> = base
        .iter()
        .filter(|r| needle.is_empty() || matches_search(r, &needle))
        .filter(|r| criteria.category.is_empty() || r.category == criteria.category)
        .cloned()
        .collect();

    if criteria.sort_by_date {
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
    out
}

// `needle` is already lowercased.
fn matches_search(recipe: &Recipe, needle: &str) -> bool {
    recipe.name.to_lowercase().contains(needle)
        || recipe
            .ingredients
            .iter()
            .any(|i| i.to_lowercase().contains(needle))
}

/// Distinct categories in order of first appearance, for a filter dropdown.
/// Blank categories are left out; the empty value means "all categories".
#[must_use]
pub fn category_options(base: &[Recipe]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    base.iter()
        .map(|r| r.category.as_str())
        .filter(|c| !c.is_empty())
        .filter(|c| seen.insert(*c))
        .map(String::from)
        .collect()
}
