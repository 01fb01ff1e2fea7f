use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RecipeError;

/// A recipe as held by the store of record.
///
/// Wire names are `_id`, `createdAt` and `isFavorite`, the shape favorites
/// saved by older clients already use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub category: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Recipe {
    /// Overwrite the fields named in `update`. `id` and `created_at` are not
    /// part of an update and never change here.
    pub fn apply(&mut self, update: RecipeUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(ingredients) = update.ingredients {
            self.ingredients = ingredients;
        }
        if let Some(instructions) = update.instructions {
            self.instructions = instructions;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(is_favorite) = update.is_favorite {
            self.is_favorite = is_favorite;
        }
    }
}

/// Create payload. Every field is optional on the wire; a missing `name`
/// deserializes to an empty string and is rejected by validation.
/// Unknown fields such as `_id` or `createdAt` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewRecipe {
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub category: String,
    pub is_favorite: bool,
}

/// Partial update payload. `None` (or an explicit `null`) leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecipeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl RecipeUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.ingredients.is_none()
            && self.instructions.is_none()
            && self.category.is_none()
            && self.is_favorite.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub message: String,
}

impl DeleteAck {
    #[must_use]
    pub fn deleted() -> Self {
        Self {
            message: "Recipe deleted successfully".to_string(),
        }
    }
}

/// Trim a recipe name and reject it if nothing is left.
pub fn validate_recipe_name(name: &str) -> Result<String, RecipeError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RecipeError::Validation(
            "Recipe validation failed: name is required".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn parse_recipe_id(raw: &str) -> Result<Uuid, RecipeError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| RecipeError::Validation(format!("Invalid recipe id '{raw}'")))
}

/// Split the comma-separated ingredients field of a recipe form.
/// Tokens are trimmed and empty tokens dropped.
#[must_use]
pub fn split_ingredients(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[must_use]
pub fn join_ingredients(ingredients: &[String]) -> String {
    ingredients.join(", ")
}
