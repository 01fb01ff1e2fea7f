//! View state for the list and form commands.
//!
//! Each command builds one of these, owns it for the duration of the command,
//! and renders from it. Derived output is recomputed from the base list on
//! every call.

use recipebox_core::listing::{ListCriteria, category_options, derive};
use recipebox_core::models::{
    NewRecipe, Recipe, RecipeUpdate, join_ingredients, split_ingredients,
};

pub(crate) struct RecipeListView {
    base: Vec<Recipe>,
    pub(crate) criteria: ListCriteria,
}

impl RecipeListView {
    pub(crate) fn new(base: Vec<Recipe>, criteria: ListCriteria) -> Self {
        Self { base, criteria }
    }

    pub(crate) fn displayed(&self) -> Vec<Recipe> {
        derive(&self.base, &self.criteria)
    }

    pub(crate) fn category_options(&self) -> Vec<String> {
        category_options(&self.base)
    }
}

/// The add/edit form. Ingredients are edited as one comma-separated string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RecipeForm {
    pub(crate) name: String,
    pub(crate) ingredients: String,
    pub(crate) instructions: String,
    pub(crate) category: String,
}

/// Field values given on the command line; `None` means "leave as is".
#[derive(Debug, Clone, Default)]
pub(crate) struct FormInput {
    pub(crate) name: Option<String>,
    pub(crate) ingredients: Option<String>,
    pub(crate) instructions: Option<String>,
    pub(crate) category: Option<String>,
}

impl RecipeForm {
    /// Prefill from an existing recipe.
    pub(crate) fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            name: recipe.name.clone(),
            ingredients: join_ingredients(&recipe.ingredients),
            instructions: recipe.instructions.clone(),
            category: recipe.category.clone(),
        }
    }

    pub(crate) fn overlay(&mut self, input: FormInput) {
        if let Some(name) = input.name {
            self.name = name;
        }
        if let Some(ingredients) = input.ingredients {
            self.ingredients = ingredients;
        }
        if let Some(instructions) = input.instructions {
            self.instructions = instructions;
        }
        if let Some(category) = input.category {
            self.category = category;
        }
    }

    pub(crate) fn into_new_recipe(self) -> NewRecipe {
        NewRecipe {
            name: self.name,
            ingredients: split_ingredients(&self.ingredients),
            instructions: self.instructions,
            category: self.category,
            is_favorite: false,
        }
    }

    /// Submit the edit form: only fields whose text differs from `original`
    /// are sent, so untouched ingredients never go through split/join.
    pub(crate) fn into_update(self, original: &RecipeForm) -> RecipeUpdate {
        fn changed(now: String, before: &str) -> Option<String> {
            (now != before).then_some(now)
        }
        RecipeUpdate {
            ingredients: changed(self.ingredients, &original.ingredients)
                .map(|raw| split_ingredients(&raw)),
            name: changed(self.name, &original.name),
            instructions: changed(self.instructions, &original.instructions),
            category: changed(self.category, &original.category),
            is_favorite: None,
        }
    }
}
