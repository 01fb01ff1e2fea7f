use std::path::Path;

use uuid::Uuid;

use crate::db::Database;
use crate::error::RecipeError;
use crate::models::{DeleteAck, NewRecipe, Recipe, RecipeUpdate, validate_recipe_name};

/// Recipe CRUD over the store of record.
///
/// Validation lives here so every caller (HTTP handlers, tests, future
/// frontends) gets the same rules. Each call is independent; there is no
/// transaction spanning calls.
pub struct RecipeService {
    db: Database,
}

impl RecipeService {
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    pub fn new_in_memory() -> anyhow::Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    pub fn create(&self, fields: NewRecipe) -> Result<Recipe, RecipeError> {
        let name = validate_recipe_name(&fields.name)?;
        let recipe = self.db.insert_recipe(&NewRecipe { name, ..fields })?;
        Ok(recipe)
    }

    pub fn list_all(&self) -> Result<Vec<Recipe>, RecipeError> {
        Ok(self.db.list_recipes()?)
    }

    pub fn get_by_id(&self, id: Uuid) -> Result<Recipe, RecipeError> {
        self.db.get_recipe(id)?.ok_or(RecipeError::NotFound(id))
    }

    pub fn update(&self, id: Uuid, mut fields: RecipeUpdate) -> Result<Recipe, RecipeError> {
        if let Some(name) = fields.name.as_deref() {
            fields.name = Some(validate_recipe_name(name)?);
        }
        self.db
            .update_recipe(id, fields)?
            .ok_or(RecipeError::NotFound(id))
    }

    pub fn delete(&self, id: Uuid) -> Result<DeleteAck, RecipeError> {
        if self.db.delete_recipe(id)? {
            Ok(DeleteAck::deleted())
        } else {
            Err(RecipeError::NotFound(id))
        }
    }
}
