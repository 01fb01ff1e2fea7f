use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params, types::Type};
use uuid::Uuid;

use crate::models::{NewRecipe, Recipe, RecipeUpdate};

const RECIPE_COLUMNS: &str =
    "id, name, ingredients, instructions, category, created_at, is_favorite";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS recipes (
                    id TEXT PRIMARY KEY NOT NULL,
                    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
                    ingredients TEXT NOT NULL DEFAULT '[]',
                    instructions TEXT NOT NULL DEFAULT '',
                    category TEXT NOT NULL DEFAULT '',
                    created_at TEXT NOT NULL,
                    is_favorite INTEGER NOT NULL DEFAULT 0
                );

                CREATE INDEX IF NOT EXISTS idx_recipes_category ON recipes(category);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    // Expects RECIPE_COLUMNS order.
    fn recipe_from_row(row: &rusqlite::Row) -> rusqlite::Result<Recipe> {
        let id: String = row.get(0)?;
        let ingredients: String = row.get(2)?;
        Ok(Recipe {
            id: Uuid::parse_str(&id).map_err(|e| conversion_error(0, e))?,
            name: row.get(1)?,
            ingredients: serde_json::from_str(&ingredients).map_err(|e| conversion_error(2, e))?,
            instructions: row.get(3)?,
            category: row.get(4)?,
            created_at: row.get::<_, DateTime<Utc>>(5)?,
            is_favorite: row.get(6)?,
        })
    }

    // --- Recipes ---

    pub fn insert_recipe(&self, recipe: &NewRecipe) -> Result<Recipe> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let ingredients =
            serde_json::to_string(&recipe.ingredients).context("failed to encode ingredients")?;
        self.conn.execute(
            "INSERT INTO recipes (id, name, ingredients, instructions, category, created_at, is_favorite)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id.to_string(),
                recipe.name,
                ingredients,
                recipe.instructions,
                recipe.category,
                now,
                recipe.is_favorite,
            ],
        )?;
        self.get_recipe(id)?
            .context("Recipe missing right after insert")
    }

    /// All recipes in insertion order.
    pub fn list_recipes(&self) -> Result<Vec<Recipe>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY rowid"
        ))?;
        let recipes = stmt
            .query_map([], Self::recipe_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    pub fn get_recipe(&self, id: Uuid) -> Result<Option<Recipe>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ?1"))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::recipe_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Apply a partial update as a single-row write. Returns `None` when the
    /// recipe does not exist.
    pub fn update_recipe(&self, id: Uuid, update: RecipeUpdate) -> Result<Option<Recipe>> {
        let Some(mut recipe) = self.get_recipe(id)? else {
            return Ok(None);
        };
        if update.is_empty() {
            return Ok(Some(recipe));
        }
        recipe.apply(update);

        let ingredients =
            serde_json::to_string(&recipe.ingredients).context("failed to encode ingredients")?;
        self.conn.execute(
            "UPDATE recipes SET name = ?1, ingredients = ?2, instructions = ?3, category = ?4,
             is_favorite = ?5 WHERE id = ?6",
            params![
                recipe.name,
                ingredients,
                recipe.instructions,
                recipe.category,
                recipe.is_favorite,
                id.to_string(),
            ],
        )?;
        self.get_recipe(id)
    }

    pub fn delete_recipe(&self, id: Uuid) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM recipes WHERE id = ?1", params![id.to_string()])?;
        Ok(rows > 0)
    }
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}
