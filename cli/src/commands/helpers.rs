use anyhow::{Result, anyhow};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};
use uuid::Uuid;

use recipebox_core::models::{Recipe, join_ingredients};

pub(crate) fn print_recipe_table(recipes: &[Recipe], is_favorite: impl Fn(Uuid) -> bool) {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Category")]
        category: String,
        #[tabled(rename = "Ingredients")]
        ingredients: String,
        #[tabled(rename = "Created")]
        created: String,
        #[tabled(rename = "Fav")]
        favorite: String,
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .map(|r| RecipeRow {
            id: r.id.to_string(),
            name: truncate(&r.name, 30),
            category: truncate(&r.category, 15),
            ingredients: truncate(&join_ingredients(&r.ingredients), 40),
            created: r.created_at.format("%Y-%m-%d %H:%M").to_string(),
            favorite: if is_favorite(r.id) { "★".into() } else { String::new() },
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(5..)).with(Alignment::center()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_recipe_detail(recipe: &Recipe) {
    let name = &recipe.name;
    println!("=== {name} ===");
    if !recipe.category.is_empty() {
        println!("  Category: {}", recipe.category);
    }
    println!("  Created:  {}", recipe.created_at.format("%Y-%m-%d %H:%M UTC"));
    println!("  ID:       {}\n", recipe.id);

    println!("  INGREDIENTS:");
    if recipe.ingredients.is_empty() {
        println!("    (none)");
    }
    for ing in &recipe.ingredients {
        println!("    - {ing}");
    }

    println!("\n  INSTRUCTIONS:");
    if recipe.instructions.is_empty() {
        println!("    (none)");
    }
    for line in recipe.instructions.lines() {
        println!("    {line}");
    }
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

pub(crate) fn prompt_confirm(question: &str, input: impl BufRead) -> Result<bool> {
    eprint!("{question} [y/N]: ");
    io::stderr().flush()?;
    let line = input.lines().next().transpose()?.unwrap_or_default();
    Ok(parse_confirmation(&line))
}

/// Only an explicit yes confirms; anything else (including EOF) declines.
pub(crate) fn parse_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid> {
    recipebox_core::models::parse_recipe_id(raw)
        .map_err(|e| anyhow!("{e}. Use the ID shown by `recipebox list`"))
}
