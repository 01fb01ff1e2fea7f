use anyhow::{Result, bail};
use std::io::BufRead;

use crate::client::RecipeClient;
use crate::views::{FormInput, RecipeForm, RecipeListView};
use recipebox_core::favorites::{FavoritesStore, LocalStorage};
use recipebox_core::listing::ListCriteria;

use super::helpers::{parse_id, print_recipe_detail, print_recipe_table, prompt_confirm};

pub(crate) async fn cmd_list<S: LocalStorage>(
    client: &RecipeClient,
    favorites: &FavoritesStore<S>,
    criteria: ListCriteria,
    favorites_only: bool,
    json: bool,
) -> Result<()> {
    let base = if favorites_only {
        favorites.list().to_vec()
    } else {
        client.list().await?
    };
    let view = RecipeListView::new(base, criteria);
    let shown = view.displayed();

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }
    if shown.is_empty() {
        eprintln!("No recipes found");
        return Ok(());
    }
    print_recipe_table(&shown, |id| favorites.contains(id));
    Ok(())
}

pub(crate) async fn cmd_categories(client: &RecipeClient, json: bool) -> Result<()> {
    let view = RecipeListView::new(client.list().await?, ListCriteria::default());
    let categories = view.category_options();

    if json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
    } else {
        println!("All Categories");
        for c in &categories {
            println!("{c}");
        }
    }
    Ok(())
}

pub(crate) async fn cmd_show<S: LocalStorage>(
    client: &RecipeClient,
    favorites: &FavoritesStore<S>,
    id: &str,
    json: bool,
) -> Result<()> {
    let recipe = client.get(parse_id(id)?).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
        return Ok(());
    }
    print_recipe_detail(&recipe);
    if favorites.contains(recipe.id) {
        println!("\n  ★ In favorites");
    }
    Ok(())
}

pub(crate) async fn cmd_add(client: &RecipeClient, input: FormInput, json: bool) -> Result<()> {
    let mut form = RecipeForm::default();
    form.overlay(input);
    let recipe = client.create(&form.into_new_recipe()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    } else {
        let name = &recipe.name;
        let id = recipe.id;
        println!("Added recipe: {name} (id: {id})");
    }
    Ok(())
}

pub(crate) async fn cmd_edit(
    client: &RecipeClient,
    id: &str,
    input: FormInput,
    json: bool,
) -> Result<()> {
    if input.name.is_none()
        && input.ingredients.is_none()
        && input.instructions.is_none()
        && input.category.is_none()
    {
        bail!(
            "Nothing to update. Provide at least one of --name, --ingredients, --instructions, or --category"
        );
    }

    let id = parse_id(id)?;
    let current = client.get(id).await?;
    let original = RecipeForm::from_recipe(&current);
    let mut form = original.clone();
    form.overlay(input);
    let recipe = client.update(id, &form.into_update(&original)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    } else {
        let name = &recipe.name;
        println!("Updated recipe: {name}");
    }
    Ok(())
}

/// `confirm_input` is only read when `yes` is false.
pub(crate) async fn cmd_delete(
    client: &RecipeClient,
    id: &str,
    yes: bool,
    json: bool,
    confirm_input: impl BufRead,
) -> Result<()> {
    let id = parse_id(id)?;
    if !yes && !prompt_confirm("Are you sure you want to delete this recipe?", confirm_input)? {
        if json {
            println!("{}", serde_json::json!({ "cancelled": id }));
        } else {
            eprintln!("Cancelled");
        }
        return Ok(());
    }

    let ack = client.delete(id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ack)?);
    } else {
        println!("{}", ack.message);
    }
    Ok(())
}
