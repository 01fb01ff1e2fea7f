use anyhow::Result;
use std::process;

use crate::client::RecipeClient;
use crate::views::RecipeListView;
use recipebox_core::favorites::{AddOutcome, FavoritesStore, LocalStorage};
use recipebox_core::listing::ListCriteria;

use super::helpers::{json_error, parse_id, print_recipe_table};

/// Snapshot the live recipe into favorites. The store is only touched once
/// the fetch succeeded.
pub(crate) async fn cmd_favorite_add<S: LocalStorage>(
    client: &RecipeClient,
    favorites: &mut FavoritesStore<S>,
    id: &str,
    json: bool,
) -> Result<AddOutcome> {
    let recipe = client.get(parse_id(id)?).await?;
    let outcome = favorites.add(&recipe)?;

    if json {
        let added = outcome == AddOutcome::Added;
        println!("{}", serde_json::json!({ "id": recipe.id, "added": added }));
    } else {
        match outcome {
            AddOutcome::Added => println!("{} added to favorites!", recipe.name),
            AddOutcome::AlreadyFavorite => println!("This recipe is already in favorites!"),
        }
    }
    Ok(outcome)
}

pub(crate) fn cmd_favorite_remove<S: LocalStorage>(
    favorites: &mut FavoritesStore<S>,
    id: &str,
    json: bool,
) -> Result<()> {
    let id = parse_id(id)?;
    let name = favorites
        .list()
        .iter()
        .find(|f| f.id == id)
        .map(|f| f.name.clone());

    if favorites.remove(id)? {
        if json {
            println!("{}", serde_json::json!({ "removed": id }));
        } else {
            let name = name.unwrap_or_default();
            println!("Removed {name} from favorites");
        }
        Ok(())
    } else {
        if json {
            println!("{}", json_error(&format!("Recipe {id} is not in favorites")));
        } else {
            eprintln!("Recipe {id} is not in favorites");
        }
        process::exit(2);
    }
}

pub(crate) fn cmd_favorite_list<S: LocalStorage>(
    favorites: &FavoritesStore<S>,
    criteria: ListCriteria,
    json: bool,
) -> Result<()> {
    let view = RecipeListView::new(favorites.list().to_vec(), criteria);
    let shown = view.displayed();

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }
    if shown.is_empty() {
        eprintln!("No favorite recipes found");
        return Ok(());
    }
    print_recipe_table(&shown, |_| true);
    Ok(())
}
