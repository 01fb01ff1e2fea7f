mod favorite;
mod helpers;
mod recipe;

pub(crate) use favorite::{cmd_favorite_add, cmd_favorite_list, cmd_favorite_remove};
pub(crate) use recipe::{cmd_add, cmd_categories, cmd_delete, cmd_edit, cmd_list, cmd_show};
