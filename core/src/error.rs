use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RecipeError {
    /// The payload broke a field rule (blank name, malformed id).
    #[error("{0}")]
    Validation(String),

    #[error("Recipe not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
