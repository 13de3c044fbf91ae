use thiserror::Error;

use crate::models::{ItemId, MealType};

#[derive(Debug, Error)]
pub enum PortionError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("{product} is not allowed for {meal}")]
    IneligibleMeal { product: String, meal: MealType },

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Targets are not achievable; quantities were not saved")]
    InfeasibleNotSaved,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, PortionError>;
