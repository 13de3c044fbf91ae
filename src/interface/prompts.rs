use dialoguer::{Confirm, Select};
use strsim::jaro_winkler;

use crate::error::{PortionError, Result};
use crate::models::{MealType, Product};

/// Fuzzy matches at or below this Jaro-Winkler score are ignored.
const FUZZY_MATCH_THRESHOLD: f64 = 0.7;

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Catalog products ranked by name similarity to `query`, best first.
pub fn fuzzy_candidates<'a>(products: &[&'a Product], query: &str) -> Vec<(&'a Product, f64)> {
    let query = query.trim().to_lowercase();
    let mut candidates: Vec<(&Product, f64)> = products
        .iter()
        .map(|p| (*p, jaro_winkler(&p.key(), &query)))
        .filter(|(_, score)| *score > FUZZY_MATCH_THRESHOLD)
        .collect();

    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    candidates
}

/// Resolve a product name typed by the user.
///
/// Exact (case-insensitive) matches are taken directly. Otherwise close
/// names are offered for confirmation or selection.
pub fn select_product<'a>(products: &[&'a Product], query: &str) -> Result<&'a Product> {
    let key = query.trim().to_lowercase();
    if let Some(product) = products.iter().find(|p| p.key() == key) {
        return Ok(*product);
    }

    let candidates = fuzzy_candidates(products, query);
    let not_found = || PortionError::ProductNotFound(query.to_string());

    match candidates.as_slice() {
        [] => Err(not_found()),
        [(product, _)] => {
            let confirm = prompt_yes_no(&format!("Did you mean '{}'?", product.name), true)?;
            if confirm {
                Ok(*product)
            } else {
                Err(not_found())
            }
        }
        _ => {
            // Multiple matches - let user select
            let options: Vec<&Product> = candidates.iter().take(5).map(|(p, _)| *p).collect();
            let mut labels: Vec<String> = options.iter().map(|p| p.name.clone()).collect();
            labels.push("None of these".to_string());

            let selection = Select::new()
                .with_prompt("Which did you mean?")
                .items(&labels)
                .default(0)
                .interact()?;

            options.get(selection).copied().ok_or_else(not_found)
        }
    }
}

/// Parse a meal name, or ask for one when it is missing or unknown.
pub fn prompt_meal_type(input: Option<&str>) -> Result<MealType> {
    if let Some(meal) = input.and_then(|s| s.parse::<MealType>().ok()) {
        return Ok(meal);
    }
    if let Some(raw) = input {
        println!("Unknown meal '{}'", raw);
    }

    let labels: Vec<&str> = MealType::ALL.iter().map(|m| m.name()).collect();
    let selection = Select::new()
        .with_prompt("Which meal?")
        .items(&labels)
        .default(0)
        .interact()?;

    MealType::ALL
        .get(selection)
        .copied()
        .ok_or_else(|| PortionError::InvalidInput("no meal selected".to_string()))
}
