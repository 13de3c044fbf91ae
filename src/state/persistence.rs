use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::{
    NutritionSettings, PlanEntry, PortioningSettings, Product, ProductId, WeeklyOverride,
};

/// Everything the planner keeps on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanState {
    #[serde(default)]
    pub products: Vec<Product>,

    #[serde(default)]
    pub nutrition: NutritionSettings,

    #[serde(default)]
    pub portioning: PortioningSettings,

    #[serde(default)]
    pub weekly_overrides: Vec<WeeklyOverride>,

    /// Plan lines per calendar day.
    #[serde(default)]
    pub days: BTreeMap<NaiveDate, Vec<PlanEntry>>,
}

/// Load the plan state from a JSON file.
///
/// A missing file is an empty plan. Products are deduplicated by id (last
/// occurrence wins).
pub fn load_state<P: AsRef<Path>>(path: P) -> Result<PlanState> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "no state file, starting empty");
        return Ok(PlanState::default());
    }

    let content = fs::read_to_string(path)?;
    let mut state: PlanState = serde_json::from_str(&content)?;
    state.products = dedupe_products(std::mem::take(&mut state.products));
    Ok(state)
}

/// Save the plan state to a JSON file.
pub fn save_state<P: AsRef<Path>>(path: P, state: &PlanState) -> Result<()> {
    let mut state = state.clone();
    state.products = dedupe_products(state.products);
    let json = serde_json::to_string_pretty(&state)?;
    fs::write(path, json)?;
    Ok(())
}

/// Keep the last product per id, ordered by id.
fn dedupe_products(products: Vec<Product>) -> Vec<Product> {
    let mut seen: HashMap<ProductId, Product> = HashMap::new();
    for product in products {
        seen.insert(product.id, product);
    }
    let mut deduped: Vec<Product> = seen.into_values().collect();
    deduped.sort_by_key(|p| p.id);
    deduped
}
