use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

use crate::error::{PortionError, Result};
use crate::models::{
    week_start, DailyTargets, ItemId, MealPlanItem, MealType, NutritionSettings, PlanEntry,
    PortioningSettings, Product, ProductId, WeeklyOverride,
};
use crate::planner::{self, PortionPreview, SolveResult};
use crate::state::PlanState;

/// Catalog, settings and day plans, with the operations the CLI drives.
pub struct PlanStateManager {
    /// All products keyed by id.
    products: HashMap<ProductId, Product>,
    nutrition: NutritionSettings,
    portioning: PortioningSettings,
    weekly_overrides: Vec<WeeklyOverride>,
    days: BTreeMap<NaiveDate, Vec<PlanEntry>>,
}

impl PlanStateManager {
    pub fn new(state: PlanState) -> Self {
        let products = state.products.into_iter().map(|p| (p.id, p)).collect();
        Self {
            products,
            nutrition: state.nutrition,
            portioning: state.portioning,
            weekly_overrides: state.weekly_overrides,
            days: state.days,
        }
    }

    pub fn get_product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    /// Find a product by name (case-insensitive).
    pub fn find_product(&self, name: &str) -> Option<&Product> {
        let key = name.trim().to_lowercase();
        self.products.values().find(|p| p.key() == key)
    }

    /// All products, ordered by id.
    pub fn all_products(&self) -> Vec<&Product> {
        let mut products: Vec<&Product> = self.products.values().collect();
        products.sort_by_key(|p| p.id);
        products
    }

    pub fn portioning(&self) -> &PortioningSettings {
        &self.portioning
    }

    /// A day's plan lines with their products embedded.
    pub fn day_items(&self, date: NaiveDate) -> Result<Vec<MealPlanItem>> {
        let Some(entries) = self.days.get(&date) else {
            return Ok(Vec::new());
        };
        entries
            .iter()
            .map(|entry| {
                let product = self.get_product(entry.product_id).ok_or_else(|| {
                    PortionError::ProductNotFound(format!("id {}", entry.product_id))
                })?;
                Ok(MealPlanItem {
                    id: entry.id,
                    product: product.clone(),
                    quantity_grams: entry.quantity_grams,
                    is_locked: entry.is_locked,
                    meal_type: entry.meal_type,
                })
            })
            .collect()
    }

    /// Add a product to a meal. Without `grams` the quantity is seeded by
    /// the single-item preview. Returns the new item and preview warnings.
    pub fn add_item(
        &mut self,
        date: NaiveDate,
        product_id: ProductId,
        meal: MealType,
        grams: Option<f64>,
    ) -> Result<(MealPlanItem, Vec<String>)> {
        let product = self
            .get_product(product_id)
            .ok_or_else(|| PortionError::ProductNotFound(format!("id {}", product_id)))?
            .clone();

        if !planner::is_allowed_for_meal(&product, meal) {
            return Err(PortionError::IneligibleMeal {
                product: product.name,
                meal,
            });
        }

        let (quantity, warnings) = match grams {
            Some(g) if !g.is_finite() || g < 0.0 => {
                return Err(PortionError::InvalidInput(format!(
                    "quantity must be a non-negative number of grams, got {}",
                    g
                )));
            }
            Some(g) => (g, Vec::new()),
            None => {
                let PortionPreview { grams, warnings } = self.preview(date, &product, meal)?;
                (grams, warnings)
            }
        };

        let entries = self.days.entry(date).or_default();
        let id = entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let item = MealPlanItem::new(id, product, quantity, meal);
        entries.push(item.to_entry());

        info!(
            %date,
            item_id = id,
            product = %item.product.name,
            %meal,
            grams = quantity,
            "added item"
        );
        Ok((item, warnings))
    }

    /// Preview a portion of `product` against the day's current items.
    pub fn preview(
        &self,
        date: NaiveDate,
        product: &Product,
        meal: MealType,
    ) -> Result<PortionPreview> {
        let existing = self.day_items(date)?;
        let targets = self.targets_for(date);
        planner::preview_portion(product, meal, &existing, &targets, &self.portioning)
    }

    pub fn remove_item(&mut self, date: NaiveDate, item_id: ItemId) -> Result<PlanEntry> {
        let entries = self
            .days
            .get_mut(&date)
            .ok_or(PortionError::ItemNotFound(item_id))?;
        let index = entries
            .iter()
            .position(|e| e.id == item_id)
            .ok_or(PortionError::ItemNotFound(item_id))?;
        let removed = entries.remove(index);
        if entries.is_empty() {
            self.days.remove(&date);
        }
        info!(%date, item_id, "removed item");
        Ok(removed)
    }

    pub fn set_locked(&mut self, date: NaiveDate, item_id: ItemId, locked: bool) -> Result<()> {
        let entry = self
            .days
            .get_mut(&date)
            .and_then(|entries| entries.iter_mut().find(|e| e.id == item_id))
            .ok_or(PortionError::ItemNotFound(item_id))?;
        entry.is_locked = locked;
        Ok(())
    }

    /// Resolved targets for `date`, using this week's override and last week's
    /// as carry-over.
    pub fn targets_for(&self, date: NaiveDate) -> DailyTargets {
        let monday = week_start(date);
        let previous_monday = monday - Duration::days(7);
        planner::resolve_targets(
            date,
            &self.nutrition,
            self.override_for_week(monday),
            self.override_for_week(previous_monday),
        )
    }

    fn override_for_week(&self, monday: NaiveDate) -> Option<&WeeklyOverride> {
        // Later entries replace earlier ones for the same week
        self.weekly_overrides
            .iter()
            .rev()
            .find(|o| o.week_start == monday)
    }

    /// Add or replace the override for its week.
    pub fn add_weekly_override(&mut self, weekly: WeeklyOverride) {
        self.weekly_overrides
            .retain(|o| o.week_start != weekly.week_start);
        self.weekly_overrides.push(weekly);
        self.weekly_overrides.sort_by_key(|o| o.week_start);
    }

    pub fn solve_day(&self, date: NaiveDate) -> Result<SolveResult> {
        let items = self.day_items(date)?;
        let targets = self.targets_for(date);
        planner::solve(&items, &targets, &self.portioning)
    }

    /// Solve each date on its own. A day that fails to load or solve carries
    /// its error without stopping the others.
    pub fn generate_all(&self, dates: &[NaiveDate]) -> Vec<(NaiveDate, Result<SolveResult>)> {
        dates
            .iter()
            .map(|&date| {
                let result = self.solve_day(date);
                if let Err(e) = &result {
                    warn!(%date, error = %e, "day could not be solved");
                }
                (date, result)
            })
            .collect()
    }

    /// Write a solved day back. Infeasible results are refused so the
    /// previous quantities stay untouched. Returns the number of changed items.
    pub fn apply_solution(&mut self, date: NaiveDate, result: &SolveResult) -> Result<usize> {
        if !result.is_saveable() {
            warn!(%date, "refusing to save infeasible solve");
            return Err(PortionError::InfeasibleNotSaved);
        }

        let mut changed = 0;
        if let Some(entries) = self.days.get_mut(&date) {
            for entry in entries.iter_mut() {
                if let Some(&grams) = result.quantities.get(&entry.id) {
                    if (entry.quantity_grams - grams).abs() > f64::EPSILON {
                        entry.quantity_grams = grams;
                        changed += 1;
                    }
                }
            }
        }
        info!(%date, changed, "saved solved quantities");
        Ok(changed)
    }

    /// Convert back to the on-disk form.
    pub fn to_state(&self) -> PlanState {
        PlanState {
            products: self.all_products().into_iter().cloned().collect(),
            nutrition: self.nutrition.clone(),
            portioning: self.portioning.clone(),
            weekly_overrides: self.weekly_overrides.clone(),
            days: self.days.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlanningMode, TargetValues};
    use crate::planner::SolveStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_state() -> PlanState {
        let mut oats = Product::editable(1, "Oats", 389.0, 16.9, 66.3, 6.9);
        oats.meal_eligibility = vec![MealType::Breakfast];
        PlanState {
            products: vec![
                oats,
                Product::editable(2, "Chicken Breast", 165.0, 31.0, 0.0, 3.6),
            ],
            nutrition: NutritionSettings {
                mode: PlanningMode::TargetBased,
                weekday: TargetValues::new(500.0, 94.0, 0.0, 12.0),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_find_product_case_insensitive() {
        let manager = PlanStateManager::new(sample_state());
        assert!(manager.find_product("chicken breast").is_some());
        assert!(manager.find_product("OATS").is_some());
        assert!(manager.find_product("banana").is_none());
    }

    #[test]
    fn test_add_item_rejects_ineligible_meal() {
        let mut manager = PlanStateManager::new(sample_state());
        let result = manager.add_item(date(2026, 10, 14), 1, MealType::Dinner, Some(50.0));
        assert!(matches!(result, Err(PortionError::IneligibleMeal { .. })));
    }

    #[test]
    fn test_add_item_seeds_from_preview() {
        let mut manager = PlanStateManager::new(sample_state());
        let d = date(2026, 10, 14);
        let (item, _) = manager.add_item(d, 2, MealType::Lunch, None).unwrap();
        // 500 / 3 = 166.7 kcal at 1.65 kcal/g = 101g
        assert_eq!(item.quantity_grams, 100.0);
        assert_eq!(item.id, 1);

        let (second, _) = manager.add_item(d, 1, MealType::Breakfast, Some(40.0)).unwrap();
        assert_eq!(second.id, 2);
        assert_eq!(manager.day_items(d).unwrap().len(), 2);
    }

    #[test]
    fn test_solve_and_apply() {
        let mut manager = PlanStateManager::new(sample_state());
        let d = date(2026, 10, 14);
        manager.add_item(d, 2, MealType::Lunch, Some(0.0)).unwrap();

        let result = manager.solve_day(d).unwrap();
        assert_ne!(result.status, SolveStatus::Infeasible);
        assert_eq!(manager.apply_solution(d, &result).unwrap(), 1);
        assert_eq!(manager.day_items(d).unwrap()[0].quantity_grams, 305.0);
    }

    #[test]
    fn test_infeasible_is_not_saved() {
        let mut manager = PlanStateManager::new(sample_state());
        let d = date(2026, 10, 14);
        manager.add_item(d, 2, MealType::Lunch, Some(100.0)).unwrap();
        manager.set_locked(d, 1, true).unwrap();

        let result = manager.solve_day(d).unwrap();
        assert_eq!(result.status, SolveStatus::Infeasible);
        assert!(matches!(
            manager.apply_solution(d, &result),
            Err(PortionError::InfeasibleNotSaved)
        ));
        assert_eq!(manager.day_items(d).unwrap()[0].quantity_grams, 100.0);
    }

    #[test]
    fn test_generate_all_isolates_a_broken_day() {
        let mut state = sample_state();
        let (good, broken) = (date(2026, 10, 13), date(2026, 10, 14));
        let entry = |product_id| PlanEntry {
            id: 1,
            product_id,
            quantity_grams: 0.0,
            is_locked: false,
            meal_type: MealType::Lunch,
        };
        state.days.insert(good, vec![entry(2)]);
        state.days.insert(broken, vec![entry(99)]);
        let manager = PlanStateManager::new(state);

        let results = manager.generate_all(&[good, broken]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, good);
        let solved = results[0].1.as_ref().unwrap();
        assert_eq!(solved.quantities[&1], 305.0);
        assert_eq!(results[1].0, broken);
        assert!(matches!(results[1].1, Err(PortionError::ProductNotFound(_))));
    }

    #[test]
    fn test_remove_item() {
        let mut manager = PlanStateManager::new(sample_state());
        let d = date(2026, 10, 14);
        manager.add_item(d, 2, MealType::Lunch, Some(100.0)).unwrap();
        manager.remove_item(d, 1).unwrap();
        assert!(manager.day_items(d).unwrap().is_empty());
        assert!(matches!(
            manager.remove_item(d, 1),
            Err(PortionError::ItemNotFound(1))
        ));
    }

    #[test]
    fn test_weekly_override_replaces_same_week() {
        let mut manager = PlanStateManager::new(sample_state());
        let monday = date(2026, 10, 12);
        manager.add_weekly_override(WeeklyOverride::zig_zag(monday, 2000.0, 300.0));
        manager.add_weekly_override(WeeklyOverride::zig_zag(monday, 1800.0, 200.0));

        assert_eq!(manager.to_state().weekly_overrides.len(), 1);
        assert_eq!(manager.targets_for(monday).calories, 2000.0);

        // Next Monday has no override and carries this one over
        assert_eq!(manager.targets_for(date(2026, 10, 19)).calories, 2000.0);
    }
}
