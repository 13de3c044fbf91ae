use serde::Serialize;
use tracing::debug;

use crate::error::{PortionError, Result};
use crate::models::{DailyTargets, MealPlanItem, MealType, PortioningSettings, Product};
use crate::planner::constants::{EPSILON, MAIN_MEAL_COUNT, NEGLIGIBLE_CONTRIBUTION_RATIO};
use crate::planner::eligibility::{is_allowed_for_meal, PortionBounds};
use crate::planner::solver::day_totals;

/// Starting quantity suggested for a newly added item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortionPreview {
    pub grams: f64,
    pub warnings: Vec<String>,
}

/// Estimate a portion of `product` for `meal` without touching other items.
///
/// The estimate fills what is left of the meal's calorie share: a third of
/// the day for main meals, the whole uncommitted day for snacks. It is then
/// clamped and rounded to the product's bounds.
pub fn preview_portion(
    product: &Product,
    meal: MealType,
    existing_items: &[MealPlanItem],
    targets: &DailyTargets,
    settings: &PortioningSettings,
) -> Result<PortionPreview> {
    if !is_allowed_for_meal(product, meal) {
        return Err(PortionError::IneligibleMeal {
            product: product.name.clone(),
            meal,
        });
    }
    if let Some(reason) = product.validation_error() {
        return Err(PortionError::InvalidInput(reason));
    }
    settings.validate()?;

    if product.is_fixed() {
        // validation_error() guarantees a portion for fixed products
        let grams = product.fixed_portion_grams.unwrap_or_default();
        return Ok(PortionPreview {
            grams,
            warnings: Vec::new(),
        });
    }

    let bounds = PortionBounds::for_product(product, settings);
    if let Some(reason) = bounds.validation_error() {
        return Err(PortionError::InvalidInput(reason));
    }

    if product.ignore_macros {
        return Ok(PortionPreview {
            grams: bounds.snap(bounds.min),
            warnings: vec![format!(
                "{} does not count toward macros; using the minimum portion",
                product.name
            )],
        });
    }

    let remaining = remaining_calories(meal, existing_items, targets);
    let density = product.per_gram().calories;
    let mut warnings = Vec::new();

    let raw = if density > EPSILON {
        remaining / density
    } else {
        bounds.min
    };
    let grams = bounds.snap(raw);

    if density <= EPSILON || density * bounds.max < NEGLIGIBLE_CONTRIBUTION_RATIO * remaining {
        warnings.push(format!(
            "{} contributes little toward the {} target",
            product.name, meal
        ));
    }
    if density > EPSILON {
        if raw < bounds.min - EPSILON {
            warnings.push(format!("Raised to the minimum portion of {}g", bounds.min));
        } else if raw > bounds.max + EPSILON {
            warnings.push(format!("Capped at the maximum portion of {}g", bounds.max));
        }
    }

    debug!(product = %product.name, %meal, remaining, grams, "previewed portion");

    Ok(PortionPreview { grams, warnings })
}

/// Calories still open in `meal`'s share of the day, never negative.
fn remaining_calories(meal: MealType, existing: &[MealPlanItem], targets: &DailyTargets) -> f64 {
    let (share, committed) = if meal.is_main() {
        let in_slot: Vec<MealPlanItem> = existing
            .iter()
            .filter(|item| item.meal_type == meal)
            .cloned()
            .collect();
        (targets.calories / MAIN_MEAL_COUNT, day_totals(&in_slot).calories)
    } else {
        (targets.calories, day_totals(existing).calories)
    };
    (share - committed).max(0.0)
}
