use std::path::Path;

use crate::error::Result;
use crate::models::MealPlanItem;
use crate::planner::SolveResult;

/// Write a solved day to CSV, one row per item.
pub fn write_solution_csv(items: &[MealPlanItem], result: &SolveResult, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "item_id", "product", "meal", "grams", "calories", "protein", "carbs", "fat",
    ])?;

    for item in items {
        let grams = result
            .quantities
            .get(&item.id)
            .copied()
            .unwrap_or(item.quantity_grams);
        let m = item.product.contribution(grams);
        wtr.write_record([
            item.id.to_string(),
            item.product.name.clone(),
            item.meal_type.to_string(),
            format!("{:.0}", grams),
            format!("{:.1}", m.calories),
            format!("{:.1}", m.protein),
            format!("{:.1}", m.carbs),
            format!("{:.1}", m.fat),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
