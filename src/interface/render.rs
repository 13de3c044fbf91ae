use chrono::NaiveDate;

use crate::models::{DailyTargets, Macros, MealPlanItem, MealType, Product};
use crate::planner::{Banner, PortionPreview, SolveReport, SolveResult};

/// Display a solved day: per-meal items with old and new grams, totals
/// against targets, then the banner, violations and suggestions.
pub fn display_solve(
    date: NaiveDate,
    items: &[MealPlanItem],
    result: &SolveResult,
    report: &SolveReport,
) {
    println!();
    println!("=== {} ===", date);

    if items.is_empty() {
        println!("No items planned for this day.");
    }

    // Find max product name length for alignment
    let max_name_len = items
        .iter()
        .map(|i| i.product.name.len())
        .max()
        .unwrap_or(10);

    for meal in MealType::ALL {
        let in_meal: Vec<&MealPlanItem> = items.iter().filter(|i| i.meal_type == meal).collect();
        if in_meal.is_empty() {
            continue;
        }

        println!();
        println!("--- {} ---", meal);
        for item in in_meal {
            let grams = result
                .quantities
                .get(&item.id)
                .copied()
                .unwrap_or(item.quantity_grams);

            let mut tags = Vec::new();
            if item.is_locked {
                tags.push("[Locked]");
            }
            if item.product.is_fixed() {
                tags.push("[Fixed]");
            }
            if item.product.ignore_macros {
                tags.push("[No macros]");
            }
            let tags_str = if tags.is_empty() {
                String::new()
            } else {
                format!("  {}", tags.join(" "))
            };

            println!(
                "{:>3}. {:<width$} {:>6.0}g -> {:>6.0}g | {:>5.0} kcal{}",
                item.id,
                item.product.name,
                item.quantity_grams,
                grams,
                item.product.contribution(grams).calories,
                tags_str,
                width = max_name_len
            );
        }
    }

    println!();
    println!("--- Totals ---");
    display_macros_row("Achieved", &result.achieved);
    if let Some(closest) = &result.closest {
        display_macros_row("Closest", closest);
    }
    display_macros_row("Target", &result.targets);
    println!();

    match report.banner() {
        Banner::None => println!("On target."),
        Banner::Amber => println!("Best effort: closest reachable day, still off target."),
        Banner::Red => println!("Infeasible: targets cannot be reached, nothing will be saved."),
    }

    for violation in &report.violations {
        println!("  ! {}", violation);
    }
    if !report.suggested_fixes.is_empty() {
        println!("Suggestions:");
        for fix in &report.suggested_fixes {
            println!("  - {}", fix);
        }
    }
    println!();
}

fn display_macros_row(label: &str, m: &Macros) {
    println!(
        "{:<9} {:>6.0} kcal | P {:>5.1}g | C {:>5.1}g | F {:>5.1}g",
        label, m.calories, m.protein, m.carbs, m.fat
    );
}

/// Display the resolved targets for a day.
pub fn display_targets(date: NaiveDate, targets: &DailyTargets) {
    println!();
    println!("=== Targets for {} ({}) ===", date, date.format("%A"));
    display_macros_row("Target", targets);
    println!();
}

/// Display a single-item portion estimate.
pub fn display_preview(product: &Product, meal: MealType, preview: &PortionPreview) {
    let m = product.contribution(preview.grams);
    println!(
        "{} for {}: {:.0}g ({:.0} kcal, P {:.1}g, C {:.1}g, F {:.1}g)",
        product.name, meal, preview.grams, m.calories, m.protein, m.carbs, m.fat
    );
    for warning in &preview.warnings {
        println!("  ! {}", warning);
    }
}
