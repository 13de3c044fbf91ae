use serde::Serialize;

use crate::models::Nutrient;
use crate::planner::constants::{CALORIE_TOLERANCE_KCAL, EPSILON, MACRO_TOLERANCE_GRAMS};
use crate::planner::solver::{Diagnostic, SolveResult, SolveStatus};

/// Banner the caller shows above a solved day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Banner {
    None,
    /// Best effort: saved, but off target.
    Amber,
    /// Infeasible: nothing saved.
    Red,
}

/// User-facing summary of a solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveReport {
    pub failed: bool,
    pub best_effort: bool,
    pub violations: Vec<String>,
    pub suggested_fixes: Vec<String>,
}

impl SolveReport {
    pub fn banner(&self) -> Banner {
        if self.failed {
            Banner::Red
        } else if self.best_effort {
            Banner::Amber
        } else {
            Banner::None
        }
    }
}

const FIX_INCREASE_MAX: &str = "Increase the max grams per item";
const FIX_DECREASE_MIN: &str = "Decrease the min grams per item or remove an item";
const FIX_UNLOCK: &str = "Unlock a locked item or reduce a fixed portion";
const FIX_ADD_ITEMS: &str = "Add more items to the day";
const FIX_PRODUCT_DATA: &str = "Fix the product data of skipped items";
const FIX_TARGETS: &str = "Fix the day's targets in the nutrition settings";

/// Minimum adjustable items needed to move calories and three macros
/// independently.
const ITEMS_TO_BALANCE_MACROS: usize = 4;

/// Turn a solve result into violations and suggestions.
pub fn describe(result: &SolveResult) -> SolveReport {
    let mut violations = deviation_lines(result);
    for diagnostic in &result.diagnostics {
        match diagnostic {
            Diagnostic::SkippedItem { item_id, reason } => {
                violations.push(format!("Item {} skipped: {}", item_id, reason));
            }
            Diagnostic::InvalidTarget { nutrient, value } => {
                violations.push(format!(
                    "{} target {} is invalid; solved as 0",
                    nutrient.label(),
                    value
                ));
            }
            _ => {}
        }
    }

    let suggested_fixes = if result.status == SolveStatus::Achieved {
        Vec::new()
    } else {
        suggestions(result)
    };

    SolveReport {
        failed: result.status == SolveStatus::Infeasible,
        best_effort: result.status == SolveStatus::BestEffort,
        violations,
        suggested_fixes,
    }
}

/// One line per nutrient outside tolerance, as a signed delta. Calories are
/// whole kcal, macros keep one decimal so small misses stay visible.
fn deviation_lines(result: &SolveResult) -> Vec<String> {
    let deviation = result.deviation();
    Nutrient::ALL
        .iter()
        .filter_map(|&nutrient| {
            let delta = deviation.get(nutrient);
            let outside = match nutrient {
                Nutrient::Calories => delta.abs() >= CALORIE_TOLERANCE_KCAL,
                _ => delta.abs() > MACRO_TOLERANCE_GRAMS + EPSILON,
            };
            let precision = match nutrient {
                Nutrient::Calories => 0,
                _ => 1,
            };
            outside.then(|| {
                format!("{}: {:+.*}{}", nutrient.label(), precision, delta, nutrient.unit())
            })
        })
        .collect()
}

fn suggestions(result: &SolveResult) -> Vec<String> {
    let mut fixes: Vec<&str> = Vec::new();
    let mut push = |fix: &'static str| {
        if !fixes.contains(&fix) {
            fixes.push(fix);
        }
    };

    for diagnostic in &result.diagnostics {
        match diagnostic {
            Diagnostic::ClampedToMax { .. } => push(FIX_INCREASE_MAX),
            Diagnostic::ClampedToMin { .. } => push(FIX_DECREASE_MIN),
            Diagnostic::ConstantsExceedTarget { .. } => push(FIX_UNLOCK),
            Diagnostic::NoAdjustableItems => push(FIX_ADD_ITEMS),
            Diagnostic::SkippedItem { .. } => push(FIX_PRODUCT_DATA),
            Diagnostic::InvalidTarget { .. } => push(FIX_TARGETS),
        }
    }
    if result.adjustable_count > 0 && result.adjustable_count < ITEMS_TO_BALANCE_MACROS {
        push(FIX_ADD_ITEMS);
    }

    fixes.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::Macros;

    fn result(status: SolveStatus, achieved: Macros, diagnostics: Vec<Diagnostic>) -> SolveResult {
        SolveResult {
            quantities: BTreeMap::new(),
            achieved,
            closest: None,
            targets: Macros::new(2000.0, 150.0, 200.0, 65.0),
            status,
            adjustable_count: 5,
            diagnostics,
        }
    }

    #[test]
    fn test_achieved_has_no_banner() {
        let report = describe(&result(
            SolveStatus::Achieved,
            Macros::new(2002.0, 150.5, 199.2, 65.0),
            Vec::new(),
        ));
        assert_eq!(report.banner(), Banner::None);
        assert!(report.violations.is_empty());
        assert!(report.suggested_fixes.is_empty());
    }

    #[test]
    fn test_signed_violations() {
        let report = describe(&result(
            SolveStatus::BestEffort,
            Macros::new(2030.0, 162.0, 190.0, 65.5),
            vec![Diagnostic::ClampedToMax {
                item_id: 3,
                product: "Rice".to_string(),
                grams: 500.0,
            }],
        ));
        assert_eq!(report.banner(), Banner::Amber);
        assert!(report.best_effort && !report.failed);
        assert_eq!(
            report.violations,
            vec!["Calories: +30 kcal", "Protein: +12.0g", "Carbs: -10.0g"]
        );
        assert_eq!(report.suggested_fixes, vec![FIX_INCREASE_MAX]);
    }

    #[test]
    fn test_small_macro_miss_keeps_its_decimal() {
        let report = describe(&result(
            SolveStatus::BestEffort,
            Macros::new(2000.0, 151.4, 198.6, 65.0),
            Vec::new(),
        ));
        assert_eq!(report.violations, vec!["Protein: +1.4g", "Carbs: -1.4g"]);
    }

    #[test]
    fn test_invalid_target_is_reported() {
        let report = describe(&result(
            SolveStatus::BestEffort,
            Macros::new(2000.0, 150.0, 200.0, 65.0),
            vec![Diagnostic::InvalidTarget {
                nutrient: Nutrient::Protein,
                value: -5.0,
            }],
        ));
        assert_eq!(report.violations, vec!["Protein target -5 is invalid; solved as 0"]);
        assert_eq!(report.suggested_fixes, vec![FIX_TARGETS]);
    }

    #[test]
    fn test_infeasible_suggestions_are_deduplicated() {
        let clamped = |item_id| Diagnostic::ClampedToMin {
            item_id,
            product: "Butter".to_string(),
            grams: 10.0,
        };
        let report = describe(&result(
            SolveStatus::Infeasible,
            Macros::new(2600.0, 150.0, 200.0, 65.0),
            vec![
                Diagnostic::ConstantsExceedTarget {
                    nutrient: Nutrient::Calories,
                    excess: 400.0,
                },
                clamped(1),
                clamped(2),
            ],
        ));
        assert_eq!(report.banner(), Banner::Red);
        assert_eq!(report.suggested_fixes, vec![FIX_UNLOCK, FIX_DECREASE_MIN]);
    }

    #[test]
    fn test_few_items_suggests_adding_more() {
        let mut r = result(
            SolveStatus::BestEffort,
            Macros::new(2000.0, 130.0, 200.0, 65.0),
            Vec::new(),
        );
        r.adjustable_count = 1;
        assert_eq!(describe(&r).suggested_fixes, vec![FIX_ADD_ITEMS]);
    }

    #[test]
    fn test_skipped_items_are_always_reported() {
        let report = describe(&result(
            SolveStatus::Achieved,
            Macros::new(2000.0, 150.0, 200.0, 65.0),
            vec![Diagnostic::SkippedItem {
                item_id: 9,
                reason: "min portion 300g exceeds max portion 200g".to_string(),
            }],
        ));
        assert_eq!(
            report.violations,
            vec!["Item 9 skipped: min portion 300g exceeds max portion 200g"]
        );
        assert!(report.suggested_fixes.is_empty());
    }
}
