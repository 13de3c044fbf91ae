use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{
    DailyTargets, ItemId, Macros, MealPlanItem, MealType, Nutrient, PortioningSettings,
};
use crate::planner::constants::*;
use crate::planner::eligibility::{is_adjustable, PortionBounds};

/// Outcome class of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Calories within 5 kcal and every macro within 1 g.
    Achieved,
    /// Calories inside the wider band; saved as the closest reachable day.
    BestEffort,
    /// Outside the wider band; nothing may be saved.
    Infeasible,
}

/// Why a solve fell short, or what it had to work around.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Fixed, locked and ignored items alone exceed this target.
    ConstantsExceedTarget { nutrient: Nutrient, excess: f64 },
    /// Item held at its minimum while the day still wants less.
    ClampedToMin {
        item_id: ItemId,
        product: String,
        grams: f64,
    },
    /// Item held at its maximum while the day still wants more.
    ClampedToMax {
        item_id: ItemId,
        product: String,
        grams: f64,
    },
    /// Item left out of the solve because its data is unusable.
    SkippedItem { item_id: ItemId, reason: String },
    /// Nothing in the day can be resized.
    NoAdjustableItems,
    /// Target component that was negative or not a number; solved as zero.
    InvalidTarget { nutrient: Nutrient, value: f64 },
}

/// Result of allocating one day.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    /// New quantity per item. Equal to the input quantities when infeasible.
    pub quantities: BTreeMap<ItemId, f64>,
    /// Totals of `quantities`.
    pub achieved: Macros,
    /// Totals of the rejected allocation when infeasible.
    pub closest: Option<Macros>,
    /// Targets the day was solved against, after invalid components were zeroed.
    pub targets: DailyTargets,
    pub status: SolveStatus,
    pub adjustable_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl SolveResult {
    /// Signed `achieved - targets` per nutrient.
    pub fn deviation(&self) -> Macros {
        self.achieved - self.targets
    }

    /// Whether the caller may persist `quantities`.
    pub fn is_saveable(&self) -> bool {
        self.status != SolveStatus::Infeasible
    }
}

/// An adjustable item with its resolved density and bounds.
#[derive(Debug)]
struct Variable<'a> {
    item: &'a MealPlanItem,
    per_gram: Macros,
    bounds: PortionBounds,
}

impl Variable<'_> {
    fn calories_at(&self, grams: f64) -> f64 {
        self.item.product.contribution(grams).calories
    }
}

enum Role<'a> {
    Variable(Variable<'a>),
    Constant { grams: f64 },
    Skipped(String),
}

fn classify_item<'a>(item: &'a MealPlanItem, settings: &PortioningSettings) -> Role<'a> {
    if !item.quantity_grams.is_finite() || item.quantity_grams < 0.0 {
        return Role::Skipped(format!(
            "quantity {}g is negative or missing",
            item.quantity_grams
        ));
    }
    if let Some(reason) = item.product.validation_error() {
        return Role::Skipped(reason);
    }
    if !is_adjustable(item) {
        return Role::Constant {
            grams: item.effective_grams(),
        };
    }

    let bounds = PortionBounds::for_product(&item.product, settings);
    if let Some(reason) = bounds.validation_error() {
        return Role::Skipped(format!("{}: {}", item.product.name, reason));
    }
    Role::Variable(Variable {
        item,
        per_gram: item.product.per_gram(),
        bounds,
    })
}

/// Tolerance classification of a day's totals.
pub fn classify(
    achieved: &Macros,
    targets: &DailyTargets,
    settings: &PortioningSettings,
) -> SolveStatus {
    let d = achieved.abs_diff(targets);
    let calories_tight = d.calories < CALORIE_TOLERANCE_KCAL;
    let macros_tight = [d.protein, d.carbs, d.fat]
        .iter()
        .all(|&g| g <= MACRO_TOLERANCE_GRAMS + EPSILON);

    if calories_tight && macros_tight {
        SolveStatus::Achieved
    } else if d.calories <= settings.calorie_band(targets.calories) + EPSILON {
        SolveStatus::BestEffort
    } else {
        SolveStatus::Infeasible
    }
}

/// Current nutrition of a day, leaving out items with unusable data.
pub fn day_totals(items: &[MealPlanItem]) -> Macros {
    items
        .iter()
        .filter(|item| {
            item.quantity_grams.is_finite()
                && item.quantity_grams >= 0.0
                && item.product.is_valid()
        })
        .map(MealPlanItem::contribution)
        .sum()
}

/// Size every adjustable item of a day so its totals land near `targets`.
///
/// Fixed, locked and macro-ignored items are constants. Residual calories
/// are split evenly over the main meals that have adjustable items (snacks
/// keep what they currently provide), spread inside each meal in proportion
/// to current quantities, rounded to the portion step, and finally nudged
/// one step at a time on the largest item while that narrows the calorie
/// gap. The nudge is a bounded local search, not an exact optimiser.
///
/// Returns an error only for malformed settings. Bad target components are
/// solved as zero and items with bad data are skipped; both are reported in
/// the diagnostics.
pub fn solve(
    items: &[MealPlanItem],
    targets: &DailyTargets,
    settings: &PortioningSettings,
) -> Result<SolveResult> {
    settings.validate()?;

    let mut diagnostics = Vec::new();
    let targets = &sanitize_targets(targets, &mut diagnostics);
    let mut variables = Vec::new();
    let mut constant_grams: BTreeMap<ItemId, f64> = BTreeMap::new();
    let mut constants_total = Macros::zero();

    for item in items {
        match classify_item(item, settings) {
            Role::Variable(variable) => variables.push(variable),
            Role::Constant { grams } => {
                constants_total = constants_total + item.product.contribution(grams);
                constant_grams.insert(item.id, grams);
            }
            Role::Skipped(reason) => {
                warn!(item_id = item.id, %reason, "skipping item");
                diagnostics.push(Diagnostic::SkippedItem {
                    item_id: item.id,
                    reason,
                });
            }
        }
    }

    debug!(
        variables = variables.len(),
        constants = constant_grams.len(),
        target_calories = targets.calories,
        "solving day"
    );

    let residual = residual_target(targets, &constants_total, &mut diagnostics);
    let input: BTreeMap<ItemId, f64> = items
        .iter()
        .map(|item| (item.id, item.quantity_grams))
        .collect();

    if variables.is_empty() {
        diagnostics.push(Diagnostic::NoAdjustableItems);
        let status = match classify(&constants_total, targets, settings) {
            SolveStatus::Achieved => SolveStatus::Achieved,
            _ => SolveStatus::Infeasible,
        };
        let mut quantities = input;
        if status == SolveStatus::Achieved {
            quantities.extend(constant_grams);
        }
        return Ok(SolveResult {
            quantities,
            achieved: constants_total,
            closest: None,
            targets: *targets,
            status,
            adjustable_count: 0,
            diagnostics,
        });
    }

    let grams = optimise(&variables, &constants_total, targets, &residual);
    let proposed = constants_total + totals(&variables, &grams);
    clamp_diagnostics(&variables, &grams, &residual, &proposed, targets, &mut diagnostics);

    let status = classify(&proposed, targets, settings);
    debug!(
        ?status,
        proposed_calories = proposed.calories,
        "solve finished"
    );

    let mut quantities = input;
    let (achieved, closest) = if status == SolveStatus::Infeasible {
        let start: Vec<f64> = variables.iter().map(|v| v.item.quantity_grams).collect();
        (constants_total + totals(&variables, &start), Some(proposed))
    } else {
        quantities.extend(constant_grams);
        quantities.extend(variables.iter().zip(&grams).map(|(v, g)| (v.item.id, *g)));
        (proposed, None)
    };

    Ok(SolveResult {
        quantities,
        achieved,
        closest,
        targets: *targets,
        status,
        adjustable_count: variables.len(),
        diagnostics,
    })
}

/// Zero every negative or non-finite target component.
fn sanitize_targets(targets: &DailyTargets, diagnostics: &mut Vec<Diagnostic>) -> DailyTargets {
    let mut clean = *targets;
    for nutrient in Nutrient::ALL {
        let value = targets.get(nutrient);
        if !value.is_finite() || value < 0.0 {
            warn!(%nutrient, value, "invalid target solved as zero");
            diagnostics.push(Diagnostic::InvalidTarget { nutrient, value });
            clean.set(nutrient, 0.0);
        }
    }
    clean
}

/// `targets - constants`, clamped at zero with a diagnostic per overshoot.
fn residual_target(
    targets: &DailyTargets,
    constants: &Macros,
    diagnostics: &mut Vec<Diagnostic>,
) -> Macros {
    let mut residual = *targets - *constants;
    for nutrient in Nutrient::ALL {
        let value = residual.get(nutrient);
        if value < -EPSILON {
            diagnostics.push(Diagnostic::ConstantsExceedTarget {
                nutrient,
                excess: -value,
            });
        }
        if value < 0.0 {
            residual.set(nutrient, 0.0);
        }
    }
    residual
}

fn totals(variables: &[Variable], grams: &[f64]) -> Macros {
    variables
        .iter()
        .zip(grams)
        .map(|(v, g)| v.item.product.contribution(*g))
        .sum()
}

/// Calorie deviation plus a light penalty for protein/carbs/fat deviation.
fn deviation_score(
    variables: &[Variable],
    grams: &[f64],
    constants: &Macros,
    targets: &DailyTargets,
) -> f64 {
    let d = (*constants + totals(variables, grams)).abs_diff(targets);
    d.calories + MACRO_DEVIATION_WEIGHT * (d.protein + d.carbs + d.fat)
}

/// Run the proportional pass until it stops improving.
///
/// An input that is already a valid allocation is kept unless a strictly
/// better one exists, so solving an unchanged day twice is a no-op.
fn optimise(
    variables: &[Variable],
    constants: &Macros,
    targets: &DailyTargets,
    residual: &Macros,
) -> Vec<f64> {
    let start: Vec<f64> = variables.iter().map(|v| v.item.quantity_grams).collect();
    let start_valid = variables
        .iter()
        .zip(&start)
        .all(|(v, g)| v.bounds.accepts(*g));

    let mut best = refine(variables, &start, constants, targets.calories, residual.calories);
    let mut best_score = deviation_score(variables, &best, constants, targets);

    if start_valid {
        let start_score = deviation_score(variables, &start, constants, targets);
        if start_score <= best_score + EPSILON {
            best = start;
            best_score = start_score;
        }
    }

    for round in 0..MAX_REFINEMENT_ROUNDS {
        let next = refine(variables, &best, constants, targets.calories, residual.calories);
        let next_score = deviation_score(variables, &next, constants, targets);
        if next_score < best_score - EPSILON {
            debug!(round, score = next_score, "refinement improved allocation");
            best = next;
            best_score = next_score;
        } else {
            break;
        }
    }

    best
}

/// One proportional pass: split, round, nudge.
fn refine(
    variables: &[Variable],
    start: &[f64],
    constants: &Macros,
    target_calories: f64,
    residual_calories: f64,
) -> Vec<f64> {
    let raw = proportional_split(variables, start, residual_calories);
    let mut grams: Vec<f64> = variables
        .iter()
        .zip(&raw)
        .map(|(v, g)| v.bounds.snap(*g))
        .collect();
    nudge(variables, &mut grams, constants, target_calories);
    grams
}

/// Raw grams per variable before rounding.
///
/// Main meals start from equal shares. A meal whose items all end up pinned
/// at a bound keeps what it actually holds, and the difference is re-split
/// over the meals that still have room. Calories no main meal can take go
/// to the snacks.
fn proportional_split(variables: &[Variable], start: &[f64], residual_calories: f64) -> Vec<f64> {
    let mut raw = vec![0.0; variables.len()];
    let budgets = slot_budgets(variables, start, residual_calories);

    let mut open: Vec<MealType> = budgets.keys().copied().filter(|m| m.is_main()).collect();
    let mut main_remaining: f64 = open.iter().map(|m| budgets[m]).sum();

    for _ in 0..=open.len() {
        if open.is_empty() {
            break;
        }
        let share = main_remaining.max(0.0) / open.len() as f64;

        let mut pinned = Vec::new();
        for &meal in &open {
            let members = slot_members(variables, meal);
            fill_slot(variables, start, &members, share, &mut raw);
            let held = slot_calories(variables, &members, &raw);
            if (held - share).abs() > EPSILON {
                pinned.push((meal, held));
            }
        }
        if pinned.is_empty() {
            break;
        }

        for (meal, held) in pinned {
            debug!(%meal, held, share, "meal pinned at its bounds");
            main_remaining -= held;
            open.retain(|m| *m != meal);
        }
    }

    if let Some(&snack_budget) = budgets.get(&MealType::Snack) {
        let unplaced = if open.is_empty() {
            main_remaining.max(0.0)
        } else {
            0.0
        };
        let members = slot_members(variables, MealType::Snack);
        fill_slot(variables, start, &members, snack_budget + unplaced, &mut raw);
    }
    raw
}

fn slot_members(variables: &[Variable], meal: MealType) -> Vec<usize> {
    (0..variables.len())
        .filter(|&i| variables[i].item.meal_type == meal)
        .collect()
}

fn slot_calories(variables: &[Variable], members: &[usize], raw: &[f64]) -> f64 {
    members
        .iter()
        .map(|&i| raw[i] * variables[i].per_gram.calories)
        .sum()
}

/// Calorie budget per meal slot that has adjustable items.
///
/// Main meals share evenly. Snacks are additive: they keep the calories
/// their current quantities provide, unless they are all there is.
fn slot_budgets(
    variables: &[Variable],
    start: &[f64],
    residual_calories: f64,
) -> BTreeMap<MealType, f64> {
    let main_slots: BTreeSet<MealType> = variables
        .iter()
        .map(|v| v.item.meal_type)
        .filter(|meal| meal.is_main())
        .collect();
    let has_snacks = variables.iter().any(|v| !v.item.meal_type.is_main());

    let mut budgets = BTreeMap::new();
    if main_slots.is_empty() {
        budgets.insert(MealType::Snack, residual_calories);
        return budgets;
    }

    let mut remaining = residual_calories;
    if has_snacks {
        let snack_calories: f64 = variables
            .iter()
            .zip(start)
            .filter(|(v, _)| !v.item.meal_type.is_main())
            .map(|(v, g)| v.per_gram.calories * g.max(0.0))
            .sum();
        let snack_budget = snack_calories.min(residual_calories);
        budgets.insert(MealType::Snack, snack_budget);
        remaining -= snack_budget;
    }

    let share = remaining / main_slots.len() as f64;
    for meal in main_slots {
        budgets.insert(meal, share);
    }
    budgets
}

/// Spread `budget` calories over `members`, water-filling around bounds.
///
/// Items are weighted by their current grams, or get equal grams when the
/// slot has no quantities yet. Items pushed outside their bounds are pinned
/// there and the rest of the budget is re-split among the others.
fn fill_slot(
    variables: &[Variable],
    start: &[f64],
    members: &[usize],
    budget: f64,
    raw: &mut [f64],
) {
    let mut free: Vec<usize> = members.to_vec();
    let mut remaining = budget.max(0.0);

    for _ in 0..=members.len() {
        if free.is_empty() {
            break;
        }

        let weighted: f64 = free
            .iter()
            .map(|&i| start[i].max(0.0) * variables[i].per_gram.calories)
            .sum();
        let density: f64 = free.iter().map(|&i| variables[i].per_gram.calories).sum();

        for &i in &free {
            raw[i] = if weighted > EPSILON {
                start[i].max(0.0) * remaining / weighted
            } else if density > EPSILON {
                remaining / density
            } else {
                variables[i].bounds.min
            };
        }

        let (clamped, unclamped): (Vec<usize>, Vec<usize>) = free
            .iter()
            .partition(|&&i| !variables[i].bounds.contains(raw[i]));
        if clamped.is_empty() {
            break;
        }

        for &i in &clamped {
            let bounds = variables[i].bounds;
            raw[i] = raw[i].clamp(bounds.min, bounds.max);
            remaining -= raw[i] * variables[i].per_gram.calories;
        }
        remaining = remaining.max(0.0);
        free = unclamped;
    }
}

/// Close the rounding gap one step at a time.
///
/// Each pass moves the item with the most grams that can step toward the
/// target and strictly narrows the calorie gap. Equal grams: earliest item
/// in input order wins. Stops inside calorie tolerance, when no step helps,
/// or after `NUDGE_STEPS_PER_ITEM` passes per item.
fn nudge(variables: &[Variable], grams: &mut [f64], constants: &Macros, target_calories: f64) {
    let cap = variables.len() * NUDGE_STEPS_PER_ITEM;

    for _ in 0..cap {
        let total = constants.calories + totals(variables, grams).calories;
        let gap = target_calories - total;
        if gap.abs() < CALORIE_TOLERANCE_KCAL {
            break;
        }
        let direction = gap.signum();

        let mut pick: Option<(usize, f64)> = None;
        for (i, v) in variables.iter().enumerate() {
            let moved = grams[i] + direction * v.bounds.step;
            if !v.bounds.contains(moved) {
                continue;
            }
            let new_total = total - v.calories_at(grams[i]) + v.calories_at(moved);
            if (target_calories - new_total).abs() >= gap.abs() - EPSILON {
                continue;
            }
            match pick {
                Some((j, _)) if grams[j] >= grams[i] - EPSILON => {}
                _ => pick = Some((i, moved)),
            }
        }

        match pick {
            Some((i, moved)) => grams[i] = moved,
            None => break,
        }
    }
}

fn clamp_diagnostics(
    variables: &[Variable],
    grams: &[f64],
    residual: &Macros,
    achieved: &Macros,
    targets: &DailyTargets,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let over = achieved.calories - targets.calories >= CALORIE_TOLERANCE_KCAL;
    let under = targets.calories - achieved.calories >= CALORIE_TOLERANCE_KCAL;

    for (v, &g) in variables.iter().zip(grams) {
        let min_overshoots = v.calories_at(v.bounds.min) > residual.calories + EPSILON;
        if v.bounds.at_min(g) && (over || min_overshoots) {
            diagnostics.push(Diagnostic::ClampedToMin {
                item_id: v.item.id,
                product: v.item.product.name.clone(),
                grams: g,
            });
        } else if v.bounds.at_max(g) && under {
            diagnostics.push(Diagnostic::ClampedToMax {
                item_id: v.item.id,
                product: v.item.product.name.clone(),
                grams: g,
            });
        }
    }
}
