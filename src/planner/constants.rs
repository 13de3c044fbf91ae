// ─────────────────────────────────────────────────────────────────────────────
// Tolerances (must match what the day view shows as "on target")
// ─────────────────────────────────────────────────────────────────────────────

/// A day is on target only when calories are strictly closer than this.
pub const CALORIE_TOLERANCE_KCAL: f64 = 5.0;

/// Maximum protein/carbs/fat deviation for an on-target day.
pub const MACRO_TOLERANCE_GRAMS: f64 = 1.0;

// ─────────────────────────────────────────────────────────────────────────────
// Portioning defaults (used when user settings omit a field)
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_MIN_GRAMS: f64 = 10.0;
pub const DEFAULT_MAX_GRAMS: f64 = 500.0;
pub const DEFAULT_ROUNDING_GRAMS: f64 = 5.0;

/// Wider calorie band for best-effort results, in percent of the target.
pub const DEFAULT_TOLERANCE_PERCENT: f64 = 2.0;

// ─────────────────────────────────────────────────────────────────────────────
// Target defaults (manual mode reference line)
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_CALORIES: f64 = 2000.0;
pub const DEFAULT_PROTEIN: f64 = 150.0;
pub const DEFAULT_CARBS: f64 = 200.0;
pub const DEFAULT_FAT: f64 = 65.0;

// ─────────────────────────────────────────────────────────────────────────────
// Solver knobs
// ─────────────────────────────────────────────────────────────────────────────

/// Number of main meals sharing the day's calories.
pub const MAIN_MEAL_COUNT: f64 = 3.0;

/// Single-step nudges allowed per adjustable item.
pub const NUDGE_STEPS_PER_ITEM: usize = 20;

/// Maximum proportional re-runs from the previous proposal.
pub const MAX_REFINEMENT_ROUNDS: usize = 16;

/// Weight of protein/carbs/fat deviation relative to calorie deviation.
pub const MACRO_DEVIATION_WEIGHT: f64 = 0.1;

/// A preview item whose maximum portion covers less than this share of the
/// slot's remaining calories is flagged as negligible.
pub const NEGLIGIBLE_CONTRIBUTION_RATIO: f64 = 0.05;

/// Float slack for bound and step comparisons.
pub const EPSILON: f64 = 1e-6;
