use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use crate::models::{
    DailyTargets, DayOverride, NutritionSettings, PlanningMode, TargetValues, WeeklyOverride,
};

/// Resolve the concrete targets for `date`.
///
/// Precedence, highest first:
/// 1. the week's override (calories always, macros when it sets them)
/// 2. last week's override carried over to the same weekday, when this week has none
/// 3. weekend targets on Saturday/Sunday, when enabled
/// 4. weekday targets
/// 5. the documented defaults
///
/// Manual mode skips 1–3 and only returns a reference line for display.
pub fn resolve_targets(
    date: NaiveDate,
    settings: &NutritionSettings,
    weekly_override: Option<&WeeklyOverride>,
    previous_week_override: Option<&WeeklyOverride>,
) -> DailyTargets {
    let defaults = TargetValues::documented_defaults();
    let weekday = settings.weekday.or(&defaults);

    if settings.mode == PlanningMode::Manual {
        return to_targets(&weekday);
    }

    let standing = if settings.weekend_targets_enabled && is_weekend(date) {
        settings.weekend.or(&weekday)
    } else {
        weekday
    };

    let day_override = weekly_override
        .and_then(|o| o.day_for(date))
        .or_else(|| {
            previous_week_override.and_then(|o| {
                let carried = o.carried_over_for(date);
                if carried.is_some() {
                    debug!(%date, "carrying over previous week's override");
                }
                carried
            })
        });

    match day_override {
        Some(day) => to_targets(&apply_override(&standing, day)),
        None => to_targets(&standing),
    }
}

fn apply_override(standing: &TargetValues, day: &DayOverride) -> TargetValues {
    TargetValues {
        calories: Some(day.calories),
        protein: day.protein.or(standing.protein),
        carbs: day.carbs.or(standing.carbs),
        fat: day.fat.or(standing.fat),
    }
}

fn to_targets(values: &TargetValues) -> DailyTargets {
    DailyTargets::new(
        values.calories.unwrap_or_default(),
        values.protein.unwrap_or_default(),
        values.carbs.unwrap_or_default(),
        values.fat.unwrap_or_default(),
    )
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
