use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{PortionError, Result};
use crate::planner::constants::{
    CALORIE_TOLERANCE_KCAL, DEFAULT_CALORIES, DEFAULT_CARBS, DEFAULT_FAT, DEFAULT_MAX_GRAMS,
    DEFAULT_MIN_GRAMS, DEFAULT_PROTEIN, DEFAULT_ROUNDING_GRAMS, DEFAULT_TOLERANCE_PERCENT,
};

/// Portion sizing defaults, overridable per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortioningSettings {
    #[serde(default = "default_min_grams")]
    pub min_grams: f64,
    #[serde(default = "default_max_grams")]
    pub max_grams: f64,
    /// Rounding granularity in grams.
    #[serde(default = "default_rounding")]
    pub rounding: f64,
    /// Wider calorie band, as a percentage of the calorie target.
    #[serde(default = "default_tolerance_percent")]
    pub tolerance_percent: f64,
}

impl Default for PortioningSettings {
    fn default() -> Self {
        Self {
            min_grams: DEFAULT_MIN_GRAMS,
            max_grams: DEFAULT_MAX_GRAMS,
            rounding: DEFAULT_ROUNDING_GRAMS,
            tolerance_percent: DEFAULT_TOLERANCE_PERCENT,
        }
    }
}

impl PortioningSettings {
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.min_grams,
            self.max_grams,
            self.rounding,
            self.tolerance_percent,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(PortionError::InvalidSettings(
                "portioning values must be finite and non-negative".to_string(),
            ));
        }
        if self.min_grams > self.max_grams {
            return Err(PortionError::InvalidSettings(format!(
                "min grams {} exceeds max grams {}",
                self.min_grams, self.max_grams
            )));
        }
        if self.rounding <= 0.0 {
            return Err(PortionError::InvalidSettings(
                "rounding must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Allowed calorie deviation for a best-effort result.
    ///
    /// Never narrower than the tight calorie tolerance.
    pub fn calorie_band(&self, target_calories: f64) -> f64 {
        (target_calories * self.tolerance_percent / 100.0).max(CALORIE_TOLERANCE_KCAL)
    }
}

fn default_min_grams() -> f64 {
    DEFAULT_MIN_GRAMS
}

fn default_max_grams() -> f64 {
    DEFAULT_MAX_GRAMS
}

fn default_rounding() -> f64 {
    DEFAULT_ROUNDING_GRAMS
}

fn default_tolerance_percent() -> f64 {
    DEFAULT_TOLERANCE_PERCENT
}

/// Whether per-day targets drive portion sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningMode {
    #[default]
    Manual,
    TargetBased,
}

/// Explicit target values; missing fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
}

impl TargetValues {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories: Some(calories),
            protein: Some(protein),
            carbs: Some(carbs),
            fat: Some(fat),
        }
    }

    /// Fill missing fields from `fallback`.
    pub fn or(&self, fallback: &TargetValues) -> TargetValues {
        TargetValues {
            calories: self.calories.or(fallback.calories),
            protein: self.protein.or(fallback.protein),
            carbs: self.carbs.or(fallback.carbs),
            fat: self.fat.or(fallback.fat),
        }
    }

    /// The documented defaults: 2000 kcal, 150 g protein, 200 g carbs, 65 g fat.
    pub fn documented_defaults() -> TargetValues {
        TargetValues::new(DEFAULT_CALORIES, DEFAULT_PROTEIN, DEFAULT_CARBS, DEFAULT_FAT)
    }
}

/// User nutrition settings consumed by the target resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionSettings {
    #[serde(default)]
    pub mode: PlanningMode,
    #[serde(default)]
    pub weekday: TargetValues,
    #[serde(default)]
    pub weekend_targets_enabled: bool,
    #[serde(default)]
    pub weekend: TargetValues,
}

/// Targets for a single day of a weekly override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOverride {
    pub calories: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
}

impl DayOverride {
    pub fn calories(calories: f64) -> Self {
        Self {
            calories,
            protein: None,
            carbs: None,
            fat: None,
        }
    }
}

/// A day-by-day calorie plan for one week, starting at `week_start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyOverride {
    pub week_start: NaiveDate,
    /// Entries in day order from `week_start`; shorter lists leave later days alone.
    #[serde(default)]
    pub days: Vec<DayOverride>,
}

impl WeeklyOverride {
    /// Alternate high and low days around `average`, with the last day at
    /// `average`, so the weekly total stays at seven times the average.
    pub fn zig_zag(week_start: NaiveDate, average: f64, swing: f64) -> Self {
        let days = (0..7)
            .map(|i| {
                let calories = match i {
                    6 => average,
                    i if i % 2 == 0 => average + swing,
                    _ => (average - swing).max(0.0),
                };
                DayOverride::calories(calories)
            })
            .collect();
        Self { week_start, days }
    }

    /// The entry for `date`, if this override covers it.
    pub fn day_for(&self, date: NaiveDate) -> Option<&DayOverride> {
        let offset = (date - self.week_start).num_days();
        if !(0..7).contains(&offset) {
            return None;
        }
        self.days.get(offset as usize)
    }

    /// The entry for the same weekday one week before `date`.
    pub fn carried_over_for(&self, date: NaiveDate) -> Option<&DayOverride> {
        self.day_for(date - Duration::days(7))
    }

    pub fn total_calories(&self) -> f64 {
        self.days.iter().map(|d| d.calories).sum()
    }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portioning_defaults_from_empty_json() {
        let settings: PortioningSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, PortioningSettings::default());
        assert_eq!(settings.min_grams, 10.0);
        assert_eq!(settings.max_grams, 500.0);
        assert_eq!(settings.rounding, 5.0);
        assert_eq!(settings.tolerance_percent, 2.0);
    }

    #[test]
    fn test_portioning_partial_override() {
        let settings: PortioningSettings =
            serde_json::from_str(r#"{"max_grams": 300, "rounding": 10}"#).unwrap();
        assert_eq!(settings.min_grams, 10.0);
        assert_eq!(settings.max_grams, 300.0);
        assert_eq!(settings.rounding, 10.0);
        assert_eq!(settings.tolerance_percent, 2.0);
    }

    #[test]
    fn test_portioning_validation() {
        assert!(PortioningSettings::default().validate().is_ok());

        let inverted = PortioningSettings {
            min_grams: 600.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let no_rounding = PortioningSettings {
            rounding: 0.0,
            ..Default::default()
        };
        assert!(no_rounding.validate().is_err());
    }

    #[test]
    fn test_calorie_band_floor() {
        let settings = PortioningSettings::default();
        assert_eq!(settings.calorie_band(2000.0), 40.0);
        assert_eq!(settings.calorie_band(100.0), CALORIE_TOLERANCE_KCAL);
    }

    #[test]
    fn test_zig_zag_keeps_weekly_total() {
        let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        let plan = WeeklyOverride::zig_zag(monday, 2000.0, 300.0);
        assert_eq!(plan.days.len(), 7);
        assert_eq!(plan.days[0].calories, 2300.0);
        assert_eq!(plan.days[1].calories, 1700.0);
        assert_eq!(plan.days[6].calories, 2000.0);
        assert_eq!(plan.total_calories(), 14000.0);
    }

    #[test]
    fn test_day_for_and_carry_over() {
        let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        let plan = WeeklyOverride::zig_zag(monday, 2000.0, 300.0);

        let wednesday = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        assert_eq!(plan.day_for(wednesday).unwrap().calories, 2300.0);
        assert!(plan.day_for(monday - Duration::days(1)).is_none());
        assert!(plan.day_for(monday + Duration::days(7)).is_none());

        let next_wednesday = wednesday + Duration::days(7);
        assert_eq!(plan.carried_over_for(next_wednesday).unwrap().calories, 2300.0);
    }

    #[test]
    fn test_week_start() {
        let friday = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(week_start(friday), NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());
        let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        assert_eq!(week_start(monday), monday);
    }
}
