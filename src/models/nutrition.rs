use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// One of the four tracked nutrition dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nutrient {
    Calories,
    Protein,
    Carbs,
    Fat,
}

impl Nutrient {
    pub const ALL: [Nutrient; 4] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Carbs,
        Nutrient::Fat,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Nutrient::Calories => "Calories",
            Nutrient::Protein => "Protein",
            Nutrient::Carbs => "Carbs",
            Nutrient::Fat => "Fat",
        }
    }

    /// Unit suffix used when printing a value of this nutrient.
    pub fn unit(self) -> &'static str {
        match self {
            Nutrient::Calories => " kcal",
            _ => "g",
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Calories (kcal) plus protein, carbs and fat (grams).
///
/// Used for per-gram densities, item contributions, day totals and targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Resolved per-day targets.
pub type DailyTargets = Macros;

impl Macros {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Carbs => self.carbs,
            Nutrient::Fat => self.fat,
        }
    }

    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        match nutrient {
            Nutrient::Calories => self.calories = value,
            Nutrient::Protein => self.protein = value,
            Nutrient::Carbs => self.carbs = value,
            Nutrient::Fat => self.fat = value,
        }
    }

    /// Multiply every component by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
        }
    }

    /// Absolute per-component distance to `other`.
    pub fn abs_diff(&self, other: &Macros) -> Self {
        Self {
            calories: (self.calories - other.calories).abs(),
            protein: (self.protein - other.protein).abs(),
            carbs: (self.carbs - other.carbs).abs(),
            fat: (self.fat - other.fat).abs(),
        }
    }

    /// True when every component is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        Nutrient::ALL
            .iter()
            .all(|&n| self.get(n).is_finite() && self.get(n) >= 0.0)
    }
}

impl Add for Macros {
    type Output = Macros;

    fn add(self, other: Macros) -> Macros {
        Macros {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
        }
    }
}

impl Sub for Macros {
    type Output = Macros;

    fn sub(self, other: Macros) -> Macros {
        Macros {
            calories: self.calories - other.calories,
            protein: self.protein - other.protein,
            carbs: self.carbs - other.carbs,
            fat: self.fat - other.fat,
        }
    }
}

impl std::iter::Sum for Macros {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Macros::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_and_sub() {
        let total: Macros = vec![
            Macros::new(100.0, 10.0, 5.0, 2.0),
            Macros::new(50.0, 1.0, 10.0, 0.5),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, Macros::new(150.0, 11.0, 15.0, 2.5));

        let residual = Macros::new(200.0, 20.0, 20.0, 5.0) - total;
        assert_eq!(residual, Macros::new(50.0, 9.0, 5.0, 2.5));
    }

    #[test]
    fn test_abs_diff() {
        let a = Macros::new(495.0, 93.0, 0.0, 13.5);
        let b = Macros::new(500.0, 94.0, 0.0, 12.0);
        assert_eq!(a.abs_diff(&b), Macros::new(5.0, 1.0, 0.0, 1.5));
    }

    #[test]
    fn test_is_valid() {
        assert!(Macros::new(1.0, 0.0, 0.0, 0.0).is_valid());
        assert!(!Macros::new(-1.0, 0.0, 0.0, 0.0).is_valid());
        assert!(!Macros::new(f64::NAN, 0.0, 0.0, 0.0).is_valid());
    }
}
