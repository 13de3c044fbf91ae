use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Macros;

/// Catalog identifier of a product.
pub type ProductId = u64;

/// Meal slot an item is planned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    /// Breakfast, lunch and dinner share the day evenly; snacks do not.
    pub fn is_main(self) -> bool {
        !matches!(self, MealType::Snack)
    }

    pub fn name(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" | "snacks" => Ok(MealType::Snack),
            other => Err(format!(
                "unknown meal type '{}' (expected breakfast, lunch, dinner or snack)",
                other
            )),
        }
    }
}

/// Whether a product's portion can be sized by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    #[default]
    Editable,
    Fixed,
}

/// A food reference from the catalog.
///
/// Nutrition is stored per 100 g. Portion bounds left as `None` fall back to
/// the portioning settings at solve time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,

    pub name: String,

    pub calories_per_100g: f64,

    pub protein_per_100g: f64,

    pub carbs_per_100g: f64,

    pub fat_per_100g: f64,

    #[serde(default)]
    pub product_type: ProductType,

    /// Portion size for `fixed` products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_portion_grams: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_portion_grams: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_portion_grams: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portion_step_grams: Option<f64>,

    /// Only tracked for the grocery list; never counts toward macros.
    #[serde(default)]
    pub ignore_macros: bool,

    /// Meals this product may be planned in. Empty means any meal.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meal_eligibility: Vec<MealType>,
}

impl Product {
    /// An editable product with no custom bounds.
    pub fn editable(
        id: ProductId,
        name: &str,
        calories: f64,
        protein: f64,
        carbs: f64,
        fat: f64,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            calories_per_100g: calories,
            protein_per_100g: protein,
            carbs_per_100g: carbs,
            fat_per_100g: fat,
            product_type: ProductType::Editable,
            fixed_portion_grams: None,
            min_portion_grams: None,
            max_portion_grams: None,
            portion_step_grams: None,
            ignore_macros: false,
            meal_eligibility: Vec::new(),
        }
    }

    /// Nutrition per 100 g as a single vector.
    pub fn per_100g(&self) -> Macros {
        Macros::new(
            self.calories_per_100g,
            self.protein_per_100g,
            self.carbs_per_100g,
            self.fat_per_100g,
        )
    }

    /// Nutrient density per gram, zero for macro-ignored products.
    pub fn per_gram(&self) -> Macros {
        if self.ignore_macros {
            return Macros::zero();
        }
        self.per_100g().scale(0.01)
    }

    /// Nutrition contributed by `grams` of this product.
    pub fn contribution(&self, grams: f64) -> Macros {
        if self.ignore_macros {
            return Macros::zero();
        }
        let per_100g = self.per_100g();
        Macros::new(
            per_100g.calories * grams / 100.0,
            per_100g.protein * grams / 100.0,
            per_100g.carbs * grams / 100.0,
            per_100g.fat * grams / 100.0,
        )
    }

    pub fn is_fixed(&self) -> bool {
        self.product_type == ProductType::Fixed
    }

    /// Basic validation: finite non-negative densities and a usable fixed portion.
    pub fn is_valid(&self) -> bool {
        self.validation_error().is_none()
    }

    /// Describe the first data problem found, if any.
    pub fn validation_error(&self) -> Option<String> {
        if !self.per_100g().is_valid() {
            return Some(format!("{} has negative or missing nutrition values", self.name));
        }
        if self.is_fixed() {
            match self.fixed_portion_grams {
                Some(g) if g.is_finite() && g >= 0.0 => {}
                _ => return Some(format!("{} is fixed but has no valid fixed portion", self.name)),
            }
        }
        None
    }

    /// Canonical key for name lookups (lowercase name).
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}
