use serde::{Deserialize, Serialize};

use crate::models::{Macros, MealType, Product, ProductId};

/// Identifier of one line in a day plan.
pub type ItemId = u64;

/// A stored line of a day plan, referencing the catalog by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub id: ItemId,
    pub product_id: ProductId,
    #[serde(default)]
    pub quantity_grams: f64,
    #[serde(default)]
    pub is_locked: bool,
    pub meal_type: MealType,
}

/// One line in a day/meal slot with a snapshot of its product.
///
/// This is what the solver consumes: the product is embedded so a solve
/// never has to reach back into the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct MealPlanItem {
    pub id: ItemId,
    pub product: Product,
    pub quantity_grams: f64,
    pub is_locked: bool,
    pub meal_type: MealType,
}

impl MealPlanItem {
    pub fn new(id: ItemId, product: Product, quantity_grams: f64, meal_type: MealType) -> Self {
        Self {
            id,
            product,
            quantity_grams,
            is_locked: false,
            meal_type,
        }
    }

    /// Builder-style lock flag.
    pub fn locked(mut self) -> Self {
        self.is_locked = true;
        self
    }

    /// Grams that count toward totals: the fixed portion for fixed products.
    pub fn effective_grams(&self) -> f64 {
        if self.product.is_fixed() {
            self.product
                .fixed_portion_grams
                .unwrap_or(self.quantity_grams)
        } else {
            self.quantity_grams
        }
    }

    /// Nutrition this line currently contributes.
    pub fn contribution(&self) -> Macros {
        self.product.contribution(self.effective_grams())
    }

    pub fn to_entry(&self) -> PlanEntry {
        PlanEntry {
            id: self.id,
            product_id: self.product.id,
            quantity_grams: self.quantity_grams,
            is_locked: self.is_locked,
            meal_type: self.meal_type,
        }
    }
}
