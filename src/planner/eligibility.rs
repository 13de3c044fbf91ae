use crate::models::{MealPlanItem, MealType, PortioningSettings, Product};
use crate::planner::constants::EPSILON;

/// Whether `product` may be planned in `meal`.
pub fn is_allowed_for_meal(product: &Product, meal: MealType) -> bool {
    product.meal_eligibility.is_empty() || product.meal_eligibility.contains(&meal)
}

/// Whether the solver may change this item's quantity.
pub fn is_adjustable(item: &MealPlanItem) -> bool {
    !(item.is_locked || item.product.is_fixed() || item.product.ignore_macros)
}

/// Effective portion bounds of an adjustable product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortionBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl PortionBounds {
    /// Product bounds where set, portioning settings otherwise.
    pub fn for_product(product: &Product, settings: &PortioningSettings) -> Self {
        Self {
            min: product.min_portion_grams.unwrap_or(settings.min_grams),
            max: product.max_portion_grams.unwrap_or(settings.max_grams),
            step: product.portion_step_grams.unwrap_or(settings.rounding),
        }
    }

    /// Describe why these bounds cannot hold any portion, if they can't.
    pub fn validation_error(&self) -> Option<String> {
        if !(self.min.is_finite() && self.max.is_finite() && self.step.is_finite()) {
            return Some("portion bounds are not finite".to_string());
        }
        if self.min < 0.0 {
            return Some(format!("min portion {}g is negative", self.min));
        }
        if self.min > self.max {
            return Some(format!(
                "min portion {}g exceeds max portion {}g",
                self.min, self.max
            ));
        }
        if self.step <= 0.0 {
            return Some(format!("portion step {}g must be positive", self.step));
        }
        if self.first_step_at_or_above(self.min) > self.max + EPSILON {
            return Some(format!(
                "no multiple of {}g fits between {}g and {}g",
                self.step, self.min, self.max
            ));
        }
        None
    }

    fn first_step_at_or_above(&self, grams: f64) -> f64 {
        (grams / self.step - EPSILON).ceil() * self.step
    }

    pub fn contains(&self, grams: f64) -> bool {
        grams >= self.min - EPSILON && grams <= self.max + EPSILON
    }

    pub fn is_on_step(&self, grams: f64) -> bool {
        ((grams / self.step).round() * self.step - grams).abs() < EPSILON
    }

    /// True when `grams` is already a valid solved portion.
    pub fn accepts(&self, grams: f64) -> bool {
        grams.is_finite() && self.contains(grams) && self.is_on_step(grams)
    }

    /// Clamp to the bounds, then round to the nearest step multiple that
    /// still lies inside them.
    pub fn snap(&self, grams: f64) -> f64 {
        let clamped = if grams.is_finite() {
            grams.clamp(self.min, self.max)
        } else {
            self.min
        };
        let mut snapped = (clamped / self.step).round() * self.step;
        if snapped < self.min - EPSILON {
            snapped += self.step;
        }
        if snapped > self.max + EPSILON {
            snapped -= self.step;
        }
        snapped
    }

    /// True when `grams` sits on the lower bound.
    pub fn at_min(&self, grams: f64) -> bool {
        grams - self.step < self.min - EPSILON
    }

    /// True when `grams` sits on the upper bound.
    pub fn at_max(&self, grams: f64) -> bool {
        grams + self.step > self.max + EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductType;

    fn oats() -> Product {
        Product::editable(1, "Oats", 389.0, 16.9, 66.3, 6.9)
    }

    #[test]
    fn test_meal_eligibility() {
        let mut product = oats();
        assert!(is_allowed_for_meal(&product, MealType::Dinner));

        product.meal_eligibility = vec![MealType::Breakfast, MealType::Snack];
        assert!(is_allowed_for_meal(&product, MealType::Breakfast));
        assert!(!is_allowed_for_meal(&product, MealType::Dinner));
    }

    #[test]
    fn test_is_adjustable() {
        let item = MealPlanItem::new(1, oats(), 50.0, MealType::Breakfast);
        assert!(is_adjustable(&item));
        assert!(!is_adjustable(&item.clone().locked()));

        let mut fixed = item.clone();
        fixed.product.product_type = ProductType::Fixed;
        fixed.product.fixed_portion_grams = Some(40.0);
        assert!(!is_adjustable(&fixed));

        let mut ignored = item;
        ignored.product.ignore_macros = true;
        assert!(!is_adjustable(&ignored));
    }

    #[test]
    fn test_bounds_fall_back_to_settings() {
        let settings = PortioningSettings::default();
        let mut product = oats();
        let bounds = PortionBounds::for_product(&product, &settings);
        assert_eq!(bounds, PortionBounds { min: 10.0, max: 500.0, step: 5.0 });

        product.max_portion_grams = Some(120.0);
        product.portion_step_grams = Some(10.0);
        let bounds = PortionBounds::for_product(&product, &settings);
        assert_eq!(bounds, PortionBounds { min: 10.0, max: 120.0, step: 10.0 });
    }

    #[test]
    fn test_snap() {
        let bounds = PortionBounds { min: 10.0, max: 500.0, step: 5.0 };
        assert_eq!(bounds.snap(303.03), 305.0);
        assert_eq!(bounds.snap(302.4), 300.0);
        assert_eq!(bounds.snap(2.0), 10.0);
        assert_eq!(bounds.snap(900.0), 500.0);

        // Bounds that are not step multiples stay inside after rounding
        let odd = PortionBounds { min: 12.0, max: 48.0, step: 5.0 };
        assert_eq!(odd.snap(12.0), 15.0);
        assert_eq!(odd.snap(48.0), 45.0);
    }

    #[test]
    fn test_bounds_validation() {
        assert!(PortionBounds { min: 10.0, max: 500.0, step: 5.0 }
            .validation_error()
            .is_none());
        assert!(PortionBounds { min: 600.0, max: 500.0, step: 5.0 }
            .validation_error()
            .is_some());
        assert!(PortionBounds { min: 11.0, max: 14.0, step: 5.0 }
            .validation_error()
            .is_some());
        assert!(PortionBounds { min: 10.0, max: 10.0, step: 5.0 }
            .validation_error()
            .is_none());
    }

    #[test]
    fn test_accepts() {
        let bounds = PortionBounds { min: 10.0, max: 500.0, step: 5.0 };
        assert!(bounds.accepts(305.0));
        assert!(!bounds.accepts(303.0));
        assert!(!bounds.accepts(0.0));
        assert!(!bounds.accepts(505.0));
    }
}
