mod nutrition;
mod plan;
mod product;
mod settings;

pub use nutrition::{DailyTargets, Macros, Nutrient};
pub use plan::{ItemId, MealPlanItem, PlanEntry};
pub use product::{MealType, Product, ProductId, ProductType};
pub use settings::{
    week_start, DayOverride, NutritionSettings, PlanningMode, PortioningSettings, TargetValues,
    WeeklyOverride,
};
