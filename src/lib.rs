pub mod cli;
pub mod error;
pub mod interface;
pub mod models;
pub mod planner;
pub mod state;

pub use error::{PortionError, Result};
pub use models::{DailyTargets, MealPlanItem, PortioningSettings, Product};
pub use planner::{describe, preview_portion, resolve_targets, solve, SolveResult, SolveStatus};
