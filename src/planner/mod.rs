pub mod constants;
pub mod eligibility;
pub mod preview;
pub mod report;
pub mod solver;
pub mod targets;

pub use constants::*;
pub use eligibility::{is_adjustable, is_allowed_for_meal, PortionBounds};
pub use preview::{preview_portion, PortionPreview};
pub use report::{describe, Banner, SolveReport};
pub use solver::{classify, day_totals, solve, Diagnostic, SolveResult, SolveStatus};
pub use targets::{is_weekend, resolve_targets};
