pub mod export;
pub mod prompts;
pub mod render;

pub use export::write_solution_csv;
pub use prompts::{fuzzy_candidates, prompt_meal_type, prompt_yes_no, select_product};
pub use render::{display_preview, display_solve, display_targets};
