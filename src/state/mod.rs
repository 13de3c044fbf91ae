mod manager;
mod persistence;

pub use manager::PlanStateManager;
pub use persistence::{load_state, save_state, PlanState};
