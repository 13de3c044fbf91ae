use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// MealPortioner - sizes the portions of a planned day to hit its macro targets.
#[derive(Parser, Debug)]
#[command(name = "meal_portioner")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the plan state JSON file.
    #[arg(short, long, default_value = "plan_state.json", global = true)]
    pub file: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Solve one day's portions and save them if feasible.
    Solve {
        /// Day to solve (YYYY-MM-DD). Defaults to today.
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Also export the solved day to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Save without asking.
        #[arg(short, long)]
        yes: bool,
    },

    /// Solve every day of a week independently.
    GenerateAll {
        /// Any date in the week (YYYY-MM-DD). Defaults to this week.
        #[arg(short, long)]
        week_of: Option<NaiveDate>,

        /// Save without asking.
        #[arg(short, long)]
        yes: bool,
    },

    /// Add a product to a meal, seeding its quantity from a preview.
    Add {
        /// Product name (fuzzy matched).
        #[arg(short, long)]
        product: String,

        /// breakfast, lunch, dinner or snack.
        #[arg(short, long)]
        meal: Option<String>,

        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Explicit quantity instead of the preview estimate.
        #[arg(short, long)]
        grams: Option<f64>,
    },

    /// Estimate a portion for a product without changing the plan.
    Preview {
        #[arg(short, long)]
        product: String,

        #[arg(short, long)]
        meal: Option<String>,

        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Lock an item so solves leave its quantity alone.
    Lock {
        /// Item id as shown by `solve`.
        #[arg(short, long)]
        item: u64,

        /// Unlock instead.
        #[arg(long)]
        unlock: bool,

        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Remove an item from a day.
    Remove {
        #[arg(short, long)]
        item: u64,

        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Show the resolved targets for a day.
    Targets {
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Set a zig-zag calorie override for a week.
    ZigZag {
        /// Any date in the week (YYYY-MM-DD).
        #[arg(short, long)]
        week_of: NaiveDate,

        /// Average daily calories.
        #[arg(short, long)]
        calories: f64,

        /// Calories added on high days and removed on low days.
        #[arg(short, long)]
        swing: f64,
    },
}
