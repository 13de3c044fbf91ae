use std::path::Path;

use chrono::{Duration, Local, NaiveDate};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use meal_portioner_rs::cli::{Cli, Command};
use meal_portioner_rs::error::Result;
use meal_portioner_rs::interface::{
    display_preview, display_solve, display_targets, prompt_meal_type, prompt_yes_no,
    select_product, write_solution_csv,
};
use meal_portioner_rs::models::{week_start, WeeklyOverride};
use meal_portioner_rs::planner::{describe, SolveStatus};
use meal_portioner_rs::state::{load_state, save_state, PlanStateManager};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let path = Path::new(&cli.file);

    match cli.command {
        Command::Solve { date, csv, yes } => cmd_solve(path, or_today(date), csv.as_deref(), yes),
        Command::GenerateAll { week_of, yes } => cmd_generate_all(path, or_today(week_of), yes),
        Command::Add {
            product,
            meal,
            date,
            grams,
        } => cmd_add(path, &product, meal.as_deref(), or_today(date), grams),
        Command::Preview {
            product,
            meal,
            date,
        } => cmd_preview(path, &product, meal.as_deref(), or_today(date)),
        Command::Lock { item, unlock, date } => cmd_lock(path, item, !unlock, or_today(date)),
        Command::Remove { item, date } => cmd_remove(path, item, or_today(date)),
        Command::Targets { date } => cmd_targets(path, or_today(date)),
        Command::ZigZag {
            week_of,
            calories,
            swing,
        } => cmd_zig_zag(path, week_of, calories, swing),
    }
}

fn or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

fn load_manager(path: &Path) -> Result<PlanStateManager> {
    Ok(PlanStateManager::new(load_state(path)?))
}

/// Solve a day, show the result, and save if feasible and confirmed.
fn cmd_solve(path: &Path, date: NaiveDate, csv: Option<&Path>, yes: bool) -> Result<()> {
    let mut manager = load_manager(path)?;
    let items = manager.day_items(date)?;
    let result = manager.solve_day(date)?;
    let report = describe(&result);

    display_solve(date, &items, &result, &report);

    if let Some(csv_path) = csv {
        write_solution_csv(&items, &result, csv_path)?;
        println!("Exported to {}", csv_path.display());
    }

    if result.status == SolveStatus::Infeasible {
        return Ok(());
    }

    if yes || prompt_yes_no("Save solved quantities?", true)? {
        let changed = manager.apply_solution(date, &result)?;
        save_state(path, &manager.to_state())?;
        println!("Saved {} changed items.", changed);
    }

    Ok(())
}

/// Solve Monday through Sunday of the week containing `week_of`.
fn cmd_generate_all(path: &Path, week_of: NaiveDate, yes: bool) -> Result<()> {
    let mut manager = load_manager(path)?;
    let monday = week_start(week_of);
    let dates: Vec<NaiveDate> = (0..7).map(|i| monday + Duration::days(i)).collect();

    let results = manager.generate_all(&dates);
    let mut saveable = Vec::new();
    for (date, result) in results {
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Error on {}: {}", date, e);
                continue;
            }
        };
        let items = manager.day_items(date)?;
        if items.is_empty() {
            continue;
        }
        let report = describe(&result);
        display_solve(date, &items, &result, &report);
        if result.is_saveable() {
            saveable.push((date, result));
        }
    }

    if saveable.is_empty() {
        println!("Nothing to save.");
        return Ok(());
    }

    let prompt = format!("Save {} solved days?", saveable.len());
    if yes || prompt_yes_no(&prompt, true)? {
        let mut changed = 0;
        for (date, result) in &saveable {
            changed += manager.apply_solution(*date, result)?;
        }
        save_state(path, &manager.to_state())?;
        println!("Saved {} changed items.", changed);
    }

    Ok(())
}

fn cmd_add(
    path: &Path,
    query: &str,
    meal: Option<&str>,
    date: NaiveDate,
    grams: Option<f64>,
) -> Result<()> {
    let mut manager = load_manager(path)?;
    let product_id = select_product(&manager.all_products(), query)?.id;
    let meal = prompt_meal_type(meal)?;

    let (item, warnings) = manager.add_item(date, product_id, meal, grams)?;
    println!(
        "Added {} ({:.0}g) to {} on {} as item {}",
        item.product.name, item.quantity_grams, meal, date, item.id
    );
    for warning in &warnings {
        println!("  ! {}", warning);
    }

    save_state(path, &manager.to_state())?;
    Ok(())
}

fn cmd_preview(path: &Path, query: &str, meal: Option<&str>, date: NaiveDate) -> Result<()> {
    let manager = load_manager(path)?;
    let product = select_product(&manager.all_products(), query)?.clone();
    let meal = prompt_meal_type(meal)?;

    let preview = manager.preview(date, &product, meal)?;
    display_preview(&product, meal, &preview);
    Ok(())
}

fn cmd_lock(path: &Path, item: u64, locked: bool, date: NaiveDate) -> Result<()> {
    let mut manager = load_manager(path)?;
    manager.set_locked(date, item, locked)?;
    save_state(path, &manager.to_state())?;
    println!(
        "Item {} on {} {}.",
        item,
        date,
        if locked { "locked" } else { "unlocked" }
    );
    Ok(())
}

fn cmd_remove(path: &Path, item: u64, date: NaiveDate) -> Result<()> {
    let mut manager = load_manager(path)?;
    manager.remove_item(date, item)?;
    save_state(path, &manager.to_state())?;
    println!("Removed item {} from {}.", item, date);
    Ok(())
}

fn cmd_targets(path: &Path, date: NaiveDate) -> Result<()> {
    let manager = load_manager(path)?;
    display_targets(date, &manager.targets_for(date));
    Ok(())
}

fn cmd_zig_zag(path: &Path, week_of: NaiveDate, calories: f64, swing: f64) -> Result<()> {
    let mut manager = load_manager(path)?;
    let weekly = WeeklyOverride::zig_zag(week_start(week_of), calories, swing);

    for (i, day) in weekly.days.iter().enumerate() {
        let date = weekly.week_start + Duration::days(i as i64);
        println!("{} {}: {:.0} kcal", date, date.format("%a"), day.calories);
    }
    println!("Weekly total: {:.0} kcal", weekly.total_calories());

    manager.add_weekly_override(weekly);
    save_state(path, &manager.to_state())?;
    Ok(())
}
