use chrono::{Duration, NaiveDate};

use meal_portioner_rs::models::{
    MealType, NutritionSettings, PlanningMode, Product, TargetValues, WeeklyOverride,
};
use meal_portioner_rs::planner::{describe, SolveResult, SolveStatus};
use meal_portioner_rs::state::{load_state, save_state, PlanState, PlanStateManager};

fn sample_state() -> PlanState {
    let mut oats = Product::editable(1, "Oats", 389.0, 16.9, 66.3, 6.9);
    oats.meal_eligibility = vec![MealType::Breakfast];

    PlanState {
        products: vec![
            oats,
            Product::editable(2, "Chicken Breast", 165.0, 31.0, 0.0, 3.6),
            Product::editable(3, "Rice", 130.0, 2.7, 28.0, 0.3),
            Product::editable(4, "Greek Yogurt", 59.0, 10.0, 3.6, 0.4),
        ],
        nutrition: NutritionSettings {
            mode: PlanningMode::TargetBased,
            weekday: TargetValues::new(2000.0, 150.0, 200.0, 65.0),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 12).unwrap()
}

#[test]
fn test_plan_solve_save_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan_state.json");
    save_state(&path, &sample_state()).unwrap();

    let mut manager = PlanStateManager::new(load_state(&path).unwrap());
    let day = monday();
    manager.add_item(day, 1, MealType::Breakfast, None).unwrap();
    manager.add_item(day, 4, MealType::Breakfast, Some(150.0)).unwrap();
    manager.add_item(day, 2, MealType::Lunch, None).unwrap();
    manager.add_item(day, 3, MealType::Lunch, None).unwrap();
    manager.add_item(day, 2, MealType::Dinner, None).unwrap();
    manager.add_item(day, 3, MealType::Dinner, None).unwrap();

    let result = manager.solve_day(day).unwrap();
    assert_ne!(result.status, SolveStatus::Infeasible);
    assert!((result.achieved.calories - 2000.0).abs() <= 40.0);

    let report = describe(&result);
    assert!(!report.failed);

    manager.apply_solution(day, &result).unwrap();
    save_state(&path, &manager.to_state()).unwrap();

    let reloaded = PlanStateManager::new(load_state(&path).unwrap());
    let items = reloaded.day_items(day).unwrap();
    assert_eq!(items.len(), 6);
    for item in &items {
        assert_eq!(item.quantity_grams, result.quantities[&item.id]);
    }

    // Solving the saved day again changes nothing
    let again = reloaded.solve_day(day).unwrap();
    assert_eq!(again.quantities, result.quantities);
}

#[test]
fn test_generate_all_solves_each_day_independently() {
    let mut state = sample_state();
    state.nutrition.weekday = TargetValues::new(1200.0, 100.0, 120.0, 30.0);
    let mut manager = PlanStateManager::new(state);
    let dates: Vec<NaiveDate> = (0..7).map(|i| monday() + Duration::days(i)).collect();
    for &date in &dates[..3] {
        manager.add_item(date, 2, MealType::Lunch, Some(0.0)).unwrap();
        manager.add_item(date, 3, MealType::Dinner, Some(0.0)).unwrap();
    }

    let solved = |dates: &[NaiveDate]| -> Vec<(NaiveDate, SolveResult)> {
        manager
            .generate_all(dates)
            .into_iter()
            .map(|(date, result)| (date, result.unwrap()))
            .collect()
    };
    let forward = solved(&dates);
    let mut reversed_dates = dates.clone();
    reversed_dates.reverse();
    let mut backward = solved(&reversed_dates);
    backward.reverse();
    assert_eq!(forward, backward);

    // Planned days are solved, empty days are infeasible
    assert_ne!(forward[0].1.status, SolveStatus::Infeasible);
    assert_eq!(forward[6].1.status, SolveStatus::Infeasible);
}

#[test]
fn test_zig_zag_week_drives_targets() {
    let mut manager = PlanStateManager::new(sample_state());
    manager.add_weekly_override(WeeklyOverride::zig_zag(monday(), 2000.0, 250.0));

    let calories: Vec<f64> = (0..7)
        .map(|i| manager.targets_for(monday() + Duration::days(i)).calories)
        .collect();
    assert_eq!(
        calories,
        vec![2250.0, 1750.0, 2250.0, 1750.0, 2250.0, 1750.0, 2000.0]
    );
    assert_eq!(calories.iter().sum::<f64>(), 14000.0);

    // Protein still comes from the weekday targets
    assert_eq!(manager.targets_for(monday()).protein, 150.0);
}
