//! Unit tests for objective evaluation, unlocks and level loading.

use crate::errors::ConfigurationError;

use super::*;

fn money_happiness_level(id: u32) -> GameLevel {
    GameLevel {
        id: LevelId(id),
        name: format!("L{id}"),
        objectives: vec![
            LevelObjective::new(ObjectiveKind::Money, 500.0),
            LevelObjective::new(ObjectiveKind::Happiness, 70.0),
        ],
        passenger_frequency_interval_ms: 5_000,
        max_active_passengers: 5,
        train_capacity: 4,
        unlocked: false,
        completed: false,
        time_limit_s: None,
    }
}

fn metrics(money: f64, happiness: f32) -> LiveMetrics {
    LiveMetrics {
        money,
        delivered_passengers: 0,
        happiness,
        elapsed_s: 10.0,
    }
}

#[test]
fn test_scenario_e_objectives_complete_and_unlock_next() {
    let mut book = LevelBook::new(vec![money_happiness_level(1), money_happiness_level(2)])
        .expect("valid levels");

    let first = book
        .apply_metrics(LevelId(1), &metrics(500.0, 69.0))
        .expect("known level");
    assert_eq!(first, LevelEvaluation::InProgress);
    assert!(!book.level(LevelId(1)).unwrap().completed);
    assert!(!book.level(LevelId(2)).unwrap().unlocked);

    let second = book
        .apply_metrics(LevelId(1), &metrics(500.0, 70.0))
        .expect("known level");
    assert_eq!(
        second,
        LevelEvaluation::Completed {
            unlocked: Some(LevelId(2))
        }
    );
    assert!(book.level(LevelId(1)).unwrap().completed);
    assert!(book.level(LevelId(2)).unwrap().unlocked);
}

#[test]
fn test_evaluate_objectives_sets_current_from_metrics() {
    let level = money_happiness_level(1);
    let updated = evaluate_objectives(&level, &metrics(120.0, 44.5));
    assert_eq!(updated.objectives[0].current, 120.0);
    assert_eq!(updated.objectives[1].current, 44.5);
    assert!(!updated.completed);
    // Input untouched.
    assert_eq!(level.objectives[0].current, 0.0);
}

#[test]
fn test_evaluate_objectives_is_idempotent() {
    let level = money_happiness_level(1);
    let m = metrics(300.0, 80.0);
    let once = evaluate_objectives(&level, &m);
    let twice = evaluate_objectives(&once, &m);
    assert_eq!(once, twice);

    let done = evaluate_objectives(&level, &metrics(900.0, 90.0));
    assert!(done.completed);
    assert_eq!(evaluate_objectives(&done, &metrics(900.0, 90.0)), done);
    // A completed level ignores later, worse metrics.
    assert_eq!(evaluate_objectives(&done, &metrics(0.0, 0.0)), done);
}

#[test]
fn test_apply_metrics_twice_changes_nothing_after_completion() {
    let mut book = LevelBook::new(vec![money_happiness_level(1), money_happiness_level(2)])
        .expect("valid levels");
    book.apply_metrics(LevelId(1), &metrics(600.0, 75.0))
        .expect("known level");
    let snapshot = book.clone();
    let again = book
        .apply_metrics(LevelId(1), &metrics(600.0, 75.0))
        .expect("known level");
    assert_eq!(again, LevelEvaluation::AlreadyCompleted);
    assert_eq!(book, snapshot);
}

#[test]
fn test_last_level_completion_unlocks_nothing() {
    let mut book = LevelBook::new(vec![money_happiness_level(1)]).expect("valid");
    let result = book
        .apply_metrics(LevelId(1), &metrics(500.0, 70.0))
        .expect("known level");
    assert_eq!(result, LevelEvaluation::Completed { unlocked: None });
}

#[test]
fn test_next_level_is_by_ascending_id_not_input_order() {
    let book = LevelBook::new(vec![
        money_happiness_level(7),
        money_happiness_level(2),
        money_happiness_level(4),
    ])
    .expect("valid");
    assert_eq!(book.levels()[0].id, LevelId(2));
    assert!(book.levels()[0].unlocked);
    assert_eq!(book.next_after(LevelId(2)), Some(LevelId(4)));
    assert_eq!(book.next_after(LevelId(4)), Some(LevelId(7)));
    assert_eq!(book.active_id(), LevelId(2));
}

#[test]
fn test_level_without_objectives_is_configuration_error() {
    let mut empty = money_happiness_level(3);
    empty.objectives.clear();
    assert_eq!(
        empty.validate(),
        Err(ConfigurationError::NoObjectives { level: LevelId(3) })
    );
    assert_eq!(
        LevelBook::new(vec![money_happiness_level(1), empty]).unwrap_err(),
        ConfigurationError::NoObjectives { level: LevelId(3) }
    );
    assert_eq!(LevelBook::new(Vec::new()).unwrap_err(), ConfigurationError::NoLevels);
}

#[test]
fn test_duplicate_level_id_is_configuration_error() {
    let mut twin = money_happiness_level(2);
    twin.name = "Second L2".to_string();
    let result = LevelBook::new(vec![
        money_happiness_level(2),
        money_happiness_level(1),
        twin,
    ]);
    assert_eq!(result.unwrap_err(), ConfigurationError::DuplicateLevel(LevelId(2)));
}

#[test]
fn test_unknown_level_is_reported() {
    let mut book = LevelBook::new(vec![money_happiness_level(1)]).expect("valid");
    assert_eq!(
        book.apply_metrics(LevelId(9), &metrics(0.0, 0.0)),
        Err(ConfigurationError::UnknownLevel(LevelId(9)))
    );
}

#[test]
fn test_time_limit_fails_unfinished_level() {
    let mut level = money_happiness_level(1);
    level.time_limit_s = Some(60);
    let mut book = LevelBook::new(vec![level]).expect("valid");
    let late = LiveMetrics {
        elapsed_s: 61.0,
        ..metrics(10.0, 50.0)
    };
    assert_eq!(
        book.apply_metrics(LevelId(1), &late),
        Ok(LevelEvaluation::Failed)
    );
    // Meeting every objective at the same moment still counts as a win.
    let mut level = money_happiness_level(1);
    level.time_limit_s = Some(60);
    let mut book = LevelBook::new(vec![level]).expect("valid");
    let late_but_done = LiveMetrics {
        elapsed_s: 61.0,
        ..metrics(500.0, 70.0)
    };
    assert_eq!(
        book.apply_metrics(LevelId(1), &late_but_done),
        Ok(LevelEvaluation::Completed { unlocked: None })
    );
}

#[test]
fn test_select_refuses_locked_level() {
    let mut book = LevelBook::new(vec![money_happiness_level(1), money_happiness_level(2)])
        .expect("valid");
    assert_eq!(
        book.select(LevelId(2)).map(|l| l.id),
        Err(LevelSelectError::Locked(LevelId(2)))
    );
    assert_eq!(
        book.select(LevelId(5)).map(|l| l.id),
        Err(LevelSelectError::Unknown(LevelId(5)))
    );
    book.apply_metrics(LevelId(1), &metrics(500.0, 70.0))
        .expect("known");
    assert_eq!(book.select(LevelId(2)).map(|l| l.id), Ok(LevelId(2)));
    assert_eq!(book.active_index(), 1);
}

#[test]
fn test_merge_progress_copies_flags_and_currents() {
    let mut played = LevelBook::new(vec![money_happiness_level(1), money_happiness_level(2)])
        .expect("valid");
    played
        .apply_metrics(LevelId(1), &metrics(500.0, 70.0))
        .expect("known");

    let mut fresh = LevelBook::new(vec![money_happiness_level(1), money_happiness_level(2)])
        .expect("valid");
    fresh.merge_progress(played.levels());
    assert_eq!(fresh.levels(), played.levels());
}

#[test]
fn test_default_levels_are_valid() {
    let levels = default_levels();
    assert_eq!(levels.len(), 5);
    let book = LevelBook::new(levels).expect("shipped levels validate");
    assert!(book.levels()[0].unlocked);
    assert!(book.levels()[1..].iter().all(|l| !l.unlocked));
    assert_eq!(LevelBook::default(), book);
}

#[test]
fn test_load_levels_json() {
    let json = r#"[
        {
            "id": 1,
            "name": "Intro",
            "objectives": [{"kind": "passengers", "target": 2}],
            "passenger_frequency_interval_ms": 4000,
            "max_active_passengers": 3,
            "train_capacity": 2
        },
        {
            "id": 2,
            "name": "Timed",
            "objectives": [{"kind": "money", "target": 300, "current": 120}],
            "passenger_frequency_interval_ms": 3000,
            "max_active_passengers": 5,
            "train_capacity": 3,
            "time_limit_s": 120
        }
    ]"#;
    let levels = load_levels_json(json).expect("valid json");
    assert_eq!(levels.len(), 2);
    assert_eq!(levels[0].objectives[0].kind, ObjectiveKind::Passengers);
    assert_eq!(levels[1].objectives[0].current, 120.0);
    assert_eq!(levels[1].time_limit_s, Some(120));
    assert!(!levels[0].unlocked);
}

#[test]
fn test_load_levels_json_rejects_bad_input() {
    assert!(matches!(
        load_levels_json("not json"),
        Err(LevelLoadError::Json(_))
    ));
    let no_objectives = r#"[{"id": 1, "name": "x", "objectives": [],
        "passenger_frequency_interval_ms": 1, "max_active_passengers": 1, "train_capacity": 1}]"#;
    assert!(matches!(
        load_levels_json(no_objectives),
        Err(LevelLoadError::Invalid(ConfigurationError::NoObjectives { .. }))
    ));
    let twice = r#"[
        {"id": 4, "name": "a", "objectives": [{"kind": "money", "target": 1}],
         "passenger_frequency_interval_ms": 1, "max_active_passengers": 1, "train_capacity": 1},
        {"id": 4, "name": "b", "objectives": [{"kind": "money", "target": 2}],
         "passenger_frequency_interval_ms": 1, "max_active_passengers": 1, "train_capacity": 1}
    ]"#;
    assert!(matches!(
        load_levels_json(twice),
        Err(LevelLoadError::Invalid(ConfigurationError::DuplicateLevel(LevelId(4))))
    ));
}
