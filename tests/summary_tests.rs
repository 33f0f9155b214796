use pert_estimator::{ConfidenceLevel, EstimateInput, ProjectSummary, Task};

fn task(id: i32, o: &str, m: &str, p: &str) -> Task {
    Task::with_estimate(id, format!("Task {id}"), EstimateInput::new(o, m, p))
}

fn approx(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}

#[test]
fn worked_example_matches_reference_values() {
    let tasks = vec![
        task(1, "1", "2", "3"),
        task(2, "2", "4", "6"),
        task(3, "0", "1", "2"),
    ];

    let displays: Vec<(String, String)> = tasks
        .iter()
        .map(|t| {
            let e = t.estimate();
            (e.expected_display(), e.std_dev_display())
        })
        .collect();
    assert_eq!(
        displays,
        vec![
            ("2.00".to_string(), "0.33".to_string()),
            ("4.00".to_string(), "0.67".to_string()),
            ("1.00".to_string(), "0.33".to_string()),
        ]
    );

    let summary = ProjectSummary::from_tasks(&tasks, &ConfidenceLevel::defaults());
    assert_eq!(summary.total_tasks, 3);
    assert_eq!(summary.estimated_tasks, 3);
    assert!(approx(summary.total_expected, 7.0, 1e-12));
    assert!(approx(summary.total_variance, 0.6667, 1e-4));
    assert!(approx(summary.total_std_dev, 0.8165, 1e-4));

    let ci68 = summary.ci68();
    assert_eq!(format!("{:.2}", ci68.low), "6.18");
    assert_eq!(format!("{:.2}", ci68.high), "7.82");
    let ci95 = summary.ci95();
    assert!(approx(ci95.low, 7.0 - 2.0 * summary.total_std_dev, 1e-12));

    let labelled = summary.interval("68%").expect("default 68% level");
    assert!(approx(labelled.low, ci68.low, 1e-12));
    assert!(approx(labelled.high, ci68.high, 1e-12));
}

#[test]
fn empty_store_yields_zero_width_intervals() {
    let summary = ProjectSummary::from_tasks(&[], &ConfidenceLevel::defaults());
    assert_eq!(summary.total_tasks, 0);
    assert_eq!(summary.total_expected, 0.0);
    assert_eq!(summary.total_std_dev, 0.0);
    for ci in &summary.intervals {
        assert_eq!(ci.low, 0.0);
        assert_eq!(ci.high, 0.0);
    }
}

#[test]
fn undefined_tasks_are_counted_but_not_summed() {
    let tasks = vec![
        task(1, "", "", ""),
        task(2, "1", "x", "3"),
        task(3, "2", "4", "6"),
    ];
    let summary = ProjectSummary::from_tasks(&tasks, &ConfidenceLevel::defaults());
    assert_eq!(summary.total_tasks, 3);
    assert_eq!(summary.estimated_tasks, 1);
    assert!(approx(summary.total_expected, 4.0, 1e-12));
    assert!(approx(summary.total_std_dev, 4.0 / 6.0, 1e-12));

    let only_blank = vec![task(1, "", "", "")];
    let summary = ProjectSummary::from_tasks(&only_blank, &ConfidenceLevel::defaults());
    assert_eq!(summary.total_expected, 0.0);
    assert_eq!(summary.ci95().width(), 0.0);
}

#[test]
fn aggregation_is_order_independent() {
    let mut tasks = vec![
        task(1, "1.5", "2", "9"),
        task(2, "3", "3.3", "4"),
        task(3, "0.25", "8", "13"),
        task(4, "", "1", "2"),
        task(5, "6", "6", "6"),
    ];
    let levels = ConfidenceLevel::defaults();
    let forward = ProjectSummary::from_tasks(&tasks, &levels);
    tasks.reverse();
    tasks.swap(0, 2);
    let shuffled = ProjectSummary::from_tasks(&tasks, &levels);

    assert_eq!(forward.total_tasks, shuffled.total_tasks);
    assert!(approx(forward.total_expected, shuffled.total_expected, 1e-9));
    assert!(approx(forward.total_variance, shuffled.total_variance, 1e-9));
    assert!(approx(forward.total_std_dev, shuffled.total_std_dev, 1e-9));
}

#[test]
fn additional_confidence_levels_need_no_algorithm_change() {
    let tasks = vec![task(1, "0", "3", "12")];
    let levels = vec![
        ConfidenceLevel::new("68%", 1.0),
        ConfidenceLevel::new("95%", 2.0),
        ConfidenceLevel::new("99.7%", 3.0),
    ];
    let summary = ProjectSummary::from_tasks(&tasks, &levels);
    assert_eq!(summary.intervals.len(), 3);
    let widest = summary.interval("99.7%").unwrap();
    assert!(approx(widest.low, summary.total_expected - 6.0, 1e-12));
    assert!(approx(widest.high, summary.total_expected + 6.0, 1e-12));
}
