use chrono::{FixedOffset, TimeZone, Utc};
use moodnote_core::{
    day_report, ema_score, score_day_from_values, smooth_series, trend_report, Category,
    Classification, Classifier, DateKey, KeywordClassifier, Note, ScoreConfig,
};

#[test]
fn mixed_day_scores_slightly_above_neutral() {
    let totals = score_day_from_values([4.0, 3.0, -3.0], &ScoreConfig::default()).unwrap();

    assert_eq!(totals.positive_sum, 7.0);
    assert_eq!(totals.negative_sum, 3.0);
    assert!((totals.raw_score - 56.6).abs() < 0.05);
}

#[test]
fn empty_day_is_exactly_fifty() {
    let totals = score_day_from_values(Vec::<f64>::new(), &ScoreConfig::default()).unwrap();

    assert_eq!(totals.raw_score, 50.0);
    assert_eq!(totals.positive_sum, 0.0);
    assert_eq!(totals.negative_sum, 0.0);
}

#[test]
fn two_day_trend_blends_second_day() {
    let config = ScoreConfig::default();
    let day_one = ema_score(80.0, None, &config);
    let day_two = ema_score(40.0, Some(day_one), &config);

    assert_eq!(day_one, 80.0);
    assert!((day_two - 68.0).abs() < 1e-9);
    assert_eq!(smooth_series(&[80.0, 40.0], &config), vec![day_one, day_two]);
}

#[test]
fn walk_note_classifies_as_physical() {
    let classified = KeywordClassifier::new()
        .classify("Went for a 20 min walk")
        .unwrap();

    assert_eq!(
        classified,
        Classification {
            category: Category::Physical,
            value: 4.0,
        }
    );
}

#[test]
fn notes_to_day_report_end_to_end() {
    let tz = FixedOffset::east_opt(3600).unwrap();
    let notes = vec![
        Note::new("Went for a 20 min walk", Utc.with_ymd_and_hms(2026, 8, 10, 7, 0, 0).unwrap()),
        Note::new("coffee with a friend", Utc.with_ymd_and_hms(2026, 8, 10, 12, 0, 0).unwrap()),
        Note::new("skipped the dentist", Utc.with_ymd_and_hms(2026, 8, 10, 18, 0, 0).unwrap()),
        // 23:30 UTC is already 2026-08-11 at UTC+1.
        Note::new("binge watched", Utc.with_ymd_and_hms(2026, 8, 10, 23, 30, 0).unwrap()),
    ];

    let totals = day_report(
        &notes,
        DateKey::from_ymd(2026, 8, 10).unwrap(),
        &tz,
        &KeywordClassifier::new(),
        &ScoreConfig::default(),
    )
    .unwrap();

    assert_eq!(totals.positive_sum, 7.0);
    assert_eq!(totals.negative_sum, 3.0);
    assert!((totals.raw_score - 56.6).abs() < 0.05);
}

#[test]
fn trend_smooths_oldest_first_across_gaps() {
    let config = ScoreConfig::default();
    let notes = vec![
        Note::new("gym session", Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap()),
        Note::new("doomscrolling", Utc.with_ymd_and_hms(2026, 9, 3, 22, 0, 0).unwrap()),
    ];

    let trend = trend_report(
        &notes,
        DateKey::from_ymd(2026, 9, 3).unwrap(),
        3,
        &Utc,
        &KeywordClassifier::new(),
        &config,
    )
    .unwrap();

    let dates: Vec<String> = trend.iter().map(|day| day.date_key.to_string()).collect();
    assert_eq!(dates, vec!["2026-09-01", "2026-09-02", "2026-09-03"]);

    let raws: Vec<f64> = trend.iter().map(|day| day.raw_score).collect();
    assert!(raws[0] > 50.0);
    assert_eq!(raws[1], 50.0);
    assert!(raws[2] < 50.0);

    let smoothed: Vec<f64> = trend.iter().map(|day| day.smoothed_score).collect();
    assert_eq!(smoothed, smooth_series(&raws, &config));
}

#[test]
fn report_is_reproducible_from_the_same_inputs() {
    let notes = vec![
        Note::new("meditated", Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap()),
        Note::new("procrastinated", Utc.with_ymd_and_hms(2026, 9, 2, 9, 0, 0).unwrap()),
    ];
    let today = DateKey::from_ymd(2026, 9, 2).unwrap();
    let classifier = KeywordClassifier::new();
    let config = ScoreConfig::default();

    let first = trend_report(&notes, today, 5, &Utc, &classifier, &config).unwrap();
    let second = trend_report(&notes, today, 5, &Utc, &classifier, &config).unwrap();
    assert_eq!(first, second);
}
