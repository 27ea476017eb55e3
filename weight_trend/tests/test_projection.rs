use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use weight_trend::projection::{fit_trend, PROJECTION_STEPS};
use weight_trend::utils::{format_date, parse_timestamp};
use weight_trend::{
    project, project_trend, Milestone, Observation, ProjectionConfig, TrendError,
};

const DAY: i64 = 86_400_000;

fn obs(date: &str, value: f64) -> Observation {
    Observation::new(parse_timestamp(date).unwrap(), value)
}

fn three_weeks() -> Vec<Observation> {
    vec![
        obs("2024-01-01", 200.0),
        obs("2024-01-08", 198.0),
        obs("2024-01-15", 196.0),
    ]
}

fn with_regain() -> Vec<Observation> {
    let mut series = three_weeks();
    series.push(obs("2024-01-22", 197.0));
    series
}

fn start() -> Milestone {
    Milestone::new(parse_timestamp("2024-01-01").unwrap(), "Start")
}

#[test]
fn test_trend_over_window_without_projection() {
    let series = three_weeks();
    let window_end = parse_timestamp("2024-01-15").unwrap();

    let projection = project_trend(
        &series,
        &series,
        Some(&start()),
        &ProjectionConfig::default(),
        window_end,
    )
    .unwrap()
    .unwrap();

    assert_eq!(projection.fit.sample_size, 3);
    assert_relative_eq!(
        projection.fit.regression.slope_per_day(),
        -2.0 / 7.0,
        max_relative = 1e-9
    );
    assert_eq!(projection.projection_end, None);
    assert_eq!(projection.points.len(), 3);
    assert!(projection.points.iter().all(|p| !p.is_projected));
    assert_relative_eq!(projection.points[0].fitted_value, 200.0, max_relative = 1e-9);
    assert_relative_eq!(projection.points[2].fitted_value, 196.0, max_relative = 1e-9);
}

#[test]
fn test_no_milestone_means_no_trend() {
    let series = three_weeks();
    let config = ProjectionConfig::new(3);

    assert!(project(&series, &series, None, &config, series[2].timestamp)
        .unwrap()
        .is_empty());
    assert!(project_trend(&series, &series, None, &config, series[2].timestamp)
        .unwrap()
        .is_none());
}

#[test]
fn test_needs_two_observations_since_milestone() {
    let series = three_weeks();
    let late = Milestone::new(parse_timestamp("2024-01-10").unwrap(), "Late");

    let points = project(
        &series,
        &series,
        Some(&late),
        &ProjectionConfig::new(1),
        series[2].timestamp,
    )
    .unwrap();

    assert!(points.is_empty());
}

#[test]
fn test_single_timestamp_sample_yields_no_trend() {
    let series = vec![obs("2024-01-05", 190.0), obs("2024-01-05", 191.0)];
    let milestone = Milestone::new(parse_timestamp("2024-01-01").unwrap(), "Start");

    let projection = project_trend(
        &series,
        &series,
        Some(&milestone),
        &ProjectionConfig::new(6),
        series[1].timestamp,
    )
    .unwrap();

    assert!(projection.is_none());
}

#[test]
fn test_recent_restriction_changes_fit_not_display_range() {
    let series = with_regain();
    let window_end = parse_timestamp("2024-01-22").unwrap();

    let full = project_trend(
        &series,
        &series,
        Some(&start()),
        &ProjectionConfig::default(),
        window_end,
    )
    .unwrap()
    .unwrap();
    assert!(full.fit.regression.slope < 0.0);
    assert_eq!(full.fit.sample_size, 4);

    let recent_config = ProjectionConfig::default().with_recent_count(2).unwrap();
    let recent = project_trend(&series, &series, Some(&start()), &recent_config, window_end)
        .unwrap()
        .unwrap();

    assert!(recent.fit.regression.slope > 0.0);
    assert_relative_eq!(
        recent.fit.regression.slope_per_day(),
        1.0 / 7.0,
        max_relative = 1e-9
    );
    assert_eq!(recent.fit.sample_size, 2);

    // Drawn over all four observations using the two-point fit
    assert_eq!(recent.points.len(), 4);
    assert_relative_eq!(recent.points[0].fitted_value, 194.0, max_relative = 1e-9);
    assert_relative_eq!(recent.points[3].fitted_value, 197.0, max_relative = 1e-9);
}

#[test]
fn test_recent_restriction_larger_than_sample_uses_everything() {
    let series = three_weeks();
    let config = ProjectionConfig::default().with_recent_count(10).unwrap();

    let fit = fit_trend(&series, Some(&start()), &config).unwrap().unwrap();
    assert_eq!(fit.sample_size, 3);
}

#[test]
fn test_recent_count_below_two_is_rejected() {
    assert!(matches!(
        ProjectionConfig::default().with_recent_count(1),
        Err(TrendError::InvalidParameter(_))
    ));

    let config = ProjectionConfig {
        horizon_months: 0,
        restrict_to_recent_count: Some(0),
    };
    let series = three_weeks();
    assert!(project(&series, &series, Some(&start()), &config, series[2].timestamp).is_err());
}

#[test]
fn test_one_month_projection() {
    let series = three_weeks();
    let window_end = parse_timestamp("2024-01-15").unwrap();

    let projection = project_trend(
        &series,
        &series,
        Some(&start()),
        &ProjectionConfig::new(1),
        window_end,
    )
    .unwrap()
    .unwrap();

    let projected: Vec<_> = projection.projected_points().collect();
    assert_eq!(projected.len(), PROJECTION_STEPS);
    assert_eq!(projection.observed_points().count(), 3);

    let last = projection.points.last().unwrap();
    assert!(last.is_projected);
    let target = parse_timestamp("2024-02-15").unwrap();
    assert!((last.timestamp - target).abs() <= 2 * DAY);
    assert_eq!(format_date(projection.projection_end.unwrap()).unwrap(), "2024-02-15");

    assert!(projected.iter().all(|p| p.timestamp > window_end));
}

#[test]
fn test_points_are_ordered_observed_then_projected() {
    let series = with_regain();
    let window_end = parse_timestamp("2024-01-22").unwrap();

    let points = project(
        &series,
        &series,
        Some(&start()),
        &ProjectionConfig::new(3),
        window_end,
    )
    .unwrap();

    assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    let first_projected = points.iter().position(|p| p.is_projected).unwrap();
    assert!(points[..first_projected].iter().all(|p| !p.is_projected));
    assert!(points[first_projected..].iter().all(|p| p.is_projected));
}

#[test]
fn test_negative_slope_projects_decreasing_values() {
    let series = three_weeks();
    let points = project(
        &series,
        &series,
        Some(&start()),
        &ProjectionConfig::new(12),
        series[2].timestamp,
    )
    .unwrap();

    let projected: Vec<f64> = points
        .iter()
        .filter(|p| p.is_projected)
        .map(|p| p.fitted_value)
        .collect();
    assert_eq!(projected.len(), PROJECTION_STEPS);
    assert!(projected.windows(2).all(|w| w[1] < w[0]));
    assert!(projected[0] < 196.0);
}

#[test]
fn test_fit_sample_comes_from_full_series() {
    let series = three_weeks();
    let windowed = &series[..2];
    let window_end = series[1].timestamp;

    let projection = project_trend(
        windowed,
        &series,
        Some(&start()),
        &ProjectionConfig::default(),
        window_end,
    )
    .unwrap()
    .unwrap();

    assert_eq!(projection.fit.sample_size, 3);
    assert_eq!(projection.points.len(), 2);
}

#[test]
fn test_display_is_clipped_to_window_end() {
    let series = with_regain();
    let window_end = parse_timestamp("2024-01-15").unwrap();

    let points = project(
        &series,
        &series,
        Some(&start()),
        &ProjectionConfig::new(1),
        window_end,
    )
    .unwrap();

    let observed: Vec<_> = points.iter().filter(|p| !p.is_projected).collect();
    assert_eq!(observed.len(), 3);
    assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[test]
fn test_no_projection_without_display_points() {
    let series = three_weeks();
    let projection = project_trend(
        &[],
        &series,
        Some(&start()),
        &ProjectionConfig::new(6),
        series[2].timestamp,
    )
    .unwrap()
    .unwrap();

    assert!(projection.points.is_empty());
    assert_eq!(projection.projection_end, None);
}

#[test]
fn test_horizon_past_calendar_range_keeps_trend() {
    let series = three_weeks();
    let far_future = 9_000_000_000_000_000;

    let projection = project_trend(
        &series,
        &series,
        Some(&start()),
        &ProjectionConfig::new(1),
        far_future,
    )
    .unwrap()
    .unwrap();

    assert_eq!(projection.points.len(), 3);
    assert!(projection.points.iter().all(|p| !p.is_projected));
    assert_eq!(projection.projection_end, None);
}

#[test]
fn test_trend_point_serializes_for_presentation() {
    let series = three_weeks();
    let points = project(
        &series,
        &series,
        Some(&start()),
        &ProjectionConfig::default(),
        series[2].timestamp,
    )
    .unwrap();

    let json = serde_json::to_value(points[0]).unwrap();
    assert_eq!(json["timestamp"], series[0].timestamp);
    assert_eq!(json["isProjected"], false);
    assert!(json["fittedValue"].is_number());
}
