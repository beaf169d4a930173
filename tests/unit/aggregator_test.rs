// Report aggregation over in-memory records

#[path = "../helpers/mod.rs"]
mod helpers;

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use campusdesk::records::models::StudentStatus;
use campusdesk::records::{Division, Labelled, PaymentMode};
use campusdesk::reports::models::Granularity;
use campusdesk::reports::services::largest_remainder_percentages;
use campusdesk::reports::{ExportFormat, ReportAggregator, ReportConfiguration, ReportType};
use helpers::{course, course_payment, student, transaction};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn january(report_types: Vec<ReportType>) -> ReportConfiguration {
    ReportConfiguration::new(d(2025, 1, 1), d(2025, 1, 31), report_types, ExportFormat::Csv)
}

fn generated_at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 1, 4, 30, 0).unwrap()
}

#[test]
fn test_revenue_trend_daily_series_is_sparse() {
    let txs = vec![
        transaction(
            "t1",
            "2025-01-05",
            dec!(1000),
            Some(Division::Tuition),
            Some(PaymentMode::Cash),
        ),
        transaction("t2", "2025-01-05", dec!(500), Some(Division::Tuition), Some(PaymentMode::Upi)),
        transaction(
            "t3",
            "2025-01-20",
            dec!(2500),
            Some(Division::VedicMaths),
            Some(PaymentMode::Card),
        ),
        // outside the range
        transaction(
            "t4",
            "2025-02-02",
            dec!(9999),
            Some(Division::Tuition),
            Some(PaymentMode::Cash),
        ),
    ];

    let result = ReportAggregator::new()
        .aggregate(&txs, &[], &[], &january(vec![ReportType::RevenueTrend]), generated_at())
        .unwrap();
    let trend = result.revenue_trend().unwrap();

    assert_eq!(trend.granularity, Granularity::Daily);
    assert_eq!(trend.points.len(), 2);
    assert_eq!(trend.points[0].period_start, d(2025, 1, 5));
    assert_eq!(trend.points[0].amount, dec!(1500));
    assert_eq!(trend.points[0].transaction_count, 2);
    assert_eq!(trend.total, dec!(4000));
}

#[test]
fn test_weekly_buckets_clamped_to_range() {
    // 2025-01-01 is a Wednesday; the first weekly bucket starts at the range start
    let config = ReportConfiguration::new(
        d(2025, 1, 1),
        d(2025, 3, 31),
        vec![ReportType::RevenueTrend],
        ExportFormat::Csv,
    );
    let txs = vec![
        transaction("t1", "2025-01-02", dec!(100), None, None),
        transaction("t2", "2025-01-08", dec!(200), None, None),
    ];

    let result = ReportAggregator::new()
        .aggregate(&txs, &[], &[], &config, generated_at())
        .unwrap();
    let trend = result.revenue_trend().unwrap();

    assert_eq!(trend.granularity, Granularity::Weekly);
    assert_eq!(trend.points[0].period_start, d(2025, 1, 1));
    assert_eq!(trend.points[0].period_end, d(2025, 1, 5));
    assert_eq!(trend.points[1].period_start, d(2025, 1, 6));
    assert_eq!(trend.points[1].period_end, d(2025, 1, 12));
}

#[test]
fn test_division_breakdown_lists_every_known_division() {
    let txs = vec![
        transaction(
            "t1",
            "2025-01-10",
            dec!(3000),
            Some(Division::GamaAbacus),
            Some(PaymentMode::Cash),
        ),
        transaction("t2", "2025-01-11", dec!(700), None, Some(PaymentMode::Cash)),
    ];

    let result = ReportAggregator::new()
        .aggregate(&txs, &[], &[], &january(vec![ReportType::DivisionBreakdown]), generated_at())
        .unwrap();
    let breakdown = result.division_breakdown().unwrap();

    for known in Division::KNOWN {
        assert!(breakdown.rows.iter().any(|r| r.division == known), "{} missing", known);
    }
    let vedic = breakdown.rows.iter().find(|r| r.division == Division::VedicMaths).unwrap();
    assert_eq!(vedic.amount, Decimal::ZERO);

    let unassigned = breakdown.rows.iter().find(|r| r.division.code() == "unassigned").unwrap();
    assert_eq!(unassigned.amount, dec!(700));
    assert_eq!(breakdown.total, dec!(3700));
}

#[test]
fn test_division_filter_excludes_other_divisions() {
    let txs = vec![
        transaction(
            "t1",
            "2025-01-10",
            dec!(3000),
            Some(Division::GamaAbacus),
            Some(PaymentMode::Cash),
        ),
        transaction(
            "t2",
            "2025-01-11",
            dec!(700),
            Some(Division::Tuition),
            Some(PaymentMode::Cash),
        ),
    ];
    let config = january(vec![ReportType::RevenueTrend]).with_division(Division::Tuition);

    let result = ReportAggregator::new()
        .aggregate(&txs, &[], &[], &config, generated_at())
        .unwrap();

    assert_eq!(result.revenue_trend().unwrap().total, dec!(700));
    assert_eq!(result.division, Some(Division::Tuition));
}

#[test]
fn test_payment_modes_sum_to_hundred() {
    let txs = vec![
        transaction("t1", "2025-01-10", dec!(100), None, Some(PaymentMode::Cash)),
        transaction("t2", "2025-01-10", dec!(100), None, Some(PaymentMode::Upi)),
        transaction("t3", "2025-01-10", dec!(100), None, Some(PaymentMode::Card)),
    ];

    let result = ReportAggregator::new()
        .aggregate(
            &txs,
            &[],
            &[],
            &january(vec![ReportType::PaymentModeDistribution]),
            generated_at(),
        )
        .unwrap();
    let dist = result.payment_mode_distribution().unwrap();

    let shares: Vec<u32> = dist.rows.iter().map(|r| r.percentage).collect();
    assert_eq!(shares, vec![34, 33, 33]);
    assert_eq!(dist.rows[0].payment_mode, PaymentMode::Cash);
    assert_eq!(dist.total_count, 3);
}

#[test]
fn test_missing_payment_mode_counted_as_unspecified() {
    let txs = vec![
        transaction("t1", "2025-01-10", dec!(100), None, None),
        transaction("t2", "2025-01-10", dec!(100), None, Some(PaymentMode::Cash)),
    ];

    let result = ReportAggregator::new()
        .aggregate(
            &txs,
            &[],
            &[],
            &january(vec![ReportType::PaymentModeDistribution]),
            generated_at(),
        )
        .unwrap();
    let dist = result.payment_mode_distribution().unwrap();

    let unspecified = dist.rows.iter().find(|r| r.payment_mode.code() == "unspecified").unwrap();
    assert_eq!(unspecified.percentage, 50);
}

#[test]
fn test_enrollment_vs_dropoff() {
    let courses = vec![
        course("C-2", "Vedic Basics", &["S-4"]),
        course("C-1", "Abacus Level 1", &["S-1", "S-2", "S-3"]),
    ];
    let students = vec![
        student("S-3", "C-1", StudentStatus::Dropped),
        student("S-1", "C-1", StudentStatus::Active),
    ];

    let result = ReportAggregator::new()
        .aggregate(
            &[],
            &students,
            &courses,
            &january(vec![ReportType::EnrollmentVsDropoff]),
            generated_at(),
        )
        .unwrap();
    let section = result.enrollment_vs_dropoff().unwrap();

    assert_eq!(section.rows[0].course_id, "C-1");
    assert_eq!(section.rows[0].enrolled, 2);
    assert_eq!(section.rows[0].dropped, 1);
    assert_eq!(section.rows[0].dropoff_rate, dec!(33.33));
    assert_eq!(section.rows[1].dropoff_rate, Decimal::ZERO);
    assert_eq!(section.total_enrolled, 3);
    assert_eq!(section.total_dropped, 1);
}

#[test]
fn test_top_courses_ties_broken_by_enrollment_then_id() {
    let courses = vec![
        course("C-1", "Abacus Level 1", &["S-1"]),
        course("C-2", "Abacus Level 2", &["S-2", "S-3"]),
        course("C-3", "Abacus Level 3", &["S-4"]),
    ];
    let txs = vec![
        course_payment("t1", "2025-01-03", dec!(5000), "C-1", "Abacus Level 1"),
        course_payment("t2", "2025-01-04", dec!(5000), "C-2", "Abacus Level 2"),
        course_payment("t3", "2025-01-05", dec!(5000), "C-3", "Abacus Level 3"),
    ];
    let mut config = january(vec![ReportType::TopCourses]);
    config.top_limit = 2;

    let result = ReportAggregator::new()
        .aggregate(&txs, &[], &courses, &config, generated_at())
        .unwrap();
    let top = result.top_courses().unwrap();

    assert_eq!(top.rows.len(), 2);
    assert_eq!(top.rows[0].course_id.as_deref(), Some("C-2"));
    assert_eq!(top.rows[0].rank, 1);
    assert_eq!(top.rows[1].course_id.as_deref(), Some("C-1"));
    assert_eq!(top.rows[1].rank, 2);
}

#[test]
fn test_top_courses_matches_by_name_and_keeps_orphans() {
    let courses = vec![course("C-1", "Abacus Level 1", &["S-1"])];
    let mut by_name = course_payment("t1", "2025-01-03", dec!(1000), "", "abacus level 1");
    by_name.course_id = None;
    let mut orphan = course_payment("t2", "2025-01-04", dec!(4000), "", "Summer Camp");
    orphan.course_id = None;

    let result = ReportAggregator::new()
        .aggregate(
            &[by_name, orphan],
            &[],
            &courses,
            &january(vec![ReportType::TopCourses]),
            generated_at(),
        )
        .unwrap();
    let top = result.top_courses().unwrap();

    assert_eq!(top.rows[0].course_name, "Summer Camp");
    assert!(top.rows[0].course_id.is_none());
    assert_eq!(top.rows[1].course_id.as_deref(), Some("C-1"));
    assert_eq!(top.rows[1].revenue, dec!(1000));
}

#[test]
fn test_empty_input_gives_empty_sections() {
    let config = january(vec![
        ReportType::RevenueTrend,
        ReportType::TopCourses,
        ReportType::PaymentModeDistribution,
    ]);
    let result = ReportAggregator::new()
        .aggregate(&[], &[], &[], &config, generated_at())
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(result.revenue_trend().unwrap().total, Decimal::ZERO);
    assert_eq!(result.generated_at, generated_at());
}

#[test]
fn test_sections_follow_request_order_without_duplicates() {
    let config = january(vec![
        ReportType::TopCourses,
        ReportType::RevenueTrend,
        ReportType::TopCourses,
    ]);
    let result = ReportAggregator::new()
        .aggregate(&[], &[], &[], &config, generated_at())
        .unwrap();

    assert_eq!(result.report_types(), vec![ReportType::TopCourses, ReportType::RevenueTrend]);
}

#[test]
fn test_unreadable_dates_excluded() {
    let txs = vec![
        transaction("t1", "not a date", dec!(800), None, Some(PaymentMode::Cash)),
        transaction("t2", "2025-01-09", dec!(200), None, Some(PaymentMode::Cash)),
    ];
    let result = ReportAggregator::new()
        .aggregate(&txs, &[], &[], &january(vec![ReportType::RevenueTrend]), generated_at())
        .unwrap();

    assert_eq!(result.revenue_trend().unwrap().total, dec!(200));
}

#[test]
fn test_invalid_configuration_rejected() {
    let config = ReportConfiguration::new(
        d(2025, 2, 1),
        d(2025, 1, 1),
        vec![ReportType::RevenueTrend],
        ExportFormat::Csv,
    );
    let err = ReportAggregator::new()
        .aggregate(&[], &[], &[], &config, generated_at())
        .unwrap_err();

    assert!(err.is_invalid_configuration());
}

proptest! {
    #[test]
    fn prop_percentages_sum_to_hundred(counts in prop::collection::vec(0u64..10_000, 1..8)) {
        let shares = largest_remainder_percentages(&counts);
        let total: u64 = counts.iter().sum();

        prop_assert_eq!(shares.len(), counts.len());
        if total == 0 {
            prop_assert!(shares.iter().all(|s| *s == 0));
        } else {
            prop_assert_eq!(shares.iter().sum::<u32>(), 100);
        }
    }

    /// Revenue trend total equals the sum of in-range payments
    #[test]
    fn prop_trend_total_matches_inputs(amounts in prop::collection::vec(0u64..1_000_000, 0..40)) {
        let txs: Vec<_> = amounts
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let date = format!("2025-01-{:02}", (i % 31) + 1);
                transaction(
                    &format!("t{}", i),
                    &date,
                    Decimal::from(*a),
                    None,
                    Some(PaymentMode::Cash),
                )
            })
            .collect();

        let result = ReportAggregator::new()
            .aggregate(&txs, &[], &[], &january(vec![ReportType::RevenueTrend]), generated_at())
            .unwrap();

        let expected: Decimal = amounts.iter().map(|a| Decimal::from(*a)).sum();
        prop_assert_eq!(result.revenue_trend().unwrap().total, expected);
    }
}
