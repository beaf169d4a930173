use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

use crate::core::Result;
use crate::modules::fees::models::PaymentTransaction;
use crate::modules::records::models::{Course, Division, Labelled, PaymentMode, Student};
use crate::modules::reports::models::{
    DivisionBreakdown, DivisionRow, EnrollmentRow, EnrollmentVsDropoff, Granularity,
    PaymentModeDistribution, PaymentModeRow, ReportConfiguration, ReportResult, ReportSection,
    ReportType, RevenuePoint, RevenueTrend, TopCourseRow, TopCourses,
};

/// Code used for transactions that carry no division
const UNASSIGNED: &str = "unassigned";
/// Code used for transactions that carry no payment mode
const UNSPECIFIED: &str = "unspecified";

/// Computes report sections from raw records.
///
/// Pure: the caller fetches records and supplies the generation timestamp. Transactions
/// whose payment date cannot be read are left out of every date-ranged view.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportAggregator;

impl ReportAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(
        &self,
        transactions: &[PaymentTransaction],
        students: &[Student],
        courses: &[Course],
        config: &ReportConfiguration,
        generated_at: DateTime<Utc>,
    ) -> Result<ReportResult> {
        config.validate()?;

        let in_scope: Vec<&PaymentTransaction> = transactions
            .iter()
            .filter(|tx| tx.falls_within(config.start, config.end))
            .filter(|tx| matches_division(tx.division.as_ref(), config.division.as_ref()))
            .collect();

        let unreadable = transactions.iter().filter(|tx| tx.payment_day().is_none()).count();
        if unreadable > 0 {
            warn!(unreadable, "Skipping transactions with unreadable payment dates");
        }

        let courses: Vec<&Course> = courses
            .iter()
            .filter(|c| matches_division(c.division.as_ref(), config.division.as_ref()))
            .collect();

        let sections = config
            .unique_report_types()
            .into_iter()
            .map(|report_type| match report_type {
                ReportType::RevenueTrend => {
                    ReportSection::RevenueTrend(revenue_trend(&in_scope, config))
                }
                ReportType::DivisionBreakdown => {
                    ReportSection::DivisionBreakdown(division_breakdown(&in_scope))
                }
                ReportType::EnrollmentVsDropoff => ReportSection::EnrollmentVsDropoff(
                    enrollment_vs_dropoff(&courses, students, config),
                ),
                ReportType::PaymentModeDistribution => {
                    ReportSection::PaymentModeDistribution(payment_mode_distribution(&in_scope))
                }
                ReportType::TopCourses => {
                    ReportSection::TopCourses(top_courses(&in_scope, &courses, config.top_limit))
                }
            })
            .collect();

        debug!(
            transactions = in_scope.len(),
            start = %config.start,
            end = %config.end,
            "Aggregated report"
        );

        Ok(ReportResult {
            start: config.start,
            end: config.end,
            division: config.division.clone(),
            generated_at,
            sections,
        })
    }
}

fn matches_division(value: Option<&Division>, filter: Option<&Division>) -> bool {
    match filter {
        None => true,
        Some(wanted) => value == Some(wanted),
    }
}

fn bucket_bounds(day: NaiveDate, granularity: Granularity) -> (NaiveDate, NaiveDate) {
    match granularity {
        Granularity::Daily => (day, day),
        Granularity::Weekly => {
            let monday = day - Days::new(u64::from(day.weekday().num_days_from_monday()));
            (monday, monday + Days::new(6))
        }
        Granularity::Monthly => {
            let first = day.with_day(1).unwrap_or(day);
            let next_month = first
                .checked_add_months(chrono::Months::new(1))
                .unwrap_or(first);
            (first, next_month.pred_opt().unwrap_or(first))
        }
    }
}

fn revenue_trend(
    transactions: &[&PaymentTransaction],
    config: &ReportConfiguration,
) -> RevenueTrend {
    let granularity = config.granularity();
    let mut buckets: BTreeMap<NaiveDate, (NaiveDate, Decimal, u64)> = BTreeMap::new();

    for tx in transactions {
        let Some(day) = tx.payment_day() else { continue };
        let (start, end) = bucket_bounds(day, granularity);
        let entry = buckets.entry(start).or_insert((end, Decimal::ZERO, 0));
        entry.1 += tx.paid();
        entry.2 += 1;
    }

    let points: Vec<RevenuePoint> = buckets
        .into_iter()
        .map(|(start, (end, amount, count))| RevenuePoint {
            period_start: start.max(config.start),
            period_end: end.min(config.end),
            amount,
            transaction_count: count,
        })
        .collect();
    let total = points.iter().map(|p| p.amount).sum();

    RevenueTrend {
        granularity,
        points,
        total,
    }
}

fn division_breakdown(transactions: &[&PaymentTransaction]) -> DivisionBreakdown {
    let mut totals: HashMap<Division, (Decimal, u64)> = Division::KNOWN
        .iter()
        .cloned()
        .map(|d| (d, (Decimal::ZERO, 0)))
        .collect();

    for tx in transactions {
        let division = tx
            .division
            .clone()
            .unwrap_or_else(|| Division::Unrecognized(UNASSIGNED.to_string()));
        let entry = totals.entry(division).or_insert((Decimal::ZERO, 0));
        entry.0 += tx.paid();
        entry.1 += 1;
    }

    let mut extra: Vec<Division> = totals.keys().filter(|d| !d.is_known()).cloned().collect();
    extra.sort_by(|a, b| a.code().cmp(b.code()));

    let rows: Vec<DivisionRow> = Division::KNOWN
        .iter()
        .cloned()
        .chain(extra)
        .map(|division| {
            let (amount, count) = totals.get(&division).copied().unwrap_or((Decimal::ZERO, 0));
            DivisionRow {
                label: division.label().to_string(),
                division,
                amount,
                transaction_count: count,
            }
        })
        .collect();
    let total = rows.iter().map(|r| r.amount).sum();

    DivisionBreakdown { rows, total }
}

fn enrollment_vs_dropoff(
    courses: &[&Course],
    students: &[Student],
    config: &ReportConfiguration,
) -> EnrollmentVsDropoff {
    let mut dropped_by_course: HashMap<&str, HashSet<&str>> = HashMap::new();
    for student in students.iter().filter(|s| s.has_dropped()) {
        if let Some(course_id) = student.course_id.as_deref() {
            dropped_by_course
                .entry(course_id)
                .or_default()
                .insert(student.id.as_str());
        }
    }

    let mut rows: Vec<EnrollmentRow> = courses
        .iter()
        .filter(|c| c.is_active_within(config.start, config.end))
        .map(|course| {
            let dropped_ids = dropped_by_course.get(course.id.as_str());
            let dropped = dropped_ids.map_or(0, |ids| ids.len() as u64);
            let enrolled = course
                .students_enrolled
                .iter()
                .filter(|id| !dropped_ids.map_or(false, |ids| ids.contains(id.as_str())))
                .count() as u64;

            EnrollmentRow {
                course_id: course.id.clone(),
                course_name: course.name.clone(),
                enrolled,
                dropped,
                dropoff_rate: percent(dropped, enrolled + dropped),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.course_id.cmp(&b.course_id));

    EnrollmentVsDropoff {
        total_enrolled: rows.iter().map(|r| r.enrolled).sum(),
        total_dropped: rows.iter().map(|r| r.dropped).sum(),
        rows,
    }
}

fn percent(part: u64, whole: u64) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Whole-number shares of `counts` that sum to exactly 100 (largest remainder method).
///
/// Ties on the remainder go to the earlier index, so output is deterministic.
pub fn largest_remainder_percentages(counts: &[u64]) -> Vec<u32> {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return vec![0; counts.len()];
    }

    let mut shares: Vec<u32> = counts
        .iter()
        .map(|&c| ((u128::from(c) * 100) / u128::from(total)) as u32)
        .collect();
    let mut order: Vec<(usize, u128)> = counts
        .iter()
        .enumerate()
        .map(|(i, &c)| (i, (u128::from(c) * 100) % u128::from(total)))
        .collect();
    order.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let assigned: u32 = shares.iter().sum();
    let short = 100u32.saturating_sub(assigned) as usize;
    for (index, _) in order.into_iter().take(short) {
        shares[index] += 1;
    }
    shares
}

fn payment_mode_distribution(transactions: &[&PaymentTransaction]) -> PaymentModeDistribution {
    let mut counts: HashMap<PaymentMode, u64> = HashMap::new();
    for tx in transactions {
        let mode = tx
            .payment_mode
            .clone()
            .unwrap_or_else(|| PaymentMode::Unrecognized(UNSPECIFIED.to_string()));
        *counts.entry(mode).or_insert(0) += 1;
    }

    let mut extra: Vec<PaymentMode> = counts
        .keys()
        .filter(|m| !PaymentMode::KNOWN.contains(m))
        .cloned()
        .collect();
    extra.sort_by(|a, b| a.code().cmp(b.code()));

    let modes: Vec<(PaymentMode, u64)> = PaymentMode::KNOWN
        .iter()
        .cloned()
        .chain(extra)
        .filter_map(|mode| counts.get(&mode).copied().map(|count| (mode, count)))
        .collect();

    let shares = largest_remainder_percentages(&modes.iter().map(|(_, c)| *c).collect::<Vec<_>>());
    let total_count = modes.iter().map(|(_, c)| c).sum();

    let rows = modes
        .into_iter()
        .zip(shares)
        .map(|((mode, count), percentage)| PaymentModeRow {
            label: mode.label().to_string(),
            payment_mode: mode,
            transaction_count: count,
            percentage,
        })
        .collect();

    PaymentModeDistribution { rows, total_count }
}

fn top_courses(
    transactions: &[&PaymentTransaction],
    courses: &[&Course],
    limit: usize,
) -> TopCourses {
    struct Tally {
        course_id: Option<String>,
        course_name: String,
        revenue: Decimal,
        enrollment: u64,
        transaction_count: u64,
    }

    // Keyed by catalog id, or by lowercased name for courses missing from the catalog
    let mut tallies: HashMap<String, Tally> = HashMap::new();

    for tx in transactions {
        let catalog = tx
            .course_id
            .as_deref()
            .and_then(|id| courses.iter().find(|c| c.id == id))
            .or_else(|| {
                tx.course_name
                    .as_deref()
                    .and_then(|name| courses.iter().find(|c| c.matches_name(name)))
            });

        let (key, tally) = match catalog {
            Some(course) => (
                course.id.clone(),
                Tally {
                    course_id: Some(course.id.clone()),
                    course_name: course.name.clone(),
                    revenue: Decimal::ZERO,
                    enrollment: course.enrollment_count() as u64,
                    transaction_count: 0,
                },
            ),
            None => {
                let name = tx
                    .course_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .unwrap_or("Unknown course")
                    .to_string();
                (
                    name.to_lowercase(),
                    Tally {
                        course_id: None,
                        course_name: name,
                        revenue: Decimal::ZERO,
                        enrollment: 0,
                        transaction_count: 0,
                    },
                )
            }
        };

        let entry = tallies.entry(key).or_insert(tally);
        entry.revenue += tx.paid();
        entry.transaction_count += 1;
    }

    let mut ranked: Vec<(String, Tally)> = tallies.into_iter().collect();
    ranked.sort_by(|(a_key, a), (b_key, b)| {
        let a_id = a.course_id.as_deref().unwrap_or(a_key);
        let b_id = b.course_id.as_deref().unwrap_or(b_key);
        b.revenue
            .cmp(&a.revenue)
            .then(b.enrollment.cmp(&a.enrollment))
            .then(a_id.cmp(b_id))
    });

    let rows = ranked
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, (_, tally))| TopCourseRow {
            rank: index as u32 + 1,
            course_id: tally.course_id,
            course_name: tally.course_name,
            revenue: tally.revenue,
            enrollment: tally.enrollment,
            transaction_count: tally.transaction_count,
        })
        .collect();

    TopCourses { rows }
}
