use std::collections::BTreeMap;

use crate::models::{AwardRecord, Series, WeeklyAggregate, YEAR_BASELINE, YEAR_CURRENT};

#[derive(Debug, Clone, PartialEq)]
pub struct WeekSum {
    pub week_start: String,
    pub amount: f64,
}

/// Sums amounts per `week_start` for one year, ascending by week.
///
/// ISO dates order correctly as strings, so the map key order is the
/// chronological order. Records without a week are bucketed under "" so
/// the year total still covers them.
pub fn weekly_sums<'a, I>(records: I, year: &str) -> Vec<WeekSum>
where
    I: IntoIterator<Item = &'a AwardRecord>,
{
    let mut buckets: BTreeMap<&str, f64> = BTreeMap::new();

    for record in records {
        if record.year.as_deref() != Some(year) {
            continue;
        }
        let week = record.week_start.as_deref().unwrap_or("");
        *buckets.entry(week).or_insert(0.0) += record.amount;
    }

    buckets
        .into_iter()
        .map(|(week_start, amount)| WeekSum {
            week_start: week_start.to_string(),
            amount,
        })
        .collect()
}

/// Running prefix sum over already-sorted weekly sums.
pub fn cumulative(weeks: &[WeekSum]) -> Series {
    let mut running = 0.0;
    let mut series = Series::default();

    for week in weeks {
        running += week.amount;
        series.dates.push(week.week_start.clone());
        series.cumulative.push(running);
    }

    series.total = series.cumulative.last().copied().unwrap_or(0.0);
    series
}

pub fn aggregate(subset: &[&AwardRecord]) -> WeeklyAggregate {
    WeeklyAggregate {
        baseline: cumulative(&weekly_sums(subset.iter().copied(), YEAR_BASELINE)),
        current: cumulative(&weekly_sums(subset.iter().copied(), YEAR_CURRENT)),
    }
}
