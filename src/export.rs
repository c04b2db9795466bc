use std::io::Write;

use serde::Serialize;

use crate::aggregate::{cumulative, weekly_sums};
use crate::filter::filter_records;
use crate::models::{AwardRecord, FilterSelection, YEAR_BASELINE, YEAR_CURRENT};

#[derive(Debug, Serialize)]
struct SeriesRow<'a> {
    year: &'a str,
    week_start: &'a str,
    weekly_amount: f64,
    cumulative_amount: f64,
}

/// Writes both years' weekly and running totals as CSV, 2024 first.
pub fn write_series_csv<W: Write>(
    records: &[AwardRecord],
    selection: &FilterSelection,
    out: W,
) -> anyhow::Result<usize> {
    let subset = filter_records(records, selection);
    let mut writer = csv::Writer::from_writer(out);
    let mut rows = 0usize;

    for year in [YEAR_BASELINE, YEAR_CURRENT] {
        let weeks = weekly_sums(subset.iter().copied(), year);
        let series = cumulative(&weeks);
        for (week, running) in weeks.iter().zip(series.cumulative.iter()) {
            writer.serialize(SeriesRow {
                year,
                week_start: &week.week_start,
                weekly_amount: week.amount,
                cumulative_amount: *running,
            })?;
            rows += 1;
        }
    }

    writer.flush()?;
    Ok(rows)
}
