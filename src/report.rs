use std::fmt::Write as _;
use std::io::Write;

use chrono::{Datelike, NaiveDate};

use crate::chart::{Figure, HtmlDashboard, Plotter};
use crate::models::{PicklistMeta, SummaryText, WeeklyAggregate};

pub const PERCENT_UNAVAILABLE: &str = "n/a";

/// US-dollar text with no cents, e.g. `$1,234,568` or `-$40`.
pub fn format_usd(value: f64) -> String {
    let rounded = value.round();
    if rounded == 0.0 || !rounded.is_finite() {
        return "$0".to_string();
    }

    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// 2025 as a whole percentage of 2024; undefined unless 2024 is positive.
pub fn percent_of_baseline(current: f64, baseline: f64) -> String {
    if baseline > 0.0 {
        // Halves round toward +inf; adding 0.0 turns -0 into 0.
        let percent = (current / baseline * 100.0 + 0.5).floor() + 0.0;
        format!("{percent:.0}%")
    } else {
        PERCENT_UNAVAILABLE.to_string()
    }
}

pub fn summarize(aggregate: &WeeklyAggregate) -> SummaryText {
    SummaryText {
        total_2025: format_usd(aggregate.current.total),
        total_2024: format_usd(aggregate.baseline.total),
        percent: percent_of_baseline(aggregate.current.total, aggregate.baseline.total),
    }
}

/// Describes the comparison window, only when the 2025 cutoff is known.
pub fn cutoff_note(meta: &PicklistMeta) -> Option<String> {
    let cutoff_2025 = meta.cutoff_2025.as_deref()?;
    let cutoff_2024 = match meta.cutoff_2024.as_deref() {
        Some(date) => Some(date.to_string()),
        None => NaiveDate::parse_from_str(cutoff_2025, "%Y-%m-%d")
            .ok()
            .and_then(same_day_in_2024)
            .map(|date| date.to_string()),
    };

    Some(match cutoff_2024 {
        Some(baseline) => format!(
            "2025 year-to-date through {cutoff_2025}, compared with 2024 through {baseline}."
        ),
        None => format!("2025 year-to-date through {cutoff_2025}."),
    })
}

fn same_day_in_2024(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, date.month(), date.day())
}

pub trait SummaryDisplay {
    fn show_summary(&mut self, summary: &SummaryText);
    fn show_note(&mut self, note: Option<&str>);
}

impl SummaryDisplay for HtmlDashboard {
    fn show_summary(&mut self, summary: &SummaryText) {
        self.set_summary(summary);
    }

    fn show_note(&mut self, note: Option<&str>) {
        self.set_note(note);
    }
}

/// Plain-text display surface, usually stdout.
pub struct TextDisplay<W: Write> {
    out: W,
}

impl<W: Write> TextDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> SummaryDisplay for TextDisplay<W> {
    fn show_summary(&mut self, summary: &SummaryText) {
        let mut output = String::new();
        let _ = writeln!(output, "2025 YTD: {}", summary.total_2025);
        let _ = writeln!(output, "2024 YTD: {}", summary.total_2024);
        let _ = writeln!(output, "2025 as % of 2024: {}", summary.percent);
        let _ = self.out.write_all(output.as_bytes());
    }

    fn show_note(&mut self, note: Option<&str>) {
        if let Some(note) = note {
            let _ = writeln!(self.out, "{note}");
        }
    }
}

impl<W: Write> Plotter for TextDisplay<W> {
    fn plot(&mut self, figure: &Figure) -> anyhow::Result<()> {
        if figure.data.is_empty() {
            writeln!(self.out, "No weekly data for this selection.")?;
        }
        for trace in &figure.data {
            let first = trace.x.first().map(String::as_str).unwrap_or("");
            let last = trace.x.last().map(String::as_str).unwrap_or("");
            writeln!(
                self.out,
                "- {}: {} weeks ({} to {}), cumulative {}",
                trace.name,
                trace.x.len(),
                first,
                last,
                format_usd(trace.y.last().copied().unwrap_or(0.0))
            )?;
        }
        self.out.flush()?;
        Ok(())
    }
}
