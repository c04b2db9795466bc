use tracing::debug;

use crate::aggregate::aggregate;
use crate::chart::{build_figure, Figure, Plotter};
use crate::filter::filter_records;
use crate::models::{FilterSelection, SummaryText, WeeklyAggregate};
use crate::report::{cutoff_note, summarize, SummaryDisplay};
use crate::store::DatasetStore;

pub struct Dashboard {
    store: DatasetStore,
}

impl Dashboard {
    pub fn new(store: DatasetStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    /// Filter then aggregate; recomputed from scratch on every call.
    pub fn compute(&self, selection: &FilterSelection) -> WeeklyAggregate {
        let subset = filter_records(self.store.records(), selection);
        let result = aggregate(&subset);
        debug!(
            matched = subset.len(),
            total_2025 = result.current.total,
            total_2024 = result.baseline.total,
            "aggregated selection"
        );
        result
    }

    /// Runs the whole pipeline and pushes the result to the display surfaces.
    pub fn render<S>(&self, selection: &FilterSelection, surface: &mut S) -> anyhow::Result<()>
    where
        S: SummaryDisplay + Plotter + ?Sized,
    {
        let result = self.compute(selection);
        surface.show_summary(&summarize(&result));
        surface.show_note(cutoff_note(&self.store.picklists().meta).as_deref());
        surface.plot(&build_figure(&result))
    }
}

/// Anything that can both show the summary and draw the chart.
pub trait Surface: SummaryDisplay + Plotter {}

impl<T: SummaryDisplay + Plotter + ?Sized> Surface for T {}

/// Fans one render out to every attached surface.
#[derive(Default)]
pub struct Surfaces<'a> {
    members: Vec<&'a mut dyn Surface>,
}

impl<'a> Surfaces<'a> {
    pub fn attach(mut self, surface: &'a mut dyn Surface) -> Self {
        self.members.push(surface);
        self
    }
}

impl SummaryDisplay for Surfaces<'_> {
    fn show_summary(&mut self, summary: &SummaryText) {
        for member in self.members.iter_mut() {
            member.show_summary(summary);
        }
    }

    fn show_note(&mut self, note: Option<&str>) {
        for member in self.members.iter_mut() {
            member.show_note(note);
        }
    }
}

impl Plotter for Surfaces<'_> {
    fn plot(&mut self, figure: &Figure) -> anyhow::Result<()> {
        for member in self.members.iter_mut() {
            member.plot(figure)?;
        }
        Ok(())
    }
}
