use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

use crate::models::{Series, SummaryText, WeeklyAggregate, YEAR_BASELINE, YEAR_CURRENT};
use crate::report::SummaryDisplay;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub mode: &'static str,
    pub line: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: AxisTitle,
    #[serde(rename = "tickformat", skip_serializing_if = "Option::is_none")]
    pub tick_format: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub text: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub orientation: &'static str,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub legend: Legend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotConfig {
    pub display_mode_bar: bool,
    pub responsive: bool,
}

/// Everything the plotting library needs for one draw call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
    pub config: PlotConfig,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            xaxis: Axis {
                title: AxisTitle { text: "Week" },
                tick_format: None,
            },
            yaxis: Axis {
                title: AxisTitle {
                    text: "Cumulative award dollars",
                },
                tick_format: Some("~s"),
            },
            legend: Legend {
                orientation: "h",
                y: -0.2,
            },
        }
    }
}

fn trace(name: &str, series: &Series, line: LineStyle) -> Trace {
    Trace {
        name: name.to_string(),
        x: series.dates.clone(),
        y: series.cumulative.clone(),
        mode: "lines",
        line,
    }
}

/// Years without any weeks get no trace at all.
pub fn build_figure(aggregate: &WeeklyAggregate) -> Figure {
    let mut data = Vec::with_capacity(2);

    if !aggregate.current.is_empty() {
        data.push(trace(
            YEAR_CURRENT,
            &aggregate.current,
            LineStyle {
                width: 3.0,
                dash: None,
            },
        ));
    }
    if !aggregate.baseline.is_empty() {
        data.push(trace(
            YEAR_BASELINE,
            &aggregate.baseline,
            LineStyle {
                width: 2.0,
                dash: Some("dash"),
            },
        ));
    }

    Figure {
        data,
        layout: Layout::default(),
        config: PlotConfig {
            display_mode_bar: false,
            responsive: true,
        },
    }
}

/// The external drawing collaborator.
pub trait Plotter {
    fn plot(&mut self, figure: &Figure) -> anyhow::Result<()>;
}

/// Writes the figure as JSON, for hosts that draw it themselves.
pub struct JsonFigureFile {
    path: PathBuf,
}

impl JsonFigureFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

// The figure file carries no summary text.
impl SummaryDisplay for JsonFigureFile {
    fn show_summary(&mut self, _summary: &SummaryText) {}

    fn show_note(&mut self, _note: Option<&str>) {}
}

impl Plotter for JsonFigureFile {
    fn plot(&mut self, figure: &Figure) -> anyhow::Result<()> {
        let body = serde_json::to_string_pretty(figure)?;
        std::fs::write(&self.path, body)
            .with_context(|| format!("failed to write chart to {}", self.path.display()))
    }
}

/// A standalone dashboard page; rewritten on every draw with the latest
/// summary and note it has been handed.
pub struct HtmlDashboard {
    path: PathBuf,
    summary: Option<SummaryText>,
    note: Option<String>,
}

impl HtmlDashboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            summary: None,
            note: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_summary(&mut self, summary: &SummaryText) {
        self.summary = Some(summary.clone());
    }

    pub fn set_note(&mut self, note: Option<&str>) {
        self.note = note.map(str::to_string);
    }

    pub fn to_html(&self, figure: &Figure) -> anyhow::Result<String> {
        let figure_json = serde_json::to_string(figure)?;
        let mut output = String::new();

        let _ = writeln!(output, "<!doctype html>");
        let _ = writeln!(output, "<html lang=\"en\"><head><meta charset=\"utf-8\">");
        let _ = writeln!(output, "<title>Award dollars, 2025 vs 2024 YTD</title>");
        let _ = writeln!(output, "<script src=\"{PLOTLY_CDN}\"></script>");
        let _ = writeln!(output, "<style>body{{font-family:system-ui,sans-serif;margin:24px}}.kpis{{display:flex;gap:32px}}.kpi .value{{font-size:28px;font-weight:700}}#chart{{width:100%;height:480px}}.note{{color:#666;font-size:13px}}</style>");
        let _ = writeln!(output, "</head><body>");

        if let Some(summary) = &self.summary {
            let _ = writeln!(output, "<div class=\"kpis\">");
            for (label, value) in [
                ("2025 YTD", &summary.total_2025),
                ("2024 YTD", &summary.total_2024),
                ("2025 as % of 2024", &summary.percent),
            ] {
                let _ = writeln!(
                    output,
                    "<div class=\"kpi\"><div>{}</div><div class=\"value\">{}</div></div>",
                    label,
                    html_escape(value)
                );
            }
            let _ = writeln!(output, "</div>");
        }

        let _ = writeln!(output, "<div id=\"chart\"></div>");
        if let Some(note) = &self.note {
            let _ = writeln!(output, "<p class=\"note\">{}</p>", html_escape(note));
        }
        let _ = writeln!(output, "<script>");
        let _ = writeln!(output, "const fig = {};", script_safe(&figure_json));
        let _ = writeln!(
            output,
            "Plotly.newPlot('chart', fig.data, fig.layout, fig.config);"
        );
        let _ = writeln!(output, "</script>");
        let _ = writeln!(output, "</body></html>");

        Ok(output)
    }
}

impl Plotter for HtmlDashboard {
    fn plot(&mut self, figure: &Figure) -> anyhow::Result<()> {
        let page = self.to_html(figure)?;
        std::fs::write(&self.path, page)
            .with_context(|| format!("failed to write dashboard to {}", self.path.display()))
    }
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// Institution names end up in the page only through the figure JSON, which
// must not be able to close the script element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}
