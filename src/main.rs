use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod aggregate;
mod chart;
mod controls;
mod dashboard;
mod export;
mod filter;
mod models;
mod report;
mod session;
mod store;

use chart::{HtmlDashboard, JsonFigureFile};
use controls::{ControlPanel, MultiControl};
use dashboard::{Dashboard, Surfaces};
use models::FilterSelection;
use report::TextDisplay;

#[derive(Parser)]
#[command(name = "award-ytd")]
#[command(about = "Year-to-date award dollars, 2025 against 2024, by week", long_about = None)]
struct Cli {
    /// Pre-computed weekly award records (JSON array)
    #[arg(long, global = true, env = "YTD_DATA_PATH", default_value = "pages/data/ytd_2024_2025.json")]
    data: PathBuf,
    /// Filter pick-lists (JSON object); optional
    #[arg(long, global = true, env = "YTD_PICKLISTS_PATH", default_value = "pages/data/picklists.json")]
    picklists: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Normalized institution name; omit for all institutions
    #[arg(long)]
    institution: Option<String>,
    /// Administering IC (repeatable)
    #[arg(long = "ic")]
    ics: Vec<String>,
    /// Funding mechanism (repeatable)
    #[arg(long = "mechanism")]
    mechanisms: Vec<String>,
    /// Activity code (repeatable)
    #[arg(long = "activity-code")]
    activity_codes: Vec<String>,
    #[arg(long)]
    include_renewals: bool,
    #[arg(long)]
    include_supplements: bool,
}

impl FilterArgs {
    fn selection(&self) -> FilterSelection {
        FilterSelection {
            institution: self.institution.clone().filter(|value| !value.is_empty()),
            admin_ics: self.ics.iter().cloned().collect::<BTreeSet<_>>(),
            mechanisms: self.mechanisms.iter().cloned().collect(),
            activity_codes: self.activity_codes.iter().cloned().collect(),
            include_renewals: self.include_renewals,
            include_supplements: self.include_supplements,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OptionList {
    Institution,
    Ic,
    Mechanism,
    Activity,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the summary and chart once
    Render {
        #[command(flatten)]
        filters: FilterArgs,
        /// Write a standalone dashboard page
        #[arg(long)]
        html: Option<PathBuf>,
        /// Write the chart figure as JSON
        #[arg(long)]
        chart_json: Option<PathBuf>,
    },
    /// Change filters line by line on stdin, re-rendering after each change
    Interactive {
        /// Dashboard page rewritten after every change
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// List the values a filter control offers
    Options {
        #[arg(value_enum)]
        control: OptionList,
    },
    /// Export weekly and cumulative totals as CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "ytd_series.csv")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = store::load(&cli.data, &cli.picklists)
        .await
        .context("failed to load dashboard data")?;
    let dashboard = Dashboard::new(store);

    match cli.command {
        Commands::Render {
            filters,
            html,
            chart_json,
        } => {
            let mut text = TextDisplay::new(std::io::stdout());
            let mut page = html.map(HtmlDashboard::new);
            let mut figure_file = chart_json.map(JsonFigureFile::new);

            let mut surfaces = Surfaces::default().attach(&mut text);
            if let Some(page) = page.as_mut() {
                surfaces = surfaces.attach(page);
            }
            if let Some(figure_file) = figure_file.as_mut() {
                surfaces = surfaces.attach(figure_file);
            }
            dashboard.render(&filters.selection(), &mut surfaces)?;
            drop(surfaces);

            if let Some(page) = &page {
                info!(path = %page.path().display(), "dashboard page written");
            }
        }
        Commands::Interactive { html } => {
            let input = BufReader::new(tokio::io::stdin());
            session::run_session(&dashboard, input, &mut std::io::stdout(), html).await?;
        }
        Commands::Options { control } => {
            let panel = ControlPanel::populate(dashboard.store().picklists());
            let mut out = std::io::stdout();
            match control {
                OptionList::Institution => session::write_institution_options(&panel, &mut out)?,
                OptionList::Ic => session::write_options(&panel, MultiControl::AdminIc, &mut out)?,
                OptionList::Mechanism => {
                    session::write_options(&panel, MultiControl::Mechanism, &mut out)?
                }
                OptionList::Activity => {
                    session::write_options(&panel, MultiControl::ActivityCode, &mut out)?
                }
            }
        }
        Commands::Export { filters, out } => {
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            let rows =
                export::write_series_csv(dashboard.store().records(), &filters.selection(), file)?;
            println!("Wrote {rows} weekly rows to {}.", out.display());
        }
    }

    Ok(())
}
