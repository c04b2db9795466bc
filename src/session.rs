use std::io::Write;
use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::chart::HtmlDashboard;
use crate::controls::{self, Command, ControlPanel, MultiControl};
use crate::dashboard::{Dashboard, Surfaces};
use crate::report::TextDisplay;

/// Institution values, with the "(all)" label standing in for the sentinel.
pub fn write_institution_options<W: Write>(
    panel: &ControlPanel,
    out: &mut W,
) -> std::io::Result<()> {
    for (label, value) in panel.institution_options() {
        if value.is_empty() {
            writeln!(out, "{label}")?;
        } else {
            writeln!(out, "{value}")?;
        }
    }
    Ok(())
}

pub fn write_options<W: Write>(
    panel: &ControlPanel,
    control: MultiControl,
    out: &mut W,
) -> std::io::Result<()> {
    let options = panel.multi(control).options();
    if options.is_empty() {
        writeln!(out, "No {control} options available.")?;
    }
    for value in options {
        writeln!(out, "{value}")?;
    }
    Ok(())
}

/// Renders to the text output and, when given, the dashboard page. A failed
/// render is logged and reported on `out`; the session carries on.
fn render_current<W: Write>(
    dashboard: &Dashboard,
    panel: &ControlPanel,
    page: Option<&mut HtmlDashboard>,
    out: &mut W,
) {
    let result = {
        let mut text = TextDisplay::new(&mut *out);
        let mut surfaces = Surfaces::default().attach(&mut text);
        if let Some(page) = page {
            surfaces = surfaces.attach(page);
        }
        dashboard.render(&panel.selection(), &mut surfaces)
    };

    if let Err(err) = result {
        warn!("render failed: {err:#}");
        let _ = writeln!(out, "render failed: {err:#}");
    }
}

/// Reads one command per line and re-renders after every accepted change.
/// Returns once the input ends or `quit` is read.
pub async fn run_session<R, W>(
    dashboard: &Dashboard,
    input: R,
    out: &mut W,
    html: Option<PathBuf>,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut panel = ControlPanel::populate(dashboard.store().picklists());
    let mut page = html.map(HtmlDashboard::new);

    render_current(dashboard, &panel, page.as_mut(), out);
    writeln!(out, "{}", controls::USAGE)?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match controls::parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                writeln!(out, "{err}. {}", controls::USAGE)?;
                continue;
            }
        };

        match command {
            Command::Change(event) => {
                debug!(?event, "control changed");
                if let Err(err) = panel.apply(event) {
                    warn!("ignored change: {err:#}");
                    writeln!(out, "{err}")?;
                    continue;
                }
                render_current(dashboard, &panel, page.as_mut(), out);
            }
            Command::Show => render_current(dashboard, &panel, page.as_mut(), out),
            Command::Options(Some(control)) => write_options(&panel, control, out)?,
            Command::Options(None) => write_institution_options(&panel, out)?,
            Command::Help => writeln!(out, "{}", controls::USAGE)?,
            Command::Quit => break,
        }
        out.flush()?;
    }

    Ok(())
}
