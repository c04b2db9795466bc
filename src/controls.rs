use std::collections::BTreeSet;
use std::fmt;

use anyhow::{bail, Context};

use crate::models::{FilterSelection, Picklists};

pub const ALL_INSTITUTIONS_LABEL: &str = "(all)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiControl {
    AdminIc,
    Mechanism,
    ActivityCode,
}

impl MultiControl {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "ic" | "ics" => Some(Self::AdminIc),
            "mechanism" | "mechanisms" => Some(Self::Mechanism),
            "activity" | "activity_code" | "activity_codes" => Some(Self::ActivityCode),
            _ => None,
        }
    }
}

impl fmt::Display for MultiControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AdminIc => "ic",
            Self::Mechanism => "mechanism",
            Self::ActivityCode => "activity",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    SetInstitution(String),
    Select(MultiControl, String),
    Deselect(MultiControl, String),
    Clear(MultiControl),
    SetRenewals(bool),
    SetSupplements(bool),
}

/// One line of an interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Change(ControlEvent),
    Show,
    Options(Option<MultiControl>),
    Help,
    Quit,
}

pub const USAGE: &str = "commands: institution <name|all> | ic|mechanism|activity add|remove <value> | \
ic|mechanism|activity clear | renewals on|off | supplements on|off | options [ic|mechanism|activity] | show | quit\n(bare `options` lists institutions)";

pub fn parse_command(line: &str) -> anyhow::Result<Command> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let command = match head {
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "options" if rest.is_empty() => Command::Options(None),
        "options" => Command::Options(Some(
            MultiControl::parse(rest).with_context(|| format!("unknown control {rest:?}"))?,
        )),
        "institution" => {
            let value = if rest.is_empty() || rest == "all" || rest == ALL_INSTITUTIONS_LABEL {
                String::new()
            } else {
                rest.to_string()
            };
            Command::Change(ControlEvent::SetInstitution(value))
        }
        "renewals" => Command::Change(ControlEvent::SetRenewals(parse_flag(rest)?)),
        "supplements" => Command::Change(ControlEvent::SetSupplements(parse_flag(rest)?)),
        other => {
            let Some(control) = MultiControl::parse(other) else {
                bail!("unknown command {other:?}");
            };
            let (action, value) = match rest.split_once(char::is_whitespace) {
                Some((action, value)) => (action, value.trim()),
                None => (rest, ""),
            };
            match (action, value) {
                ("clear", _) => Command::Change(ControlEvent::Clear(control)),
                ("add", value) if !value.is_empty() => {
                    Command::Change(ControlEvent::Select(control, value.to_string()))
                }
                ("remove", value) if !value.is_empty() => {
                    Command::Change(ControlEvent::Deselect(control, value.to_string()))
                }
                _ => bail!("expected `{control} add|remove <value>` or `{control} clear`"),
            }
        }
    };

    Ok(command)
}

fn parse_flag(word: &str) -> anyhow::Result<bool> {
    match word {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => bail!("expected on|off, got {other:?}"),
    }
}

/// A select element: its options and what is currently chosen.
#[derive(Debug, Clone, Default)]
pub struct MultiSelect {
    options: Vec<String>,
    selected: BTreeSet<String>,
}

impl MultiSelect {
    fn populate(&mut self, values: &[String]) {
        self.options = values.to_vec();
        self.selected.clear();
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    fn select(&mut self, control: MultiControl, value: String) -> anyhow::Result<()> {
        if !self.options.contains(&value) {
            bail!("{value:?} is not an option of {control}");
        }
        self.selected.insert(value);
        Ok(())
    }
}

/// The six dashboard controls.
#[derive(Debug, Clone, Default)]
pub struct ControlPanel {
    institutions: Vec<(String, String)>,
    institution: String,
    admin_ics: MultiSelect,
    mechanisms: MultiSelect,
    activity_codes: MultiSelect,
    include_renewals: bool,
    include_supplements: bool,
}

impl ControlPanel {
    pub fn populate(picklists: &Picklists) -> Self {
        let mut panel = Self::default();
        panel.institutions = std::iter::once((ALL_INSTITUTIONS_LABEL.to_string(), String::new()))
            .chain(
                picklists
                    .institutions
                    .iter()
                    .map(|name| (name.clone(), name.clone())),
            )
            .collect();
        panel.admin_ics.populate(&picklists.ics);
        panel.mechanisms.populate(&picklists.mechanisms);
        panel.activity_codes.populate(&picklists.activity_codes);
        panel
    }

    /// (label, value) pairs, starting with the "(all)" sentinel.
    pub fn institution_options(&self) -> &[(String, String)] {
        &self.institutions
    }

    pub fn multi(&self, control: MultiControl) -> &MultiSelect {
        match control {
            MultiControl::AdminIc => &self.admin_ics,
            MultiControl::Mechanism => &self.mechanisms,
            MultiControl::ActivityCode => &self.activity_codes,
        }
    }

    fn multi_mut(&mut self, control: MultiControl) -> &mut MultiSelect {
        match control {
            MultiControl::AdminIc => &mut self.admin_ics,
            MultiControl::Mechanism => &mut self.mechanisms,
            MultiControl::ActivityCode => &mut self.activity_codes,
        }
    }

    /// Applies a change event. Every accepted event warrants a full re-render,
    /// even when the value did not actually change.
    pub fn apply(&mut self, event: ControlEvent) -> anyhow::Result<()> {
        match event {
            ControlEvent::SetInstitution(value) => {
                if !self.institutions.iter().any(|(_, option)| *option == value) {
                    bail!("{value:?} is not an institution option");
                }
                self.institution = value;
            }
            ControlEvent::Select(control, value) => {
                self.multi_mut(control).select(control, value)?;
            }
            ControlEvent::Deselect(control, value) => {
                self.multi_mut(control).selected.remove(&value);
            }
            ControlEvent::Clear(control) => {
                self.multi_mut(control).selected.clear();
            }
            ControlEvent::SetRenewals(flag) => self.include_renewals = flag,
            ControlEvent::SetSupplements(flag) => self.include_supplements = flag,
        }
        Ok(())
    }

    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            institution: Some(self.institution.clone()).filter(|value| !value.is_empty()),
            admin_ics: self.admin_ics.selected.clone(),
            mechanisms: self.mechanisms.selected.clone(),
            activity_codes: self.activity_codes.selected.clone(),
            include_renewals: self.include_renewals,
            include_supplements: self.include_supplements,
        }
    }
}
