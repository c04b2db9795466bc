use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const TYPE_NEW: &str = "new";
pub const TYPE_COMPETING_RENEWAL: &str = "competing_renewal";
pub const TYPE_SUPPLEMENT: &str = "supplement";
pub const TYPE_OTHER: &str = "other";

pub const YEAR_CURRENT: &str = "2025";
pub const YEAR_BASELINE: &str = "2024";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AwardRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub org_name_norm: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub admin_ic: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mechanism: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub activity_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub type_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub week_start: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,
}

impl AwardRecord {
    pub fn type_category(&self) -> &str {
        self.type_category.as_deref().unwrap_or(TYPE_OTHER)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PicklistMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff_2025: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff_2024: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Picklists {
    #[serde(default)]
    pub institutions: Vec<String>,
    #[serde(default)]
    pub ics: Vec<String>,
    #[serde(default)]
    pub mechanisms: Vec<String>,
    #[serde(default)]
    pub activity_codes: Vec<String>,
    #[serde(default)]
    pub type_options: Vec<String>,
    #[serde(default)]
    pub meta: PicklistMeta,
}

/// Current values of the control panel, read fresh for every render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub institution: Option<String>,
    pub admin_ics: BTreeSet<String>,
    pub mechanisms: BTreeSet<String>,
    pub activity_codes: BTreeSet<String>,
    pub include_renewals: bool,
    pub include_supplements: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    pub dates: Vec<String>,
    pub cumulative: Vec<f64>,
    pub total: f64,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeeklyAggregate {
    #[serde(rename = "2024")]
    pub baseline: Series,
    #[serde(rename = "2025")]
    pub current: Series,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryText {
    pub total_2025: String,
    pub total_2024: String,
    pub percent: String,
}

// Anything other than a string reads as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        _ => None,
    })
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(match number.as_i64() {
            Some(whole) => whole.to_string(),
            None => match number.as_f64() {
                Some(float) if float.fract() == 0.0 && float.is_finite() => {
                    format!("{}", float as i64)
                }
                _ => number.to_string(),
            },
        }),
        _ => None,
    })
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let amount = match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => text.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if amount.is_finite() { amount } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_numeric_and_string_years() {
        let records: Vec<AwardRecord> = serde_json::from_str(
            r#"[{"year": 2024}, {"year": "2025"}, {"year": 2024.0}, {"year": null}, {}]"#,
        )
        .unwrap();
        let years: Vec<Option<&str>> = records.iter().map(|r| r.year.as_deref()).collect();
        assert_eq!(
            years,
            vec![Some("2024"), Some("2025"), Some("2024"), None, None]
        );
    }

    #[test]
    fn bad_amounts_become_zero() {
        let records: Vec<AwardRecord> = serde_json::from_str(
            r#"[{"amount": 12.5}, {"amount": "40"}, {"amount": "n/a"}, {"amount": null}, {}, {"amount": -3}]"#,
        )
        .unwrap();
        let amounts: Vec<f64> = records.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![12.5, 40.0, 0.0, 0.0, 0.0, -3.0]);
    }

    #[test]
    fn non_string_fields_read_as_absent() {
        let records: Vec<AwardRecord> = serde_json::from_str(
            r#"[
                {"org_name_norm": "Yale University", "admin_ic": "NCI", "week_start": "2025-01-06"},
                {"org_name_norm": 12, "admin_ic": 7, "mechanism": true, "activity_code": {"code": "R01"},
                 "type_category": ["new"], "week_start": 20250106, "year": 2025, "amount": 10}
            ]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].admin_ic.as_deref(), Some("NCI"));

        let dirty = &records[1];
        assert_eq!(dirty.org_name_norm, None);
        assert_eq!(dirty.admin_ic, None);
        assert_eq!(dirty.mechanism, None);
        assert_eq!(dirty.activity_code, None);
        assert_eq!(dirty.type_category(), TYPE_OTHER);
        assert_eq!(dirty.week_start, None);
        assert_eq!(dirty.year.as_deref(), Some("2025"));
        assert_eq!(dirty.amount, 10.0);
    }

    #[test]
    fn missing_type_defaults_to_other() {
        let record = AwardRecord::default();
        assert_eq!(record.type_category(), TYPE_OTHER);
    }

    #[test]
    fn picklists_ignore_unknown_keys() {
        let picklists: Picklists = serde_json::from_str(
            r#"{"ics": ["NCI"], "meta": {"cutoff_2025": "2025-03-14", "extra": 1}, "other": []}"#,
        )
        .unwrap();
        assert_eq!(picklists.ics, vec!["NCI".to_string()]);
        assert!(picklists.institutions.is_empty());
        assert_eq!(picklists.meta.cutoff_2025.as_deref(), Some("2025-03-14"));
    }
}
