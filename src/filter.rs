use std::collections::BTreeSet;

use crate::models::{
    AwardRecord, FilterSelection, TYPE_COMPETING_RENEWAL, TYPE_NEW, TYPE_SUPPLEMENT,
};

/// New awards are always admitted; the flags only re-admit renewals and
/// supplements, so "other" never passes.
pub fn allowed_types(selection: &FilterSelection) -> BTreeSet<&'static str> {
    let mut allowed = BTreeSet::from([TYPE_NEW]);
    if selection.include_renewals {
        allowed.insert(TYPE_COMPETING_RENEWAL);
    }
    if selection.include_supplements {
        allowed.insert(TYPE_SUPPLEMENT);
    }
    allowed
}

pub fn filter_records<'a>(
    records: &'a [AwardRecord],
    selection: &FilterSelection,
) -> Vec<&'a AwardRecord> {
    let allowed = allowed_types(selection);
    records
        .iter()
        .filter(|record| passes(record, selection, &allowed))
        .collect()
}

fn passes(record: &AwardRecord, selection: &FilterSelection, allowed: &BTreeSet<&str>) -> bool {
    if !allowed.contains(record.type_category()) {
        return false;
    }

    if let Some(institution) = selection.institution.as_deref().filter(|v| !v.is_empty()) {
        if record.org_name_norm.as_deref().unwrap_or("") != institution {
            return false;
        }
    }

    in_set(&selection.admin_ics, record.admin_ic.as_deref())
        && in_set(&selection.mechanisms, record.mechanism.as_deref())
        && in_set(&selection.activity_codes, record.activity_code.as_deref())
}

// An empty selection means the dimension is unfiltered.
fn in_set(selected: &BTreeSet<String>, value: Option<&str>) -> bool {
    selected.is_empty() || selected.contains(value.unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(org: Option<&str>, ic: Option<&str>, kind: Option<&str>) -> AwardRecord {
        AwardRecord {
            org_name_norm: org.map(str::to_string),
            admin_ic: ic.map(str::to_string),
            mechanism: Some("R".to_string()),
            activity_code: Some("R01".to_string()),
            type_category: kind.map(str::to_string),
            year: Some("2025".to_string()),
            week_start: Some("2025-01-06".to_string()),
            amount: 10.0,
        }
    }

    #[test]
    fn default_flags_only_admit_new() {
        let selection = FilterSelection::default();
        assert_eq!(allowed_types(&selection), BTreeSet::from([TYPE_NEW]));

        let records = vec![
            record(None, None, Some("new")),
            record(None, None, Some("competing_renewal")),
            record(None, None, Some("supplement")),
            record(None, None, Some("other")),
            record(None, None, None),
        ];
        let kept = filter_records(&records, &selection);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].type_category(), "new");
    }

    #[test]
    fn flags_never_readmit_other() {
        let selection = FilterSelection {
            include_renewals: true,
            include_supplements: true,
            ..Default::default()
        };
        let records = vec![
            record(None, None, Some("new")),
            record(None, None, Some("competing_renewal")),
            record(None, None, Some("supplement")),
            record(None, None, Some("other")),
            record(None, None, Some("extension")),
            record(None, None, None),
        ];
        assert_eq!(filter_records(&records, &selection).len(), 3);
    }

    #[test]
    fn institution_must_match_exactly() {
        let records = vec![
            record(Some("Johns Hopkins University"), None, Some("new")),
            record(Some("johns hopkins university"), None, Some("new")),
            record(None, None, Some("new")),
        ];
        let selection = FilterSelection {
            institution: Some("Johns Hopkins University".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_records(&records, &selection).len(), 1);

        let all = FilterSelection {
            institution: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filter_records(&records, &all).len(), 3);
    }

    #[test]
    fn multi_select_dimensions_combine_with_and() {
        let mut other_mech = record(Some("A"), Some("NCI"), Some("new"));
        other_mech.mechanism = Some("U".to_string());
        let records = vec![
            record(Some("A"), Some("NCI"), Some("new")),
            record(Some("A"), Some("NIA"), Some("new")),
            record(Some("A"), None, Some("new")),
            other_mech,
        ];
        let selection = FilterSelection {
            admin_ics: BTreeSet::from(["NCI".to_string(), "NHLBI".to_string()]),
            mechanisms: BTreeSet::from(["R".to_string()]),
            ..Default::default()
        };
        let kept = filter_records(&records, &selection);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].admin_ic.as_deref(), Some("NCI"));
        assert_eq!(kept[0].mechanism.as_deref(), Some("R"));
    }

    #[test]
    fn every_kept_record_satisfies_all_predicates() {
        let mut records = Vec::new();
        for ic in [Some("NCI"), Some("NIA"), None] {
            for kind in [Some("new"), Some("supplement"), Some("other"), None] {
                for org in [Some("A"), Some("B"), None] {
                    records.push(record(org, ic, kind));
                }
            }
        }
        let selection = FilterSelection {
            institution: Some("B".to_string()),
            admin_ics: BTreeSet::from(["NIA".to_string()]),
            include_supplements: true,
            ..Default::default()
        };
        let kept = filter_records(&records, &selection);
        assert_eq!(kept.len(), 2);
        for r in kept {
            assert_eq!(r.org_name_norm.as_deref(), Some("B"));
            assert_eq!(r.admin_ic.as_deref(), Some("NIA"));
            assert!(matches!(r.type_category(), "new" | "supplement"));
        }
    }
}
