use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Named reference to a vendor report, identified by an opaque numeric ID.
///
/// The descriptor list is configuration data: the built-in set below covers
/// the known flooring dealers, and a `reports.json` file in the source
/// directory overrides it without a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDescriptor {
    /// Vendor-assigned report identifier.
    pub id: u64,
    /// Human-readable dealer name used for filtering and log lines.
    pub name: String,
}

impl ReportDescriptor {
    fn new(id: u64, name: &str) -> Self {
        ReportDescriptor {
            id,
            name: name.to_string(),
        }
    }
}

/// The dealers configured when no `reports.json` override is present.
pub fn builtin_reports() -> Vec<ReportDescriptor> {
    vec![
        ReportDescriptor::new(7487692708571012, "Boat Country Flooring"),
        ReportDescriptor::new(2403688380688260, "Clemens Flooring"),
        ReportDescriptor::new(5706277981579140, "Idaho Marine Flooring"),
        ReportDescriptor::new(363956872210308, "Port Boat House Flooring"),
        ReportDescriptor::new(7470375400433540, "Valley Marine Flooring"),
        ReportDescriptor::new(8526731196819332, "Y-Marina Flooring"),
    ]
}

/// Loads descriptors from `path` when it exists, falling back to the
/// built-in list otherwise. List order is preserved either way.
pub fn load_reports(path: &Path) -> Result<Vec<ReportDescriptor>> {
    if !path.exists() {
        return Ok(builtin_reports());
    }
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// The descriptor list as configured for this run: the `reports.json`
/// override inside `source_dir` when one is present, the built-in list when
/// no source directory (or no override) is available.
pub fn configured_reports(source_dir: Option<&Path>) -> Result<Vec<ReportDescriptor>> {
    match source_dir {
        Some(dir) => load_reports(&dir.join("reports.json")),
        None => Ok(builtin_reports()),
    }
}

/// Applies the CLI dealer filters to the configured list.
///
/// A non-empty include list restricts the selection to exactly those names;
/// the exclude list then removes any matches. Both filters match on the full
/// dealer name.
pub fn select(
    reports: &[ReportDescriptor],
    include: &[String],
    exclude: &[String],
) -> Vec<ReportDescriptor> {
    reports
        .iter()
        .filter(|report| include.is_empty() || include.iter().any(|name| *name == report.name))
        .filter(|report| !exclude.iter().any(|name| *name == report.name))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_filters_selects_everything() {
        let reports = builtin_reports();
        let selected = select(&reports, &[], &[]);
        assert_eq!(selected, reports);
    }

    #[test]
    fn include_filter_restricts_to_named_dealers() {
        let reports = builtin_reports();
        let selected = select(&reports, &["Clemens Flooring".to_string()], &[]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "Clemens Flooring");
    }

    #[test]
    fn exclude_filter_removes_included_dealer() {
        let reports = builtin_reports();
        let include = vec!["Clemens Flooring".to_string()];
        let exclude = vec!["Clemens Flooring".to_string()];
        assert!(select(&reports, &include, &exclude).is_empty());
    }

    #[test]
    fn exclude_filter_alone_drops_one_dealer() {
        let reports = builtin_reports();
        let selected = select(&reports, &[], &["Y-Marina Flooring".to_string()]);
        assert_eq!(selected.len(), reports.len() - 1);
        assert!(selected.iter().all(|r| r.name != "Y-Marina Flooring"));
    }

    #[test]
    fn descriptor_file_overrides_builtin_list() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("reports.json");
        std::fs::write(
            &path,
            r#"[{"id": 42, "name": "Test Dealer Flooring"}]"#,
        )
        .expect("descriptor file written");

        let reports = load_reports(&path).expect("descriptors loaded");
        assert_eq!(
            reports,
            vec![ReportDescriptor::new(42, "Test Dealer Flooring")]
        );
    }

    #[test]
    fn missing_descriptor_file_falls_back_to_builtin() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let reports = load_reports(&dir.path().join("absent.json")).expect("fallback");
        assert_eq!(reports, builtin_reports());
    }

    #[test]
    fn configured_reports_honor_the_source_dir_override() {
        let dir = tempfile::tempdir().expect("temporary directory");
        std::fs::write(
            dir.path().join("reports.json"),
            r#"[{"id": 7, "name": "Override Flooring"}]"#,
        )
        .expect("descriptor file written");

        let reports = configured_reports(Some(dir.path())).expect("override loaded");
        assert_eq!(reports, vec![ReportDescriptor::new(7, "Override Flooring")]);
        assert_eq!(configured_reports(None).expect("fallback"), builtin_reports());
    }
}
