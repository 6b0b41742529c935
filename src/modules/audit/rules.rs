use serde::Serialize;
use std::fmt;

use crate::modules::catalog::domain::VenueRecord;

/// Number of checks in [`run_checks`]. The completeness score treats every
/// record as having exactly this many chances to fail.
pub const CHECK_COUNT: usize = 11;

const MIN_DESCRIPTION_CHARS: usize = 50;
const IMAGE_TARGET: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        write!(f, "{}", label)
    }
}

/// One rule violation on one record. Ephemeral: reported, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditIssue {
    pub venue_id: String,
    pub field: &'static str,
    pub message: String,
    pub severity: Severity,
    pub current_value: Option<String>,
}

fn issue(
    record: &VenueRecord,
    field: &'static str,
    severity: Severity,
    message: String,
    current_value: Option<String>,
) -> AuditIssue {
    AuditIssue {
        venue_id: record.id.clone(),
        field,
        message,
        severity,
        current_value,
    }
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or("").is_empty()
}

/// Runs the fixed check set against one record, in a fixed order, each check
/// yielding at most one issue. Checks never fail; a field that cannot be
/// evaluated is simply reported as the corresponding issue.
pub fn run_checks(record: &VenueRecord) -> Vec<AuditIssue> {
    let mut issues = Vec::new();

    match record.coordinates {
        None => issues.push(issue(
            record,
            "coordinates",
            Severity::Critical,
            "coordinates are missing".to_string(),
            None,
        )),
        Some(point) if !point.is_valid() => issues.push(issue(
            record,
            "coordinates",
            Severity::Critical,
            "coordinates are outside the valid range".to_string(),
            Some(point.to_string()),
        )),
        Some(_) => {}
    }

    // Stock placeholders are deliberately not counted here.
    let image_count = record.countable_image_count();
    if image_count == 0 {
        issues.push(issue(
            record,
            "images",
            Severity::High,
            "no images".to_string(),
            None,
        ));
    } else if image_count < IMAGE_TARGET {
        issues.push(issue(
            record,
            "images",
            Severity::Medium,
            format!("only {} of {} images", image_count, IMAGE_TARGET),
            Some(image_count.to_string()),
        ));
    }

    if record.venue_types.is_empty() {
        issues.push(issue(
            record,
            "venue_types",
            Severity::High,
            "no classification tags".to_string(),
            None,
        ));
    }

    if record.settings.is_empty() {
        issues.push(issue(
            record,
            "settings",
            Severity::High,
            "no indoor/outdoor setting".to_string(),
            None,
        ));
    }

    if blank(&record.website) {
        issues.push(issue(
            record,
            "website",
            Severity::High,
            "no website".to_string(),
            None,
        ));
    }

    let description_len = record
        .description
        .as_deref()
        .map(|d| d.trim().chars().count())
        .unwrap_or(0);
    if description_len < MIN_DESCRIPTION_CHARS {
        issues.push(issue(
            record,
            "description",
            Severity::Medium,
            format!(
                "description under {} characters",
                MIN_DESCRIPTION_CHARS
            ),
            Some(description_len.to_string()),
        ));
    }

    if record.capacity.is_inverted() {
        issues.push(issue(
            record,
            "capacity",
            Severity::Medium,
            "capacity minimum exceeds maximum".to_string(),
            Some(format!("{:?}..{:?}", record.capacity.min, record.capacity.max)),
        ));
    }

    if record.price.is_inverted() {
        issues.push(issue(
            record,
            "price",
            Severity::Medium,
            "price minimum exceeds maximum".to_string(),
            Some(format!("{:?}..{:?}", record.price.min, record.price.max)),
        ));
    }

    if blank(&record.phone) {
        issues.push(issue(
            record,
            "phone",
            Severity::Low,
            "no phone number".to_string(),
            None,
        ));
    }

    if record.rating.is_none() {
        issues.push(issue(
            record,
            "rating",
            Severity::Low,
            "no rating".to_string(),
            None,
        ));
    }

    if blank(&record.subregion) {
        issues.push(issue(
            record,
            "subregion",
            Severity::Low,
            "no subregion".to_string(),
            None,
        ));
    }

    issues
}

/// Share of passed checks across an audited slice, as a whole percentage.
/// An empty slice has nothing wrong with it.
pub fn completeness_score(record_count: usize, total_issues: usize) -> i32 {
    if record_count == 0 {
        return 100;
    }
    let checks = (record_count * CHECK_COUNT) as f64;
    let score = 100.0 * (1.0 - total_issues as f64 / checks);
    (score.round() as i32).clamp(0, 100)
}
