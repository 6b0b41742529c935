use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Grouping key for attention notes that come from the runner itself rather
/// than a verification or audit finding.
pub const ERROR_KIND: &str = "error";

/// What processing one record contributed to the run.
#[derive(Debug, Default, Clone)]
pub struct RecordOutcome {
    pub changed: bool,
    pub flagged: bool,
    /// Writes a dry run would have made.
    pub planned: usize,
    pub provider_failures: usize,
    /// (finding kind, detail) lines surfaced in the end-of-run listing,
    /// grouped by kind when printed.
    pub notes: Vec<(String, String)>,
}

impl RecordOutcome {
    pub fn noop() -> Self {
        Self::default()
    }

    pub fn wrote() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }

    pub fn with_note(mut self, kind: impl Into<String>, note: impl Into<String>) -> Self {
        self.notes.push((kind.into(), note.into()));
        self
    }

    pub fn with_flag(mut self) -> Self {
        self.flagged = true;
        self
    }
}

/// Aggregated counters for one batch run, printed when the run ends.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub label: &'static str,
    pub processed: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub errored: usize,
    pub flagged: usize,
    pub planned: usize,
    pub provider_failures: usize,
    /// (venue id, finding kind, note) triples a human should look at.
    pub attention: Vec<(String, String, String)>,
    pub interrupted: bool,
    /// Offset of the first unprocessed record; pass as `--start` to resume.
    pub next_offset: i64,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn new(run_id: Uuid, label: &'static str) -> Self {
        Self {
            run_id,
            label,
            processed: 0,
            changed: 0,
            unchanged: 0,
            errored: 0,
            flagged: 0,
            planned: 0,
            provider_failures: 0,
            attention: Vec::new(),
            interrupted: false,
            next_offset: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn absorb(&mut self, venue_id: &str, outcome: RecordOutcome) {
        if outcome.changed {
            self.changed += 1;
        } else {
            self.unchanged += 1;
        }
        if outcome.flagged {
            self.flagged += 1;
        }
        self.planned += outcome.planned;
        self.provider_failures += outcome.provider_failures;
        for (kind, note) in outcome.notes {
            self.attention.push((venue_id.to_string(), kind, note));
        }
    }

    pub fn record_error(&mut self, venue_id: &str, detail: String) {
        self.errored += 1;
        self.attention
            .push((venue_id.to_string(), ERROR_KIND.to_string(), detail));
    }

    pub fn clean(&self) -> bool {
        self.errored == 0 && self.attention.is_empty() && !self.interrupted
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} run {} finished in {:.1}s",
            self.label,
            self.run_id,
            self.elapsed.as_secs_f64()
        )?;
        writeln!(
            f,
            "  processed: {}   changed: {}   unchanged: {}   errored: {}",
            self.processed, self.changed, self.unchanged, self.errored
        )?;
        writeln!(
            f,
            "  flagged: {}   planned: {}   provider failures: {}",
            self.flagged, self.planned, self.provider_failures
        )?;
        if !self.attention.is_empty() {
            let mut grouped: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
            for (id, kind, note) in &self.attention {
                grouped.entry(kind).or_default().push((id, note));
            }
            writeln!(f, "  needs attention:")?;
            for (kind, entries) in grouped {
                writeln!(f, "    {} ({}):", kind, entries.len())?;
                for (id, note) in entries {
                    writeln!(f, "      {}: {}", id, note)?;
                }
            }
        }
        if self.interrupted {
            writeln!(f, "  interrupted; resume with --start {}", self.next_offset)?;
        } else {
            writeln!(f, "  done; continue with --start {}", self.next_offset)?;
        }
        Ok(())
    }
}
