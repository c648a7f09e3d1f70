/// Outcome of searching a single input.
#[derive(Debug, Clone, Default)]
pub struct FileReport {
    /// Number of records the input split into.
    pub records: usize,
    /// Number of records selected after inversion.
    pub matched: usize,
    /// Whether the raw content looked binary.
    pub binary: bool,
}

impl FileReport {
    /// True when at least one record was selected.
    pub fn has_match(&self) -> bool {
        self.matched > 0
    }
}

/// Aggregated totals across every input in a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of inputs searched.
    pub files_searched: usize,
    /// Number of inputs with at least one selected record.
    pub files_matched: usize,
    /// Total selected records across all inputs.
    pub total_matches: usize,
}

impl RunSummary {
    /// Creates an empty summary.
    pub fn new() -> Self {
        RunSummary::default()
    }

    /// Folds one input's report into the running totals.
    pub fn add_file(&mut self, report: &FileReport) {
        self.files_searched += 1;
        if report.has_match() {
            self.files_matched += 1;
            self.total_matches += report.matched;
        }
    }

    /// True when any input produced a selected record.
    pub fn any_match(&self) -> bool {
        self.files_matched > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_report() {
        let report = FileReport {
            records: 10,
            matched: 3,
            binary: false,
        };
        assert!(report.has_match());

        let report = FileReport::default();
        assert!(!report.has_match());
    }

    #[test]
    fn test_summary_aggregation() {
        let mut summary = RunSummary::new();
        summary.add_file(&FileReport {
            records: 5,
            matched: 2,
            binary: false,
        });
        summary.add_file(&FileReport {
            records: 8,
            matched: 0,
            binary: false,
        });
        summary.add_file(&FileReport {
            records: 1,
            matched: 1,
            binary: true,
        });

        assert_eq!(summary.files_searched, 3);
        assert_eq!(summary.files_matched, 2);
        assert_eq!(summary.total_matches, 3);
        assert!(summary.any_match());
    }

    #[test]
    fn test_empty_summary() {
        let summary = RunSummary::new();
        assert_eq!(summary.files_searched, 0);
        assert!(!summary.any_match());
    }
}
