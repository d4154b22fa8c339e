/// Result of one entity type within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced {
        entity_name: &'static str,
        count: u64,
    },
    Failed {
        entity_name: &'static str,
        error_message: String,
    },
}

/// Results and errors collected across one run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcomes {
    results: Vec<(&'static str, u64)>,
    errors: Vec<String>,
}

impl SyncOutcomes {
    pub fn record(&mut self, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Synced { entity_name, count } => self.results.push((entity_name, *count)),
            SyncOutcome::Failed {
                entity_name,
                error_message,
            } => self.errors.push(format!("{entity_name}: {error_message}")),
        }
    }

    pub fn results(&self) -> &[(&'static str, u64)] {
        &self.results
    }

    pub fn count_for(&self, entity_name: &str) -> Option<u64> {
        self.results
            .iter()
            .find(|(name, _)| *name == entity_name)
            .map(|(_, count)| *count)
    }

    /// `"{entity}: {message}"` entries.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Coarse-status detail: error entries joined with `"; "`.
    pub fn error_detail(&self) -> Option<String> {
        self.has_errors().then(|| self.errors.join("; "))
    }

    pub fn total_synced(&self) -> u64 {
        self.results.iter().map(|(_, count)| count).sum()
    }
}
