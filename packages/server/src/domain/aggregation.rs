//! Per-row aggregation split by secondary role.

use super::distribution::Distribution;

/// Name of the synthetic leading row added to multi-row results.
pub const SUMMARY_ROW: &str = "Summary";

/// Aggregated result of one row (estimation dimension).
///
/// Every contributed value lands in `overall` and in exactly one of
/// `primary` (participants without the secondary role) or `secondary`.
#[derive(Debug, Clone, PartialEq)]
pub struct RowResult {
    name: String,
    overall: Distribution,
    primary: Distribution,
    secondary: Distribution,
}

impl RowResult {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            overall: Distribution::new(),
            primary: Distribution::new(),
            secondary: Distribution::new(),
        }
    }

    pub fn add(&mut self, label: &str, is_secondary: bool) {
        self.overall.add(label);
        if is_secondary {
            self.secondary.add(label);
        } else {
            self.primary.add(label);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn overall(&self) -> &Distribution {
        &self.overall
    }

    pub fn primary(&self) -> &Distribution {
        &self.primary
    }

    pub fn secondary(&self) -> &Distribution {
        &self.secondary
    }
}
