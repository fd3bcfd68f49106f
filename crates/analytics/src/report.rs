use crate::health::HealthScore;
use crate::ratios::RatioSet;
use crate::recommendations::Recommendation;
use serde::{Deserialize, Serialize};

/// The full statement-based assessment: ratios, the health score derived from
/// them and the findings both produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthAssessment {
    pub ratios: RatioSet,
    pub health: HealthScore,
    pub recommendations: Vec<Recommendation>,
}

impl HealthAssessment {
    /// Number of findings at the highest (error) severity.
    pub fn critical_findings(&self) -> usize {
        self.recommendations
            .iter()
            .filter(|r| r.severity == core_types::Severity::Error)
            .count()
    }
}
