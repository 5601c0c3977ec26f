mod engagement;
mod feedback;
mod velocity;

pub use engagement::HmEngagementDetector;
pub use feedback::FeedbackTimelinessDetector;
pub use velocity::StageVelocityDetector;

use super::domain::{Metric, PipelineRecord, RequisitionId, Violation};
use super::rules::ScoringRules;
use std::collections::BTreeMap;
use tracing::debug;

/// A single SLA rule check over the full record set.
///
/// Implementations only read the records and return their own violations, so
/// detectors can run in any order without coordinating.
pub trait ViolationDetector: Send + Sync {
    fn metric(&self) -> Metric;
    fn detect(&self, records: &[PipelineRecord], rules: &ScoringRules) -> Vec<Violation>;
}

pub fn standard_detectors() -> [&'static dyn ViolationDetector; 3] {
    [
        &FeedbackTimelinessDetector,
        &StageVelocityDetector,
        &HmEngagementDetector,
    ]
}

/// Runs every standard detector and concatenates their output in metric order.
pub fn detect_all(records: &[PipelineRecord], rules: &ScoringRules) -> Vec<Violation> {
    let mut violations = Vec::new();
    for detector in standard_detectors() {
        let found = detector.detect(records, rules);
        debug!(
            metric = detector.metric().key(),
            violations = found.len(),
            "detector finished"
        );
        violations.extend(found);
    }
    violations
}

/// Groups records per requisition, preserving input order within a group.
pub(crate) fn by_requisition(
    records: &[PipelineRecord],
) -> BTreeMap<&RequisitionId, Vec<&PipelineRecord>> {
    let mut grouped: BTreeMap<&RequisitionId, Vec<&PipelineRecord>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(&record.requisition_id)
            .or_default()
            .push(record);
    }
    grouped
}
