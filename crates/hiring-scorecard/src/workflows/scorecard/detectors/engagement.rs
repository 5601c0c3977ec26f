use super::super::domain::{
    Magnitude, Metric, PipelineRecord, ResponsibleParty, RoleType, Violation,
};
use super::super::rules::ScoringRules;
use super::{by_requisition, ViolationDetector};

/// Counts missed and late hiring-manager feedback per requisition.
pub struct HmEngagementDetector;

impl ViolationDetector for HmEngagementDetector {
    fn metric(&self) -> Metric {
        Metric::HmEngagement
    }

    fn detect(&self, records: &[PipelineRecord], rules: &ScoringRules) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (requisition_id, rows) in by_requisition(records) {
            let Some(first) = rows.first() else {
                continue;
            };

            let mut missing = 0u32;
            let mut delayed = 0u32;
            for row in rows.iter().filter(|row| row.is_hiring_manager_interview) {
                if row.feedback_missing() {
                    missing += 1;
                } else if row
                    .feedback_delay_hours()
                    .is_some_and(|hours| hours > rules.engagement.delayed_after_hours)
                {
                    delayed += 1;
                }
            }

            let issues = missing + delayed;
            let Some((severity, penalty)) = rules.classify_engagement(issues) else {
                continue;
            };

            violations.push(Violation {
                requisition_id: requisition_id.clone(),
                metric: Metric::HmEngagement,
                severity,
                penalty,
                magnitude: Magnitude::MissedActions { missing, delayed },
                recruiter_name: first.recruiter_name.clone(),
                hiring_manager_name: first.hiring_manager_name.clone(),
                responsible_party: ResponsibleParty {
                    name: first.hiring_manager_name.clone(),
                    role: RoleType::HiringManager,
                },
                stage: "Overall".to_string(),
                description: format!(
                    "{} missing and {} delayed hiring manager feedback response{}",
                    missing,
                    delayed,
                    if issues == 1 { "" } else { "s" }
                ),
            });
        }

        violations
    }
}
