use super::super::domain::{
    Magnitude, Metric, PipelineRecord, ResponsibleParty, RoleType, Violation,
};
use super::super::rules::ScoringRules;
use super::ViolationDetector;
use tracing::warn;

/// Scores every completed interview on how quickly feedback followed it.
pub struct FeedbackTimelinessDetector;

impl ViolationDetector for FeedbackTimelinessDetector {
    fn metric(&self) -> Metric {
        Metric::FeedbackTimeliness
    }

    fn detect(&self, records: &[PipelineRecord], rules: &ScoringRules) -> Vec<Violation> {
        records
            .iter()
            .filter(|record| record.interview_completed_at.is_some())
            .map(|record| feedback_violation(record, rules))
            .collect()
    }
}

fn feedback_violation(record: &PipelineRecord, rules: &ScoringRules) -> Violation {
    let responsible_party = if record.is_hiring_manager_interview {
        ResponsibleParty {
            name: record.hiring_manager_name.clone(),
            role: RoleType::HiringManager,
        }
    } else {
        ResponsibleParty {
            name: record.recruiter_name.clone(),
            role: RoleType::Recruiter,
        }
    };

    let (severity, penalty, magnitude, description) = match record.feedback_delay_hours() {
        Some(hours) => {
            if hours < 0.0 {
                warn!(
                    requisition = %record.requisition_id,
                    interviewer = %record.interviewer_name,
                    hours,
                    "feedback timestamp precedes interview completion"
                );
            }
            let (severity, penalty) = rules.classify_feedback_delay(hours);
            (
                severity,
                penalty,
                Magnitude::DelayHours { hours },
                format!(
                    "Feedback from {} submitted {:.0} hours after the interview",
                    display_interviewer(record),
                    hours
                ),
            )
        }
        None => {
            let (severity, penalty) = rules.missing_feedback();
            (
                severity,
                penalty,
                Magnitude::MissingFeedback,
                format!(
                    "Feedback from {} missing for completed interview",
                    display_interviewer(record)
                ),
            )
        }
    };

    Violation {
        requisition_id: record.requisition_id.clone(),
        metric: Metric::FeedbackTimeliness,
        severity,
        penalty,
        magnitude,
        recruiter_name: record.recruiter_name.clone(),
        hiring_manager_name: record.hiring_manager_name.clone(),
        responsible_party,
        stage: record.stage.clone(),
        description,
    }
}

fn display_interviewer(record: &PipelineRecord) -> &str {
    if record.interviewer_name.is_empty() {
        "interviewer"
    } else {
        &record.interviewer_name
    }
}
