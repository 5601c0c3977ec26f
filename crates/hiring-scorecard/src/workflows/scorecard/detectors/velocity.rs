use super::super::domain::{
    Magnitude, Metric, PipelineRecord, PipelineStage, ResponsibleParty, RoleType, Violation,
};
use super::super::rules::ScoringRules;
use super::{by_requisition, ViolationDetector};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Times each completed stage of a requisition against the velocity tiers.
///
/// Only catalogued stages with an entry timestamp take part. The stage a requisition
/// currently sits in has no successor and is never scored here.
pub struct StageVelocityDetector;

impl ViolationDetector for StageVelocityDetector {
    fn metric(&self) -> Metric {
        Metric::StageVelocity
    }

    fn detect(&self, records: &[PipelineRecord], rules: &ScoringRules) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (requisition_id, rows) in by_requisition(records) {
            let Some(first) = rows.first() else {
                continue;
            };

            let visits = stage_visits(&rows);
            for pair in visits.windows(2) {
                let (stage, entered) = pair[0];
                let (next_stage, next_entered) = pair[1];
                let days = (next_entered - entered).num_days();
                let (severity, penalty) = rules.classify_stage_duration(days);

                violations.push(Violation {
                    requisition_id: requisition_id.clone(),
                    metric: Metric::StageVelocity,
                    severity,
                    penalty,
                    magnitude: Magnitude::DaysInStage { days },
                    recruiter_name: first.recruiter_name.clone(),
                    hiring_manager_name: first.hiring_manager_name.clone(),
                    responsible_party: ResponsibleParty {
                        name: first.recruiter_name.clone(),
                        role: RoleType::Recruiter,
                    },
                    stage: stage.label().to_string(),
                    description: format!(
                        "{} days in {} before moving to {}",
                        days,
                        stage.label(),
                        next_stage.label()
                    ),
                });
            }
        }

        violations
    }
}

/// First entry per known stage, ordered by when the stage was entered.
fn stage_visits(rows: &[&PipelineRecord]) -> Vec<(PipelineStage, NaiveDateTime)> {
    let mut first_entry: BTreeMap<PipelineStage, NaiveDateTime> = BTreeMap::new();

    for row in rows {
        let (Some(stage), Some(entered)) = (PipelineStage::from_label(&row.stage), row.stage_entered_at)
        else {
            continue;
        };

        first_entry
            .entry(stage)
            .and_modify(|existing| {
                if entered < *existing {
                    *existing = entered;
                }
            })
            .or_insert(entered);
    }

    let mut visits: Vec<(PipelineStage, NaiveDateTime)> = first_entry.into_iter().collect();
    visits.sort_by(|(stage_a, at_a), (stage_b, at_b)| at_a.cmp(at_b).then(stage_a.cmp(stage_b)));
    visits
}
