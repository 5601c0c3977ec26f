use super::domain::{Metric, RoleType, ScoreBand, ScoringError, Severity, Violation};
use super::roster::Roster;
use super::rules::ScoringRules;
use serde::{Deserialize, Serialize};

/// Scoring result for one recruiter or hiring manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonScore {
    pub name: String,
    pub role_type: RoleType,
    pub final_score: f64,
    pub feedback_score: f64,
    pub velocity_score: f64,
    pub engagement_score: f64,
    pub total_violations: usize,
    pub high_severity: usize,
    pub medium_severity: usize,
    pub low_severity: usize,
}

impl PersonScore {
    pub fn metric_score(&self, metric: Metric) -> f64 {
        match metric {
            Metric::FeedbackTimeliness => self.feedback_score,
            Metric::StageVelocity => self.velocity_score,
            Metric::HmEngagement => self.engagement_score,
        }
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::for_score(self.final_score)
    }

    /// Lowest metric score; ties resolve in metric order.
    pub fn weakest_metric(&self) -> Metric {
        Metric::ordered()
            .into_iter()
            .fold(Metric::FeedbackTimeliness, |weakest, metric| {
                if self.metric_score(metric) < self.metric_score(weakest) {
                    metric
                } else {
                    weakest
                }
            })
    }
}

/// Penalty points `violation` moves against `name` in `role`, if it counts at all.
///
/// Recruiters answer for their own feedback and for stage velocity; they are never
/// scored on engagement. Hiring managers answer for their own feedback and engagement
/// and carry `hm_velocity_share` of each velocity penalty on their requisitions.
pub fn contribution(
    violation: &Violation,
    name: &str,
    role: RoleType,
    rules: &ScoringRules,
) -> Option<f64> {
    let penalty = f64::from(violation.penalty);
    match (role, violation.metric) {
        (_, Metric::FeedbackTimeliness) => violation
            .is_attributed_to(name, role)
            .then_some(penalty),
        (RoleType::Recruiter, Metric::StageVelocity) => violation
            .is_attributed_to(name, role)
            .then_some(penalty),
        (RoleType::Recruiter, Metric::HmEngagement) => None,
        (RoleType::HiringManager, Metric::StageVelocity) => (violation.hiring_manager_name == name
            && rules.hm_velocity_share > 0.0)
            .then_some(penalty * rules.hm_velocity_share),
        (RoleType::HiringManager, Metric::HmEngagement) => violation
            .is_attributed_to(name, role)
            .then_some(penalty),
    }
}

pub fn score_person(
    name: &str,
    role: RoleType,
    violations: &[Violation],
    rules: &ScoringRules,
) -> PersonScore {
    let mut penalty_sums = [0.0_f64; 3];
    let mut severity_counts = [0usize; 3];
    let mut total_violations = 0;

    for violation in violations {
        let Some(points) = contribution(violation, name, role, rules) else {
            continue;
        };

        penalty_sums[metric_slot(violation.metric)] += points;
        severity_counts[severity_slot(violation.severity)] += 1;
        total_violations += 1;
    }

    let metric_score = |metric: Metric| {
        (ScoringRules::BASELINE + penalty_sums[metric_slot(metric)]).clamp(0.0, ScoringRules::BASELINE)
    };

    let feedback_score = metric_score(Metric::FeedbackTimeliness);
    let velocity_score = metric_score(Metric::StageVelocity);
    let engagement_score = metric_score(Metric::HmEngagement);

    let final_score = feedback_score * rules.weights.feedback_timeliness
        + velocity_score * rules.weights.stage_velocity
        + engagement_score * rules.weights.hm_engagement;

    PersonScore {
        name: name.to_string(),
        role_type: role,
        final_score,
        feedback_score,
        velocity_score,
        engagement_score,
        total_violations,
        high_severity: severity_counts[severity_slot(Severity::High)],
        medium_severity: severity_counts[severity_slot(Severity::Medium)],
        low_severity: severity_counts[severity_slot(Severity::Low)],
    }
}

/// Scores everyone on the roster, recruiters first, each group ordered by name.
///
/// Every violation must name a responsible party that exists on the roster.
pub fn score_roster(
    roster: &Roster,
    violations: &[Violation],
    rules: &ScoringRules,
) -> Result<Vec<PersonScore>, ScoringError> {
    for violation in violations {
        let party = &violation.responsible_party;
        if !roster.contains(&party.name, party.role) {
            return Err(ScoringError::UnknownResponsibleParty {
                requisition: violation.requisition_id.clone(),
                name: party.name.clone(),
                role: party.role,
            });
        }
    }

    let scores = RoleType::ordered()
        .into_iter()
        .flat_map(|role| roster.people(role))
        .map(|entry| score_person(&entry.name, entry.role, violations, rules))
        .collect();

    Ok(scores)
}

const fn metric_slot(metric: Metric) -> usize {
    match metric {
        Metric::FeedbackTimeliness => 0,
        Metric::StageVelocity => 1,
        Metric::HmEngagement => 2,
    }
}

const fn severity_slot(severity: Severity) -> usize {
    match severity {
        Severity::Low => 0,
        Severity::Medium => 1,
        Severity::High => 2,
    }
}

/// Mean of every individual final score; `None` for an empty slice.
pub fn pooled_average(scores: &[PersonScore]) -> Option<f64> {
    mean(scores.iter().map(|score| score.final_score))
}

pub fn role_average(scores: &[PersonScore], role: RoleType) -> Option<f64> {
    mean(
        scores
            .iter()
            .filter(|score| score.role_type == role)
            .map(|score| score.final_score),
    )
}

pub(crate) fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}
