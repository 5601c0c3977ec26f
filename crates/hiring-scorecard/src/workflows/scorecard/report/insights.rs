use super::super::domain::{Metric, ScoreBand};
use super::views::{LeaderboardEntry, RoleAttention, ScorecardInsights, ScorecardSummary};

const ATTENTION_LIMIT: usize = 5;

pub(crate) fn generate_insights(summary: &ScorecardSummary) -> ScorecardInsights {
    let org_band = summary.org.band();

    let critical_people = summary
        .recruiter_leaderboard
        .iter()
        .chain(&summary.hm_leaderboard)
        .filter(|entry| entry.band == ScoreBand::Critical)
        .count();

    let top_recruiter = leader(&summary.recruiter_leaderboard);
    let top_hiring_manager = leader(&summary.hm_leaderboard);

    // Ties resolve to the earlier metric.
    let most_common_violation = summary
        .violations_by_metric
        .iter()
        .filter(|count| count.total > 0)
        .fold(None, |best: Option<(Metric, usize)>, count| match best {
            Some((_, total)) if total >= count.total => best,
            _ => Some((count.metric, count.total)),
        })
        .map(|(metric, _)| metric);

    let mut critical_roles: Vec<_> = summary
        .roles
        .iter()
        .filter(|role| role.band == ScoreBand::Critical)
        .collect();
    critical_roles.sort_by(|a, b| {
        a.combined_score
            .total_cmp(&b.combined_score)
            .then_with(|| a.requisition_id.cmp(&b.requisition_id))
    });
    let roles_needing_attention: Vec<RoleAttention> = critical_roles
        .into_iter()
        .take(ATTENTION_LIMIT)
        .map(|role| RoleAttention {
            requisition_id: role.requisition_id.clone(),
            job_title: role.job_title.clone(),
            department: role.department.clone(),
            combined_score: role.combined_score,
        })
        .collect();

    let mut observations = vec![format!(
        "Organization average {:.1} ({}) across {} people",
        summary.org.org_average_score,
        org_band.label(),
        summary.org.people_count
    )];

    if summary.org.high_severity_total > 0 {
        observations.push(format!(
            "{} of {} violations are high severity",
            summary.org.high_severity_total, summary.org.total_violations
        ));
    }

    let gap = summary.org.recruiter_average - summary.org.hm_average;
    if gap.abs() >= 10.0 {
        observations.push(format!(
            "{} trail {} by {:.1} points",
            if gap > 0.0 { "Hiring managers" } else { "Recruiters" },
            if gap > 0.0 { "recruiters" } else { "hiring managers" },
            gap.abs()
        ));
    }

    let mut recommended_actions = Vec::new();
    match most_common_violation {
        Some(Metric::FeedbackTimeliness) => recommended_actions
            .push("Set interview feedback reminders at 24 and 48 hours".to_string()),
        Some(Metric::StageVelocity) => recommended_actions
            .push("Review requisitions idle in a stage for more than a week".to_string()),
        Some(Metric::HmEngagement) => recommended_actions
            .push("Schedule feedback check-ins with hiring managers".to_string()),
        None => {}
    }

    if critical_people > 0 {
        recommended_actions.push(format!(
            "Pair {} critical-band {} with a coach this cycle",
            critical_people,
            if critical_people == 1 { "person" } else { "people" }
        ));
    }

    if !roles_needing_attention.is_empty() {
        recommended_actions.push(format!(
            "Escalate {} role{} in the critical band",
            roles_needing_attention.len(),
            if roles_needing_attention.len() == 1 { "" } else { "s" }
        ));
    }

    ScorecardInsights {
        org_band,
        org_band_label: org_band.label(),
        critical_people,
        top_recruiter,
        top_hiring_manager,
        most_common_violation,
        roles_needing_attention,
        observations,
        recommended_actions,
    }
}

fn leader(leaderboard: &[LeaderboardEntry]) -> Option<String> {
    leaderboard.first().map(|entry| entry.score.name.clone())
}
