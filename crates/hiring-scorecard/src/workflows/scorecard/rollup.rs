use super::aggregate::{mean, pooled_average, role_average, PersonScore};
use super::domain::{
    Metric, RequisitionId, RoleType, ScoreBand, ScoringError, Severity, Violation,
};
use super::roster::Roster;
use super::rules::ScoringRules;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Requisition-level view joining the recruiter and hiring manager scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleScore {
    pub requisition_id: RequisitionId,
    pub job_title: String,
    pub department: String,
    pub current_status: String,
    pub recruiter_name: String,
    pub recruiter_score: f64,
    pub hiring_manager_name: String,
    pub hm_score: f64,
    pub combined_score: f64,
    pub high_severity_violations: usize,
    pub days_open: Option<i64>,
    pub band: ScoreBand,
    pub action_items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub team: String,
    pub recruiter_average: f64,
    pub hm_average: f64,
    pub department_score: f64,
    pub open_roles: usize,
    pub recruiters: Vec<String>,
    pub hiring_managers: Vec<String>,
    pub violations: usize,
}

/// Organization-wide rollup; the same shape is persisted in snapshot files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgSummary {
    pub org_average_score: f64,
    pub recruiter_average: f64,
    pub hm_average: f64,
    #[serde(default)]
    pub total_violations: usize,
    #[serde(default)]
    pub high_severity_total: usize,
    #[serde(default)]
    pub people_count: usize,
}

impl OrgSummary {
    pub fn from_scores(people: &[PersonScore], violations: &[Violation]) -> Result<Self, ScoringError> {
        let (Some(org_average_score), Some(recruiter_average), Some(hm_average)) = (
            pooled_average(people),
            role_average(people, RoleType::Recruiter),
            role_average(people, RoleType::HiringManager),
        ) else {
            return Err(ScoringError::NoRecords);
        };

        Ok(Self {
            org_average_score,
            recruiter_average,
            hm_average,
            total_violations: violations.len(),
            high_severity_total: violations
                .iter()
                .filter(|violation| violation.severity == Severity::High)
                .count(),
            people_count: people.len(),
        })
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::for_score(self.org_average_score)
    }
}

type ScoreIndex<'a> = HashMap<(RoleType, &'a str), &'a PersonScore>;

fn index_scores(people: &[PersonScore]) -> ScoreIndex<'_> {
    people
        .iter()
        .map(|score| ((score.role_type, score.name.as_str()), score))
        .collect()
}

fn final_score_of(
    index: &ScoreIndex<'_>,
    role: RoleType,
    name: &str,
) -> Result<f64, ScoringError> {
    index
        .get(&(role, name))
        .map(|score| score.final_score)
        .ok_or_else(|| ScoringError::MissingScore {
            name: name.to_string(),
            role,
        })
}

/// One entry per requisition, in requisition id order.
///
/// Every assigned recruiter and hiring manager must appear in `people`.
pub fn role_scores(
    roster: &Roster,
    people: &[PersonScore],
    violations: &[Violation],
    rules: &ScoringRules,
    as_of: NaiveDate,
) -> Result<Vec<RoleScore>, ScoringError> {
    let index = index_scores(people);

    roster
        .requisitions()
        .map(|info| {
            let recruiter_score =
                final_score_of(&index, RoleType::Recruiter, &info.recruiter_name)?;
            let hm_score =
                final_score_of(&index, RoleType::HiringManager, &info.hiring_manager_name)?;
            let combined_score = recruiter_score * rules.recruiter_role_share
                + hm_score * (1.0 - rules.recruiter_role_share);

            let on_requisition: Vec<&Violation> = violations
                .iter()
                .filter(|violation| violation.requisition_id == info.requisition_id)
                .collect();
            let high_severity_violations = on_requisition
                .iter()
                .filter(|violation| violation.severity == Severity::High)
                .count();

            Ok(RoleScore {
                requisition_id: info.requisition_id.clone(),
                job_title: info.job_title.clone(),
                department: info.team.clone(),
                current_status: info.current_status.clone(),
                recruiter_name: info.recruiter_name.clone(),
                recruiter_score,
                hiring_manager_name: info.hiring_manager_name.clone(),
                hm_score,
                combined_score,
                high_severity_violations,
                days_open: info
                    .role_opened_date
                    .map(|opened| (as_of - opened).num_days()),
                band: ScoreBand::for_score(combined_score),
                action_items: action_items(&on_requisition, high_severity_violations),
            })
        })
        .collect()
}

fn action_items(violations: &[&Violation], high_count: usize) -> Vec<String> {
    let mut items = Vec::new();

    if high_count > 0 {
        items.push(format!("{high_count} critical issue(s)"));
    }

    if violations.iter().any(|violation| {
        violation.metric == Metric::FeedbackTimeliness && violation.severity >= Severity::Medium
    }) {
        items.push("Feedback overdue".to_string());
    }

    if violations.iter().any(|violation| {
        violation.metric == Metric::StageVelocity && violation.severity == Severity::High
    }) {
        items.push("Stage delay".to_string());
    }

    if items.is_empty() {
        items.push("On track".to_string());
    }

    items
}

/// Department rollups ordered by department score, best first.
pub fn team_summaries(
    roster: &Roster,
    people: &[PersonScore],
    violations: &[Violation],
) -> Result<Vec<TeamSummary>, ScoringError> {
    let index = index_scores(people);
    let mut summaries = Vec::new();

    for team in roster.teams() {
        let requisitions: Vec<_> = roster
            .requisitions()
            .filter(|info| info.team == team)
            .collect();

        let recruiters: BTreeSet<&str> = requisitions
            .iter()
            .map(|info| info.recruiter_name.as_str())
            .collect();
        let hiring_managers: BTreeSet<&str> = requisitions
            .iter()
            .map(|info| info.hiring_manager_name.as_str())
            .collect();

        let recruiter_scores = recruiters
            .iter()
            .map(|name| final_score_of(&index, RoleType::Recruiter, name))
            .collect::<Result<Vec<f64>, _>>()?;
        let hm_scores = hiring_managers
            .iter()
            .map(|name| final_score_of(&index, RoleType::HiringManager, name))
            .collect::<Result<Vec<f64>, _>>()?;

        let (Some(recruiter_average), Some(hm_average), Some(department_score)) = (
            mean(recruiter_scores.iter().copied()),
            mean(hm_scores.iter().copied()),
            mean(recruiter_scores.iter().chain(&hm_scores).copied()),
        ) else {
            continue;
        };

        let violation_count = violations
            .iter()
            .filter(|violation| {
                requisitions
                    .iter()
                    .any(|info| info.requisition_id == violation.requisition_id)
            })
            .count();

        summaries.push(TeamSummary {
            team: team.to_string(),
            recruiter_average,
            hm_average,
            department_score,
            open_roles: requisitions.len(),
            recruiters: recruiters.into_iter().map(str::to_string).collect(),
            hiring_managers: hiring_managers.into_iter().map(str::to_string).collect(),
            violations: violation_count,
        });
    }

    summaries.sort_by(|a, b| {
        b.department_score
            .total_cmp(&a.department_score)
            .then_with(|| a.team.cmp(&b.team))
    });
    Ok(summaries)
}
