use super::super::aggregate::PersonScore;
use super::super::domain::{
    Magnitude, Metric, RequisitionId, ResponsibleParty, ScoreBand, Severity, Violation,
};
use super::super::rollup::{OrgSummary, RoleScore, TeamSummary};
use chrono::NaiveDate;
use serde::Serialize;

/// Violation output record consumed by alert panels and exports.
#[derive(Debug, Clone, Serialize)]
pub struct ViolationView {
    pub requisition_id: RequisitionId,
    pub metric: Metric,
    pub metric_label: &'static str,
    pub severity: Severity,
    pub severity_label: &'static str,
    pub penalty: i32,
    pub magnitude: Magnitude,
    pub magnitude_label: String,
    pub recruiter_name: String,
    pub hiring_manager_name: String,
    pub responsible_party: ResponsibleParty,
    pub stage: String,
    pub description: String,
}

impl From<&Violation> for ViolationView {
    fn from(violation: &Violation) -> Self {
        Self {
            requisition_id: violation.requisition_id.clone(),
            metric: violation.metric,
            metric_label: violation.metric.label(),
            severity: violation.severity,
            severity_label: violation.severity.label(),
            penalty: violation.penalty,
            magnitude: violation.magnitude,
            magnitude_label: violation.magnitude.to_string(),
            recruiter_name: violation.recruiter_name.clone(),
            hiring_manager_name: violation.hiring_manager_name.clone(),
            responsible_party: violation.responsible_party.clone(),
            stage: violation.stage.clone(),
            description: violation.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub score: PersonScore,
    pub band: ScoreBand,
    pub band_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricViolationCount {
    pub metric: Metric,
    pub metric_label: &'static str,
    pub total: usize,
    pub high: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonDetailView {
    #[serde(flatten)]
    pub score: PersonScore,
    pub role_label: &'static str,
    pub band: ScoreBand,
    pub band_label: &'static str,
    pub rank: usize,
    pub ranked_out_of: usize,
    pub weakest_metric: Metric,
    pub weakest_metric_label: &'static str,
    pub teams: Vec<String>,
    pub requisitions: Vec<RequisitionId>,
    pub violations: Vec<ViolationView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScorecardSummary {
    pub as_of: NaiveDate,
    pub org: OrgSummary,
    pub org_band: ScoreBand,
    pub org_band_label: &'static str,
    pub recruiter_leaderboard: Vec<LeaderboardEntry>,
    pub hm_leaderboard: Vec<LeaderboardEntry>,
    pub departments: Vec<TeamSummary>,
    pub roles: Vec<RoleScore>,
    pub violations_by_metric: Vec<MetricViolationCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleAttention {
    pub requisition_id: RequisitionId,
    pub job_title: String,
    pub department: String,
    pub combined_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScorecardInsights {
    pub org_band: ScoreBand,
    pub org_band_label: &'static str,
    pub critical_people: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_recruiter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_hiring_manager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_common_violation: Option<Metric>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles_needing_attention: Vec<RoleAttention>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommended_actions: Vec<String>,
}
