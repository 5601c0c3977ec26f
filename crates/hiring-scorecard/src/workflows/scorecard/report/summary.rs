use super::super::aggregate::{contribution, PersonScore};
use super::super::domain::{Metric, RequisitionId, RoleType, Severity, Violation};
use super::super::rollup::{OrgSummary, RoleScore, TeamSummary};
use super::super::roster::Roster;
use super::super::rules::ScoringRules;
use super::views::{
    LeaderboardEntry, MetricViolationCount, PersonDetailView, ScorecardInsights,
    ScorecardSummary, ViolationView,
};
use chrono::NaiveDate;

/// Everything derived from one set of pipeline records.
#[derive(Debug, Clone)]
pub struct Scorecard {
    as_of: NaiveDate,
    rules: ScoringRules,
    roster: Roster,
    violations: Vec<Violation>,
    people: Vec<PersonScore>,
    roles: Vec<RoleScore>,
    teams: Vec<TeamSummary>,
    org: OrgSummary,
}

impl Scorecard {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        as_of: NaiveDate,
        rules: ScoringRules,
        roster: Roster,
        violations: Vec<Violation>,
        people: Vec<PersonScore>,
        roles: Vec<RoleScore>,
        teams: Vec<TeamSummary>,
        org: OrgSummary,
    ) -> Self {
        Self {
            as_of,
            rules,
            roster,
            violations,
            people,
            roles,
            teams,
            org,
        }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn people(&self) -> &[PersonScore] {
        &self.people
    }

    pub fn people_in_role(&self, role: RoleType) -> impl Iterator<Item = &PersonScore> {
        self.people.iter().filter(move |score| score.role_type == role)
    }

    pub fn roles(&self) -> &[RoleScore] {
        &self.roles
    }

    pub fn teams(&self) -> &[TeamSummary] {
        &self.teams
    }

    pub fn org_summary(&self) -> &OrgSummary {
        &self.org
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn person(&self, name: &str, role: RoleType) -> Option<&PersonScore> {
        self.people
            .iter()
            .find(|score| score.role_type == role && score.name == name)
    }

    /// People in `role` ranked by final score, best first; ties break on name.
    pub fn leaderboard(&self, role: RoleType) -> Vec<LeaderboardEntry> {
        let mut ranked: Vec<&PersonScore> = self.people_in_role(role).collect();
        ranked.sort_by(|a, b| {
            b.final_score
                .total_cmp(&a.final_score)
                .then_with(|| a.name.cmp(&b.name))
        });

        ranked
            .into_iter()
            .enumerate()
            .map(|(position, score)| LeaderboardEntry {
                rank: position + 1,
                score: score.clone(),
                band: score.band(),
                band_label: score.band().label(),
            })
            .collect()
    }

    /// Violations that moved `name`'s score in `role`, worst first.
    pub fn violations_for(&self, name: &str, role: RoleType) -> Vec<ViolationView> {
        let mut matching: Vec<&Violation> = self
            .violations
            .iter()
            .filter(|violation| contribution(violation, name, role, &self.rules).is_some())
            .collect();
        matching.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.requisition_id.cmp(&b.requisition_id))
        });
        matching.into_iter().map(ViolationView::from).collect()
    }

    /// Detail card for `name`. Without a role, recruiters are matched before hiring managers.
    pub fn person_detail(&self, name: &str, role: Option<RoleType>) -> Option<PersonDetailView> {
        let roles: Vec<RoleType> = match role {
            Some(role) => vec![role],
            None => RoleType::ordered().to_vec(),
        };

        let score = roles
            .into_iter()
            .find_map(|role| self.person(name, role))?;
        let leaderboard = self.leaderboard(score.role_type);
        let rank = leaderboard
            .iter()
            .find(|entry| entry.score.name == score.name)
            .map_or(leaderboard.len(), |entry| entry.rank);
        let (teams, requisitions): (Vec<String>, Vec<RequisitionId>) = self
            .roster
            .entry(&score.name, score.role_type)
            .map(|entry| {
                (
                    entry.teams.iter().cloned().collect(),
                    entry.requisitions.iter().cloned().collect(),
                )
            })
            .unwrap_or_default();
        let weakest = score.weakest_metric();

        Some(PersonDetailView {
            score: score.clone(),
            role_label: score.role_type.label(),
            band: score.band(),
            band_label: score.band().label(),
            rank,
            ranked_out_of: leaderboard.len(),
            weakest_metric: weakest,
            weakest_metric_label: weakest.label(),
            teams,
            requisitions,
            violations: self.violations_for(&score.name, score.role_type),
        })
    }

    pub fn summary(&self) -> ScorecardSummary {
        let violations_by_metric = Metric::ordered()
            .into_iter()
            .map(|metric| {
                let of_metric = self
                    .violations
                    .iter()
                    .filter(|violation| violation.metric == metric);
                MetricViolationCount {
                    metric,
                    metric_label: metric.label(),
                    total: of_metric.clone().count(),
                    high: of_metric
                        .filter(|violation| violation.severity == Severity::High)
                        .count(),
                }
            })
            .collect();

        ScorecardSummary {
            as_of: self.as_of,
            org: self.org.clone(),
            org_band: self.org.band(),
            org_band_label: self.org.band().label(),
            recruiter_leaderboard: self.leaderboard(RoleType::Recruiter),
            hm_leaderboard: self.leaderboard(RoleType::HiringManager),
            departments: self.teams.clone(),
            roles: self.roles.clone(),
            violations_by_metric,
        }
    }
}

impl ScorecardSummary {
    pub fn insights(&self) -> ScorecardInsights {
        super::generate_insights(self)
    }
}
