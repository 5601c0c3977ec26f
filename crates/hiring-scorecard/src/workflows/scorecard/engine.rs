use super::aggregate::score_roster;
use super::detectors::detect_all;
use super::domain::{PipelineRecord, ScoringError};
use super::report::Scorecard;
use super::rollup::{role_scores, team_summaries, OrgSummary};
use super::roster::Roster;
use super::rules::ScoringRules;
use chrono::NaiveDate;
use tracing::info;

/// Stateless scorer: every call recomputes from the records it is handed.
#[derive(Debug, Clone)]
pub struct ScorecardEngine {
    rules: ScoringRules,
}

impl ScorecardEngine {
    pub fn new(rules: ScoringRules) -> Result<Self, ScoringError> {
        rules.validate()?;
        Ok(Self { rules })
    }

    pub fn standard() -> Self {
        Self {
            rules: ScoringRules::standard(),
        }
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    /// Scores `records` as of `as_of`, which only affects days-open on roles.
    pub fn evaluate(
        &self,
        records: &[PipelineRecord],
        as_of: NaiveDate,
    ) -> Result<Scorecard, ScoringError> {
        let roster = Roster::from_records(records)?;
        let violations = detect_all(records, &self.rules);
        let people = score_roster(&roster, &violations, &self.rules)?;
        let org = OrgSummary::from_scores(&people, &violations)?;
        let roles = role_scores(&roster, &people, &violations, &self.rules, as_of)?;
        let teams = team_summaries(&roster, &people, &violations)?;

        info!(
            records = records.len(),
            people = people.len(),
            roles = roles.len(),
            violations = violations.len(),
            org_average = org.org_average_score,
            "scorecard evaluated"
        );

        Ok(Scorecard::new(
            as_of,
            self.rules.clone(),
            roster,
            violations,
            people,
            roles,
            teams,
            org,
        ))
    }
}

impl Default for ScorecardEngine {
    fn default() -> Self {
        Self::standard()
    }
}
