//! Recruiter and hiring manager SLA scoring.
//!
//! Pipeline records flow one way: detectors emit violations, the aggregator turns them
//! into per-person scores, rollups join those into role, team and organization views,
//! and snapshots of the rollups feed trend analysis.

pub mod aggregate;
pub mod detectors;
pub mod domain;
mod engine;
pub mod report;
pub mod rollup;
pub mod roster;
pub mod rules;
pub mod snapshot;
pub mod trends;

#[cfg(test)]
mod tests;

pub use aggregate::{pooled_average, role_average, score_person, score_roster, PersonScore};
pub use detectors::{detect_all, ViolationDetector};
pub use domain::{
    Magnitude, Metric, PipelineRecord, PipelineStage, RequisitionId, ResponsibleParty, RoleType,
    ScoreBand, ScoringError, Severity, Violation,
};
pub use engine::ScorecardEngine;
pub use report::views::{
    LeaderboardEntry, PersonDetailView, ScorecardInsights, ScorecardSummary, ViolationView,
};
pub use report::Scorecard;
pub use rollup::{OrgSummary, RoleScore, TeamSummary};
pub use roster::Roster;
pub use rules::ScoringRules;
pub use snapshot::{PersonSnapshot, Snapshot, SnapshotError, SnapshotSeries};
pub use trends::{
    OrgTrend, PersonDelta, PersonHistoryPoint, PersonTrend, TrendDelta, TrendDirection,
    TrendReport,
};
