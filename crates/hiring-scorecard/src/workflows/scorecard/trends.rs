use super::domain::RoleType;
use super::snapshot::{PersonSnapshot, Snapshot, SnapshotSeries};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

const FLAT_EPSILON: f64 = 1e-9;
pub const DEFAULT_HIGHLIGHTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Flat,
}

impl TrendDirection {
    pub fn from_delta(delta: f64) -> Self {
        if delta.abs() <= FLAT_EPSILON {
            Self::Flat
        } else if delta > 0.0 {
            Self::Improving
        } else {
            Self::Declining
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Improving => "Improving",
            Self::Declining => "Declining",
            Self::Flat => "Flat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendDelta {
    pub earlier: f64,
    pub later: f64,
    pub delta: f64,
    pub direction: TrendDirection,
}

impl TrendDelta {
    pub fn between(earlier: f64, later: f64) -> Self {
        let delta = later - earlier;
        Self {
            earlier,
            later,
            delta,
            direction: TrendDirection::from_delta(delta),
        }
    }
}

/// Organization movement between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgTrend {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub org_average: TrendDelta,
    pub recruiter_average: TrendDelta,
    pub hm_average: TrendDelta,
    /// Positive when fewer high-severity violations were recorded later.
    pub high_severity_reduction: i64,
    pub total_violations_change: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersonDelta {
    Available(TrendDelta),
    InsufficientHistory,
}

impl PersonDelta {
    pub fn delta(&self) -> Option<f64> {
        match self {
            Self::Available(trend) => Some(trend.delta),
            Self::InsufficientHistory => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonTrend {
    pub name: String,
    pub role_type: RoleType,
    pub change: PersonDelta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonHistoryPoint {
    pub snapshot_num: usize,
    pub snapshot_date: NaiveDate,
    pub role_type: RoleType,
    pub final_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engagement_score: Option<f64>,
    pub total_violations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub snapshots: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<OrgTrend>,
    pub consecutive: Vec<OrgTrend>,
    pub people: Vec<PersonTrend>,
    pub most_improved: Vec<PersonTrend>,
    pub needs_support: Vec<PersonTrend>,
}

impl TrendReport {
    /// First-versus-last comparison plus every consecutive step of `series`.
    pub fn build(series: &SnapshotSeries, highlights: usize) -> Self {
        let people = match (series.snapshots().first(), series.latest()) {
            (Some(first), Some(last)) if series.len() > 1 => compare_people(first, last),
            _ => Vec::new(),
        };

        Self {
            snapshots: series.len(),
            overall: overall_trend(series),
            consecutive: consecutive_trends(series),
            most_improved: most_improved(&people, highlights),
            needs_support: needs_support(&people, highlights),
            people,
        }
    }
}

pub fn compare(earlier: &Snapshot, later: &Snapshot) -> OrgTrend {
    let before = &earlier.org_summary;
    let after = &later.org_summary;

    OrgTrend {
        from: earlier.snapshot_date,
        to: later.snapshot_date,
        org_average: TrendDelta::between(before.org_average_score, after.org_average_score),
        recruiter_average: TrendDelta::between(before.recruiter_average, after.recruiter_average),
        hm_average: TrendDelta::between(before.hm_average, after.hm_average),
        high_severity_reduction: before.high_severity_total as i64
            - after.high_severity_total as i64,
        total_violations_change: after.total_violations as i64 - before.total_violations as i64,
    }
}

/// Every person seen in either snapshot, recruiters first then by name.
pub fn compare_people(earlier: &Snapshot, later: &Snapshot) -> Vec<PersonTrend> {
    let everyone: BTreeSet<(RoleType, &str)> = earlier
        .people()
        .chain(later.people())
        .map(|person| (person.role_type, person.name.as_str()))
        .collect();

    everyone
        .into_iter()
        .map(|(role, name)| {
            let change = match (earlier.person(name, role), later.person(name, role)) {
                (Some(before), Some(after)) => {
                    PersonDelta::Available(TrendDelta::between(before.final_score, after.final_score))
                }
                _ => PersonDelta::InsufficientHistory,
            };
            PersonTrend {
                name: name.to_string(),
                role_type: role,
                change,
            }
        })
        .collect()
}

/// First versus last snapshot; `None` until the series holds two snapshots.
pub fn overall_trend(series: &SnapshotSeries) -> Option<OrgTrend> {
    match series.snapshots() {
        [first, .., last] => Some(compare(first, last)),
        _ => None,
    }
}

pub fn consecutive_trends(series: &SnapshotSeries) -> Vec<OrgTrend> {
    series
        .snapshots()
        .windows(2)
        .map(|pair| compare(&pair[0], &pair[1]))
        .collect()
}

/// Scores recorded for `name` across the series. Without a role, both roles are included.
pub fn person_history(
    series: &SnapshotSeries,
    name: &str,
    role: Option<RoleType>,
) -> Vec<PersonHistoryPoint> {
    series
        .snapshots()
        .iter()
        .flat_map(|snapshot| {
            snapshot
                .people()
                .filter(|person| person.name == name)
                .filter(|person| role.map_or(true, |role| person.role_type == role))
                .map(|person| history_point(snapshot, person))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn history_point(snapshot: &Snapshot, person: &PersonSnapshot) -> PersonHistoryPoint {
    PersonHistoryPoint {
        snapshot_num: snapshot.snapshot_num,
        snapshot_date: snapshot.snapshot_date,
        role_type: person.role_type,
        final_score: person.final_score,
        feedback_score: person.feedback_score,
        velocity_score: person.velocity_score,
        engagement_score: person.engagement_score,
        total_violations: person.total_violations,
    }
}

/// Largest positive movers first. People without a computable delta are left out.
pub fn most_improved(trends: &[PersonTrend], limit: usize) -> Vec<PersonTrend> {
    let mut ranked = with_delta(trends);
    ranked.sort_by(|(a, a_delta), (b, b_delta)| {
        b_delta.total_cmp(a_delta).then_with(|| a.name.cmp(&b.name))
    });
    ranked
        .into_iter()
        .take(limit)
        .map(|(trend, _)| trend.clone())
        .collect()
}

/// Smallest or most negative movers first.
pub fn needs_support(trends: &[PersonTrend], limit: usize) -> Vec<PersonTrend> {
    let mut ranked = with_delta(trends);
    ranked.sort_by(|(a, a_delta), (b, b_delta)| {
        a_delta.total_cmp(b_delta).then_with(|| a.name.cmp(&b.name))
    });
    ranked
        .into_iter()
        .take(limit)
        .map(|(trend, _)| trend.clone())
        .collect()
}

fn with_delta(trends: &[PersonTrend]) -> Vec<(&PersonTrend, f64)> {
    trends
        .iter()
        .filter_map(|trend| trend.change.delta().map(|delta| (trend, delta)))
        .collect()
}
