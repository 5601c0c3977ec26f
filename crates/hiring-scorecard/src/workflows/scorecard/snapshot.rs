//! Persisted history of scorecard rollups.
//!
//! A series is append-only: snapshots are strictly ordered by date and never edited once
//! recorded. Files written here round-trip through `serde_json` and stay readable by
//! dashboards that only know the `snapshots` / `metadata` layout.

use super::aggregate::PersonScore;
use super::domain::RoleType;
use super::report::Scorecard;
use super::rollup::OrgSummary;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_CADENCE: &str = "biweekly";

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot history not found at {0}")]
    NotFound(PathBuf),
    #[error("failed to access snapshot history: {0}")]
    Io(#[from] io::Error),
    #[error("snapshot history is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot dated {attempted} must come after the latest snapshot ({latest})")]
    OutOfOrder {
        latest: NaiveDate,
        attempted: NaiveDate,
    },
    #[error("metadata records {recorded} snapshots but the series holds {actual}")]
    MetadataMismatch { recorded: usize, actual: usize },
    #[error("snapshot dated {date} is numbered {found}, expected {expected}")]
    NumberingGap {
        date: NaiveDate,
        expected: usize,
        found: usize,
    },
    #[error("metadata covers {recorded_start:?}..{recorded_end:?} but snapshots span {actual_start:?}..{actual_end:?}")]
    DateRangeMismatch {
        recorded_start: Option<NaiveDate>,
        recorded_end: Option<NaiveDate>,
        actual_start: Option<NaiveDate>,
        actual_end: Option<NaiveDate>,
    },
}

/// Per-person score as persisted; component scores are optional in older files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonSnapshot {
    pub name: String,
    pub role_type: RoleType,
    pub final_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement_score: Option<f64>,
    #[serde(default)]
    pub total_violations: usize,
}

impl From<&PersonScore> for PersonSnapshot {
    fn from(score: &PersonScore) -> Self {
        Self {
            name: score.name.clone(),
            role_type: score.role_type,
            final_score: score.final_score,
            feedback_score: Some(score.feedback_score),
            velocity_score: Some(score.velocity_score),
            engagement_score: Some(score.engagement_score),
            total_violations: score.total_violations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub snapshot_num: usize,
    pub snapshot_date: NaiveDate,
    pub org_summary: OrgSummary,
    #[serde(default)]
    pub recruiters: Vec<PersonSnapshot>,
    #[serde(default)]
    pub hiring_managers: Vec<PersonSnapshot>,
}

impl Snapshot {
    /// Freezes `scorecard` as of `date`. The series assigns `snapshot_num` on append.
    pub fn capture(date: NaiveDate, scorecard: &Scorecard) -> Self {
        Self {
            snapshot_num: 0,
            snapshot_date: date,
            org_summary: scorecard.org_summary().clone(),
            recruiters: scorecard
                .people_in_role(RoleType::Recruiter)
                .map(PersonSnapshot::from)
                .collect(),
            hiring_managers: scorecard
                .people_in_role(RoleType::HiringManager)
                .map(PersonSnapshot::from)
                .collect(),
        }
    }

    pub fn person(&self, name: &str, role: RoleType) -> Option<&PersonSnapshot> {
        let people = match role {
            RoleType::Recruiter => &self.recruiters,
            RoleType::HiringManager => &self.hiring_managers,
        };
        people.iter().find(|person| person.name == name)
    }

    pub fn people(&self) -> impl Iterator<Item = &PersonSnapshot> {
        self.recruiters.iter().chain(&self.hiring_managers)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesMetadata {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub num_snapshots: usize,
    pub cadence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSeries {
    snapshots: Vec<Snapshot>,
    metadata: SeriesMetadata,
}

impl SnapshotSeries {
    pub fn new(cadence: impl Into<String>) -> Self {
        Self {
            snapshots: Vec::new(),
            metadata: SeriesMetadata {
                start_date: None,
                end_date: None,
                num_snapshots: 0,
                cadence: cadence.into(),
            },
        }
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn metadata(&self) -> &SeriesMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Appends `snapshot`, numbering it after the last one.
    pub fn append(&mut self, mut snapshot: Snapshot) -> Result<&Snapshot, SnapshotError> {
        if let Some(latest) = self.latest() {
            if snapshot.snapshot_date <= latest.snapshot_date {
                return Err(SnapshotError::OutOfOrder {
                    latest: latest.snapshot_date,
                    attempted: snapshot.snapshot_date,
                });
            }
            snapshot.snapshot_num = latest.snapshot_num + 1;
        } else {
            snapshot.snapshot_num = 0;
        }

        self.snapshots.push(snapshot);
        self.refresh_metadata();
        Ok(&self.snapshots[self.snapshots.len() - 1])
    }

    fn refresh_metadata(&mut self) {
        self.metadata.start_date = self.snapshots.first().map(|s| s.snapshot_date);
        self.metadata.end_date = self.snapshots.last().map(|s| s.snapshot_date);
        self.metadata.num_snapshots = self.snapshots.len();
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        for pair in self.snapshots.windows(2) {
            if pair[1].snapshot_date <= pair[0].snapshot_date {
                return Err(SnapshotError::OutOfOrder {
                    latest: pair[0].snapshot_date,
                    attempted: pair[1].snapshot_date,
                });
            }
        }

        if self.metadata.num_snapshots != self.snapshots.len() {
            return Err(SnapshotError::MetadataMismatch {
                recorded: self.metadata.num_snapshots,
                actual: self.snapshots.len(),
            });
        }

        for pair in self.snapshots.windows(2) {
            let expected = pair[0].snapshot_num + 1;
            if pair[1].snapshot_num != expected {
                return Err(SnapshotError::NumberingGap {
                    date: pair[1].snapshot_date,
                    expected,
                    found: pair[1].snapshot_num,
                });
            }
        }

        let actual_start = self.snapshots.first().map(|s| s.snapshot_date);
        let actual_end = self.snapshots.last().map(|s| s.snapshot_date);
        if self.metadata.start_date != actual_start || self.metadata.end_date != actual_end {
            return Err(SnapshotError::DateRangeMismatch {
                recorded_start: self.metadata.start_date,
                recorded_end: self.metadata.end_date,
                actual_start,
                actual_end,
            });
        }

        Ok(())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        let series: Self = serde_json::from_reader(reader)?;
        series.validate()?;
        Ok(series)
    }

    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        Self::from_reader(raw.as_bytes())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => SnapshotError::NotFound(path.to_path_buf()),
            _ => SnapshotError::Io(err),
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Loads the series at `path`, or starts an empty one when the file does not exist yet.
    pub fn load_or_new(path: impl AsRef<Path>, cadence: &str) -> Result<Self, SnapshotError> {
        match Self::from_path(path) {
            Err(SnapshotError::NotFound(path)) => {
                info!(path = %path.display(), cadence, "starting new snapshot history");
                Ok(Self::new(cadence))
            }
            other => other,
        }
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), SnapshotError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
