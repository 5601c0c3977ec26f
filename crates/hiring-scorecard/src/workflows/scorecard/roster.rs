use super::domain::{PipelineRecord, RequisitionId, RoleType, ScoringError};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, BTreeSet};

/// Requisition-level facts shared by every row of one requisition.
#[derive(Debug, Clone, PartialEq)]
pub struct RequisitionInfo {
    pub requisition_id: RequisitionId,
    pub job_title: String,
    pub team: String,
    pub recruiter_name: String,
    pub hiring_manager_name: String,
    pub role_opened_date: Option<NaiveDate>,
    pub current_status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub name: String,
    pub role: RoleType,
    pub teams: BTreeSet<String>,
    pub requisitions: BTreeSet<RequisitionId>,
}

/// Everyone who can be scored, derived from the requisition assignments in the export.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    people: BTreeMap<(RoleType, String), RosterEntry>,
    requisitions: BTreeMap<RequisitionId, RequisitionInfo>,
}

impl Roster {
    pub fn from_records(records: &[PipelineRecord]) -> Result<Self, ScoringError> {
        if records.is_empty() {
            return Err(ScoringError::NoRecords);
        }

        let mut roster = Roster::default();
        // Latest stage entry per requisition decides its reported status.
        let mut latest_entry: BTreeMap<RequisitionId, NaiveDateTime> = BTreeMap::new();

        for record in records {
            match roster.requisitions.get(&record.requisition_id) {
                Some(info) => {
                    ensure_same(info, RoleType::Recruiter, &record.recruiter_name)?;
                    ensure_same(info, RoleType::HiringManager, &record.hiring_manager_name)?;
                }
                None => {
                    roster.requisitions.insert(
                        record.requisition_id.clone(),
                        RequisitionInfo {
                            requisition_id: record.requisition_id.clone(),
                            job_title: record.job_title.clone(),
                            team: record.team.clone(),
                            recruiter_name: record.recruiter_name.clone(),
                            hiring_manager_name: record.hiring_manager_name.clone(),
                            role_opened_date: record.role_opened_date,
                            current_status: record.current_status.clone(),
                        },
                    );
                }
            }

            if let Some(entered) = record.stage_entered_at {
                let newer = latest_entry
                    .get(&record.requisition_id)
                    .map_or(true, |current| entered > *current);
                if newer {
                    latest_entry.insert(record.requisition_id.clone(), entered);
                    if let Some(info) = roster.requisitions.get_mut(&record.requisition_id) {
                        info.current_status = record.current_status.clone();
                    }
                }
            }

            roster.enroll(&record.recruiter_name, RoleType::Recruiter, record);
            roster.enroll(&record.hiring_manager_name, RoleType::HiringManager, record);
        }

        Ok(roster)
    }

    fn enroll(&mut self, name: &str, role: RoleType, record: &PipelineRecord) {
        let entry = self
            .people
            .entry((role, name.to_string()))
            .or_insert_with(|| RosterEntry {
                name: name.to_string(),
                role,
                teams: BTreeSet::new(),
                requisitions: BTreeSet::new(),
            });
        entry.teams.insert(record.team.clone());
        entry.requisitions.insert(record.requisition_id.clone());
    }

    pub fn contains(&self, name: &str, role: RoleType) -> bool {
        self.people.contains_key(&(role, name.to_string()))
    }

    pub fn entry(&self, name: &str, role: RoleType) -> Option<&RosterEntry> {
        self.people.get(&(role, name.to_string()))
    }

    /// People holding `role`, ordered by name.
    pub fn people(&self, role: RoleType) -> impl Iterator<Item = &RosterEntry> {
        self.people.values().filter(move |entry| entry.role == role)
    }

    pub fn requisitions(&self) -> impl Iterator<Item = &RequisitionInfo> {
        self.requisitions.values()
    }

    pub fn requisition(&self, id: &RequisitionId) -> Option<&RequisitionInfo> {
        self.requisitions.get(id)
    }

    pub fn teams(&self) -> BTreeSet<&str> {
        self.requisitions
            .values()
            .map(|info| info.team.as_str())
            .collect()
    }
}

fn ensure_same(info: &RequisitionInfo, role: RoleType, candidate: &str) -> Result<(), ScoringError> {
    let assigned = match role {
        RoleType::Recruiter => &info.recruiter_name,
        RoleType::HiringManager => &info.hiring_manager_name,
    };

    if assigned == candidate {
        Ok(())
    } else {
        Err(ScoringError::ConflictingAssignment {
            requisition: info.requisition_id.clone(),
            role,
            first: assigned.clone(),
            second: candidate.to_string(),
        })
    }
}
