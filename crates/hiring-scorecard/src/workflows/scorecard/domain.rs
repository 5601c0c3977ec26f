use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for an open requisition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequisitionId(pub String);

impl RequisitionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequisitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One normalized row of the hiring-pipeline export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRecord {
    pub requisition_id: RequisitionId,
    pub job_title: String,
    pub team: String,
    pub recruiter_name: String,
    pub hiring_manager_name: String,
    pub role_opened_date: Option<NaiveDate>,
    pub current_status: String,
    pub stage: String,
    pub stage_entered_at: Option<NaiveDateTime>,
    pub interview_completed_at: Option<NaiveDateTime>,
    pub feedback_submitted_at: Option<NaiveDateTime>,
    pub interviewer_name: String,
    pub is_hiring_manager_interview: bool,
}

impl PipelineRecord {
    /// Hours between interview completion and feedback, when both are known.
    pub fn feedback_delay_hours(&self) -> Option<f64> {
        match (self.interview_completed_at, self.feedback_submitted_at) {
            (Some(completed), Some(submitted)) => {
                Some((submitted - completed).num_seconds() as f64 / 3600.0)
            }
            _ => None,
        }
    }

    pub fn feedback_missing(&self) -> bool {
        self.interview_completed_at.is_some() && self.feedback_submitted_at.is_none()
    }
}

/// The three weighted SLA metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    FeedbackTimeliness,
    StageVelocity,
    HmEngagement,
}

impl Metric {
    pub const fn ordered() -> [Self; 3] {
        [
            Self::FeedbackTimeliness,
            Self::StageVelocity,
            Self::HmEngagement,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::FeedbackTimeliness => "feedback_timeliness",
            Self::StageVelocity => "stage_velocity",
            Self::HmEngagement => "hm_engagement",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FeedbackTimeliness => "Interview Feedback Timeliness",
            Self::StageVelocity => "Stage Progression Velocity",
            Self::HmEngagement => "Hiring Manager Engagement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Which side of the hiring team a person is scored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    #[serde(alias = "Recruiter")]
    Recruiter,
    #[serde(alias = "Hiring Manager")]
    HiringManager,
}

impl RoleType {
    pub const fn ordered() -> [Self; 2] {
        [Self::Recruiter, Self::HiringManager]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Recruiter => "Recruiter",
            Self::HiringManager => "Hiring Manager",
        }
    }
}

/// Coarse grouping used to triage people and roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Critical,
    NeedsAttention,
    Good,
}

impl ScoreBand {
    pub fn for_score(score: f64) -> Self {
        if score >= 70.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::NeedsAttention
        } else {
            Self::Critical
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::NeedsAttention => "Needs Attention",
            Self::Good => "Good",
        }
    }
}

/// Pipeline stages the velocity detector knows how to time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    New,
    PhoneScreen,
    TechnicalInterview,
    FinalInterview,
    Offer,
    Hired,
}

impl PipelineStage {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::New,
            Self::PhoneScreen,
            Self::TechnicalInterview,
            Self::FinalInterview,
            Self::Offer,
            Self::Hired,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::PhoneScreen => "Phone Screen",
            Self::TechnicalInterview => "Technical Interview",
            Self::FinalInterview => "Final Interview",
            Self::Offer => "Offer",
            Self::Hired => "Hired",
        }
    }

    /// Case and whitespace insensitive lookup; `None` for stages outside the catalogue.
    pub fn from_label(raw: &str) -> Option<Self> {
        let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_lowercase().as_str() {
            "new" => Some(Self::New),
            "phone screen" => Some(Self::PhoneScreen),
            "technical interview" => Some(Self::TechnicalInterview),
            "final interview" | "onsite interview" => Some(Self::FinalInterview),
            "offer" => Some(Self::Offer),
            "hired" => Some(Self::Hired),
            _ => None,
        }
    }
}

/// Metric-specific measurement behind a violation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Magnitude {
    DelayHours { hours: f64 },
    MissingFeedback,
    DaysInStage { days: i64 },
    MissedActions { missing: u32, delayed: u32 },
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DelayHours { hours } => write!(f, "{hours:.1}h"),
            Self::MissingFeedback => f.write_str("missing"),
            Self::DaysInStage { days } => write!(f, "{days} days"),
            Self::MissedActions { missing, delayed } => {
                write!(f, "{missing} missing, {delayed} delayed")
            }
        }
    }
}

/// Person accountable for a violation, tagged with the role they are scored in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResponsibleParty {
    pub name: String,
    pub role: RoleType,
}

/// One detected SLA breach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub requisition_id: RequisitionId,
    pub metric: Metric,
    pub severity: Severity,
    pub penalty: i32,
    pub magnitude: Magnitude,
    pub recruiter_name: String,
    pub hiring_manager_name: String,
    pub responsible_party: ResponsibleParty,
    pub stage: String,
    pub description: String,
}

impl Violation {
    pub fn is_attributed_to(&self, name: &str, role: RoleType) -> bool {
        self.responsible_party.role == role && self.responsible_party.name == name
    }
}

/// Failures raised while turning records into scores.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("no pipeline records supplied; refusing to score an empty table")]
    NoRecords,
    #[error("requisition {requisition} lists both '{first}' and '{second}' as {role:?}")]
    ConflictingAssignment {
        requisition: RequisitionId,
        role: RoleType,
        first: String,
        second: String,
    },
    #[error("violation on requisition {requisition} names {role:?} '{name}' who is not on the roster")]
    UnknownResponsibleParty {
        requisition: RequisitionId,
        name: String,
        role: RoleType,
    },
    #[error("{role:?} '{name}' is on the roster but has no computed score")]
    MissingScore { name: String, role: RoleType },
    #[error("invalid scoring rules: {0}")]
    InvalidRules(String),
}
