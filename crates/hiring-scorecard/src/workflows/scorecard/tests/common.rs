use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::workflows::scorecard::aggregate::PersonScore;
use crate::workflows::scorecard::domain::{PipelineRecord, RequisitionId, RoleType};
use crate::workflows::scorecard::rollup::OrgSummary;
use crate::workflows::scorecard::rules::ScoringRules;
use crate::workflows::scorecard::snapshot::{PersonSnapshot, Snapshot};

pub(super) const RECRUITER: &str = "Sarah Chen";
pub(super) const HIRING_MANAGER: &str = "Tom Brady";

pub(super) fn rules() -> ScoringRules {
    ScoringRules::standard()
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn as_of() -> NaiveDate {
    date(2025, 2, 1)
}

/// `days` and `hours` after midnight on 2025-01-01.
pub(super) fn at(days: i64, hours: i64) -> NaiveDateTime {
    date(2025, 1, 1).and_hms_opt(0, 0, 0).expect("valid time")
        + Duration::days(days)
        + Duration::hours(hours)
}

pub(super) fn row(requisition: &str, recruiter: &str, hiring_manager: &str) -> PipelineRecord {
    PipelineRecord {
        requisition_id: RequisitionId(requisition.to_string()),
        job_title: "Backend Engineer".to_string(),
        team: "Engineering".to_string(),
        recruiter_name: recruiter.to_string(),
        hiring_manager_name: hiring_manager.to_string(),
        role_opened_date: Some(date(2025, 1, 1)),
        current_status: "Open".to_string(),
        stage: "New".to_string(),
        stage_entered_at: Some(at(0, 0)),
        interview_completed_at: None,
        feedback_submitted_at: None,
        interviewer_name: String::new(),
        is_hiring_manager_interview: false,
    }
}

pub(super) fn stage_entry(requisition: &str, stage: &str, entered_day: i64) -> PipelineRecord {
    PipelineRecord {
        stage: stage.to_string(),
        stage_entered_at: Some(at(entered_day, 0)),
        ..row(requisition, RECRUITER, HIRING_MANAGER)
    }
}

/// An interview completed on day 1 at 09:00 with feedback `delay_hours` later, if any.
/// Carries no stage entry so it never shifts stage timing.
pub(super) fn interview(
    requisition: &str,
    delay_hours: Option<i64>,
    by_hiring_manager: bool,
) -> PipelineRecord {
    let completed = at(1, 9);
    PipelineRecord {
        stage: "Technical Interview".to_string(),
        stage_entered_at: None,
        interview_completed_at: Some(completed),
        feedback_submitted_at: delay_hours.map(|hours| completed + Duration::hours(hours)),
        interviewer_name: if by_hiring_manager {
            HIRING_MANAGER.to_string()
        } else {
            "Panel Interviewer".to_string()
        },
        is_hiring_manager_interview: by_hiring_manager,
        ..row(requisition, RECRUITER, HIRING_MANAGER)
    }
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn person(name: &str, role: RoleType, final_score: f64) -> PersonScore {
    PersonScore {
        name: name.to_string(),
        role_type: role,
        final_score,
        feedback_score: final_score,
        velocity_score: final_score,
        engagement_score: final_score,
        total_violations: 0,
        high_severity: 0,
        medium_severity: 0,
        low_severity: 0,
    }
}

/// Two engineering requisitions owned by one pair plus a design requisition.
pub(super) fn sample_records() -> Vec<PipelineRecord> {
    let mut records = vec![
        stage_entry("REQ-1", "Phone Screen", 0),
        stage_entry("REQ-1", "Technical Interview", 5),
        interview("REQ-1", Some(50), true),
        stage_entry("REQ-1", "Final Interview", 25),
        stage_entry("REQ-2", "New", 0),
        interview("REQ-2", Some(12), false),
    ];

    let design = |stage: &str, day: i64| PipelineRecord {
        job_title: "Product Designer".to_string(),
        team: "Design".to_string(),
        stage: stage.to_string(),
        stage_entered_at: Some(at(day, 0)),
        ..row("REQ-3", "Mike Rodriguez", "Alex Kumar")
    };
    records.push(design("New", 0));
    records.push(design("Phone Screen", 3));

    records
}

pub(super) fn snapshot(
    date: NaiveDate,
    org_average: f64,
    high_severity_total: usize,
    people: &[(&str, RoleType, f64)],
) -> Snapshot {
    let entry = |(name, role, score): &(&str, RoleType, f64)| PersonSnapshot {
        name: name.to_string(),
        role_type: *role,
        final_score: *score,
        feedback_score: None,
        velocity_score: None,
        engagement_score: None,
        total_violations: 0,
    };

    Snapshot {
        snapshot_num: 0,
        snapshot_date: date,
        org_summary: OrgSummary {
            org_average_score: org_average,
            recruiter_average: org_average,
            hm_average: org_average,
            total_violations: high_severity_total * 2,
            high_severity_total,
            people_count: people.len(),
        },
        recruiters: people
            .iter()
            .filter(|(_, role, _)| *role == RoleType::Recruiter)
            .map(entry)
            .collect(),
        hiring_managers: people
            .iter()
            .filter(|(_, role, _)| *role == RoleType::HiringManager)
            .map(entry)
            .collect(),
    }
}
