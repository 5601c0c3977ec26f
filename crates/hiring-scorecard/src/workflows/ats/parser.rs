use super::normalizer::{normalize_text, parse_flag, parse_timestamp};
use super::AtsImportError;
use crate::workflows::scorecard::{PipelineRecord, RequisitionId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct AtsRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    requisition_id: Option<String>,
    #[serde(default)]
    job_title: String,
    #[serde(default)]
    team: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    recruiter_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    hiring_manager_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    role_opened_date: Option<String>,
    #[serde(default)]
    current_status: String,
    #[serde(default)]
    stage: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    stage_entered_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    interview_completed_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    feedback_submitted_date: Option<String>,
    #[serde(default)]
    interviewer_name: String,
    #[serde(default)]
    is_hiring_manager_interview: String,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<PipelineRecord>, AtsImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for result in csv_reader.records() {
        let raw = result?;
        let line = raw.position().map_or(0, |position| position.line());
        let row: AtsRow = raw.deserialize(Some(&headers))?;
        records.push(row.into_record(line)?);
    }

    Ok(records)
}

impl AtsRow {
    fn into_record(self, line: u64) -> Result<PipelineRecord, AtsImportError> {
        let requisition_id = required(self.requisition_id, "requisition_id", line)?;
        let recruiter_name = required(self.recruiter_name, "recruiter_name", line)?;
        let hiring_manager_name = required(self.hiring_manager_name, "hiring_manager_name", line)?;

        let is_hiring_manager_interview =
            parse_flag(&self.is_hiring_manager_interview).ok_or_else(|| {
                AtsImportError::InvalidRow {
                    line,
                    reason: format!(
                        "is_hiring_manager_interview '{}' is not a boolean",
                        self.is_hiring_manager_interview
                    ),
                }
            })?;

        Ok(PipelineRecord {
            requisition_id: RequisitionId(requisition_id),
            job_title: normalize_text(&self.job_title),
            team: normalize_text(&self.team),
            recruiter_name,
            hiring_manager_name,
            role_opened_date: timestamp(self.role_opened_date, "role_opened_date", line)
                .map(|opened| opened.date()),
            current_status: normalize_text(&self.current_status),
            stage: normalize_text(&self.stage),
            stage_entered_at: timestamp(self.stage_entered_date, "stage_entered_date", line),
            interview_completed_at: timestamp(
                self.interview_completed_date,
                "interview_completed_date",
                line,
            ),
            feedback_submitted_at: timestamp(
                self.feedback_submitted_date,
                "feedback_submitted_date",
                line,
            ),
            interviewer_name: normalize_text(&self.interviewer_name),
            is_hiring_manager_interview,
        })
    }
}

fn required(value: Option<String>, column: &str, line: u64) -> Result<String, AtsImportError> {
    value
        .map(|raw| normalize_text(&raw))
        .filter(|normalized| !normalized.is_empty())
        .ok_or_else(|| AtsImportError::InvalidRow {
            line,
            reason: format!("{column} is required"),
        })
}

fn timestamp(value: Option<String>, column: &str, line: u64) -> Option<NaiveDateTime> {
    let raw = value?;
    let parsed = parse_timestamp(&raw);
    if parsed.is_none() {
        warn!(line, column, value = %raw, "ignoring unparseable timestamp");
    }
    parsed
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
