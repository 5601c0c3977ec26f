use crate::infra::parse_date;
use crate::routes::ScorecardResponse;
use chrono::{Local, NaiveDate};
use clap::Args;
use hiring_scorecard::config::AppConfig;
use hiring_scorecard::error::AppError;
use hiring_scorecard::workflows::ats::AtsImporter;
use hiring_scorecard::workflows::scorecard::trends::{person_history, DEFAULT_HIGHLIGHTS};
use hiring_scorecard::workflows::scorecard::{
    LeaderboardEntry, OrgTrend, PersonDelta, PersonDetailView, PersonHistoryPoint, PersonTrend,
    Scorecard, ScorecardEngine, ScorecardInsights, ScorecardSummary, Snapshot, SnapshotSeries,
    TrendReport,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// ATS export to score
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Evaluation date used for days-open (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Print JSON instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
    /// Show the detail card for a single person
    #[arg(long)]
    pub(crate) person: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct CaptureArgs {
    /// ATS export to score
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Snapshot history file; created when missing
    #[arg(long)]
    pub(crate) history: PathBuf,
    /// Snapshot date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Cadence recorded on a new history file (defaults to SCORECARD_CADENCE)
    #[arg(long)]
    pub(crate) cadence: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct TrendsArgs {
    /// Snapshot history file
    #[arg(long)]
    pub(crate) history: PathBuf,
    /// Include the score history of one person
    #[arg(long)]
    pub(crate) person: Option<String>,
}

fn evaluate_export(path: &Path, as_of: NaiveDate) -> Result<Scorecard, AppError> {
    let records = AtsImporter::from_path(path)?;
    Ok(ScorecardEngine::standard().evaluate(&records, as_of)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        csv,
        as_of,
        json,
        person,
    } = args;

    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let scorecard = evaluate_export(&csv, as_of)?;

    if let Some(name) = person {
        match scorecard.person_detail(&name, None) {
            Some(detail) if json => print_json(&detail)?,
            Some(detail) => render_person(&detail),
            None => eprintln!("No scorecard entry for '{name}'"),
        }
        return Ok(());
    }

    let response = ScorecardResponse::from(&scorecard);
    if json {
        print_json(&response)
    } else {
        render_scorecard(&response.summary, &response.insights);
        Ok(())
    }
}

pub(crate) fn run_capture(args: CaptureArgs) -> Result<(), AppError> {
    let CaptureArgs {
        csv,
        history,
        date,
        cadence,
    } = args;

    let cadence = match cadence {
        Some(cadence) => cadence,
        None => AppConfig::load()?.data.cadence,
    };
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let scorecard = evaluate_export(&csv, date)?;

    let mut series = SnapshotSeries::load_or_new(&history, &cadence)?;
    let snapshot = series.append(Snapshot::capture(date, &scorecard))?;
    println!(
        "Recorded snapshot #{} for {}: org average {:.1}, {} violations ({} high severity)",
        snapshot.snapshot_num,
        snapshot.snapshot_date,
        snapshot.org_summary.org_average_score,
        snapshot.org_summary.total_violations,
        snapshot.org_summary.high_severity_total
    );
    series.save(&history)?;
    println!(
        "History {} now holds {} snapshot(s) ({} cadence)",
        history.display(),
        series.len(),
        series.metadata().cadence
    );
    Ok(())
}

pub(crate) fn run_trends(args: TrendsArgs) -> Result<(), AppError> {
    let series = SnapshotSeries::from_path(&args.history)?;
    let report = TrendReport::build(&series, DEFAULT_HIGHLIGHTS);
    render_trends(&report);

    if let Some(name) = args.person {
        render_person_history(&name, &person_history(&series, &name, None));
    }
    Ok(())
}

fn render_leaderboard(title: &str, entries: &[LeaderboardEntry]) {
    println!("\n{title}");
    for entry in entries {
        let score = &entry.score;
        println!(
            "{}. {}: {:.1} ({}) | feedback {:.1}, velocity {:.1}, engagement {:.1} | {} violations",
            entry.rank,
            score.name,
            score.final_score,
            entry.band_label,
            score.feedback_score,
            score.velocity_score,
            score.engagement_score,
            score.total_violations
        );
    }
}

pub(crate) fn render_scorecard(summary: &ScorecardSummary, insights: &ScorecardInsights) {
    let org = &summary.org;
    println!("Hiring scorecard (as of {})", summary.as_of);
    println!(
        "Organization: {:.1} ({}) | Recruiters {:.1} | Hiring managers {:.1}",
        org.org_average_score, summary.org_band_label, org.recruiter_average, org.hm_average
    );
    println!(
        "Violations: {} total, {} high severity across {} people",
        org.total_violations, org.high_severity_total, org.people_count
    );

    render_leaderboard("Recruiter leaderboard", &summary.recruiter_leaderboard);
    render_leaderboard("Hiring manager leaderboard", &summary.hm_leaderboard);

    println!("\nDepartments");
    for team in &summary.departments {
        println!(
            "- {}: {:.1} | recruiters {:.1}, hiring managers {:.1} | {} open roles, {} violations",
            team.team,
            team.department_score,
            team.recruiter_average,
            team.hm_average,
            team.open_roles,
            team.violations
        );
    }

    println!("\nRoles");
    for role in &summary.roles {
        let days_open = role
            .days_open
            .map(|days| format!("{days} days open"))
            .unwrap_or_else(|| "open date unknown".to_string());
        println!(
            "- {} {} ({}): {:.1} | {} / {} | {} | {}",
            role.requisition_id,
            role.job_title,
            role.department,
            role.combined_score,
            role.recruiter_name,
            role.hiring_manager_name,
            days_open,
            role.action_items.join("; ")
        );
    }

    println!("\nViolations by metric");
    for count in &summary.violations_by_metric {
        println!(
            "- {}: {} ({} high)",
            count.metric_label, count.total, count.high
        );
    }

    if !insights.roles_needing_attention.is_empty() {
        println!("\nRoles needing immediate attention");
        for role in &insights.roles_needing_attention {
            println!(
                "- {} {} ({}): {:.1}",
                role.requisition_id, role.job_title, role.department, role.combined_score
            );
        }
    }

    if !insights.observations.is_empty() {
        println!("\nObservations");
        for note in &insights.observations {
            println!("- {}", note);
        }
    }

    if !insights.recommended_actions.is_empty() {
        println!("\nRecommended actions");
        for action in &insights.recommended_actions {
            println!("- {}", action);
        }
    }
}

pub(crate) fn render_person(detail: &PersonDetailView) {
    let score = &detail.score;
    println!("{} ({})", score.name, detail.role_label);
    println!(
        "Score {:.1} ({}) | rank {} of {}",
        score.final_score, detail.band_label, detail.rank, detail.ranked_out_of
    );
    println!(
        "Feedback {:.1} | Velocity {:.1} | Engagement {:.1}",
        score.feedback_score, score.velocity_score, score.engagement_score
    );
    println!("Weakest metric: {}", detail.weakest_metric_label);
    println!("Teams: {}", detail.teams.join(", "));
    let requisitions: Vec<&str> = detail.requisitions.iter().map(|id| id.as_str()).collect();
    println!("Requisitions: {}", requisitions.join(", "));

    if detail.violations.is_empty() {
        println!("\nViolations: none");
    } else {
        println!("\nViolations");
        for violation in &detail.violations {
            println!(
                "- [{}] {} {} ({}): {}",
                violation.severity_label,
                violation.requisition_id,
                violation.metric_label,
                violation.magnitude_label,
                violation.description
            );
        }
    }
}

fn describe_org_trend(trend: &OrgTrend) -> String {
    format!(
        "{} -> {}: org {:+.1} ({}), recruiters {:+.1}, hiring managers {:+.1}, high severity reduced by {}",
        trend.from,
        trend.to,
        trend.org_average.delta,
        trend.org_average.direction.label(),
        trend.recruiter_average.delta,
        trend.hm_average.delta,
        trend.high_severity_reduction
    )
}

fn describe_person_trend(trend: &PersonTrend) -> String {
    match trend.change {
        PersonDelta::Available(change) => format!(
            "{} ({}): {:.1} -> {:.1} ({:+.1}, {})",
            trend.name,
            trend.role_type.label(),
            change.earlier,
            change.later,
            change.delta,
            change.direction.label()
        ),
        PersonDelta::InsufficientHistory => format!(
            "{} ({}): insufficient history",
            trend.name,
            trend.role_type.label()
        ),
    }
}

pub(crate) fn render_trends(report: &TrendReport) {
    println!("Snapshot trends ({} snapshots)", report.snapshots);
    let Some(overall) = &report.overall else {
        println!("At least two snapshots are needed to compute trends");
        return;
    };

    println!("Overall: {}", describe_org_trend(overall));

    if report.consecutive.len() > 1 {
        println!("\nPeriod over period");
        for step in &report.consecutive {
            println!("- {}", describe_org_trend(step));
        }
    }

    println!("\nPeople");
    for trend in &report.people {
        println!("- {}", describe_person_trend(trend));
    }

    if !report.most_improved.is_empty() {
        println!("\nMost improved");
        for trend in &report.most_improved {
            println!("- {}", describe_person_trend(trend));
        }
    }

    if !report.needs_support.is_empty() {
        println!("\nNeeds support");
        for trend in &report.needs_support {
            println!("- {}", describe_person_trend(trend));
        }
    }
}

fn render_person_history(name: &str, points: &[PersonHistoryPoint]) {
    if points.is_empty() {
        println!("\nNo snapshots recorded for '{name}'");
        return;
    }

    println!("\nHistory for {name}");
    for point in points {
        println!(
            "- #{} {} ({}): {:.1}, {} violations",
            point.snapshot_num,
            point.snapshot_date,
            point.role_type.label(),
            point.final_score,
            point.total_violations
        );
    }
}
