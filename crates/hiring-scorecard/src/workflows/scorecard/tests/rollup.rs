use super::common::*;
use crate::workflows::scorecard::detectors::detect_all;
use crate::workflows::scorecard::domain::{
    Metric, PipelineRecord, RoleType, ScoreBand, ScoringError,
};
use crate::workflows::scorecard::rollup::{role_scores, team_summaries, OrgSummary};
use crate::workflows::scorecard::roster::Roster;
use crate::workflows::scorecard::{score_roster, ScorecardEngine};

fn scorecard() -> crate::workflows::scorecard::Scorecard {
    ScorecardEngine::standard()
        .evaluate(&sample_records(), as_of())
        .expect("sample scores")
}

#[test]
fn org_summary_pools_every_person() {
    let card = scorecard();
    let org = card.org_summary();

    assert_close(org.org_average_score, 94.63125);
    assert_close(org.recruiter_average, 93.975);
    assert_close(org.hm_average, 95.2875);
    assert_eq!(org.total_violations, 5);
    assert_eq!(org.high_severity_total, 1);
    assert_eq!(org.people_count, 4);
}

#[test]
fn org_summary_needs_scored_people() {
    assert!(matches!(
        OrgSummary::from_scores(&[], &[]),
        Err(ScoringError::NoRecords)
    ));
}

#[test]
fn rollups_reject_rostered_people_without_scores() {
    let rules = rules();
    let records = sample_records();
    let roster = Roster::from_records(&records).expect("roster builds");
    let violations = detect_all(&records, &rules);

    assert!(matches!(
        role_scores(&roster, &[], &violations, &rules, as_of()),
        Err(ScoringError::MissingScore { .. })
    ));
    assert!(matches!(
        team_summaries(&roster, &[], &violations),
        Err(ScoringError::MissingScore { .. })
    ));

    let people = score_roster(&roster, &violations, &rules).expect("scores");
    let without_tom: Vec<_> = people
        .iter()
        .filter(|score| score.name != HIRING_MANAGER)
        .cloned()
        .collect();
    match role_scores(&roster, &without_tom, &violations, &rules, as_of()) {
        Err(ScoringError::MissingScore { name, role }) => {
            assert_eq!(name, HIRING_MANAGER);
            assert_eq!(role, RoleType::HiringManager);
        }
        other => panic!("expected a missing score, got {other:?}"),
    }
}

#[test]
fn combined_role_score_is_mean_of_both_owners() {
    let card = scorecard();
    let role = card
        .roles()
        .iter()
        .find(|role| role.requisition_id.as_str() == "REQ-1")
        .expect("REQ-1 scored");

    assert_close(role.recruiter_score, 89.0);
    assert_close(role.hm_score, 91.1);
    assert_close(role.combined_score, 90.05);
    assert_eq!(role.high_severity_violations, 1);
    assert_eq!(role.days_open, Some(31));
    assert_eq!(role.department, "Engineering");
    assert_eq!(
        role.action_items,
        vec!["1 critical issue(s)", "Feedback overdue", "Stage delay"]
    );
}

#[test]
fn person_delta_moves_combined_score_by_half() {
    let rules = rules();
    let records = sample_records();
    let roster = Roster::from_records(&records).expect("roster builds");
    let violations = detect_all(&records, &rules);
    let mut people = score_roster(&roster, &violations, &rules).expect("scores");

    let before =
        role_scores(&roster, &people, &violations, &rules, as_of()).expect("roles roll up");
    for score in people.iter_mut() {
        if score.name == RECRUITER {
            score.final_score += 10.0;
        }
    }
    let after =
        role_scores(&roster, &people, &violations, &rules, as_of()).expect("roles roll up");

    for (earlier, later) in before.iter().zip(&after) {
        let expected = if earlier.recruiter_name == RECRUITER { 5.0 } else { 0.0 };
        assert_close(later.combined_score - earlier.combined_score, expected);
    }
}

#[test]
fn quiet_role_is_on_track_and_unknown_open_date_has_no_age() {
    let mut records = sample_records();
    for record in records.iter_mut().filter(|record| record.requisition_id.as_str() == "REQ-3") {
        record.role_opened_date = None;
    }
    let card = ScorecardEngine::standard()
        .evaluate(&records, as_of())
        .expect("scores");

    let design = card
        .roles()
        .iter()
        .find(|role| role.requisition_id.as_str() == "REQ-3")
        .expect("REQ-3 scored");
    assert_eq!(design.days_open, None);
    assert_eq!(design.action_items, vec!["On track"]);
    assert_eq!(design.band, ScoreBand::Good);
}

#[test]
fn role_status_follows_latest_stage_entry() {
    let mut records = sample_records();
    records.push(PipelineRecord {
        current_status: "Offer Extended".to_string(),
        ..stage_entry("REQ-1", "Offer", 30)
    });
    records.push(PipelineRecord {
        current_status: "Stale".to_string(),
        ..stage_entry("REQ-1", "New", -5)
    });

    let card = ScorecardEngine::standard()
        .evaluate(&records, as_of())
        .expect("scores");
    let role = card
        .roles()
        .iter()
        .find(|role| role.requisition_id.as_str() == "REQ-1")
        .expect("REQ-1 scored");

    assert_eq!(role.current_status, "Offer Extended");
}

#[test]
fn departments_use_pooled_mean_and_sort_best_first() {
    let card = scorecard();
    let teams = card.teams();

    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0].team, "Design");
    assert_close(teams[0].department_score, 99.2125);
    assert_eq!(teams[1].team, "Engineering");
    assert_close(teams[1].recruiter_average, 89.0);
    assert_close(teams[1].hm_average, 91.1);
    assert_close(teams[1].department_score, 90.05);
    assert_eq!(teams[1].open_roles, 2);
    assert_eq!(teams[1].violations, 4);
    assert_eq!(teams[1].recruiters, vec![RECRUITER.to_string()]);
}

#[test]
fn leaderboard_ranks_by_score_then_name() {
    let mut records = sample_records();
    records.push(PipelineRecord {
        team: "Design".to_string(),
        ..row("REQ-4", "Aaron Blake", "Alex Kumar")
    });
    let card = ScorecardEngine::standard()
        .evaluate(&records, as_of())
        .expect("scores");

    let board = card.leaderboard(RoleType::Recruiter);
    let ranking: Vec<(usize, &str)> = board
        .iter()
        .map(|entry| (entry.rank, entry.score.name.as_str()))
        .collect();

    assert_eq!(
        ranking,
        vec![(1, "Aaron Blake"), (2, "Mike Rodriguez"), (3, RECRUITER)]
    );
}

#[test]
fn person_detail_lists_contributing_violations() {
    let card = scorecard();

    let detail = card
        .person_detail(HIRING_MANAGER, None)
        .expect("hiring manager found");

    assert_eq!(detail.score.role_type, RoleType::HiringManager);
    assert_eq!(detail.rank, 2);
    assert_eq!(detail.ranked_out_of, 2);
    assert_eq!(detail.weakest_metric, Metric::StageVelocity);
    assert_eq!(detail.teams, vec!["Engineering".to_string()]);
    assert_eq!(detail.violations.len(), detail.score.total_violations);
    assert_eq!(detail.score.total_violations, 3);
    assert_eq!(detail.violations[0].severity_label, "High");

    assert!(card.person_detail("Nobody", None).is_none());
    assert!(card
        .person_detail(RECRUITER, Some(RoleType::HiringManager))
        .is_none());
}

#[test]
fn summary_and_insights_describe_the_org() {
    let card = scorecard();
    let summary = card.summary();

    assert_eq!(summary.org_band, ScoreBand::Good);
    assert_eq!(summary.recruiter_leaderboard[0].score.name, "Mike Rodriguez");
    assert_eq!(summary.roles.len(), 3);
    let velocity = summary
        .violations_by_metric
        .iter()
        .find(|count| count.metric == Metric::StageVelocity)
        .expect("velocity counted");
    assert_eq!(velocity.total, 3);
    assert_eq!(velocity.high, 1);

    let insights = summary.insights();
    assert_eq!(insights.critical_people, 0);
    assert_eq!(insights.top_hiring_manager.as_deref(), Some("Alex Kumar"));
    assert_eq!(insights.most_common_violation, Some(Metric::StageVelocity));
    assert!(insights.roles_needing_attention.is_empty());
    assert!(!insights.observations.is_empty());
}

#[test]
fn insights_cap_critical_roles_at_five() {
    let mut records = Vec::new();
    for index in 0..7 {
        let requisition = format!("REQ-{index}");
        let recruiter = format!("Recruiter {index}");
        let manager = format!("Manager {index}");
        for (delay, hm) in [
            (None, true),
            (None, true),
            (None, true),
            (Some(90), true),
            (None, false),
            (None, false),
        ] {
            records.push(PipelineRecord {
                recruiter_name: recruiter.clone(),
                hiring_manager_name: manager.clone(),
                ..interview(&requisition, delay, hm)
            });
        }
        for (stage, day) in [("New", 0), ("Phone Screen", 30), ("Offer", 60)] {
            records.push(PipelineRecord {
                recruiter_name: recruiter.clone(),
                hiring_manager_name: manager.clone(),
                ..stage_entry(&requisition, stage, day)
            });
        }
    }

    let card = ScorecardEngine::standard()
        .evaluate(&records, as_of())
        .expect("scores");
    let insights = card.summary().insights();

    assert_eq!(insights.roles_needing_attention.len(), 5);
    assert!(insights.critical_people > 0);
    let scores: Vec<f64> = insights
        .roles_needing_attention
        .iter()
        .map(|role| role.combined_score)
        .collect();
    assert!(scores.windows(2).all(|pair| pair[0] <= pair[1]));
}
