//! Canonical scoring constants shared by every detector and aggregator.
//!
//! Detectors never carry their own thresholds or penalty values; they receive a
//! [`ScoringRules`] and classify through it so severity and penalty cannot drift apart.

use super::domain::{Metric, ScoringError, Severity};
use serde::{Deserialize, Serialize};

const WEIGHT_EPSILON: f64 = 1e-9;

/// Relative weight of each metric in the final score. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricWeights {
    pub feedback_timeliness: f64,
    pub stage_velocity: f64,
    pub hm_engagement: f64,
}

impl MetricWeights {
    pub fn weight(&self, metric: Metric) -> f64 {
        match metric {
            Metric::FeedbackTimeliness => self.feedback_timeliness,
            Metric::StageVelocity => self.stage_velocity,
            Metric::HmEngagement => self.hm_engagement,
        }
    }

    pub fn total(&self) -> f64 {
        self.feedback_timeliness + self.stage_velocity + self.hm_engagement
    }
}

/// Canonical point penalty per severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyTable {
    pub low: i32,
    pub medium: i32,
    pub high: i32,
}

impl PenaltyTable {
    pub const fn penalty(&self, severity: Severity) -> i32 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
        }
    }

    /// Permitted penalty band for each tier: low -2..=-5, medium -6..=-15, high -20 and beyond.
    pub fn within_band(severity: Severity, penalty: i32) -> bool {
        match severity {
            Severity::Low => (-5..=-2).contains(&penalty),
            Severity::Medium => (-15..=-6).contains(&penalty),
            Severity::High => penalty <= -20,
        }
    }
}

/// Upper bounds (inclusive) of the low and medium tiers for a measured quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub low_max: f64,
    pub medium_max: f64,
}

impl TierThresholds {
    pub fn classify(&self, value: f64) -> Severity {
        if value <= self.low_max {
            Severity::Low
        } else if value <= self.medium_max {
            Severity::Medium
        } else {
            Severity::High
        }
    }
}

/// Hiring-manager engagement counting rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementRules {
    /// Feedback later than this many hours counts as a delayed action.
    pub delayed_after_hours: f64,
    /// Issue counts up to this value are medium; above it they are high.
    pub medium_max_issues: u32,
    /// Cap on the multiplier applied to the high penalty.
    pub max_multiplier: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    pub weights: MetricWeights,
    pub penalties: PenaltyTable,
    pub feedback_hours: TierThresholds,
    pub velocity_days: TierThresholds,
    pub engagement: EngagementRules,
    /// Fraction of a stage-velocity penalty carried by the requisition's hiring manager.
    pub hm_velocity_share: f64,
    /// Weight of the recruiter's score in a role's combined score; the hiring manager gets the rest.
    pub recruiter_role_share: f64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self::standard()
    }
}

impl ScoringRules {
    pub const BASELINE: f64 = 100.0;

    pub fn standard() -> Self {
        Self {
            weights: MetricWeights {
                feedback_timeliness: 0.40,
                stage_velocity: 0.35,
                hm_engagement: 0.25,
            },
            penalties: PenaltyTable {
                low: -3,
                medium: -10,
                high: -25,
            },
            feedback_hours: TierThresholds {
                low_max: 48.0,
                medium_max: 72.0,
            },
            velocity_days: TierThresholds {
                low_max: 7.0,
                medium_max: 14.0,
            },
            engagement: EngagementRules {
                delayed_after_hours: 72.0,
                medium_max_issues: 2,
                max_multiplier: 3,
            },
            hm_velocity_share: 0.5,
            recruiter_role_share: 0.5,
        }
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        let total = self.weights.total();
        if (total - 1.0).abs() > WEIGHT_EPSILON {
            return Err(ScoringError::InvalidRules(format!(
                "metric weights must sum to 1.0 (got {total:.4})"
            )));
        }

        if Metric::ordered()
            .into_iter()
            .any(|metric| self.weights.weight(metric) < 0.0)
        {
            return Err(ScoringError::InvalidRules(
                "metric weights must be non-negative".to_string(),
            ));
        }

        for severity in [Severity::Low, Severity::Medium, Severity::High] {
            let penalty = self.penalties.penalty(severity);
            if !PenaltyTable::within_band(severity, penalty) {
                return Err(ScoringError::InvalidRules(format!(
                    "{} penalty {penalty} falls outside its tier band",
                    severity.label()
                )));
            }
        }

        for (name, thresholds) in [
            ("feedback", &self.feedback_hours),
            ("velocity", &self.velocity_days),
        ] {
            if thresholds.low_max < 0.0 || thresholds.medium_max < thresholds.low_max {
                return Err(ScoringError::InvalidRules(format!(
                    "{name} thresholds must be non-negative and ascending"
                )));
            }
        }

        if self.engagement.max_multiplier == 0 || self.engagement.medium_max_issues == 0 {
            return Err(ScoringError::InvalidRules(
                "engagement issue limits must be positive".to_string(),
            ));
        }

        for (name, share) in [
            ("hm_velocity_share", self.hm_velocity_share),
            ("recruiter_role_share", self.recruiter_role_share),
        ] {
            if !(0.0..=1.0).contains(&share) {
                return Err(ScoringError::InvalidRules(format!(
                    "{name} must lie within [0, 1] (got {share})"
                )));
            }
        }

        Ok(())
    }

    pub fn classify_feedback_delay(&self, hours: f64) -> (Severity, i32) {
        let severity = self.feedback_hours.classify(hours);
        (severity, self.penalties.penalty(severity))
    }

    pub fn missing_feedback(&self) -> (Severity, i32) {
        (Severity::High, self.penalties.high)
    }

    pub fn classify_stage_duration(&self, days: i64) -> (Severity, i32) {
        let severity = self.velocity_days.classify(days as f64);
        (severity, self.penalties.penalty(severity))
    }

    /// `None` when the hiring manager had no missed or delayed actions.
    pub fn classify_engagement(&self, issues: u32) -> Option<(Severity, i32)> {
        if issues == 0 {
            return None;
        }

        if issues <= self.engagement.medium_max_issues {
            return Some((Severity::Medium, self.penalties.medium));
        }

        let multiplier = issues.min(self.engagement.max_multiplier) as i32;
        Some((Severity::High, self.penalties.high.saturating_mul(multiplier)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_rules_validate() {
        ScoringRules::standard()
            .validate()
            .expect("standard rules are consistent");
    }

    #[test]
    fn feedback_tiers_use_inclusive_upper_bounds() {
        let rules = ScoringRules::standard();
        assert_eq!(rules.classify_feedback_delay(48.0), (Severity::Low, -3));
        assert_eq!(rules.classify_feedback_delay(48.5), (Severity::Medium, -10));
        assert_eq!(rules.classify_feedback_delay(72.0), (Severity::Medium, -10));
        assert_eq!(rules.classify_feedback_delay(72.1), (Severity::High, -25));
    }

    #[test]
    fn engagement_penalty_compounds_and_caps() {
        let rules = ScoringRules::standard();
        assert_eq!(rules.classify_engagement(0), None);
        assert_eq!(rules.classify_engagement(2), Some((Severity::Medium, -10)));
        assert_eq!(rules.classify_engagement(3), Some((Severity::High, -75)));
        assert_eq!(rules.classify_engagement(9), Some((Severity::High, -75)));
    }

    #[test]
    fn rejects_weights_that_do_not_sum_to_one() {
        let mut rules = ScoringRules::standard();
        rules.weights.hm_engagement = 0.30;
        assert!(matches!(
            rules.validate(),
            Err(ScoringError::InvalidRules(_))
        ));
    }

    #[test]
    fn rejects_penalties_outside_tier_band() {
        let mut rules = ScoringRules::standard();
        rules.penalties.medium = -25;
        let error = rules.validate().expect_err("medium penalty out of band");
        assert!(error.to_string().contains("Medium"));
    }
}
