use chrono::NaiveDate;
use hiring_scorecard::config::DataConfig;
use hiring_scorecard::error::AppError;
use hiring_scorecard::workflows::scorecard::Scorecard;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) data: Arc<DataConfig>,
    pub(crate) scorecards: ScorecardCache,
}

struct CachedScorecard {
    digest: u64,
    as_of: NaiveDate,
    scorecard: Arc<Scorecard>,
}

/// Holds the scorecard for the most recently scored export, keyed on its content.
///
/// The lock is only held to read or replace the entry, never while scoring.
#[derive(Default, Clone)]
pub(crate) struct ScorecardCache {
    entry: Arc<Mutex<Option<CachedScorecard>>>,
}

impl ScorecardCache {
    pub(crate) fn get_or_evaluate<F>(
        &self,
        raw: &str,
        as_of: NaiveDate,
        evaluate: F,
    ) -> Result<Arc<Scorecard>, AppError>
    where
        F: FnOnce(&str, NaiveDate) -> Result<Scorecard, AppError>,
    {
        let digest = content_digest(raw);

        if let Some(cached) = self.lookup(digest, as_of) {
            debug!(digest, %as_of, "serving cached scorecard");
            return Ok(cached);
        }

        let scorecard = Arc::new(evaluate(raw, as_of)?);
        *self.entry.lock().unwrap_or_else(PoisonError::into_inner) = Some(CachedScorecard {
            digest,
            as_of,
            scorecard: Arc::clone(&scorecard),
        });
        Ok(scorecard)
    }

    fn lookup(&self, digest: u64, as_of: NaiveDate) -> Option<Arc<Scorecard>> {
        let guard = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|cached| cached.digest == digest && cached.as_of == as_of)
            .map(|cached| Arc::clone(&cached.scorecard))
    }
}

fn content_digest(raw: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    raw.hash(&mut hasher);
    hasher.finish()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
