use crate::infra::{deserialize_optional_date, AppState};
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use hiring_scorecard::error::AppError;
use hiring_scorecard::workflows::ats::AtsImporter;
use hiring_scorecard::workflows::scorecard::trends::{person_history, DEFAULT_HIGHLIGHTS};
use hiring_scorecard::workflows::scorecard::{
    PersonDetailView, PersonHistoryPoint, RoleType, Scorecard, ScorecardEngine,
    ScorecardInsights, ScorecardSummary, SnapshotError, SnapshotSeries, TrendReport,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct ScorecardRequest {
    pub(crate) csv: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ScorecardQuery {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) role: Option<RoleType>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScorecardResponse {
    pub(crate) summary: ScorecardSummary,
    pub(crate) insights: ScorecardInsights,
}

impl From<&Scorecard> for ScorecardResponse {
    fn from(scorecard: &Scorecard) -> Self {
        let summary = scorecard.summary();
        let insights = summary.insights();
        Self { summary, insights }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrendsRequest {
    pub(crate) series: SnapshotSeries,
    #[serde(default)]
    pub(crate) person: Option<String>,
    #[serde(default)]
    pub(crate) highlights: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TrendsQuery {
    #[serde(default)]
    pub(crate) person: Option<String>,
    #[serde(default)]
    pub(crate) highlights: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TrendsResponse {
    pub(crate) report: TrendReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) person_history: Option<Vec<PersonHistoryPoint>>,
}

/// Route-level failures: library errors keep their own status, lookups add 404.
#[derive(Debug)]
pub(crate) enum ApiError {
    App(AppError),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::App(err) => err.into_response(),
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self::App(value)
    }
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route(
            "/api/v1/scorecard",
            get(configured_scorecard_endpoint).post(scorecard_endpoint),
        )
        .route("/api/v1/scorecard/people/:name", get(person_endpoint))
        .route(
            "/api/v1/scorecard/trends",
            get(configured_trends_endpoint).post(trends_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) fn score_csv(raw: &str, as_of: NaiveDate) -> Result<Scorecard, AppError> {
    let records = AtsImporter::from_csv_str(raw)?;
    Ok(ScorecardEngine::standard().evaluate(&records, as_of)?)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) async fn scorecard_endpoint(
    Json(payload): Json<ScorecardRequest>,
) -> Result<Json<ScorecardResponse>, ApiError> {
    let as_of = payload.as_of.unwrap_or_else(today);
    let scorecard = score_csv(&payload.csv, as_of)?;
    Ok(Json(ScorecardResponse::from(&scorecard)))
}

fn configured_path(path: Option<&PathBuf>, variable: &str) -> Result<PathBuf, ApiError> {
    path.cloned()
        .ok_or_else(|| ApiError::NotFound(format!("no file configured; set {variable}")))
}

/// Reads and scores the configured export on the blocking pool.
async fn configured_scorecard(
    state: &AppState,
    as_of: NaiveDate,
) -> Result<Arc<Scorecard>, ApiError> {
    let path = configured_path(state.data.ats_csv.as_ref(), "SCORECARD_ATS_CSV")?;
    let cache = state.scorecards.clone();

    let scored = tokio::task::spawn_blocking(move || -> Result<Arc<Scorecard>, AppError> {
        let raw = AtsImporter::read_export(&path)?;
        cache.get_or_evaluate(&raw, as_of, score_csv)
    })
    .await
    .map_err(|err| AppError::from(std::io::Error::other(err)))?;

    Ok(scored?)
}

pub(crate) async fn configured_scorecard_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<ScorecardQuery>,
) -> Result<Json<ScorecardResponse>, ApiError> {
    let scorecard = configured_scorecard(&state, query.as_of.unwrap_or_else(today)).await?;
    Ok(Json(ScorecardResponse::from(scorecard.as_ref())))
}

pub(crate) async fn person_endpoint(
    Extension(state): Extension<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ScorecardQuery>,
) -> Result<Json<PersonDetailView>, ApiError> {
    let scorecard = configured_scorecard(&state, query.as_of.unwrap_or_else(today)).await?;
    scorecard
        .person_detail(&name, query.role)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no scorecard entry for '{name}'")))
}

fn trends_response(
    series: &SnapshotSeries,
    person: Option<&str>,
    highlights: Option<usize>,
) -> TrendsResponse {
    TrendsResponse {
        report: TrendReport::build(series, highlights.unwrap_or(DEFAULT_HIGHLIGHTS)),
        person_history: person.map(|name| person_history(series, name, None)),
    }
}

pub(crate) async fn trends_endpoint(
    Json(payload): Json<TrendsRequest>,
) -> Result<Json<TrendsResponse>, ApiError> {
    payload.series.validate().map_err(AppError::from)?;
    Ok(Json(trends_response(
        &payload.series,
        payload.person.as_deref(),
        payload.highlights,
    )))
}

pub(crate) async fn configured_trends_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<TrendsResponse>, ApiError> {
    let path = configured_path(state.data.history.as_ref(), "SCORECARD_HISTORY")?;
    let series = match SnapshotSeries::from_path(&path) {
        Ok(series) => series,
        Err(SnapshotError::NotFound(path)) => {
            return Err(ApiError::NotFound(format!(
                "no snapshot history at {}",
                path.display()
            )))
        }
        Err(err) => return Err(AppError::from(err).into()),
    };
    Ok(Json(trends_response(
        &series,
        query.person.as_deref(),
        query.highlights,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::ScorecardCache;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use hiring_scorecard::config::DataConfig;
    use hiring_scorecard::workflows::scorecard::Snapshot;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    const EXPORT: &str = include_str!("../../../crates/hiring-scorecard/tests/data/ats_export.csv");

    fn export_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../crates/hiring-scorecard/tests/data/ats_export.csv")
    }

    fn state(data: DataConfig) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            data: Arc::new(data),
            scorecards: ScorecardCache::default(),
        }
    }

    fn configured() -> AppState {
        state(DataConfig {
            ats_csv: Some(export_path()),
            history: None,
            cadence: "biweekly".to_string(),
        })
    }

    fn app(state: AppState) -> Router {
        router().layer(Extension(state))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body collected");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request builds")
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 1).expect("valid date")
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_flagged() {
        let (status, body) = send(app(configured()), get_request("/ready")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");

        let (status, body) = send(app(configured()), get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn posted_export_is_scored() {
        let request = post_json(
            "/api/v1/scorecard",
            &json!({ "csv": EXPORT, "as_of": "2025-02-01" }),
        );
        let (status, body) = send(app(configured()), request).await;

        assert_eq!(status, StatusCode::OK);
        let org = &body["summary"]["org"];
        assert_eq!(org["people_count"], 6);
        assert_eq!(org["total_violations"], 19);
        assert_eq!(org["high_severity_total"], 7);
        assert_eq!(
            body["summary"]["recruiter_leaderboard"][0]["name"],
            "Mike Rodriguez"
        );
        assert_eq!(body["summary"]["departments"][0]["team"], "Design");
        assert_eq!(body["insights"]["critical_people"], 1);
    }

    #[tokio::test]
    async fn headers_only_export_is_a_bad_request() {
        let headers = EXPORT.lines().next().expect("header row");
        let request = post_json("/api/v1/scorecard", &json!({ "csv": headers }));
        let (status, body) = send(app(configured()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .expect("error message")
            .contains("no pipeline records"));
    }

    #[tokio::test]
    async fn configured_export_backs_person_lookup() {
        let state = configured();
        let uri = "/api/v1/scorecard/people/Mark%20Watson?as_of=2025-02-01&role=hiring_manager";
        let (status, body) = send(app(state.clone()), get_request(uri)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Mark Watson");
        assert_eq!(body["band"], "critical");
        assert_eq!(body["rank"], 3);
        let score = body["final_score"].as_f64().expect("numeric score");
        assert!((score - 47.75).abs() < 1e-9);

        let (status, _) = send(
            app(state),
            get_request("/api/v1/scorecard/people/Nobody?as_of=2025-02-01"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unreadable_configured_export_names_its_path() {
        let state = state(DataConfig {
            ats_csv: Some(PathBuf::from("missing/ats_export.csv")),
            history: None,
            cadence: "biweekly".to_string(),
        });
        let (status, body) = send(app(state), get_request("/api/v1/scorecard")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .expect("error message")
            .contains("missing/ats_export.csv"));
    }

    #[tokio::test]
    async fn configured_endpoints_report_missing_configuration() {
        let (status, body) = send(
            app(state(DataConfig::default())),
            get_request("/api/v1/scorecard"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"]
            .as_str()
            .expect("error message")
            .contains("SCORECARD_ATS_CSV"));

        let (status, _) = send(
            app(state(DataConfig::default())),
            get_request("/api/v1/scorecard/trends"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    fn two_snapshot_series() -> SnapshotSeries {
        let scorecard = score_csv(EXPORT, as_of()).expect("export scores");
        let mut series = SnapshotSeries::new("biweekly");
        for day in [1, 15] {
            let date = NaiveDate::from_ymd_opt(2025, 2, day).expect("valid date");
            series
                .append(Snapshot::capture(date, &scorecard))
                .expect("snapshot appends");
        }
        series
    }

    #[tokio::test]
    async fn posted_series_yields_trends() {
        let request = post_json(
            "/api/v1/scorecard/trends",
            &json!({ "series": two_snapshot_series(), "person": "Sarah Chen" }),
        );
        let (status, body) = send(app(configured()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report"]["snapshots"], 2);
        assert_eq!(body["report"]["overall"]["org_average"]["direction"], "flat");
        assert_eq!(body["report"]["overall"]["high_severity_reduction"], 0);
        let history = body["person_history"].as_array().expect("history listed");
        assert_eq!(history.len(), 2);
        assert_eq!(history[1]["snapshot_num"], 1);
    }

    #[tokio::test]
    async fn inconsistent_series_is_rejected() {
        let request = post_json(
            "/api/v1/scorecard/trends",
            &json!({
                "series": {
                    "snapshots": [],
                    "metadata": {
                        "start_date": null,
                        "end_date": null,
                        "num_snapshots": 3,
                        "cadence": "biweekly"
                    }
                }
            }),
        );
        let (status, _) = send(app(configured()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
