// Youth Transition Dashboard - REST API
// Axum router over the DataStore; every request recomputes the Analysis

use crate::aggregate::{Analysis, MonthlyTrend, RegionSummary};
use crate::error::{LoadError, QueryError};
use crate::loader::{DataStore, Datasets};
use crate::query::{self, Overview};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{debug, error};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DataStore>,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Load(String),
    Query(QueryError),
}

impl From<LoadError> for ApiError {
    fn from(err: LoadError) -> Self {
        ApiError::Load(err.to_string())
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::Query(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Load(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
            ApiError::Query(err) => (StatusCode::NOT_FOUND, err.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn load(state: &AppState) -> Result<(&Datasets, Analysis), ApiError> {
    let data = state.store.datasets().map_err(|e| {
        error!("Error loading datasets: {}", e);
        ApiError::from(e)
    })?;
    Ok((data, Analysis::compute(data)))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/overview - Headline statistics
async fn get_overview(State(state): State<AppState>) -> Result<Json<Overview>, ApiError> {
    let (data, analysis) = load(&state)?;
    let today = chrono::Local::now().date_naive();
    Ok(Json(query::overview(data, &analysis, today)?))
}

/// GET /api/states - Full state table
async fn get_states(State(state): State<AppState>) -> Result<Json<Vec<RegionSummary>>, ApiError> {
    let (_, analysis) = load(&state)?;
    Ok(Json(analysis.states))
}

/// GET /api/monthly - Monthly biometric trend
async fn get_monthly(State(state): State<AppState>) -> Result<Json<Vec<MonthlyTrend>>, ApiError> {
    let (_, analysis) = load(&state)?;
    Ok(Json(analysis.monthly))
}

/// GET /api/risk-distribution - States per risk tier
async fn get_risk_distribution(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, usize>>, ApiError> {
    let (_, analysis) = load(&state)?;
    Ok(Json(query::risk_distribution(&analysis.states)))
}

/// GET /api/top-performers/:n
async fn get_top_performers(
    State(state): State<AppState>,
    Path(n): Path<usize>,
) -> Result<Json<Vec<RegionSummary>>, ApiError> {
    let (_, analysis) = load(&state)?;
    Ok(Json(query::top_performers(&analysis.states, n).to_vec()))
}

/// GET /api/bottom-performers/:n
async fn get_bottom_performers(
    State(state): State<AppState>,
    Path(n): Path<usize>,
) -> Result<Json<Vec<RegionSummary>>, ApiError> {
    let (_, analysis) = load(&state)?;
    Ok(Json(query::bottom_performers(&analysis.states, n).to_vec()))
}

/// GET /api/state/:name - One state's row
async fn get_state_detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RegionSummary>, ApiError> {
    let (_, analysis) = load(&state)?;
    match query::state_detail(&analysis.states, &name) {
        Ok(row) => Ok(Json(row.clone())),
        Err(e) => {
            debug!(state = %name, "state lookup missed");
            Err(e.into())
        }
    }
}

/// GET / - Serve the dashboard
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(store: Arc<DataStore>, web_dir: &std::path::Path) -> Router {
    let state = AppState { store };

    let api_routes = Router::new()
        .route("/overview", get(get_overview))
        .route("/states", get(get_states))
        .route("/monthly", get(get_monthly))
        .route("/risk-distribution", get(get_risk_distribution))
        .route("/top-performers/:n", get(get_top_performers))
        .route("/bottom-performers/:n", get(get_bottom_performers))
        .route("/state/:name", get(get_state_detail))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new(web_dir))
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{DataPaths, DataSource};
    use crate::records::{BiometricRecord, EnrolmentRecord};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::NaiveDate;
    use serde_json::Value;
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn bio(state: &str, district: &str, young: u64, adult: u64) -> BiometricRecord {
        BiometricRecord {
            state: Some(state.to_string()),
            district: district.to_string(),
            pincode: format!("{}-pin", district),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            bio_age_5_17: young,
            bio_age_17_: adult,
        }
    }

    fn nowhere() -> DataPaths {
        DataPaths {
            biometric_dir: PathBuf::from("/nonexistent/bio"),
            demographic_dir: PathBuf::from("/nonexistent/demo"),
            enrolment_dir: PathBuf::from("/nonexistent/enrol"),
            cleaned_dir: PathBuf::from("/nonexistent/cleaned"),
        }
    }

    fn app_with(datasets: Datasets) -> Router {
        let store = DataStore::with_datasets(DataSource::Raw, nowhere(), datasets);
        router(Arc::new(store), std::path::Path::new("web"))
    }

    fn sample_app() -> Router {
        app_with(Datasets {
            biometric: vec![
                bio("Kerala", "Ernakulam", 65, 35),
                bio("West Bengal", "Kolkata", 25, 75),
                bio("Goa", "North Goa", 50, 50),
            ],
            demographic: vec![],
            enrolment: vec![EnrolmentRecord {
                state: Some("Sikkim".to_string()),
                district: "Gangtok".to_string(),
                pincode: "737101".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                age_5_17: 1,
                age_18_greater: 1,
            }],
        })
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_overview_endpoint() {
        let (status, body) = get_json(sample_app(), "/api/overview").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_records"], 4);
        assert_eq!(body["num_states"], 4);
        assert_eq!(body["best_state"], "Kerala");
        assert_eq!(body["worst_state"], "West Bengal");
        assert_eq!(body["gap"], 2.6);
        assert_eq!(body["critical_states"], 1);
        assert!(body["analysis_date"].is_string());
    }

    #[tokio::test]
    async fn test_overview_empty_is_not_found() {
        let (status, body) = get_json(app_with(Datasets::default()), "/api/overview").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No state data available");
    }

    #[tokio::test]
    async fn test_states_endpoint_is_sorted() {
        let (status, body) = get_json(sample_app(), "/api/states").await;

        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["state"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Kerala", "Goa", "West Bengal", "Sikkim"]);
        assert!(body[3]["youth_bio_pct"].is_null());
        assert_eq!(body[3]["risk_category"], "Unknown");
    }

    #[tokio::test]
    async fn test_monthly_endpoint() {
        let (_, body) = get_json(sample_app(), "/api/monthly").await;

        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["month_str"], "2025-03");
        assert_eq!(body[0]["bio_age_5_17"], 140);
    }

    #[tokio::test]
    async fn test_risk_distribution_endpoint() {
        let (_, body) = get_json(sample_app(), "/api/risk-distribution").await;

        assert_eq!(body["Exemplary"], 1);
        assert_eq!(body["Good"], 1);
        assert_eq!(body["Critical"], 1);
        assert_eq!(body["Unknown"], 1);
    }

    #[tokio::test]
    async fn test_top_and_bottom_performers() {
        let (_, top) = get_json(sample_app(), "/api/top-performers/2").await;
        let (_, none) = get_json(sample_app(), "/api/top-performers/0").await;
        let (_, bottom) = get_json(sample_app(), "/api/bottom-performers/50").await;

        assert_eq!(top.as_array().unwrap().len(), 2);
        assert_eq!(top[0]["state"], "Kerala");
        assert_eq!(none, Value::Array(vec![]));
        assert_eq!(bottom.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_state_detail_endpoint() {
        let (status, body) = get_json(sample_app(), "/api/state/West%20Bengal").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["youth_bio_pct"], 25.0);

        let (status, body) = get_json(sample_app(), "/api/state/Atlantis").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "State not found" }));
    }

    #[tokio::test]
    async fn test_load_failure_is_server_error() {
        let store = DataStore::new(DataSource::Raw, nowhere());
        let app = router(Arc::new(store), std::path::Path::new("web"));

        let (status, body) = get_json(app, "/api/states").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_index_served() {
        let response = sample_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("/static/app.js"));
    }
}
