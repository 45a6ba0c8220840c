use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Json, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::clients::Summarizer;
use crate::core::{
    Advisor, FundListing, ProfileRequest, SummaryContext, SummarySection, ask, recommend,
    summarize,
};
use crate::error::Error;

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

/// Number of fund search hits the dashboard shows by default.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

#[derive(Clone)]
pub struct AppState {
    pub advisor: Advisor,
    /// Absent when no LLM key is configured; the AI endpoints then answer 500.
    pub summarizer: Option<Arc<dyn Summarizer>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RecommendPayload {
    age: Option<u32>,
    monthly_income: Option<f64>,
    profession: Option<String>,
    region: Option<String>,
    goal: Option<String>,
    enrich: Option<bool>,
}

impl RecommendPayload {
    fn into_request(self) -> (ProfileRequest, bool) {
        let enrich = self.enrich.unwrap_or(false);
        (
            ProfileRequest {
                age: self.age,
                monthly_income: self.monthly_income,
                profession: self.profession,
                region: self.region,
                goal: self.goal,
            },
            enrich,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FundsQuery {
    q: Option<String>,
    limit: Option<usize>,
}

/// A recommendation plus the section the dashboard adds to its summary context.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecommendResponse<T> {
    #[serde(flatten)]
    recommendation: T,
    summary_section: SummarySection,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FundsResponse {
    query: String,
    results: Vec<FundListing>,
    summary_section: SummarySection,
}

#[derive(Debug, Deserialize)]
struct AskPayload {
    question: String,
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    summary: String,
}

#[derive(Debug, Serialize)]
struct AskResponse {
    answer: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Http(_) | Error::Api(_) | Error::Parse(_) => StatusCode::BAD_GATEWAY,
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("{self}");
        }
        error_response(status, &self.to_string())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/recommend",
            get(recommend_get_handler).post(recommend_post_handler),
        )
        .route("/api/funds", get(funds_handler))
        .route("/api/summary", post(summary_handler))
        .route("/api/ask", post(ask_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(state: AppState, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Advisor HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, router(state)).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn recommend_get_handler(
    State(state): State<AppState>,
    payload: Result<Query<RecommendPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => recommend_handler_impl(&state, payload).await,
        Err(rejection) => bad_request(rejection.body_text()),
    }
}

async fn recommend_post_handler(
    State(state): State<AppState>,
    payload: Result<Json<RecommendPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => recommend_handler_impl(&state, payload).await,
        Err(rejection) => bad_request(rejection.body_text()),
    }
}

async fn recommend_handler_impl(state: &AppState, payload: RecommendPayload) -> Response {
    let (request, enrich) = payload.into_request();
    let profile = match request.validate() {
        Ok(profile) => profile,
        Err(e) => return e.into_response(),
    };

    let allocation = recommend(&profile);
    if enrich {
        let enriched = state.advisor.enrich(allocation).await;
        let summary_section = SummarySection::recommendation(&enriched.allocation);
        json_response(
            StatusCode::OK,
            RecommendResponse {
                recommendation: enriched,
                summary_section,
            },
        )
    } else {
        let summary_section = SummarySection::recommendation(&allocation);
        json_response(
            StatusCode::OK,
            RecommendResponse {
                recommendation: allocation,
                summary_section,
            },
        )
    }
}

async fn funds_handler(
    State(state): State<AppState>,
    query: Result<Query<FundsQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let q = query.q.unwrap_or_default().trim().to_string();
    if q.is_empty() {
        return Error::Validation("q is required".to_string()).into_response();
    }

    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let mut results = state.advisor.search_funds(&q).await;
    results.truncate(limit);
    let summary_section = SummarySection::fund_search(&q, &results);
    json_response(
        StatusCode::OK,
        FundsResponse {
            query: q,
            results,
            summary_section,
        },
    )
}

async fn summary_handler(
    State(state): State<AppState>,
    context: Result<Json<SummaryContext>, JsonRejection>,
) -> Response {
    let context: SummaryContext = match context {
        Ok(Json(context)) => context.sections.into_iter().collect(),
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let summarizer = match summarizer(&state) {
        Ok(summarizer) => summarizer,
        Err(e) => return e.into_response(),
    };
    match summarize(summarizer.as_ref(), &context).await {
        Ok(summary) => json_response(StatusCode::OK, SummaryResponse { summary }),
        Err(e) => e.into_response(),
    }
}

async fn ask_handler(
    State(state): State<AppState>,
    payload: Result<Json<AskPayload>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let summarizer = match summarizer(&state) {
        Ok(summarizer) => summarizer,
        Err(e) => return e.into_response(),
    };
    match ask(summarizer.as_ref(), &payload.question).await {
        Ok(answer) => json_response(StatusCode::OK, AskResponse { answer }),
        Err(e) => e.into_response(),
    }
}

fn summarizer(state: &AppState) -> Result<Arc<dyn Summarizer>, Error> {
    state
        .summarizer
        .clone()
        .ok_or_else(|| Error::Config("GEMINI_API_KEY is not configured".to_string()))
}

/// Extractor rejections answer in the same JSON shape as every other error.
fn bad_request(reason: String) -> Response {
    Error::Validation(reason).into_response()
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
