// campaign generator api

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shuttle_axum::ShuttleAxum;
use shuttle_runtime::SecretStore;
use tracing::{info, warn};

mod analytics;
mod assistant;
mod config;
mod engagement;
mod generator;
mod history;
mod models;
mod parsing;
mod prompt;
mod providers;
mod templates;

use analytics::HistorySummary;
use assistant::CampaignAssistant;
use config::AppConfig;
use generator::VariantGenerator;
use history::CampaignStore;
use models::{GenerationRequest, GenerationResponse, HistoricalCampaign};
use providers::Provider;

#[derive(Clone)]
struct AppState {
    assistant: Arc<CampaignAssistant>,
}

type ApiError = (StatusCode, String);

// main api endpoint
async fn generate_campaigns_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResponse>, ApiError> {
    let payload = accept_request(payload)?;
    info!(
        "Received {} campaign request for '{}' ({} tone)",
        payload.campaign_type, payload.product, payload.brand_tone
    );
    reject_incomplete(&payload)?;

    let response = state.assistant.generate_campaigns(&payload).await;

    info!(
        "Generated {} campaign variants for '{}'",
        response.variants.len(),
        payload.product
    );
    Ok(Json(response))
}

// template path only, no model call
async fn generate_deterministic_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResponse>, ApiError> {
    let payload = accept_request(payload)?;
    reject_incomplete(&payload)?;
    Ok(Json(state.assistant.generator().generate(&payload)))
}

async fn list_campaigns_handler(State(state): State<AppState>) -> Json<Vec<HistoricalCampaign>> {
    Json(state.assistant.generator().store().campaigns().to_vec())
}

async fn analytics_handler(State(state): State<AppState>) -> Json<HistorySummary> {
    Json(analytics::summarize(
        state.assistant.generator().store().campaigns(),
    ))
}

// malformed or partial bodies are incomplete input too
fn accept_request(
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<GenerationRequest, ApiError> {
    match payload {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => {
            warn!("Rejected campaign request: {}", rejection.body_text());
            Err((StatusCode::BAD_REQUEST, rejection.body_text()))
        }
    }
}

fn reject_incomplete(payload: &GenerationRequest) -> Result<(), ApiError> {
    payload.validate().map_err(|e| {
        warn!("Rejected campaign request: {}", e);
        (StatusCode::BAD_REQUEST, e.to_string())
    })
}

// shuttle entry point
#[shuttle_runtime::main]
async fn axum(#[shuttle_runtime::Secrets] secret_store: SecretStore) -> ShuttleAxum {
    info!("Starting campaign generator API v0.1");

    let config = AppConfig::from_secrets(&secret_store);
    let store = CampaignStore::builtin().context("Cannot start without the campaign dataset")?;
    info!(
        "Loaded {} historical campaigns (dataset {})",
        store.campaigns().len(),
        store.version()
    );

    let backend = completion_backend(&config);
    let generator = VariantGenerator::new(Arc::new(store));
    let assistant = CampaignAssistant::new(generator, backend, config.timeout);

    let router = build_router(AppState {
        assistant: Arc::new(assistant),
    });
    Ok(router.into())
}

fn completion_backend(config: &AppConfig) -> Option<Provider> {
    match Provider::from_config(config) {
        Ok(provider) => Some(provider),
        Err(e) => {
            warn!("{} - campaigns will use templates only", e);
            None
        }
    }
}

// setup http routes
fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/generate-campaigns", post(generate_campaigns_handler))
        .route(
            "/generate-campaigns/deterministic",
            post(generate_deterministic_handler),
        )
        .route("/campaigns", get(list_campaigns_handler))
        .route("/analytics", get(analytics_handler))
        .with_state(state)
}
