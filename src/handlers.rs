use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::debug;
use std::sync::Arc;

use crate::engine::{Agent, MarketInfo, Quote, Trade, TradeResult, TradingEngine};
use crate::error::{ErrorKind, TradeError};
use crate::params::{CreateAgentRequest, ErrorResponse, TradeRequest};

pub type SharedEngine = Arc<TradingEngine>;

type ApiResult<T> = Result<Json<T>, TradeError>;

/// Body extraction failures answer in the same error shape as everything else.
fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, TradeError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| TradeError::InvalidRequest(rejection.body_text()))
}

impl IntoResponse for TradeError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::CapacityError | ErrorKind::SlippageError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::ConcurrencyError => StatusCode::CONFLICT,
            ErrorKind::StateError => match &self {
                TradeError::AgentNotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::CONFLICT,
            },
            ErrorKind::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        debug!("Rejected request ({}): {}", status, self);
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

pub fn router(engine: SharedEngine) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/agents", post(create_agent))
        .route("/agents/:id", get(get_agent))
        .route("/agents/:id/trades", get(get_trades))
        .route("/quote", post(post_quote))
        .route("/trade", post(post_trade))
        .with_state(engine)
}

pub async fn health_check() -> &'static str {
    "agent-curve, working"
}

pub async fn create_agent(
    State(engine): State<SharedEngine>,
    body: Result<Json<CreateAgentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Agent>), TradeError> {
    let agent = engine.create_agent(payload(body)?.into())?;
    Ok((StatusCode::CREATED, Json(agent)))
}

pub async fn get_agent(State(engine): State<SharedEngine>, Path(id): Path<String>) -> ApiResult<MarketInfo> {
    Ok(Json(engine.agent_info(&id)?))
}

pub async fn get_trades(State(engine): State<SharedEngine>, Path(id): Path<String>) -> ApiResult<Vec<Trade>> {
    Ok(Json(engine.trades(&id)?))
}

//Dry run, nothing is stored
pub async fn post_quote(
    State(engine): State<SharedEngine>,
    body: Result<Json<TradeRequest>, JsonRejection>,
) -> ApiResult<Quote> {
    let (agent_id, order) = payload(body)?.into_order()?;
    Ok(Json(engine.quote(&agent_id, order)?))
}

pub async fn post_trade(
    State(engine): State<SharedEngine>,
    body: Result<Json<TradeRequest>, JsonRejection>,
) -> ApiResult<TradeResult> {
    let (agent_id, order) = payload(body)?.into_order()?;
    Ok(Json(engine.execute_trade(&agent_id, order).await?))
}
